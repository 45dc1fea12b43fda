//! UUID utilities

use uuid::Uuid;

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Parse the final path segment of a resource location as a UUID
///
/// Accepts absolute URIs or bare paths. Query strings, fragments and a
/// trailing `/` are ignored. Returns `None` when no segment exists or the
/// segment is not a UUID.
pub fn trailing_segment_uuid(location: &str) -> Option<Uuid> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }

    parse(segment).ok()
}
