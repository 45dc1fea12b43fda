//! Jobs submitted by the current run

use std::collections::HashSet;
use uuid::Uuid;

/// Identifiers of jobs this run created
///
/// The listing endpoint returns every job visible to the credential, so this
/// set scopes "jobs to wait for" down to the ones submitted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedJobSet {
    ids: HashSet<Uuid>,
}

impl CreatedJobSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created job. Returns false if it was already tracked.
    pub fn insert(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<Uuid> for CreatedJobSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
