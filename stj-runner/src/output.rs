//! Transcript rendering and output

use std::path::Path;

use crate::services::Transcript;

/// Render transcripts for display
///
/// A single transcript is emitted verbatim. Several are each preceded by a
/// `# <job id>` header line.
pub fn render_transcripts(transcripts: &[Transcript]) -> String {
    if let [only] = transcripts {
        return only.text.clone();
    }

    let mut rendered = String::new();
    for transcript in transcripts {
        rendered.push_str(&format!("# {}\n", transcript.job_id));
        rendered.push_str(&transcript.text);
        if !transcript.text.ends_with('\n') {
            rendered.push('\n');
        }
    }
    rendered
}

/// Write rendered transcripts to `path`, replacing any existing file
pub async fn write_transcripts(path: &Path, transcripts: &[Transcript]) -> std::io::Result<()> {
    tokio::fs::write(path, render_transcripts(transcripts)).await?;
    tracing::info!(path = %path.display(), count = transcripts.len(), "Transcripts written");
    Ok(())
}
