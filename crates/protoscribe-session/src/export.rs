//! Saving the current text and history

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use protoscribe_protocol::HistoryEntry;
use serde::Serialize;

use crate::Session;

/// Write `text` as Markdown under a `# {title}` heading
///
/// The file is written to a temporary sibling and renamed into place, so a
/// failed save never leaves a truncated file behind.
pub fn write_markdown(path: &Path, title: &str, text: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(render_markdown(title, text).as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    tracing::info!(path = %path.display(), bytes = text.len(), "saved section");
    Ok(())
}

pub fn render_markdown(title: &str, text: &str) -> String {
    let title = title.trim();
    let body = text.trim_end();
    if title.is_empty() {
        format!("{}\n", body)
    } else {
        format!("# {}\n\n{}\n", title, body)
    }
}

#[derive(Debug, Serialize)]
struct SessionExport<'a> {
    exported_at: DateTime<Utc>,
    current_text: &'a str,
    history: &'a [HistoryEntry],
}

/// Current text and history as pretty-printed JSON
pub fn to_json(session: &Session) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SessionExport {
        exported_at: Utc::now(),
        current_text: session.current_text(),
        history: session.history(),
    })
}
