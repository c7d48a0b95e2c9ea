//! Note-history consolidation.
//!
//! The target deployment accepts a single audit note per write, so the
//! source's note history is folded into one note whose text survives review:
//! newest first, author names resolved where possible, and a marker so
//! migrated notes are recognisable later.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use conformity_api::models::Note;

const MIGRATION_MARKER: &str = "[Copied settings via migration tool]";

/// Render a millisecond epoch as ISO-8601 UTC with a space separator,
/// e.g. `2023-11-14 22:13:20+00:00`.
fn format_ts(created_ts: i64) -> String {
    match Utc.timestamp_millis_opt(created_ts).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
        None => format!("epoch-ms {created_ts}"),
    }
}

/// Fold a note history into one note, newest first.
///
/// `user_names` maps author user ids to display names; unknown authors get
/// an empty name rather than dropping the note.
pub fn consolidate_notes(notes: &[Note], user_names: &HashMap<String, String>) -> String {
    if notes.is_empty() {
        return format!("{MIGRATION_MARKER} No history of notes found.");
    }

    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by(|a, b| b.created_ts.cmp(&a.created_ts));

    let fragments: Vec<String> = sorted
        .iter()
        .map(|note| {
            let name = user_names
                .get(&note.created_by)
                .map(String::as_str)
                .unwrap_or_default();
            format!(
                "On: {}\nBy: {}\nNote: {}",
                format_ts(note.created_ts),
                name,
                note.note
            )
        })
        .collect();

    format!(
        "{MIGRATION_MARKER} History of notes:\n\
         -----------------------\n\
         {}\n\
         -----------------------\n",
        fragments.join("\n\n")
    )
}

/// The text of the newest note, keeping the first-seen note among equal
/// timestamps.  Empty string when there is no history.
pub fn most_recent_note_text(notes: &[Note]) -> String {
    let mut best: Option<&Note> = None;
    for note in notes {
        match best {
            Some(b) if note.created_ts <= b.created_ts => {}
            _ => best = Some(note),
        }
    }
    best.map(|n| n.note.clone()).unwrap_or_default()
}

/// Truncate to at most `max_len` characters, ending in `suffix` when
/// anything was cut.  The suffix is never itself split.
pub fn truncate_text(txt: &str, max_len: usize, suffix: &str) -> String {
    let char_count = txt.chars().count();
    if char_count <= max_len {
        return txt.to_string();
    }
    let keep = max_len.saturating_sub(suffix.chars().count());
    let mut out: String = txt.chars().take(keep).collect();
    out.push_str(suffix);
    out
}
