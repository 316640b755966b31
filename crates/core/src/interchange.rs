//! JSON interchange format for export and import.
//!
//! The document is a flat array of `{ "name": string, "episode": number }`.
//! Entries that do not match that shape are skipped on import rather than
//! failing the whole file.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{InterchangeError, VideoProgress};

/// One exported or imported record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeEntry {
    pub name: String,
    pub episode: u32,
}

/// Entries accepted from an import document plus how many were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub entries: Vec<InterchangeEntry>,
    pub skipped: usize,
}

/// Parse an import document.
///
/// # Errors
/// Fails when the text is not JSON or the top level is not an array.
/// Individual malformed entries never fail the parse.
pub fn parse_import(text: &str) -> Result<ParsedImport, InterchangeError> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(InterchangeError::NotAnArray);
    };
    Ok(parse_import_items(&items))
}

/// Shape-check already decoded items.
#[must_use]
pub fn parse_import_items(items: &[Value]) -> ParsedImport {
    let mut parsed = ParsedImport::default();
    for item in items {
        match entry_from_value(item) {
            Some(entry) => parsed.entries.push(entry),
            None => {
                tracing::warn!(item = %item, "skipping malformed import entry");
                parsed.skipped = parsed.skipped.saturating_add(1);
            },
        }
    }
    parsed
}

fn entry_from_value(item: &Value) -> Option<InterchangeEntry> {
    let name = item.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let episode = episode_from_number(item.get("episode")?)?;
    Some(InterchangeEntry { name: name.to_owned(), episode })
}

/// Whole, non-negative numbers that fit the counter. `3.0` is accepted,
/// `3.5` and `-1` are not.
fn episode_from_number(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() != 0.0 || f < 0.0 || f > f64::from(u32::MAX) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "range and fraction checked above"
    )]
    let episode = f as u32;
    Some(episode)
}

/// Render records as a pretty-printed export document.
///
/// # Errors
/// Returns [`InterchangeError::NothingToExport`] for an empty collection.
pub fn export_json(videos: &[VideoProgress]) -> Result<String, InterchangeError> {
    if videos.is_empty() {
        return Err(InterchangeError::NothingToExport);
    }
    let entries: Vec<InterchangeEntry> = videos
        .iter()
        .map(|v| InterchangeEntry { name: v.name.clone(), episode: v.episode })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewVideo;

    #[test]
    fn keeps_well_formed_and_skips_the_rest() {
        let parsed = parse_import(
            r#"[
                {"name": "Arcane", "episode": 3},
                {"name": "Dark"},
                {"name": 12, "episode": 1},
                {"name": "Severance", "episode": "4"},
                "nonsense",
                {"name": "Frieren", "episode": 7.0}
            ]"#,
        )
        .unwrap();
        assert_eq!(parsed.skipped, 4);
        assert_eq!(
            parsed.entries,
            vec![
                InterchangeEntry { name: "Arcane".to_owned(), episode: 3 },
                InterchangeEntry { name: "Frieren".to_owned(), episode: 7 },
            ]
        );
    }

    #[test]
    fn negative_and_fractional_episodes_are_malformed() {
        let parsed =
            parse_import(r#"[{"name": "A", "episode": -1}, {"name": "B", "episode": 1.5}]"#)
                .unwrap();
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn object_document_is_rejected() {
        let err = parse_import(r#"{"name": "Arcane", "episode": 3}"#).unwrap_err();
        assert!(matches!(err, InterchangeError::NotAnArray));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(parse_import("[{"), Err(InterchangeError::Json(_))));
    }

    #[test]
    fn export_writes_name_and_episode_only() {
        let video = NewVideo::new("Arcane", 3, "user-1").unwrap().into_video("id-1".to_owned());
        let text = export_json(&[video]).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!([{"name": "Arcane", "episode": 3}]));
        assert!(text.contains("\n  {"), "expected two-space indentation: {text}");
    }

    #[test]
    fn empty_export_is_refused() {
        assert!(matches!(export_json(&[]), Err(InterchangeError::NothingToExport)));
    }
}
