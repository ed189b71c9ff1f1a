use std::path::Path;

use serde::Deserialize;

use story_progress_core::{EventFamily, ProgressError, ProgressEvent};

/// One line of a replay script: the family to post on plus the raw payload.
#[derive(Debug, Deserialize)]
struct ScriptLine {
    family: EventFamily,
    #[serde(flatten)]
    event: ProgressEvent,
}

/// Parse a JSON-lines replay script. Blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<(EventFamily, ProgressEvent)>, ProgressError> {
    let mut events = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: ScriptLine = serde_json::from_str(line).map_err(|e| ProgressError::Script {
            line: idx + 1,
            message: e.to_string(),
        })?;
        events.push((parsed.family, parsed.event));
    }
    Ok(events)
}

pub fn load_script(path: &Path) -> Result<Vec<(EventFamily, ProgressEvent)>, ProgressError> {
    let text = std::fs::read_to_string(path).map_err(|e| ProgressError::Script {
        line: 0,
        message: format!("{}: {}", path.display(), e),
    })?;
    parse_script(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use story_progress_core::event::{SAVE_RESULT, UPLOAD_UPLOADING};

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = r#"
# upload starts
{"family":"upload","mediaId":"m1","state":1,"progress":0.4}

{"family":"save","mediaId":"m1","state":9,"progress":1,"success":false}
"#;
        let events = parse_script(text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, EventFamily::Upload);
        assert_eq!(events[0].1, ProgressEvent::new("m1", UPLOAD_UPLOADING).with_progress(0.4));
        assert_eq!(events[1].0, EventFamily::Save);
        assert_eq!(
            events[1].1,
            ProgressEvent::new("m1", SAVE_RESULT).with_progress(1.0).with_success(false)
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "{\"family\":\"upload\",\"mediaId\":\"m1\",\"state\":1}\n{\"family\":\"sideways\",\"state\":1}\n";
        match parse_script(text) {
            Err(ProgressError::Script { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected script error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"family":"save","mediaId":"m2","state":10}}"#).unwrap();

        let events = load_script(file.path()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.media_id.as_ref().map(|id| id.as_str()), Some("m2"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_script(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, ProgressError::Script { line: 0, .. }));
    }
}
