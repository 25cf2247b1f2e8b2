//! Append-only audit trail of suggestion submissions and approvals.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{errors::Error, registry::SuggestionKind, Result};

pub const AUDIT_MAX_TEXT: usize = 500;

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,
    pub user_id: i64,
    pub username: String,
    pub kind: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<u64>,
}

impl AuditEvent {
    fn new(
        event: &str,
        user_id: i64,
        username: &str,
        kind: SuggestionKind,
        description: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            event: event.to_string(),
            user_id,
            username: username.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            reference: None,
            suggestion_id: None,
        }
    }

    pub fn suggested(
        user_id: i64,
        username: &str,
        kind: SuggestionKind,
        description: &str,
        reference: &str,
        suggestion_id: u64,
    ) -> Self {
        Self {
            reference: Some(reference.to_string()),
            suggestion_id: Some(suggestion_id),
            ..Self::new("suggested", user_id, username, kind, description)
        }
    }

    pub fn approved(
        user_id: i64,
        username: &str,
        kind: SuggestionKind,
        description: &str,
        reference: &str,
    ) -> Self {
        Self {
            reference: Some(reference.to_string()),
            ..Self::new("approved", user_id, username, kind, description)
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditLogger {
    path: PathBuf,
    json: bool,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            path: path.into(),
            json,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        event.description = truncate_text(&event.description, AUDIT_MAX_TEXT);
        if let Some(r) = &event.reference {
            event.reference = Some(truncate_text(r, AUDIT_MAX_TEXT));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if self.json {
            let line = serde_json::to_string(&event)?;
            writeln!(file, "{line}")?;
            return Ok(());
        }

        let value = serde_json::to_value(&event)?;
        let Some(obj) = value.as_object() else {
            return Err(Error::External(
                "audit event is not a JSON object".to_string(),
            ));
        };

        let mut out = String::new();
        out.push('\n');
        out.push_str(&"=".repeat(40));
        for (k, v) in obj {
            out.push('\n');
            out.push_str(k);
            out.push_str(": ");
            match v {
                serde_json::Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
        }
        out.push('\n');

        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let head: String = s.chars().take(max_chars).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.log"))
    }

    #[test]
    fn truncate_text_adds_ellipsis() {
        assert_eq!(truncate_text("short", 10), "short");
        let t = truncate_text(&"é".repeat(20), 5);
        assert_eq!(t, format!("{}...", "é".repeat(5)));
    }

    #[test]
    fn json_lines_are_appended() {
        let log = AuditLogger::new(tmp_file("studybot-audit-json"), true);
        log.write(AuditEvent::suggested(
            7,
            "alice",
            SuggestionKind::Link,
            "Example Site",
            "https://example.com",
            1,
        ))
        .unwrap();
        log.write(AuditEvent::approved(
            8,
            "root",
            SuggestionKind::Link,
            "Example Site",
            "https://example.com",
        ))
        .unwrap();

        let written = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "suggested");
        assert_eq!(lines[0]["suggestion_id"], 1);
        assert_eq!(lines[1]["event"], "approved");
        assert!(lines[1].get("suggestion_id").is_none());

        let _ = std::fs::remove_file(log.path());
    }

    #[test]
    fn plain_format_truncates_long_descriptions() {
        let log = AuditLogger::new(tmp_file("studybot-audit-plain"), false);
        let long = "x".repeat(AUDIT_MAX_TEXT + 10);
        log.write(AuditEvent::approved(1, "u", SuggestionKind::Pdf, &long, "file"))
            .unwrap();

        let written = std::fs::read_to_string(log.path()).unwrap();
        assert!(written.contains("kind: PDF"));
        assert!(written.contains("..."));
        assert!(!written.contains(&long));

        let _ = std::fs::remove_file(log.path());
    }
}
