//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`.
//! Role: Shared contract helper for CLI diagnostics such as "already present".
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde::Serialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub scope: String,
    pub entry: String,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

/// Wraps `notice` as `{"notice": {...}}` for stderr.
pub fn notice_json(notice: &Notice) -> Value {
    json!({ "notice": notice })
}

#[cfg(test)]
mod tests {
    use super::{Notice, notice_json};
    use serde_json::{Map, Value};

    #[test]
    fn notice_json_has_required_fields() {
        let mut details = Map::new();
        details.insert("entries".to_string(), Value::from(4));

        let notice = Notice {
            kind: "present".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            cmd: "add".to_string(),
            scope: "user".to_string(),
            entry: "/opt/tool/bin".to_string(),
            message: "already present".to_string(),
            details,
        };

        let value = notice_json(&notice);
        let obj = value
            .get("notice")
            .and_then(|v| v.as_object())
            .expect("notice object");

        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("present"));
        assert_eq!(
            obj.get("time").and_then(|v| v.as_str()),
            Some("2026-02-01T00:00:00Z")
        );
        assert_eq!(obj.get("cmd").and_then(|v| v.as_str()), Some("add"));
        assert_eq!(obj.get("scope").and_then(|v| v.as_str()), Some("user"));
        assert_eq!(
            obj.get("entry").and_then(|v| v.as_str()),
            Some("/opt/tool/bin")
        );
        assert_eq!(
            obj.get("message").and_then(|v| v.as_str()),
            Some("already present")
        );
        assert_eq!(obj["details"]["entries"], 4);
    }

    #[test]
    fn notice_json_omits_empty_details() {
        let notice = Notice {
            kind: "present".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            cmd: "add".to_string(),
            scope: "process".to_string(),
            entry: "/opt/tool/bin".to_string(),
            message: "already present".to_string(),
            details: Map::new(),
        };

        let value = notice_json(&notice);
        assert_eq!(value["notice"]["scope"], "process");
        assert!(value["notice"].get("details").is_none());
    }
}
