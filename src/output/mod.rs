//! Helpers for rendering scan results for the terminal and for JSON consumers

use crate::scanner::{ScanAttempt, ScanOutcome};
use serde_json::{Map, Value, json};

/// Combined structured and human-readable representation of a scan outcome
#[derive(Debug, Clone)]
pub struct RenderedOutcome {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a scan outcome into both JSON and human-readable forms.
pub fn render_outcome(outcome: &ScanOutcome) -> RenderedOutcome {
    let json = outcome_value(outcome);
    let mut human = Vec::new();

    human.push(format!("{} ({})", outcome.file, outcome.kind.mime()));

    match &outcome.payload {
        Some(payload) => {
            match payload.as_str() {
                Some(text) => human.push(format!("  QR text: {text}")),
                None => human.push(format!(
                    "  QR binary payload ({} bytes): {}",
                    payload.as_bytes().len(),
                    payload.to_hex()
                )),
            }
            if let Some(attempt) = outcome.winning_attempt() {
                human.push(format!("  Found {}", describe_attempt(attempt)));
            }
        }
        None => human.push("  No QR code found".to_string()),
    }

    human.push(format!(
        "  Attempts: {}, elapsed: {} ms",
        outcome.attempts.len(),
        outcome.elapsed.as_millis()
    ));

    RenderedOutcome { json, human }
}

/// Produce a structured JSON representation of a scan outcome.
pub fn outcome_value(outcome: &ScanOutcome) -> Value {
    let mut root = Map::new();
    root.insert("file".to_string(), Value::String(outcome.file.clone()));
    root.insert(
        "kind".to_string(),
        Value::String(outcome.kind.label().to_string()),
    );
    root.insert(
        "mime".to_string(),
        Value::String(outcome.kind.mime().to_string()),
    );
    root.insert("found".to_string(), Value::Bool(outcome.payload.is_some()));

    let qr = match &outcome.payload {
        Some(payload) => json!({
            "text": payload.as_str(),
            "bytes_hex": payload.to_hex(),
            "byte_length": payload.as_bytes().len(),
        }),
        None => Value::Null,
    };
    root.insert("qr".to_string(), qr);

    let attempts = outcome
        .attempts
        .iter()
        .map(|a| serde_json::to_value(a).unwrap_or(Value::Null))
        .collect();
    root.insert("attempts".to_string(), Value::Array(attempts));
    root.insert(
        "elapsed_ms".to_string(),
        Value::from(outcome.elapsed.as_millis() as u64),
    );

    Value::Object(root)
}

/// JSON shape used when a file could not be scanned at all.
pub fn error_value(file: &str, message: &str) -> Value {
    json!({ "file": file, "error": message })
}

fn describe_attempt(attempt: &ScanAttempt) -> String {
    match attempt.page {
        Some(page) => format!(
            "on page {} (scale {:.3}, {}x{} canvas)",
            page, attempt.scale, attempt.width, attempt.height
        ),
        None => format!(
            "at scale {} ({}x{} canvas)",
            attempt.scale, attempt.width, attempt.height
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::QrPayload;
    use crate::source::FileKind;
    use std::time::Duration;

    fn outcome(payload: Option<QrPayload>) -> ScanOutcome {
        let found = payload.is_some();
        ScanOutcome {
            file: "ticket.pdf".to_string(),
            kind: FileKind::Pdf,
            payload,
            attempts: vec![
                ScanAttempt {
                    page: Some(1),
                    scale: 4.0,
                    width: 2480,
                    height: 3508,
                    found: false,
                },
                ScanAttempt {
                    page: Some(2),
                    scale: 4.0,
                    width: 2480,
                    height: 3508,
                    found,
                },
            ],
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_found_outcome_json() {
        let rendered = render_outcome(&outcome(Some(QrPayload::from_string(
            "BCD\n001\n1\nSCT".to_string(),
        ))));

        assert_eq!(rendered.json["found"], Value::Bool(true));
        assert_eq!(rendered.json["mime"], "application/pdf");
        assert_eq!(rendered.json["qr"]["text"], "BCD\n001\n1\nSCT");
        assert_eq!(rendered.json["attempts"].as_array().map(Vec::len), Some(2));
        assert_eq!(rendered.json["attempts"][1]["page"], 2);
        assert_eq!(rendered.json["elapsed_ms"], 42);
        assert!(rendered.human.iter().any(|l| l.contains("on page 2")));
    }

    #[test]
    fn test_missing_outcome() {
        let rendered = render_outcome(&outcome(None));
        assert_eq!(rendered.json["found"], Value::Bool(false));
        assert!(rendered.json["qr"].is_null());
        assert_eq!(rendered.human[1], "  No QR code found");
    }

    #[test]
    fn test_binary_payload_rendered_as_hex() {
        // 0xff/0xfe never appear in UTF-8
        let rendered = render_outcome(&outcome(Some(QrPayload::from_bytes(vec![0xff, 0xfe]))));
        assert!(rendered.json["qr"]["text"].is_null());
        assert_eq!(rendered.json["qr"]["bytes_hex"], "fffe");
        assert_eq!(rendered.json["qr"]["byte_length"], 2);
        assert_eq!(rendered.human[1], "  QR binary payload (2 bytes): fffe");
    }
}
