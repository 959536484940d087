#![forbid(unsafe_code)]

//! JSON input parser for browser-encoded host events.
//!
//! [`parse_encoded_input`] accepts one JSON object produced by the page's
//! event bridge and returns the matching [`Event`]. Kinds the engine does not
//! consume (key presses, focus changes, ...) return `Ok(None)`.
//!
//! ```json
//! {"kind":"scroll","scrollTop":120,"scrollHeight":3000,"clientHeight":800,"clientWidth":420}
//! {"kind":"pan","target":17,"deltaX":-64.5,"phase":"move"}
//! {"kind":"pan","target":17,"deltaX":-210,"isFinal":true}
//! {"kind":"measure","target":17,"width":400}
//! ```
//!
//! A pan is final when `isFinal` is true or `phase` is `"end"` / `"cancel"`.

use infiniscroll_core::{Event, NodeId, PanEvent, ScrollMetrics};
use serde::Deserialize;

/// Errors from parsing encoded input JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown pan phase value.
    UnknownPhase(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownPhase(phase) => write!(f, "unknown phase: {phase}"),
        }
    }
}

impl std::error::Error for InputParseError {}

/// Internal deserialization target for every event kind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInput {
    kind: String,
    #[serde(default)]
    scroll_top: Option<f64>,
    #[serde(default)]
    scroll_height: Option<f64>,
    #[serde(default)]
    client_height: Option<f64>,
    #[serde(default)]
    client_width: Option<f64>,
    #[serde(default)]
    target: Option<u64>,
    #[serde(default)]
    delta_x: Option<f64>,
    #[serde(default)]
    is_final: Option<bool>,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    width: Option<f64>,
}

/// Parse a JSON-encoded host event into an [`Event`].
///
/// Returns `Ok(None)` for kinds with no engine equivalent and `Err` for
/// malformed JSON or missing required fields.
pub fn parse_encoded_input(json: &str) -> Result<Option<Event>, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "scroll" => parse_scroll_event(&raw).map(Some),
        "pan" => parse_pan_event(&raw).map(Some),
        "measure" => parse_measure_event(&raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_scroll_event(raw: &RawInput) -> Result<Event, InputParseError> {
    let scroll_top = raw
        .scroll_top
        .ok_or(InputParseError::MissingField("scrollTop"))?;
    let scroll_height = raw
        .scroll_height
        .ok_or(InputParseError::MissingField("scrollHeight"))?;
    let client_height = raw
        .client_height
        .ok_or(InputParseError::MissingField("clientHeight"))?;
    let metrics = ScrollMetrics::new(scroll_top, scroll_height, client_height)
        .with_client_width(raw.client_width.unwrap_or(0.0));
    Ok(Event::Scroll(metrics))
}

fn parse_pan_final(raw: &RawInput) -> Result<bool, InputParseError> {
    if raw.is_final == Some(true) {
        return Ok(true);
    }
    match raw.phase.as_deref() {
        None | Some("start" | "move") => Ok(false),
        Some("end" | "cancel") => Ok(true),
        Some(other) => Err(InputParseError::UnknownPhase(other.to_string())),
    }
}

fn parse_pan_event(raw: &RawInput) -> Result<Event, InputParseError> {
    let target = NodeId(raw.target.ok_or(InputParseError::MissingField("target"))?);
    let delta_x = raw.delta_x.ok_or(InputParseError::MissingField("deltaX"))?;
    let is_final = parse_pan_final(raw)?;
    Ok(Event::Pan(PanEvent {
        delta_x,
        is_final,
        target,
    }))
}

fn parse_measure_event(raw: &RawInput) -> Result<Event, InputParseError> {
    let target = NodeId(raw.target.ok_or(InputParseError::MissingField("target"))?);
    let width = raw.width.ok_or(InputParseError::MissingField("width"))?;
    Ok(Event::Measure { target, width })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scroll_event() {
        let json = r#"{"kind":"scroll","scrollTop":120,"scrollHeight":3000,"clientHeight":800,"clientWidth":420}"#;
        let event = parse_encoded_input(json).unwrap().unwrap();
        assert_eq!(
            event,
            Event::Scroll(ScrollMetrics::new(120.0, 3000.0, 800.0).with_client_width(420.0))
        );
    }

    #[test]
    fn scroll_without_width_defaults_to_zero() {
        let json = r#"{"kind":"scroll","scrollTop":0,"scrollHeight":10,"clientHeight":10}"#;
        let Some(Event::Scroll(m)) = parse_encoded_input(json).unwrap() else {
            panic!("expected scroll");
        };
        assert_eq!(m.client_width, 0.0);
    }

    #[test]
    fn scroll_missing_height() {
        let json = r#"{"kind":"scroll","scrollTop":0,"clientHeight":10}"#;
        assert_eq!(
            parse_encoded_input(json),
            Err(InputParseError::MissingField("scrollHeight"))
        );
    }

    #[test]
    fn pan_move_phase() {
        let json = r#"{"kind":"pan","target":17,"deltaX":-64.5,"phase":"move"}"#;
        assert_eq!(
            parse_encoded_input(json).unwrap(),
            Some(Event::Pan(PanEvent::moved(NodeId(17), -64.5)))
        );
    }

    #[test]
    fn pan_final_flag() {
        let json = r#"{"kind":"pan","target":17,"deltaX":-210,"isFinal":true}"#;
        assert_eq!(
            parse_encoded_input(json).unwrap(),
            Some(Event::Pan(PanEvent::ended(NodeId(17), -210.0)))
        );
    }

    #[test]
    fn pan_end_and_cancel_phases_are_final() {
        for phase in ["end", "cancel"] {
            let json = format!(r#"{{"kind":"pan","target":1,"deltaX":5,"phase":"{phase}"}}"#);
            let Some(Event::Pan(pan)) = parse_encoded_input(&json).unwrap() else {
                panic!("expected pan");
            };
            assert!(pan.is_final, "{phase}");
        }
    }

    #[test]
    fn pan_unknown_phase() {
        let json = r#"{"kind":"pan","target":1,"deltaX":5,"phase":"fling"}"#;
        assert_eq!(
            parse_encoded_input(json),
            Err(InputParseError::UnknownPhase("fling".into()))
        );
    }

    #[test]
    fn pan_missing_target() {
        let json = r#"{"kind":"pan","deltaX":5}"#;
        assert_eq!(
            parse_encoded_input(json),
            Err(InputParseError::MissingField("target"))
        );
    }

    #[test]
    fn measure_event() {
        let json = r#"{"kind":"measure","target":4,"width":400}"#;
        assert_eq!(
            parse_encoded_input(json).unwrap(),
            Some(Event::Measure {
                target: NodeId(4),
                width: 400.0
            })
        );
    }

    #[test]
    fn unknown_kind_returns_none() {
        assert_eq!(parse_encoded_input(r#"{"kind":"key","code":"a"}"#), Ok(None));
    }

    #[test]
    fn malformed_json_returns_error() {
        assert!(matches!(
            parse_encoded_input("{not json"),
            Err(InputParseError::Json(_))
        ));
    }

    #[test]
    fn missing_kind_returns_error() {
        assert!(matches!(
            parse_encoded_input(r#"{"scrollTop":1}"#),
            Err(InputParseError::Json(_))
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            InputParseError::MissingField("deltaX").to_string(),
            "missing required field: deltaX"
        );
    }
}
