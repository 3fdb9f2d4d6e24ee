//! Slide synchronisation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Navigation action that produced the current slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideAction {
    Next,
    Previous,
    Goto,
    #[default]
    Show,
}

/// The slide currently shown to a class.
///
/// Slide content lives elsewhere; the relay only carries the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideState {
    pub slide_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<u32>,
    #[serde(default)]
    pub action: SlideAction,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl SlideState {
    /// Build a slide reference stamped with the current time.
    pub fn new(slide_id: u64, action: SlideAction) -> Self {
        Self {
            slide_id,
            file_url: None,
            order_no: None,
            action,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file_url = Some(url.into());
        self
    }

    #[must_use]
    pub const fn with_order_no(mut self, order_no: u32) -> Self {
        self.order_no = Some(order_no);
        self
    }

    /// Try to read a slide reference out of an opaque client payload.
    ///
    /// Accepts both `slideId` and `slide_id` spellings. Returns `None` when the
    /// payload carries no numeric slide id.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let slide_id = payload
            .get("slideId")
            .or_else(|| payload.get("slide_id"))
            .and_then(serde_json::Value::as_u64)?;
        let action = payload
            .get("action")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        let mut slide = Self::new(slide_id, action);
        slide.file_url = payload
            .get("fileUrl")
            .or_else(|| payload.get("file_url"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        slide.order_no = payload
            .get("orderNo")
            .or_else(|| payload.get("order_no"))
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());
        Some(slide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload_camel_case() {
        let slide = SlideState::from_payload(&json!({
            "slideId": 12,
            "fileUrl": "/slides/12.png",
            "orderNo": 3,
            "action": "next"
        }))
        .unwrap();

        assert_eq!(slide.slide_id, 12);
        assert_eq!(slide.file_url.as_deref(), Some("/slides/12.png"));
        assert_eq!(slide.order_no, Some(3));
        assert_eq!(slide.action, SlideAction::Next);
    }

    #[test]
    fn test_from_payload_snake_case_and_unknown_action() {
        let slide =
            SlideState::from_payload(&json!({ "slide_id": 4, "action": "shuffle" })).unwrap();
        assert_eq!(slide.slide_id, 4);
        assert_eq!(slide.action, SlideAction::Show);
    }

    #[test]
    fn test_from_payload_without_id() {
        assert!(SlideState::from_payload(&json!({ "page": 2 })).is_none());
    }

    #[test]
    fn test_deserialize_defaults_timestamp() {
        let slide: SlideState = serde_json::from_value(json!({ "slideId": 1 })).unwrap();
        assert_eq!(slide.action, SlideAction::Show);
        assert!(slide.timestamp <= Utc::now());
    }
}
