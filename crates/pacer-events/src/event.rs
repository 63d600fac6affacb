//! Standardized event view assembled from flexible input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{EventError, EventResult},
    extract::{extract_fields, scalar_to_string},
};

/// Standardized view of one analytics event.
///
/// Built by [`parse_event`] from JSON of any size and structure. The four key
/// fields are always present (empty string when the event lacks them, except
/// `page_type` which is mandatory); everything else extraction recognized
/// lands in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub event_type: String,
    pub page_type: String,
    pub category: String,
    pub action: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// Parse a flexible event into its standardized view.
///
/// The event type comes from a root-level `event` field when present, then
/// from an extracted `event`/`eventType` field, and is otherwise inferred
/// from category/action patterns. A `page_type` must exist somewhere in the
/// structure.
pub fn parse_event(event: &Value) -> EventResult<ParsedEvent> {
    if !event.is_object() && !event.is_array() {
        return Err(EventError::InvalidEvent(
            "event must be a JSON object or array".to_string(),
        ));
    }

    let mut fields = extract_fields(event);

    let page_type = fields
        .remove("page_type")
        .map(|v| scalar_to_string(&v))
        .ok_or(EventError::MissingPageType)?;

    let category = take_string(&mut fields, "eventCategory");
    let action = take_string(&mut fields, "eventAction");
    let label = take_string(&mut fields, "eventLabel");

    let root_event = event
        .get("event")
        .filter(|v| !v.is_null())
        .map(scalar_to_string);
    let extracted_event = fields.remove("event").map(|v| scalar_to_string(&v));
    let extracted_type = fields.remove("eventType").map(|v| scalar_to_string(&v));

    let event_type = root_event
        .or(extracted_event)
        .or(extracted_type)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| infer_event_type(&category, &action));

    debug!(
        event_type = %event_type,
        page_type = %page_type,
        category = %category,
        action = %action,
        extra_fields = fields.len(),
        "parsed event"
    );

    Ok(ParsedEvent {
        event_type,
        page_type,
        category,
        action,
        label,
        extra: fields,
    })
}

fn take_string(fields: &mut BTreeMap<String, Value>, key: &str) -> String {
    fields
        .remove(key)
        .map(|v| scalar_to_string(&v))
        .unwrap_or_default()
}

/// Infer an event type from category/action patterns when none is explicit.
fn infer_event_type(category: &str, action: &str) -> String {
    let category = category.to_ascii_lowercase();
    let action = action.to_ascii_lowercase();

    if action.contains("click") {
        if ["nav", "header", "menu", "mini-cart"]
            .iter()
            .any(|term| category.contains(term))
        {
            "Navigation Clicked".to_string()
        } else if category.contains("button") || category.contains("btn") {
            "Button Clicked".to_string()
        } else {
            "Element Clicked".to_string()
        }
    } else if action.contains("view") {
        "Element Viewed".to_string()
    } else if action.contains("submit") || category.contains("form") {
        "Form Submitted".to_string()
    } else if action.contains("hover") || action.contains("mouseover") {
        "Element Hovered".to_string()
    } else if category == "mini-cart" {
        "Mini-Cart Action".to_string()
    } else if !category.is_empty() {
        format!("Custom Action: {category}")
    } else if !action.is_empty() {
        format!("Custom Action: {action}")
    } else {
        "Generic Action".to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_event;
    use crate::error::EventError;

    #[test]
    fn root_event_field_wins() {
        let event = json!({
            "event": "Autoship Created",
            "properties": {"page_type": "autoship", "eventAction": "clicked"}
        });

        let parsed = parse_event(&event).unwrap();
        assert_eq!(parsed.event_type, "Autoship Created");
        assert_eq!(parsed.page_type, "autoship");
        assert_eq!(parsed.action, "clicked");
    }

    #[test]
    fn event_type_inferred_from_navigation_click() {
        let event = json!({
            "properties": {
                "page_type": "home",
                "eventCategory": "nav-header",
                "eventAction": "clicked"
            }
        });

        let parsed = parse_event(&event).unwrap();
        assert_eq!(parsed.event_type, "Navigation Clicked");
    }

    #[test]
    fn event_type_inferred_from_button_click() {
        let event = json!({
            "page_type": "pdp",
            "eventCategory": "button-cta",
            "eventAction": "click"
        });

        assert_eq!(parse_event(&event).unwrap().event_type, "Button Clicked");
    }

    #[test]
    fn event_type_falls_back_to_category() {
        let event = json!({"page_type": "cart", "eventCategory": "checkout"});
        assert_eq!(
            parse_event(&event).unwrap().event_type,
            "Custom Action: checkout"
        );
    }

    #[test]
    fn generic_action_when_nothing_to_infer_from() {
        let event = json!({"page_type": "home"});
        assert_eq!(parse_event(&event).unwrap().event_type, "Generic Action");
    }

    #[test]
    fn missing_page_type_is_rejected() {
        let event = json!({"event": "Button Clicked", "eventAction": "click"});
        match parse_event(&event) {
            Err(EventError::MissingPageType) => {}
            other => panic!("expected MissingPageType, got {other:?}"),
        }
    }

    #[test]
    fn scalar_event_payload_is_rejected() {
        match parse_event(&json!("not an event")) {
            Err(EventError::InvalidEvent(_)) => {}
            other => panic!("expected InvalidEvent, got {other:?}"),
        }
    }

    #[test]
    fn unclaimed_fields_land_in_extra() {
        let event = json!({
            "page_type": "account",
            "sessionId": "abc-123",
            "userId": "u-9"
        });

        let parsed = parse_event(&event).unwrap();
        assert_eq!(parsed.extra["sessionId"], json!("abc-123"));
        assert_eq!(parsed.extra["userId"], json!("u-9"));
    }
}
