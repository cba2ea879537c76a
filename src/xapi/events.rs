//! Feedback events delivered by the device over the xAPI subscription.

use serde_json::Value;

use super::types::{string_field, HandRaised};

/// Events the stager reacts to. Anything else on the feedback channel is
/// ignored at the parsing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A single participant's state changed (carries the hand-raise flag).
    ParticipantUpdated {
        participant_id: String,
        hand_raised: HandRaised,
    },
    ParticipantAdded,
    ParticipantDeleted,
    /// The device replaced the whole participant list.
    ListRefresh,
    /// A UI extension widget was actuated.
    WidgetAction {
        widget_id: String,
        action_type: String,
        value: String,
    },
}

impl DeviceEvent {
    /// Parse a feedback notification body. Returns `None` for events this
    /// service does not subscribe to or care about.
    pub fn from_feedback(params: &Value) -> Option<Self> {
        let event = params.get("Event")?;

        if let Some(list) = event
            .get("Conference")
            .and_then(|c| c.get("ParticipantList"))
        {
            if let Some(updated) = list.get("ParticipantUpdated") {
                return Some(Self::ParticipantUpdated {
                    participant_id: string_field(updated, "ParticipantId")?,
                    hand_raised: HandRaised::from_wire(
                        string_field(updated, "HandRaised").as_deref(),
                    ),
                });
            }
            if list.get("ParticipantAdded").is_some() {
                return Some(Self::ParticipantAdded);
            }
            if list.get("ParticipantDeleted").is_some() {
                return Some(Self::ParticipantDeleted);
            }
            if list.get("NewList").is_some() {
                return Some(Self::ListRefresh);
            }
            return None;
        }

        if let Some(action) = event
            .get("UserInterface")
            .and_then(|u| u.get("Extensions"))
            .and_then(|e| e.get("Widget"))
            .and_then(|w| w.get("Action"))
        {
            return Some(Self::WidgetAction {
                widget_id: string_field(action, "WidgetId")?,
                action_type: string_field(action, "Type")?,
                value: string_field(action, "Value").unwrap_or_default(),
            });
        }

        None
    }

    /// Feedback queries registered at startup, one per event kind.
    pub fn subscription_queries() -> Vec<Vec<&'static str>> {
        vec![
            vec!["Event", "Conference", "ParticipantList", "ParticipantUpdated"],
            vec!["Event", "Conference", "ParticipantList", "ParticipantAdded"],
            vec!["Event", "Conference", "ParticipantList", "ParticipantDeleted"],
            vec!["Event", "Conference", "ParticipantList", "NewList"],
            vec!["Event", "UserInterface", "Extensions", "Widget", "Action"],
        ]
    }
}
