//! Wire-level participant types.

use serde_json::Value;

/// Hand-raise flag as reported by the device: the wire value is the
/// string "True" or "False", and may be absent entirely (e.g. for the
/// local participant), hence the tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandRaised {
    Raised,
    Lowered,
    Unknown,
}

impl HandRaised {
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("True") => Self::Raised,
            Some("False") => Self::Lowered,
            _ => Self::Unknown,
        }
    }
}

/// A meeting participant as returned by the device's participant query.
/// Transient — owned by the device, never persisted here.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub hand_raised: HandRaised,
}

impl Participant {
    pub fn is_raised(&self) -> bool {
        self.hand_raised == HandRaised::Raised
    }

    /// Parse one entry of a `ParticipantList Search` result.
    pub fn from_wire(value: &Value) -> Option<Self> {
        let id = string_field(value, "ParticipantId")?;
        let hand_raised = HandRaised::from_wire(string_field(value, "HandRaised").as_deref());
        Some(Self { id, hand_raised })
    }
}

/// Read a string field that the device may deliver either plain or
/// wrapped as `{"Value": "..."}`.
pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    let field = value.get(key)?;
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => field
            .get("Value")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hand_raised_from_wire() {
        assert_eq!(HandRaised::from_wire(Some("True")), HandRaised::Raised);
        assert_eq!(HandRaised::from_wire(Some("False")), HandRaised::Lowered);
        assert_eq!(HandRaised::from_wire(Some("Unknown")), HandRaised::Unknown);
        assert_eq!(HandRaised::from_wire(None), HandRaised::Unknown);
    }

    #[test]
    fn test_participant_from_wire() {
        let participant = Participant::from_wire(&json!({
            "ParticipantId": "abc123",
            "HandRaised": "True",
        }))
        .unwrap();

        assert_eq!(participant.id, "abc123");
        assert!(participant.is_raised());
    }

    #[test]
    fn test_participant_without_flag_is_unknown() {
        let participant = Participant::from_wire(&json!({ "ParticipantId": "p1" })).unwrap();
        assert_eq!(participant.hand_raised, HandRaised::Unknown);
        assert!(!participant.is_raised());
    }

    #[test]
    fn test_wrapped_value_field() {
        let participant = Participant::from_wire(&json!({
            "ParticipantId": { "Value": "wrapped" },
            "HandRaised": { "Value": "False" },
        }))
        .unwrap();

        assert_eq!(participant.id, "wrapped");
        assert_eq!(participant.hand_raised, HandRaised::Lowered);
    }

    #[test]
    fn test_missing_id_rejects_entry() {
        assert!(Participant::from_wire(&json!({ "HandRaised": "True" })).is_none());
    }
}
