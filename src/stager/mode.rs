//! Automation mode flags and their single transition function.

/// The two toggles exposed on the device panel. Owned by the machine and
/// passed into the planning functions — never ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagerMode {
    /// Move raised hands to the stage automatically.
    pub hand_raise: bool,
    /// Designate slot 0 as the active-speaker slot when staging.
    pub active_speaker: bool,
}

/// One toggle flip, parsed from a widget action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeToggle {
    HandRaise(bool),
    ActiveSpeaker(bool),
}

impl StagerMode {
    /// Initial mode from the persisted widget values. A widget that does
    /// not exist yet (fresh panel) reads as `None` and defaults to off.
    pub fn from_widget_values(hand_raise: Option<&str>, active_speaker: Option<&str>) -> Self {
        Self {
            hand_raise: hand_raise == Some("on"),
            active_speaker: active_speaker == Some("on"),
        }
    }

    /// The only way a mode changes after startup.
    pub fn apply(self, toggle: ModeToggle) -> Self {
        match toggle {
            ModeToggle::HandRaise(on) => Self {
                hand_raise: on,
                ..self
            },
            ModeToggle::ActiveSpeaker(on) => Self {
                active_speaker: on,
                ..self
            },
        }
    }
}

/// Map a widget action to a toggle. Only "changed" actions on this
/// panel's own widgets produce one.
pub fn toggle_from_widget(
    panel_id: &str,
    widget_id: &str,
    action_type: &str,
    value: &str,
) -> Option<ModeToggle> {
    if action_type != "changed" {
        return None;
    }

    let suffix = widget_id.strip_prefix(panel_id)?.strip_prefix('-')?;
    let on = value == "on";

    match suffix {
        "handRaise" => Some(ModeToggle::HandRaise(on)),
        "activeSpeaker" => Some(ModeToggle::ActiveSpeaker(on)),
        _ => None,
    }
}
