//! Pure stage planning — no device I/O.
//!
//! Every decision about what to put on stage lives here, as functions
//! from (observed state, mode) to a single [`StageAction`].

use crate::xapi::{HandRaised, Participant};

use super::mode::StagerMode;

/// The device composites at most this many participants on stage.
pub const MAX_STAGE_SLOTS: usize = 8;

/// Command the machine should issue against the device, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    Set {
        ids: Vec<String>,
        active_speaker_index: Option<u32>,
    },
    Reset,
    None,
}

impl StageAction {
    /// Build a set command from a desired list, applying the slot cap and
    /// the active-speaker designation. An empty list becomes a reset —
    /// the device treats those differently.
    fn set(mut ids: Vec<String>, mode: StagerMode) -> Self {
        if ids.is_empty() {
            return Self::Reset;
        }
        ids.truncate(MAX_STAGE_SLOTS);
        Self::Set {
            ids,
            active_speaker_index: mode.active_speaker.then_some(0),
        }
    }
}

/// Ordered ids of every raised hand, in participant-query order.
pub fn raised_hand_ids(participants: &[Participant]) -> Vec<String> {
    participants
        .iter()
        .filter(|p| p.is_raised())
        .map(|p| p.id.clone())
        .collect()
}

/// Plan a full synchronization pass. With automation off the stage goes
/// back to the default layout.
pub fn full_sync(raised: Vec<String>, mode: StagerMode) -> StageAction {
    if !mode.hand_raise {
        return StageAction::Reset;
    }
    StageAction::set(raised, mode)
}

/// Plan a targeted update for one participant's new hand-raise state,
/// given the ids currently on stage. No command when the staged
/// membership already matches the flag.
pub fn incremental(
    staged: &[String],
    participant_id: &str,
    hand_raised: HandRaised,
    mode: StagerMode,
) -> StageAction {
    let already_staged = staged.iter().any(|id| id == participant_id);

    match hand_raised {
        HandRaised::Raised if !already_staged => {
            let mut ids = staged.to_vec();
            ids.push(participant_id.to_string());
            StageAction::set(ids, mode)
        }
        HandRaised::Lowered if already_staged => {
            let ids = staged
                .iter()
                .filter(|id| *id != participant_id)
                .cloned()
                .collect();
            StageAction::set(ids, mode)
        }
        _ => StageAction::None,
    }
}
