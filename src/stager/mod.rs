//! Hand-raise automation core.
//!
//! [`StagerMachine`] owns the mode flags and drives the device through
//! the injected [`DeviceControl`] — no concrete transport hardcoded.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::panel::PanelSpec;
use crate::xapi::{DeviceControl, DeviceEvent, HandRaised};

pub mod mode;
pub mod plan;

pub use mode::{toggle_from_widget, ModeToggle, StagerMode};
pub use plan::{StageAction, MAX_STAGE_SLOTS};

pub struct StagerMachine {
    device: Box<dyn DeviceControl>,
    panel: PanelSpec,
    mode: StagerMode,
}

impl StagerMachine {
    pub fn new(device: Box<dyn DeviceControl>, panel: PanelSpec) -> Self {
        Self {
            device,
            panel,
            mode: StagerMode::default(),
        }
    }

    pub fn mode(&self) -> StagerMode {
        self.mode
    }

    /// Startup pass: save the control panel (keeping its position among
    /// other custom panels), restore the mode from the persisted widget
    /// values, then run one full synchronization.
    pub async fn bootstrap(&mut self) -> Result<()> {
        let order = self.device.panel_order(&self.panel.panel_id).await?;
        let xml = self.panel.render(order);
        self.device.save_panel(&self.panel.panel_id, &xml).await?;

        let hand_raise = self
            .device
            .widget_value(&self.panel.hand_raise_widget_id())
            .await?;
        let active_speaker = self
            .device
            .widget_value(&self.panel.active_speaker_widget_id())
            .await?;

        self.mode =
            StagerMode::from_widget_values(hand_raise.as_deref(), active_speaker.as_deref());
        info!(
            "Mode restored - hand raise: {}, active speaker: {}",
            self.mode.hand_raise, self.mode.active_speaker
        );

        self.run_full_sync().await
    }

    /// Dispatch one device event.
    pub async fn handle_event(&mut self, event: DeviceEvent) -> Result<()> {
        match event {
            DeviceEvent::ParticipantUpdated {
                participant_id,
                hand_raised,
            } => {
                if !self.mode.hand_raise {
                    return Ok(());
                }
                self.handle_participant_update(&participant_id, hand_raised)
                    .await
            }
            DeviceEvent::ParticipantAdded
            | DeviceEvent::ParticipantDeleted
            | DeviceEvent::ListRefresh => {
                if !self.mode.hand_raise {
                    return Ok(());
                }
                self.run_full_sync().await
            }
            DeviceEvent::WidgetAction {
                widget_id,
                action_type,
                value,
            } => {
                let Some(toggle) =
                    toggle_from_widget(&self.panel.panel_id, &widget_id, &action_type, &value)
                else {
                    return Ok(());
                };

                self.mode = self.mode.apply(toggle);
                info!(
                    "Mode changed - hand raise: {}, active speaker: {}",
                    self.mode.hand_raise, self.mode.active_speaker
                );
                self.run_full_sync().await
            }
        }
    }

    /// Targeted update for a single participant's hand-raise change,
    /// against the stage as the device currently reports it.
    async fn handle_participant_update(
        &self,
        participant_id: &str,
        hand_raised: HandRaised,
    ) -> Result<()> {
        debug!("Participant {} updated", participant_id);
        let staged = self.device.stage_participant_ids().await?;
        let action = plan::incremental(&staged, participant_id, hand_raised, self.mode);

        match &action {
            StageAction::Set { .. } | StageAction::Reset
                if hand_raised == HandRaised::Raised =>
            {
                info!("Hand raised, adding {} to stage", participant_id)
            }
            StageAction::Set { .. } | StageAction::Reset => {
                info!("Hand lowered, removing {} from stage", participant_id)
            }
            StageAction::None => debug!("No action taken for {}", participant_id),
        }

        self.apply(action).await
    }

    /// Recompute the whole stage from current participant state. A failed
    /// raised-hands query skips the pass entirely — no retry.
    async fn run_full_sync(&self) -> Result<()> {
        info!("Performing full raised-hands to stage check");

        let raised = if self.mode.hand_raise {
            match self.device.search_participants().await {
                Ok(participants) => plan::raised_hand_ids(&participants),
                Err(e) => {
                    warn!("Raised-hands query failed, skipping stage update: {:#}", e);
                    return Ok(());
                }
            }
        } else {
            Vec::new()
        };

        self.apply(plan::full_sync(raised, self.mode)).await
    }

    async fn apply(&self, action: StageAction) -> Result<()> {
        match action {
            StageAction::Set {
                ids,
                active_speaker_index,
            } => {
                info!(
                    "Setting {} participant(s) to stage{}",
                    ids.len(),
                    if active_speaker_index.is_some() {
                        " with active speaker"
                    } else {
                        ""
                    }
                );
                self.device.set_stage(&ids, active_speaker_index).await
            }
            StageAction::Reset => {
                info!("Resetting stage");
                self.device.reset_stage().await
            }
            StageAction::None => Ok(()),
        }
    }
}
