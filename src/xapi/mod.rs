//! Device interface for the collaboration endpoint's xAPI.
//!
//! `DeviceControl` is the seam between the automation logic and the
//! physical device — all dependencies on the codec go through it, so the
//! stager machine can be driven against a mock in tests.

use anyhow::Result;
use async_trait::async_trait;

pub mod client;
pub mod error;
pub mod events;
pub mod types;

pub use client::WsXapiClient;
pub use error::XapiError;
pub use events::DeviceEvent;
pub use types::{HandRaised, Participant};

/// Commands and queries the stager issues against the device.
#[async_trait]
pub trait DeviceControl: Send + Sync {
    /// Replace the staged-participant list. When `active_speaker_index`
    /// is set, that slot tracks the loudest participant.
    async fn set_stage(&self, ids: &[String], active_speaker_index: Option<u32>) -> Result<()>;

    /// Restore the default stage layout.
    async fn reset_stage(&self) -> Result<()>;

    /// Ids of the participants currently on stage.
    async fn stage_participant_ids(&self) -> Result<Vec<String>>;

    /// Current participant list with hand-raise flags.
    async fn search_participants(&self) -> Result<Vec<Participant>>;

    /// Persisted value of a UI extension widget, if the widget exists.
    async fn widget_value(&self, widget_id: &str) -> Result<Option<String>>;

    /// Save a UI extension panel definition.
    async fn save_panel(&self, panel_id: &str, xml: &str) -> Result<()>;

    /// Order of an existing custom panel, used to keep a re-saved panel
    /// in its place among other UI extensions.
    async fn panel_order(&self, panel_id: &str) -> Result<Option<u32>>;
}
