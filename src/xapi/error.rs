//! Transport-level errors for the xAPI WebSocket client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XapiError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("device rejected request: {message} (code {code})")]
    Rpc { code: i64, message: String },

    #[error("connection to device closed")]
    ConnectionClosed,
}
