//! JSON-RPC 2.0 WebSocket client for the device's xAPI.
//!
//! One connection carries both directions of traffic: requests are
//! correlated to replies by numeric id, while feedback notifications
//! (no id) are parsed into [`DeviceEvent`]s and handed to the service
//! over an mpsc channel.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;

use super::error::XapiError;
use super::events::DeviceEvent;
use super::types::{string_field, Participant};
use super::DeviceControl;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, XapiError>>>>>;

pub struct WsXapiClient {
    writer: Mutex<SplitSink<WsStream, Message>>,
    pending: Pending,
    next_id: AtomicU64,
}

impl WsXapiClient {
    /// Connect to the device and subscribe to the feedback events the
    /// stager needs. The returned receiver yields those events for as
    /// long as the connection lives; it closes when the device hangs up.
    ///
    /// The event channel is unbounded: the read task also routes RPC
    /// replies, so it must never block behind a slow event consumer —
    /// the service loop awaits replies while it handles each event.
    pub async fn connect(
        config: &DeviceConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DeviceEvent>)> {
        let scheme = if config.tls { "wss" } else { "ws" };
        let url = format!("{}://{}/ws", scheme, config.host);

        let mut request = url
            .clone()
            .into_client_request()
            .context("Invalid device host")?;

        let credentials = BASE64.encode(format!("{}:{}", config.username, config.password));
        request.headers_mut().insert(
            "Authorization",
            format!("Basic {}", credentials)
                .parse()
                .context("Invalid credentials for auth header")?,
        );

        let connector = if config.tls && config.accept_invalid_certs {
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .context("Failed to build TLS connector")?;
            Some(Connector::NativeTls(tls))
        } else {
            None
        };

        let (ws_stream, _) = connect_async_tls_with_config(request, None, false, connector)
            .await
            .with_context(|| format!("Failed to connect to device at {}", url))?;

        info!("Connected to device at {}", url);

        let (writer, reader) = ws_stream.split();
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_loop(reader, pending.clone(), events_tx));

        let client = Self {
            writer: Mutex::new(writer),
            pending,
            next_id: AtomicU64::new(1),
        };

        client.subscribe_feedback().await?;

        Ok((client, events_rx))
    }

    async fn subscribe_feedback(&self) -> Result<()> {
        for query in DeviceEvent::subscription_queries() {
            self.call("xFeedback/Subscribe", json!({ "Query": query }))
                .await?;
        }
        info!("Subscribed to participant and widget feedback");
        Ok(())
    }

    /// Issue one request and wait for the matching reply.
    async fn call(&self, method: &str, params: Value) -> Result<Value, XapiError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("-> {} (id {})", method, id);

        let send_result = {
            let mut writer = self.writer.lock().await;
            writer.send(Message::Text(request.to_string())).await
        };

        if let Err(e) = send_result {
            self.pending.lock().await.remove(&id);
            return Err(XapiError::WebSocket(e));
        }

        rx.await.map_err(|_| XapiError::ConnectionClosed)?
    }
}

/// Routes incoming frames: replies resolve their pending request,
/// feedback notifications become [`DeviceEvent`]s. Exits when the
/// connection drops, failing all in-flight requests.
async fn read_loop(
    mut reader: SplitStream<WsStream>,
    pending: Pending,
    events_tx: mpsc::UnboundedSender<DeviceEvent>,
) {
    while let Some(frame) = reader.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket read error: {}", e);
                break;
            }
        };

        let message: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparseable frame from device: {}", e);
                continue;
            }
        };

        if let Some(id) = message.get("id").and_then(Value::as_u64) {
            let result = if let Some(error) = message.get("error") {
                Err(XapiError::Rpc {
                    code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                })
            } else {
                Ok(message.get("result").cloned().unwrap_or(Value::Null))
            };

            if let Some(tx) = pending.lock().await.remove(&id) {
                let _ = tx.send(result);
            }
            continue;
        }

        if message.get("method").and_then(Value::as_str) == Some("xFeedback/Event") {
            let params = message.get("params").cloned().unwrap_or(Value::Null);
            if let Some(event) = DeviceEvent::from_feedback(&params) {
                if events_tx.send(event).is_err() {
                    break;
                }
            }
        }
    }

    info!("Device connection closed");
    pending.lock().await.clear();
}

/// The device reports collections as an array when there are several
/// entries but as a bare object when there is exactly one.
fn as_entries(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

#[async_trait]
impl DeviceControl for WsXapiClient {
    async fn set_stage(&self, ids: &[String], active_speaker_index: Option<u32>) -> Result<()> {
        let mut params = json!({ "ParticipantId": ids });
        if let Some(index) = active_speaker_index {
            params["ActiveSpeakerIndex"] = json!(index);
        }

        self.call("xCommand/Video/Layout/StageParticipants/Set/ById", params)
            .await?;
        Ok(())
    }

    async fn reset_stage(&self) -> Result<()> {
        self.call("xCommand/Video/Layout/StageParticipants/Reset", json!({}))
            .await?;
        Ok(())
    }

    async fn stage_participant_ids(&self) -> Result<Vec<String>> {
        let result = self
            .call(
                "xGet",
                json!({ "Path": ["Status", "Video", "Layout", "StageParticipant"] }),
            )
            .await?;

        Ok(as_entries(&result)
            .into_iter()
            .filter_map(|entry| string_field(entry, "ParticipantId"))
            .collect())
    }

    async fn search_participants(&self) -> Result<Vec<Participant>> {
        let result = self
            .call("xCommand/Conference/ParticipantList/Search", json!({}))
            .await?;

        let participants = match result.get("Participant") {
            Some(list) => as_entries(list)
                .into_iter()
                .filter_map(Participant::from_wire)
                .collect(),
            None => Vec::new(),
        };

        Ok(participants)
    }

    async fn widget_value(&self, widget_id: &str) -> Result<Option<String>> {
        let result = self
            .call(
                "xGet",
                json!({ "Path": ["Status", "UserInterface", "Extensions", "Widget"] }),
            )
            .await?;

        Ok(as_entries(&result)
            .into_iter()
            .find(|widget| string_field(widget, "WidgetId").as_deref() == Some(widget_id))
            .and_then(|widget| string_field(widget, "Value")))
    }

    async fn save_panel(&self, panel_id: &str, xml: &str) -> Result<()> {
        self.call(
            "xCommand/UserInterface/Extensions/Panel/Save",
            json!({ "PanelId": panel_id, "body": xml }),
        )
        .await?;
        Ok(())
    }

    async fn panel_order(&self, panel_id: &str) -> Result<Option<u32>> {
        let result = self
            .call(
                "xCommand/UserInterface/Extensions/List",
                json!({ "ActivityType": "Custom" }),
            )
            .await?;

        let panels = match result.get("Extensions").and_then(|e| e.get("Panel")) {
            Some(list) => as_entries(list),
            None => return Ok(None),
        };

        Ok(panels
            .into_iter()
            .find(|panel| string_field(panel, "PanelId").as_deref() == Some(panel_id))
            .and_then(|panel| string_field(panel, "Order"))
            .and_then(|order| order.parse().ok()))
    }
}
