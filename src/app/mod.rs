use crate::config::Config;
use crate::panel::PanelSpec;
use crate::stager::StagerMachine;
use crate::xapi::WsXapiClient;
use anyhow::{bail, Result};
use tracing::{error, info};

pub async fn run_service() -> Result<()> {
    info!("Starting autostager service");

    let config = Config::load()?;
    if config.device.host.is_empty() {
        bail!(
            "No device host configured. Set [device] host in {:?}",
            crate::global::config_file()?
        );
    }

    let (client, mut events) = WsXapiClient::connect(&config.device).await?;

    let panel = PanelSpec::from(&config.panel);
    let mut machine = StagerMachine::new(Box::new(client), panel);
    machine.bootstrap().await?;

    info!("autostager is ready, watching for raised hands");

    while let Some(event) = events.recv().await {
        if let Err(e) = machine.handle_event(event).await {
            error!("Failed to handle device event: {:#}", e);
        }
    }

    bail!("Device connection closed")
}
