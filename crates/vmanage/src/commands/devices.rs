//! Device command handlers.

use chrono::Utc;
use tabled::Tabled;

use vmanage_core::{ControlStatus, Controller, DeviceHealth, DeviceInventory};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct InventoryRow {
    #[tabled(rename = "Hostname")]
    host_name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "System IP")]
    system_ip: String,
    #[tabled(rename = "Site ID")]
    site_id: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&DeviceInventory> for InventoryRow {
    fn from(d: &DeviceInventory) -> Self {
        Self {
            host_name: d.host_name.clone(),
            device_type: d.device_type.clone(),
            uuid: d.uuid.clone(),
            system_ip: d.system_ip.clone(),
            site_id: d.site_id.clone(),
            version: d.version.clone(),
            model: d.device_model.clone(),
        }
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Hostname")]
    host_name: String,
    #[tabled(rename = "System IP")]
    system_ip: String,
    #[tabled(rename = "Reachability")]
    reachability: String,
    #[tabled(rename = "Control Conns")]
    control: String,
    #[tabled(rename = "OMP Peers")]
    omp: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Model")]
    model: String,
}

impl From<&ControlStatus> for StatusRow {
    fn from(s: &ControlStatus) -> Self {
        Self {
            host_name: s.host_name.clone(),
            system_ip: s.system_ip.clone(),
            reachability: s.reachability.clone(),
            control: s.control_connections.clone(),
            omp: s.omp_peers.clone(),
            device_type: s.device_type.clone(),
            version: s.version.clone(),
            model: s.model.clone(),
        }
    }
}

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Hostname")]
    host_name: String,
    #[tabled(rename = "System IP")]
    system_ip: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
}

impl From<&DeviceHealth> for HealthRow {
    fn from(h: &DeviceHealth) -> Self {
        Self {
            host_name: h.host_name.clone(),
            system_ip: h.system_ip.clone(),
            state: h.state.clone(),
            uptime: h.uptime.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let records = controller.devices().await?;
    tracing::debug!(count = records.len(), "fetched devices");

    let out = match args.command {
        DevicesCommand::List => {
            let rows: Vec<DeviceInventory> = records.iter().map(DeviceInventory::from).collect();
            output::render_list(&global.output, &rows, |d| InventoryRow::from(d), |d| {
                d.host_name.clone()
            })?
        }
        DevicesCommand::Status => {
            let rows: Vec<ControlStatus> = records.iter().map(ControlStatus::from).collect();
            output::render_list(&global.output, &rows, |s| StatusRow::from(s), |s| {
                s.host_name.clone()
            })?
        }
        DevicesCommand::Health => {
            let now = Utc::now();
            let rows: Vec<DeviceHealth> = records
                .iter()
                .map(|r| DeviceHealth::from_record(r, now))
                .collect();
            output::render_list(&global.output, &rows, |h| HealthRow::from(h), |h| {
                h.host_name.clone()
            })?
        }
    };

    if records.is_empty() {
        output::warn("No devices returned by the controller.");
    }
    output::print_output(&out, global.quiet);
    Ok(())
}
