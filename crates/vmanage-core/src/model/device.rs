// ── Device views ──
//
// Three projections of the same `/device` inventory: the static inventory
// row, the control-plane status row and the health/uptime row.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::Record;
use crate::time::format_uptime;

/// Keys that may carry the boot time, newest controller releases first.
const UPTIME_KEYS: [&str; 4] = ["uptime", "uptime-date", "uptime-string", "lastupdated"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInventory {
    pub host_name: String,
    pub device_type: String,
    pub uuid: String,
    pub system_ip: String,
    pub site_id: String,
    pub version: String,
    pub device_model: String,
}

impl From<&Record> for DeviceInventory {
    fn from(r: &Record) -> Self {
        Self {
            host_name: r.str("host-name", ""),
            device_type: r.str("device-type", ""),
            uuid: r.str("uuid", ""),
            system_ip: r.str("system-ip", ""),
            site_id: r.str("site-id", ""),
            version: r.str("version", ""),
            device_model: r.str("device-model", ""),
        }
    }
}

/// Control-plane status. Field names differ between controller releases,
/// hence the fallback pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlStatus {
    pub host_name: String,
    pub system_ip: String,
    pub reachability: String,
    pub control_connections: String,
    pub omp_peers: String,
    pub device_type: String,
    pub version: String,
    pub model: String,
}

impl From<&Record> for ControlStatus {
    fn from(r: &Record) -> Self {
        Self {
            host_name: r.str("host-name", ""),
            system_ip: r.str("system-ip", ""),
            reachability: r.resolve_str(&["reachability", "status"], ""),
            control_connections: r.resolve_str(&["controlConnections", "controlConnectionsUp"], ""),
            omp_peers: r.resolve_str(&["ompPeers", "ompPeersUp"], ""),
            device_type: r.str("device-type", ""),
            version: r.str("version", ""),
            model: r.str("device-model", ""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceHealth {
    pub host_name: String,
    pub system_ip: String,
    pub state: String,
    /// `Xd Yh Zm` since boot, or `n/a`.
    pub uptime: String,
}

impl DeviceHealth {
    /// Build the health row relative to `now`.
    pub fn from_record(r: &Record, now: DateTime<Utc>) -> Self {
        Self {
            host_name: r.str("host-name", "unknown"),
            system_ip: r.str("system-ip", "unknown"),
            state: r.str("status", "unknown"),
            uptime: format_uptime(r.first_non_empty_value(&UPTIME_KEYS), now),
        }
    }
}
