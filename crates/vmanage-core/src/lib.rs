// vmanage-core: domain layer between vmanage-api and the CLI.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod prefix;
pub mod record;
pub mod time;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ControllerConfig;
pub use controller::{Controller, prefix_parcel_path};
pub use error::CoreError;
pub use prefix::{
    PrefixEntry, PrefixListUpdate, expand_all, expand_subnet_to_hosts, merge_unique,
    parse_positions, remove_by_positions, validate_prefix,
};
pub use record::Record;
pub use time::{format_uptime, ms_to_date};

pub use model::{
    ControlStatus, DeviceAssociation, DeviceHealth, DeviceInventory, FeatureProfile, ListRef,
    NgfwRule, ParcelSummary, PolicyGroup, PrefixObject, parse_ngfw_rules,
};

// Transport-level types callers need to build a `ControllerConfig`.
pub use vmanage_api::{Credentials, PutResponse, ResponseBody, TlsMode};
