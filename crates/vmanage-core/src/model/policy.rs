// ── Policy groups and feature profiles ──

use std::fmt;

use serde::Serialize;

use crate::record::Record;
use crate::time::ms_to_date;

fn date_field(r: &Record, key: &str) -> String {
    r.get(key).map(ms_to_date).unwrap_or_default()
}

// ── Policy groups ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub solution: String,
    pub last_updated_by: String,
    pub last_updated: String,
}

impl From<&Record> for PolicyGroup {
    fn from(r: &Record) -> Self {
        Self {
            id: r.str("id", ""),
            name: r.str("name", ""),
            description: r.str("description", ""),
            solution: r.str("solution", ""),
            last_updated_by: r.str("lastUpdatedBy", ""),
            last_updated: date_field(r, "lastUpdatedOn"),
        }
    }
}

/// Devices associated with a policy group, or why they couldn't be read.
///
/// A failed lookup is rendered in the table cell instead of aborting the
/// whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceAssociation {
    Devices(Vec<String>),
    Error(String),
}

impl DeviceAssociation {
    /// Names of associated devices: host name, else system IP, else `Unknown`.
    pub fn from_records(records: &[Record]) -> Self {
        Self::Devices(
            records
                .iter()
                .map(|d| {
                    d.first_non_empty(&["host-name", "system-ip"])
                        .unwrap_or_else(|| "Unknown".into())
                })
                .collect(),
        )
    }
}

impl fmt::Display for DeviceAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devices(names) if names.is_empty() => f.write_str("-"),
            Self::Devices(names) => f.write_str(&names.join(", ")),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

// ── Feature profiles ────────────────────────────────────────────────

/// A feature profile (policy-object, application-priority or
/// embedded-security).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureProfile {
    pub profile_id: String,
    pub profile_name: String,
    pub description: String,
    pub parcel_count: String,
    pub last_updated_by: String,
    pub last_updated: String,
    pub reference_count: String,
}

impl From<&Record> for FeatureProfile {
    fn from(r: &Record) -> Self {
        Self {
            profile_id: r.str("profileId", ""),
            profile_name: r.str("profileName", ""),
            description: r.str("description", ""),
            parcel_count: r.str("profileParcelCount", ""),
            last_updated_by: r.str("lastUpdatedBy", ""),
            last_updated: date_field(r, "lastUpdatedOn"),
            reference_count: r.str("referenceCount", ""),
        }
    }
}

/// A parcel attached to a feature profile, with its nested sub-parcels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParcelSummary {
    pub parcel_id: String,
    pub name: String,
    pub parcel_type: String,
    pub created_by: String,
    pub last_updated_by: String,
    pub last_updated: String,
    pub subparcels: Vec<ParcelSummary>,
}

impl From<&Record> for ParcelSummary {
    fn from(r: &Record) -> Self {
        Self {
            parcel_id: r.str("parcelId", ""),
            name: r.str_at(&["payload", "name"], ""),
            parcel_type: r.str("parcelType", ""),
            created_by: r.str("createdBy", ""),
            last_updated_by: r.str("lastUpdatedBy", ""),
            last_updated: date_field(r, "lastUpdatedOn"),
            subparcels: r
                .records_at(&["subparcels"])
                .iter()
                .map(Self::from)
                .collect(),
        }
    }
}
