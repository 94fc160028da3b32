// ── Data-prefix objects ──

use serde::Serialize;

use crate::error::CoreError;
use crate::prefix::{PrefixEntry, parse_entries};
use crate::record::Record;

/// One `security-data-ip-prefix` parcel found while enumerating every
/// policy-object profile. `number` is its 1-based position in that
/// enumeration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixObject {
    pub number: usize,
    pub name: String,
    pub profile_id: String,
    pub parcel_id: String,
    pub parcel_type: String,
    pub created_by: String,
    /// The full parcel as returned by the controller.
    pub record: Record,
}

impl PrefixObject {
    pub fn from_parcel(number: usize, profile_id: &str, record: Record) -> Self {
        Self {
            number,
            name: record.str_at(&["payload", "name"], ""),
            profile_id: profile_id.to_owned(),
            parcel_id: record.str("parcelId", ""),
            parcel_type: record.str("parcelType", ""),
            created_by: record.str("createdBy", ""),
            record,
        }
    }

    /// Same object rebuilt from a fresh read, keeping its menu number.
    #[must_use]
    pub fn refreshed(&self, record: Record) -> Self {
        let mut fresh = Self::from_parcel(self.number, &self.profile_id, record);
        if fresh.parcel_id.is_empty() {
            fresh.parcel_id.clone_from(&self.parcel_id);
        }
        fresh
    }

    /// Entries under `payload.data.entries`; empty when absent.
    pub fn entries(&self) -> Result<Vec<PrefixEntry>, CoreError> {
        parse_entries(self.record.array_at(&["payload", "data", "entries"]))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parcel() -> Record {
        Record::from_value(json!({
            "parcelId": "parcel-1",
            "parcelType": "security-data-ip-prefix",
            "createdBy": "admin",
            "payload": {
                "name": "grp_servers",
                "data": { "entries": [
                    { "ipPrefix": { "optionType": "global", "value": "10.1.1.10/32" } }
                ] }
            }
        }))
    }

    #[test]
    fn builds_from_parcel() {
        let obj = PrefixObject::from_parcel(3, "prof-1", parcel());
        assert_eq!(obj.number, 3);
        assert_eq!(obj.name, "grp_servers");
        assert_eq!(obj.profile_id, "prof-1");
        assert_eq!(obj.parcel_id, "parcel-1");
        assert_eq!(obj.created_by, "admin");

        let entries = obj.entries().expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value(), "10.1.1.10/32");
    }

    #[test]
    fn missing_entries_are_empty() {
        let obj = PrefixObject::from_parcel(1, "p", Record::from_value(json!({ "payload": {} })));
        assert!(obj.entries().expect("entries").is_empty());
    }

    #[test]
    fn refresh_keeps_number_and_ids() {
        let obj = PrefixObject::from_parcel(7, "prof-1", parcel());
        let fresh = obj.refreshed(Record::from_value(json!({
            "payload": { "name": "grp_servers", "data": { "entries": [] } }
        })));
        assert_eq!(fresh.number, 7);
        assert_eq!(fresh.parcel_id, "parcel-1");
        assert!(fresh.entries().expect("entries").is_empty());
    }
}
