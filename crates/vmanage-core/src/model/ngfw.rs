// ── NGFW rule flattening ──
//
// An `ngfirewall` parcel nests rules under `payload.data.sequences`, each
// with match entries and actions wrapped in `{ optionType, value }`
// objects. This module flattens them into one row per rule. List
// references stay as ids until the controller resolves their names.

use serde::Serialize;
use serde_json::Value;

use crate::record::{Record, display_value};

/// Reference to a policy object (prefix, port or FQDN list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRef {
    pub id: String,
    /// Friendly name once resolved.
    pub name: Option<String>,
}

impl ListRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Resolved name, or the raw id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgfwRule {
    pub parcel_name: String,
    pub rule_name: String,
    pub base_action: String,
    pub enabled: bool,
    pub source_ip: String,
    pub destination_ip: String,
    pub prefix_list: Option<ListRef>,
    pub port_list: Option<ListRef>,
    pub fqdn_list: Option<ListRef>,
    /// `type=parameter` per action with a non-empty type.
    pub extra_actions: Vec<String>,
}

impl NgfwRule {
    /// Every unresolved list reference, for name lookup.
    pub fn list_refs_mut(&mut self) -> impl Iterator<Item = &mut ListRef> {
        [&mut self.prefix_list, &mut self.port_list, &mut self.fqdn_list]
            .into_iter()
            .flatten()
    }

    /// Extra actions joined for display, `-` when there are none.
    pub fn extra_actions_label(&self) -> String {
        if self.extra_actions.is_empty() {
            "-".into()
        } else {
            self.extra_actions.join("; ")
        }
    }
}

/// Flatten NGFW parcels into rule rows, in parcel then sequence order.
pub fn parse_ngfw_rules(parcels: &[Record]) -> Vec<NgfwRule> {
    parcels
        .iter()
        .flat_map(|parcel| {
            let parcel_name = parcel.str_at(&["payload", "name"], "");
            parcel
                .records_at(&["payload", "data", "sequences"])
                .into_iter()
                .map(move |seq| parse_sequence(&parcel_name, &seq))
        })
        .collect()
}

fn parse_sequence(parcel_name: &str, seq: &Record) -> NgfwRule {
    let mut rule = NgfwRule {
        parcel_name: parcel_name.to_owned(),
        rule_name: seq.str_at(&["sequenceName", "value"], ""),
        base_action: seq.str_at(&["baseAction", "value"], ""),
        enabled: !seq.bool_at(&["disableSequence", "value"], false),
        source_ip: String::new(),
        destination_ip: String::new(),
        prefix_list: None,
        port_list: None,
        fqdn_list: None,
        extra_actions: Vec::new(),
    };

    // Later entries of the same kind overwrite earlier ones.
    for entry in seq.records_at(&["match", "entries"]) {
        if entry.get("sourceIp").is_some() {
            rule.source_ip = joined(entry.array_at(&["sourceIp", "ipv4Value", "value"]));
        }
        if entry.get("destinationIp").is_some() {
            rule.destination_ip = joined(entry.array_at(&["destinationIp", "ipv4Value", "value"]));
        }
        if let Some(r) = first_ref(&entry, "destinationDataPrefixList") {
            rule.prefix_list = Some(r);
        }
        if let Some(r) = first_ref(&entry, "destinationPortList") {
            rule.port_list = Some(r);
        }
        if let Some(r) = first_ref(&entry, "destinationFqdnList") {
            rule.fqdn_list = Some(r);
        }
    }

    rule.extra_actions = seq
        .records_at(&["actions"])
        .iter()
        .filter_map(|action| {
            let kind = action.str_at(&["type", "value"], "");
            if kind.is_empty() {
                return None;
            }
            let param = action.str_at(&["parameter", "value"], "");
            Some(format!("{kind}={param}"))
        })
        .collect();

    rule
}

fn joined(values: &[Value]) -> String {
    values.iter().map(display_value).collect::<Vec<_>>().join(", ")
}

fn first_ref(entry: &Record, key: &str) -> Option<ListRef> {
    entry
        .array_at(&[key, "refId", "value"])
        .first()
        .map(display_value)
        .filter(|id| !id.is_empty())
        .map(ListRef::new)
}
