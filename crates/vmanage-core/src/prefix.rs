// ── Data-prefix list editing ──
//
// Entries of a `security-data-ip-prefix` parcel, the duplicate-free merge
// used when adding to one, and the fixed `/16` host expansion rule.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Option type the controller uses for literal (non-variable) values.
pub const GLOBAL_OPTION: &str = "global";

/// Host offsets (third and fourth octet) derived from a `/16` network.
const HOST_OFFSETS: [(u8, u8); 2] = [(1, 10), (1, 11)];

/// `{ optionType, value }` pair wrapping a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    #[serde(rename = "optionType", default)]
    pub option_type: String,
    #[serde(default)]
    pub value: String,
    /// Fields this tool doesn't interpret, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a data-prefix list: `{ "ipPrefix": { optionType, value } }`.
///
/// Uniqueness within a list is by `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixEntry {
    #[serde(rename = "ipPrefix", default)]
    pub ip_prefix: OptionValue,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PrefixEntry {
    pub fn new(value: impl Into<String>, option_type: impl Into<String>) -> Self {
        Self {
            ip_prefix: OptionValue {
                option_type: option_type.into(),
                value: value.into(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Entry with the `global` option type.
    pub fn global(value: impl Into<String>) -> Self {
        Self::new(value, GLOBAL_OPTION)
    }

    pub fn value(&self) -> &str {
        &self.ip_prefix.value
    }

    pub fn option_type(&self) -> &str {
        &self.ip_prefix.option_type
    }
}

/// Parse raw `entries` from a parcel payload.
pub fn parse_entries(values: &[Value]) -> Result<Vec<PrefixEntry>, CoreError> {
    values
        .iter()
        .map(|v| {
            serde_json::from_value(v.clone()).map_err(|e| CoreError::InvalidPayload {
                message: format!("malformed prefix entry {v}: {e}"),
            })
        })
        .collect()
}

/// Union of `existing` and `candidates` without duplicate values.
///
/// Existing entries are kept as-is and in order. Each candidate is appended,
/// in its given order, only when its value is not already in the output.
pub fn merge_unique<I>(existing: &[PrefixEntry], candidates: I) -> Vec<PrefixEntry>
where
    I: IntoIterator<Item = PrefixEntry>,
{
    let mut seen: HashSet<String> = existing.iter().map(|e| e.value().to_owned()).collect();
    let mut merged = existing.to_vec();
    for candidate in candidates {
        if seen.insert(candidate.value().to_owned()) {
            merged.push(candidate);
        }
    }
    merged
}

/// Derive the two well-known host entries of a `/16` network.
///
/// `a.b.x.y/16` yields `a.b.1.10/32` and `a.b.1.11/32` (global option type).
/// Host bits in the input are ignored. Any other prefix length, and IPv6,
/// yields nothing: this is a fixed rule, not a subnetting helper. A missing
/// prefix length means a single host.
pub fn expand_subnet_to_hosts(cidr: &str) -> Result<Vec<PrefixEntry>, CoreError> {
    match parse_cidr(cidr)? {
        (IpAddr::V4(v4), 16) => Ok(hosts_for(v4)),
        _ => Ok(Vec::new()),
    }
}

/// Check that `cidr` is an address with an optional in-range prefix length.
pub fn validate_prefix(cidr: &str) -> Result<(), CoreError> {
    parse_cidr(cidr).map(|_| ())
}

fn parse_cidr(cidr: &str) -> Result<(IpAddr, u8), CoreError> {
    let cidr = cidr.trim();
    let invalid = |reason: &str| CoreError::InvalidPrefix {
        value: cidr.to_owned(),
        reason: reason.to_owned(),
    };

    let (addr_part, len_part) = match cidr.split_once('/') {
        Some((addr, len)) => (addr, Some(len)),
        None => (cidr, None),
    };

    let addr: IpAddr = addr_part
        .parse()
        .map_err(|_| invalid("not an IP address"))?;
    let max_len = if addr.is_ipv4() { 32 } else { 128 };
    let prefix_len = match len_part {
        Some(len) => len
            .parse::<u8>()
            .ok()
            .filter(|l| *l <= max_len)
            .ok_or_else(|| invalid("invalid prefix length"))?,
        None => max_len,
    };
    Ok((addr, prefix_len))
}

fn hosts_for(network: Ipv4Addr) -> Vec<PrefixEntry> {
    let [a, b, _, _] = network.octets();
    HOST_OFFSETS
        .iter()
        .map(|(c, d)| PrefixEntry::global(format!("{a}.{b}.{c}.{d}/32")))
        .collect()
}

/// Expand every CIDR in order; see [`expand_subnet_to_hosts`].
pub fn expand_all<S: AsRef<str>>(cidrs: &[S]) -> Result<Vec<PrefixEntry>, CoreError> {
    let mut out = Vec::new();
    for cidr in cidrs {
        out.extend(expand_subnet_to_hosts(cidr.as_ref())?);
    }
    Ok(out)
}

/// Remove entries by 1-based position.
///
/// Duplicate and out-of-range positions are ignored. Returns how many
/// entries were removed.
pub fn remove_by_positions(entries: &mut Vec<PrefixEntry>, positions: &[usize]) -> usize {
    let mut targets: Vec<usize> = positions
        .iter()
        .copied()
        .filter(|p| (1..=entries.len()).contains(p))
        .collect();
    targets.sort_unstable_by(|a, b| b.cmp(a));
    targets.dedup();

    for position in &targets {
        entries.remove(position - 1);
    }
    targets.len()
}

/// Parse a comma-separated list of 1-based positions (`"1, 3,5"`).
pub fn parse_positions(input: &str) -> Result<Vec<usize>, CoreError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>().map_err(|_| CoreError::InvalidPayload {
                message: format!("'{s}' is not a position number"),
            })
        })
        .collect()
}

// ── Update payload ──────────────────────────────────────────────────

/// Full replacement body for a data-prefix parcel.
///
/// The controller has no partial update for these parcels: the complete
/// entry list is always sent.
#[derive(Debug, Serialize)]
pub struct PrefixListUpdate<'a> {
    pub name: &'a str,
    pub data: PrefixListData<'a>,
}

#[derive(Debug, Serialize)]
pub struct PrefixListData<'a> {
    pub entries: &'a [PrefixEntry],
}

impl<'a> PrefixListUpdate<'a> {
    pub fn new(name: &'a str, entries: &'a [PrefixEntry]) -> Self {
        Self {
            name,
            data: PrefixListData { entries },
        }
    }
}
