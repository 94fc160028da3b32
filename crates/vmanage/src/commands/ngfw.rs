//! Embedded-security (NGFW) command handlers.

use std::path::{Path, PathBuf};

use tabled::Tabled;

use vmanage_core::{Controller, ListRef, NgfwRule, parse_ngfw_rules};

use crate::cli::{GlobalOpts, NgfwArgs, NgfwCommand};
use crate::error::CliError;
use crate::output;

use super::aar::{NumberedProfile, numbered};
use super::util;

const RULE_HEADERS: [&str; 10] = [
    "Parcel Name",
    "Rule Name",
    "Base Action",
    "Enabled?",
    "Source IP",
    "Destination IP",
    "Prefix List Name",
    "Port List Name",
    "FQDN List Name",
    "Extra Actions",
];

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Policy ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Last Updated By")]
    updated_by: String,
    #[tabled(rename = "Last Updated")]
    updated: String,
}

impl From<&NumberedProfile> for ProfileRow {
    fn from(p: &NumberedProfile) -> Self {
        Self {
            number: p.number,
            id: p.profile.profile_id.clone(),
            name: p.profile.profile_name.clone(),
            description: p.profile.description.clone(),
            updated_by: p.profile.last_updated_by.clone(),
            updated: p.profile.last_updated.clone(),
        }
    }
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Parcel")]
    parcel: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Enabled?")]
    enabled: String,
    #[tabled(rename = "Source IP")]
    source: String,
    #[tabled(rename = "Destination IP")]
    destination: String,
    #[tabled(rename = "Prefix List")]
    prefix_list: String,
    #[tabled(rename = "Port List")]
    port_list: String,
    #[tabled(rename = "FQDN List")]
    fqdn_list: String,
    #[tabled(rename = "Extra Actions")]
    extra: String,
}

fn or_dash(s: &str) -> String {
    if s.is_empty() { "-".into() } else { s.to_owned() }
}

fn list_cell(r: Option<&ListRef>) -> String {
    r.map_or_else(|| "-".into(), |l| or_dash(l.label()))
}

/// Display cells for one rule, in `RULE_HEADERS` order.
fn cells(rule: &NgfwRule) -> [String; 10] {
    [
        rule.parcel_name.clone(),
        rule.rule_name.clone(),
        rule.base_action.clone(),
        if rule.enabled { "Yes" } else { "No" }.into(),
        or_dash(&rule.source_ip),
        or_dash(&rule.destination_ip),
        list_cell(rule.prefix_list.as_ref()),
        list_cell(rule.port_list.as_ref()),
        list_cell(rule.fqdn_list.as_ref()),
        rule.extra_actions_label(),
    ]
}

impl From<&NgfwRule> for RuleRow {
    fn from(rule: &NgfwRule) -> Self {
        let [parcel, rule_name, action, enabled, source, destination, prefix_list, port_list, fqdn_list, extra] =
            cells(rule);
        Self {
            parcel,
            rule: rule_name,
            action,
            enabled,
            source,
            destination,
            prefix_list,
            port_list,
            fqdn_list,
            extra,
        }
    }
}

fn profiles_table(profiles: &[NumberedProfile]) -> String {
    let rows: Vec<ProfileRow> = profiles.iter().map(ProfileRow::from).collect();
    output::render_table(&rows)
}

fn export_csv(path: &Path, rules: &[NgfwRule], quiet: bool) -> Result<(), CliError> {
    output::write_csv_file(path, &RULE_HEADERS, rules.iter().map(|r| cells(r).to_vec()))?;
    output::success(&format!("Saved table to {}", path.display()), quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: NgfwArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let profiles = numbered(&controller.ngfw_profiles().await?);

    match args.command {
        NgfwCommand::List => {
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| ProfileRow::from(p),
                |p| p.profile.profile_id.clone(),
            )?;
            if profiles.is_empty() {
                output::warn("No embedded-security profiles found.");
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NgfwCommand::Show { number, csv } => {
            let Some(index) = util::pick(
                number,
                profiles.len(),
                "policy",
                "ngfw list",
                || Ok(profiles_table(&profiles)),
                global,
            )?
            else {
                return Ok(());
            };
            let profile_id = profiles[index].profile.profile_id.clone();

            let parcels = controller.ngfw_parcels(&profile_id).await?;
            let mut rules = parse_ngfw_rules(&parcels);
            controller.resolve_list_names(&mut rules).await;
            tracing::debug!(parcels = parcels.len(), rules = rules.len(), "parsed NGFW rules");

            if output::is_table(&global.output) {
                output::heading("NGFW Policy Table", global.quiet);
            }
            let out = output::render_list(
                &global.output,
                &rules,
                |r| RuleRow::from(r),
                |r| r.rule_name.clone(),
            )?;
            if rules.is_empty() {
                output::warn("No firewall rules in this policy.");
            }
            output::print_output(&out, global.quiet);

            let target = if csv.is_some() {
                csv
            } else if output::is_table(&global.output)
                && !rules.is_empty()
                && util::ask("Export to CSV?")?
            {
                Some(PathBuf::from(format!("{profile_id}_ngfw.csv")))
            } else {
                None
            };
            if let Some(path) = target {
                export_csv(&path, &rules, global.quiet)?;
            }
            Ok(())
        }
    }
}
