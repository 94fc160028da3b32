//! Application-aware routing command handlers.

use serde::Serialize;
use tabled::Tabled;

use vmanage_core::{Controller, FeatureProfile, ParcelSummary};

use crate::cli::{AarArgs, AarCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub(super) struct NumberedProfile {
    pub number: usize,
    #[serde(flatten)]
    pub profile: FeatureProfile,
}

#[derive(Tabled)]
struct AarProfileRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Parcels")]
    parcels: String,
    #[tabled(rename = "References")]
    references: String,
    #[tabled(rename = "Updated By")]
    updated_by: String,
    #[tabled(rename = "Last Updated")]
    updated: String,
}

impl From<&NumberedProfile> for AarProfileRow {
    fn from(p: &NumberedProfile) -> Self {
        Self {
            number: p.number,
            name: p.profile.profile_name.clone(),
            description: p.profile.description.clone(),
            parcels: p.profile.parcel_count.clone(),
            references: p.profile.reference_count.clone(),
            updated_by: p.profile.last_updated_by.clone(),
            updated: p.profile.last_updated.clone(),
        }
    }
}

#[derive(Tabled)]
struct ParcelRow {
    #[tabled(rename = "Parcel")]
    name: String,
    #[tabled(rename = "Type")]
    parcel_type: String,
    #[tabled(rename = "Parcel ID")]
    parcel_id: String,
    #[tabled(rename = "Created By")]
    created_by: String,
    #[tabled(rename = "Last Updated")]
    updated: String,
}

/// Parcels followed by their sub-parcels, indented one level per depth.
fn flatten_parcels(parcels: &[ParcelSummary], depth: usize, out: &mut Vec<ParcelRow>) {
    for p in parcels {
        let name = if depth == 0 {
            p.name.clone()
        } else {
            format!("{}└ {}", "  ".repeat(depth - 1), p.name)
        };
        out.push(ParcelRow {
            name,
            parcel_type: p.parcel_type.clone(),
            parcel_id: p.parcel_id.clone(),
            created_by: p.created_by.clone(),
            updated: p.last_updated.clone(),
        });
        flatten_parcels(&p.subparcels, depth + 1, out);
    }
}

pub(super) fn numbered(profiles: &[vmanage_core::Record]) -> Vec<NumberedProfile> {
    profiles
        .iter()
        .enumerate()
        .map(|(i, r)| NumberedProfile {
            number: i + 1,
            profile: FeatureProfile::from(r),
        })
        .collect()
}

fn profiles_table(profiles: &[NumberedProfile]) -> String {
    let rows: Vec<AarProfileRow> = profiles.iter().map(AarProfileRow::from).collect();
    output::render_table(&rows)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: AarArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let profiles = numbered(&controller.aar_profiles().await?);

    match args.command {
        AarCommand::List => {
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| AarProfileRow::from(p),
                |p| p.profile.profile_name.clone(),
            )?;
            if profiles.is_empty() {
                output::warn("No application-priority profiles found.");
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AarCommand::Show { number } => {
            let Some(index) = util::pick(
                number,
                profiles.len(),
                "policy",
                "aar list",
                || Ok(profiles_table(&profiles)),
                global,
            )?
            else {
                return Ok(());
            };
            let selected = &profiles[index].profile;
            let parcels = controller.aar_parcels(&selected.profile_id).await?;

            if output::is_table(&global.output) {
                output::heading(
                    &format!("Parcels in '{}'", selected.profile_name),
                    global.quiet,
                );
                let mut rows = Vec::new();
                flatten_parcels(&parcels, 0, &mut rows);
                if rows.is_empty() {
                    output::warn("Profile has no associated parcels.");
                    return Ok(());
                }
                output::print_output(&output::render_table(&rows), global.quiet);
            } else {
                let out = output::render_single(
                    &global.output,
                    &parcels,
                    |_| String::new(),
                    |ps| ps.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join("\n"),
                )?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}
