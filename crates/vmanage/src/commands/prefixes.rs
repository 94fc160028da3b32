//! Data-prefix list command handlers.
//!
//! Every write replaces the object's whole entry list: build the new list
//! locally, preview it, confirm, push, then re-read and show what the
//! controller actually stored.

use std::io;

use serde::Serialize;
use tabled::Tabled;

use vmanage_core::{
    Controller, PrefixEntry, PrefixObject, ResponseBody, expand_subnet_to_hosts, merge_unique,
    parse_positions, remove_by_positions, validate_prefix,
};

use crate::cli::{GlobalOpts, PrefixesArgs, PrefixesCommand};
use crate::error::CliError;
use crate::output;
use crate::prompt;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "#")]
    number: usize,
    #[tabled(rename = "Prefix Name")]
    name: String,
    #[tabled(rename = "Entries")]
    entries: usize,
    #[tabled(rename = "Profile ID")]
    profile_id: String,
    #[tabled(rename = "Parcel ID")]
    parcel_id: String,
    #[tabled(rename = "Created By")]
    created_by: String,
}

impl From<&PrefixObject> for ObjectRow {
    fn from(o: &PrefixObject) -> Self {
        Self {
            number: o.number,
            name: o.name.clone(),
            entries: o.record.array_at(&["payload", "data", "entries"]).len(),
            profile_id: o.profile_id.clone(),
            parcel_id: o.parcel_id.clone(),
            created_by: o.created_by.clone(),
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "IP Prefix")]
    value: String,
    #[tabled(rename = "Option Type")]
    option_type: String,
}

fn entries_table(entries: &[PrefixEntry]) -> String {
    let rows: Vec<EntryRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| EntryRow {
            position: i + 1,
            value: e.value().to_owned(),
            option_type: e.option_type().to_owned(),
        })
        .collect();
    output::render_table(&rows)
}

fn objects_table(objects: &[PrefixObject]) -> String {
    let rows: Vec<ObjectRow> = objects.iter().map(ObjectRow::from).collect();
    output::render_table(&rows)
}

/// Push outcome in structured output modes.
#[derive(Serialize)]
struct PushReport<'a> {
    status: u16,
    response: &'a ResponseBody,
    name: &'a str,
    entries: &'a [PrefixEntry],
}

// ── Shared flow ─────────────────────────────────────────────────────

async fn select_object(
    controller: &Controller,
    number: Option<usize>,
    global: &GlobalOpts,
) -> Result<Option<PrefixObject>, CliError> {
    let mut objects = controller.prefix_objects().await?;
    let index = util::pick(
        number,
        objects.len(),
        "prefix",
        "prefixes list",
        || Ok(objects_table(&objects)),
        global,
    )?;
    Ok(index.map(|i| objects.swap_remove(i)))
}

fn show_entries(obj: &PrefixObject, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = obj.entries()?;
    if output::is_table(&global.output) {
        output::heading(
            &format!("Prefix: {} ({} entries)", obj.name, entries.len()),
            global.quiet,
        );
        if entries.is_empty() {
            output::warn("No entries.");
            return Ok(());
        }
    }
    // Positions matter for `prefixes delete`, so tables carry them.
    let out = if output::is_table(&global.output) {
        entries_table(&entries)
    } else {
        output::render_single(&global.output, &entries, |_| String::new(), |es| {
            es.iter()
                .map(|e| e.value().to_owned())
                .collect::<Vec<_>>()
                .join("\n")
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Preview, confirm, push, re-read.
async fn apply_update(
    controller: &Controller,
    obj: &PrefixObject,
    entries: &[PrefixEntry],
    global: &GlobalOpts,
    action: &str,
    question: &str,
) -> Result<(), CliError> {
    if !global.quiet {
        eprintln!("\nUpdated entries will be:");
        eprintln!("{}", entries_table(entries));
    }
    if !util::confirm(question, global, action)? {
        output::warn("Aborted.");
        return Ok(());
    }
    push_and_show(controller, obj, entries, global).await
}

async fn push_and_show(
    controller: &Controller,
    obj: &PrefixObject,
    entries: &[PrefixEntry],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let resp = controller
        .push_prefix_update(&obj.profile_id, &obj.parcel_id, &obj.name, entries)
        .await?;
    tracing::info!(status = resp.status, object = %obj.name, "pushed prefix list");

    if output::is_table(&global.output) {
        let body = match &resp.body {
            ResponseBody::Json(v) => serde_json::to_string_pretty(v)
                .map_err(|e| CliError::Serialize(e.to_string()))?,
            ResponseBody::Text(t) => t.clone(),
        };
        output::print_output(&format!("Push result:\n{body}"), global.quiet);
    }

    if !resp.is_success() {
        if !output::is_table(&global.output) {
            let report = PushReport {
                status: resp.status,
                response: &resp.body,
                name: &obj.name,
                entries,
            };
            let out = output::render_single(&global.output, &report, |_| String::new(), |r| {
                r.status.to_string()
            })?;
            output::print_output(&out, global.quiet);
        }
        return Err(CliError::PushRejected {
            status: resp.status,
        });
    }

    let fresh = obj.refreshed(
        controller
            .prefix_object(&obj.profile_id, &obj.parcel_id)
            .await?,
    );
    output::success(
        &format!("Updated '{}' ({} entries)", fresh.name, entries.len()),
        global.quiet,
    );

    if output::is_table(&global.output) {
        show_entries(&fresh, global)
    } else {
        let stored = fresh.entries()?;
        let report = PushReport {
            status: resp.status,
            response: &resp.body,
            name: &fresh.name,
            entries: &stored,
        };
        let out = output::render_single(&global.output, &report, |_| String::new(), |r| {
            r.entries
                .iter()
                .map(|e| e.value().to_owned())
                .collect::<Vec<_>>()
                .join("\n")
        })?;
        output::print_output(&out, global.quiet);
        Ok(())
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: PrefixesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PrefixesCommand::List => {
            let objects = controller.prefix_objects().await?;
            let out = output::render_list(
                &global.output,
                &objects,
                |o| ObjectRow::from(o),
                |o| o.name.clone(),
            )?;
            if objects.is_empty() {
                output::warn("No data-prefix objects found.");
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PrefixesCommand::Show { number } => {
            let Some(obj) = select_object(controller, number, global).await? else {
                return Ok(());
            };
            show_entries(&obj, global)
        }

        PrefixesCommand::Add { number, prefixes } => add(controller, number, &prefixes, global).await,

        PrefixesCommand::Delete { number, positions } => {
            delete(controller, number, positions, global).await
        }

        PrefixesCommand::Expand { name, cidrs } => expand(controller, &name, &cidrs, global).await,
    }
}

async fn add(
    controller: &Controller,
    number: Option<usize>,
    prefixes: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let Some(obj) = select_object(controller, number, global).await? else {
        return Ok(());
    };
    let existing = obj.entries()?;

    let candidates: Vec<(String, String)> = if prefixes.is_empty() {
        if !global.quiet {
            eprintln!("{}", entries_table(&existing));
        }
        let stdin = io::stdin();
        prompt::read_new_prefixes(&mut stdin.lock(), &mut io::stderr().lock(), &obj.name)?
    } else {
        prefixes.iter().map(|p| prompt::split_prefix_arg(p)).collect()
    };

    if candidates.is_empty() {
        output::warn("No new prefixes entered. Nothing to push.");
        return Ok(());
    }
    for (cidr, _) in &candidates {
        validate_prefix(cidr)?;
    }

    let merged = merge_unique(
        &existing,
        candidates
            .into_iter()
            .map(|(cidr, kind)| PrefixEntry::new(cidr, kind)),
    );
    let added = merged.len() - existing.len();
    if added == 0 {
        output::success("All prefixes are already present. Nothing to push.", global.quiet);
        return Ok(());
    }

    apply_update(
        controller,
        &obj,
        &merged,
        global,
        "prefixes add",
        &format!("Add {added} prefix(es) to '{}'?", obj.name),
    )
    .await
}

async fn delete(
    controller: &Controller,
    number: Option<usize>,
    positions: Option<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let Some(obj) = select_object(controller, number, global).await? else {
        return Ok(());
    };
    let entries = obj.entries()?;
    if entries.is_empty() {
        output::warn(&format!("'{}' has no entries to delete.", obj.name));
        return Ok(());
    }

    let raw = if let Some(p) = positions {
        p
    } else {
        if !global.quiet {
            eprintln!("{}", entries_table(&entries));
        }
        let stdin = io::stdin();
        prompt::read_line(
            &mut stdin.lock(),
            &mut io::stderr().lock(),
            "Enter prefix numbers to delete (comma-separated): ",
        )?
        .unwrap_or_default()
    };
    if raw.trim().is_empty() {
        output::warn("No prefixes selected for deletion.");
        return Ok(());
    }

    let targets = parse_positions(&raw)?;
    let mut updated = entries.clone();
    let removed = remove_by_positions(&mut updated, &targets);
    if removed == 0 {
        output::warn(&format!(
            "None of the positions exist (valid: 1-{}). Nothing to push.",
            entries.len()
        ));
        return Ok(());
    }

    apply_update(
        controller,
        &obj,
        &updated,
        global,
        "prefixes delete",
        &format!("Delete {removed} prefix(es) from '{}'?", obj.name),
    )
    .await
}

async fn expand(
    controller: &Controller,
    name: &str,
    cidrs: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut generated = Vec::new();
    for cidr in cidrs {
        let hosts = expand_subnet_to_hosts(cidr)?;
        if hosts.is_empty() {
            output::warn(&format!("Skipping {cidr}: only /16 networks are expanded."));
        }
        generated.extend(hosts);
    }
    if generated.is_empty() {
        output::warn("No /16 networks given. Nothing to push.");
        return Ok(());
    }

    let obj = controller
        .prefix_objects()
        .await?
        .into_iter()
        .find(|o| o.name == name)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "Prefix object".into(),
            identifier: name.into(),
            hint: "Check names with: vmanage prefixes list".into(),
        })?;

    let existing = obj.entries()?;
    let merged = merge_unique(&existing, generated);
    let added = merged.len() - existing.len();
    if added == 0 {
        output::success(
            &format!("'{name}' already contains every expanded host. Nothing to push."),
            global.quiet,
        );
        return Ok(());
    }

    apply_update(
        controller,
        &obj,
        &merged,
        global,
        "prefixes expand",
        &format!("Add {added} expanded host(s) to '{name}'?"),
    )
    .await
}
