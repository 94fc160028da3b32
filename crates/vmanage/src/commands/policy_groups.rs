//! Policy group command handlers.

use serde::Serialize;
use tabled::Tabled;

use vmanage_core::{Controller, DeviceAssociation, PolicyGroup};

use crate::cli::{GlobalOpts, PolicyGroupsArgs, PolicyGroupsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct PolicyGroupView {
    #[serde(flatten)]
    group: PolicyGroup,
    devices: DeviceAssociation,
}

#[derive(Tabled)]
struct PolicyGroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Solution")]
    solution: String,
    #[tabled(rename = "Updated By")]
    updated_by: String,
    #[tabled(rename = "Last Updated")]
    updated: String,
    #[tabled(rename = "Devices")]
    devices: String,
}

impl From<&PolicyGroupView> for PolicyGroupRow {
    fn from(v: &PolicyGroupView) -> Self {
        Self {
            id: v.group.id.clone(),
            name: v.group.name.clone(),
            description: v.group.description.clone(),
            solution: v.group.solution.clone(),
            updated_by: v.group.last_updated_by.clone(),
            updated: v.group.last_updated.clone(),
            devices: v.devices.to_string(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: PolicyGroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PolicyGroupsCommand::List => {
            let records = controller.policy_groups().await?;
            let mut views = Vec::with_capacity(records.len());
            for record in &records {
                let group = PolicyGroup::from(record);
                // One lookup per group; a failure lands in the Devices cell.
                let devices = controller.device_association(&group.id).await;
                views.push(PolicyGroupView { group, devices });
            }

            let out = output::render_list(&global.output, &views, |v| PolicyGroupRow::from(v), |v| {
                v.group.name.clone()
            })?;
            if views.is_empty() {
                output::warn("No policy groups found.");
            }
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
