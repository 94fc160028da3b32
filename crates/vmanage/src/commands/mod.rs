//! Command dispatch: bridges CLI args -> controller reads/writes -> output.

pub mod aar;
pub mod config_cmd;
pub mod devices;
pub mod ngfw;
pub mod policy_groups;
pub mod prefixes;
pub mod util;

use vmanage_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::PolicyGroups(args) => policy_groups::handle(controller, args, global).await,
        Command::Aar(args) => aar::handle(controller, args, global).await,
        Command::Ngfw(args) => ngfw::handle(controller, args, global).await,
        Command::Prefixes(args) => prefixes::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
