//! Command dispatch: bridges CLI args -> catalog view-models -> output formatting.

pub mod categories;
pub mod config_cmd;
pub mod products;
pub mod session;
pub mod show;
pub mod util;

use prodview_core::Catalog;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, catalog: &Catalog, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Products(args) => products::handle(catalog, args, global).await,
        Command::Categories => categories::handle(catalog, global).await,
        Command::Show(args) => show::handle(catalog, args, global).await,
        Command::Session => session::handle(catalog, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not use the catalog server".into(),
        )),
    }
}
