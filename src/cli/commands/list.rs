//! `sencrypt list` — display all accounts in a table.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, show: bool) -> Result<()> {
    let (controller, _settings) = unlock(cli)?;
    let accounts = controller.get_all_accounts()?;
    controller.teardown();

    output::info(&format!("{} account(s)", accounts.len()));
    output::print_accounts_table(&accounts, show);

    if !show && !accounts.is_empty() {
        output::tip("Pass --show to reveal passwords.");
    }

    Ok(())
}
