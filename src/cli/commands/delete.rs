//! `sencrypt delete` — remove an account from the vault.

use crate::cli::output;
use crate::cli::{confirm, unlock, Cli};
use crate::errors::{Result, SencryptError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, index: usize, force: bool) -> Result<()> {
    let (controller, _settings) = unlock(cli)?;

    let accounts = controller.get_all_accounts()?;
    let account = accounts.get(index).ok_or(SencryptError::IndexOutOfRange {
        index,
        len: accounts.len(),
    })?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force
        && !confirm(&format!(
            "Delete account {index} ({} on {})?",
            account.username, account.website
        ))?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    controller.delete_account(index)?;

    crate::audit::log_audit(
        &controller.config().vault_dir,
        "delete",
        Some(&format!("index {index}")),
    );
    controller.teardown();

    output::success(&format!(
        "Deleted account {index} ({} remaining)",
        accounts.len() - 1
    ));
    output::tip("Indices of the accounts after it have shifted down by one.");

    Ok(())
}
