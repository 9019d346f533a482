//! `sencrypt reset-password` — change the master password.
//!
//! Unlocks with the current password, then re-derives keys from a fresh
//! salt and re-encrypts every account.  The vault file is replaced
//! atomically, so an interrupted reset leaves the old vault intact.

use crate::cli::output;
use crate::cli::{prompt_new_password, unlock, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `reset-password` command.
pub fn execute(cli: &Cli) -> Result<()> {
    // 1. Unlock with the current password.
    output::info("Enter your current master password.");
    let (controller, _settings) = unlock(cli)?;

    // 2. Prompt for the new password.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    // 3. Re-encrypt under the new key.
    controller.reset_master_password(&new_password)?;
    let count = controller.get_all_accounts()?.len();

    crate::audit::log_audit(
        &controller.config().vault_dir,
        "reset-password",
        Some(&format!("{count} accounts re-encrypted")),
    );
    controller.teardown();

    output::success(&format!(
        "Master password changed ({count} accounts re-encrypted)"
    ));
    Ok(())
}
