//! `sencrypt init` — create the vault and choose the master password.

use crate::cli::output;
use crate::cli::{open_controller, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{Result, SencryptError};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (controller, _settings) = open_controller(cli)?;

    // 1. Refuse to overwrite an existing vault.
    if !controller.check_is_new() {
        output::tip("Use `sencrypt reset-password` to change the master password.");
        return Err(SencryptError::AlreadyInitialized(
            controller.container_path().to_path_buf(),
        ));
    }

    // 2. Prompt for a new password (with confirmation) and create the vault.
    let password = prompt_new_password(PASSWORD_ENV)?;
    controller.create_master_password(&password)?;

    crate::audit::log_audit(&controller.config().vault_dir, "init", None);

    output::success(&format!(
        "Vault created at {}",
        controller.container_path().display()
    ));
    output::tip("Run `sencrypt add <WEBSITE> <USERNAME>` to add an account.");
    output::tip("Run `sencrypt list` to see all accounts.");

    controller.teardown();
    Ok(())
}
