//! `sencrypt backup export|import` — copy the encrypted vault out or in.
//!
//! Neither direction asks for the master password.  An imported backup
//! is unlocked with the password it was created under.

use std::path::Path;

use crate::cli::output;
use crate::cli::{confirm, open_controller, Cli};
use crate::errors::Result;

/// Execute `backup export`.
pub fn execute_export(cli: &Cli, destination: &Path) -> Result<()> {
    let (controller, _settings) = open_controller(cli)?;
    let bytes = controller.export_backup(destination)?;

    crate::audit::log_audit(
        &controller.config().vault_dir,
        "backup-export",
        Some(&format!("{bytes} bytes")),
    );

    output::success(&format!(
        "Backup written to {} ({bytes} bytes)",
        destination.display()
    ));
    output::tip("The backup is encrypted; keep your master password to restore it.");
    Ok(())
}

/// Execute `backup import`.
pub fn execute_import(cli: &Cli, source: &Path, force: bool) -> Result<()> {
    let (controller, _settings) = open_controller(cli)?;

    // Replacing an existing vault loses every account not in the backup.
    if !force
        && !controller.check_is_new()
        && !confirm(&format!(
            "Replace the current vault with {}?",
            source.display()
        ))?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    controller.import_backup(source)?;

    crate::audit::log_audit(&controller.config().vault_dir, "backup-import", None);

    output::success(&format!("Vault restored from {}", source.display()));
    output::tip("Unlock it with the master password the backup was made under.");
    Ok(())
}
