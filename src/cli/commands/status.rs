//! `sencrypt status` — show vault location and settings without unlocking.

use console::style;

use crate::cli::output;
use crate::cli::{vault_dir, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::vault::format::read_container;
use crate::vault::lockout::LockoutTracker;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let dir = vault_dir(cli);
    let settings = Settings::load(&dir)?;
    let config = settings.vault_config(&dir);

    println!("{} {}", style("Vault directory:").bold(), dir.display());

    let container_path = config.container_path();
    if !container_path.exists() {
        output::info("No vault yet.");
        output::tip("Run `sencrypt init` to create one.");
        return Ok(());
    }

    // Only the plaintext header is read; nothing is decrypted.
    let container = read_container(&container_path)?;
    let header = &container.header;
    println!(
        "{} {}",
        style("Created:").bold(),
        header.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "{} Argon2id, {} KiB, {} iteration(s), {} lane(s)",
        style("Key derivation:").bold(),
        header.kdf.memory_kib,
        header.kdf.iterations,
        header.kdf.parallelism
    );

    let failed = LockoutTracker::new(&config.lockout_path(), config.max_failed_attempts)
        .failed_attempts();
    if config.max_failed_attempts > 0 {
        println!(
            "{} {failed} of {} before the vault is erased",
            style("Failed unlocks:").bold(),
            config.max_failed_attempts
        );
    } else {
        println!("{} {failed}", style("Failed unlocks:").bold());
    }

    Ok(())
}
