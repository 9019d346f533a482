//! `sencrypt add` — store a new account in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{prompt_account_password, unlock, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::vault::{Account, VaultController};

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    website: &str,
    username: &str,
    password: Option<&str>,
    generate: bool,
) -> Result<()> {
    let (controller, settings) = unlock(cli)?;

    let secret = account_password(&controller, &settings, password, generate)?;
    let account = Account::new(website, username, secret.as_str());
    controller.create_account(&account)?;

    let count = controller.get_all_accounts()?.len();
    crate::audit::log_audit(
        &controller.config().vault_dir,
        "add",
        Some(&format!("index {}", count - 1)),
    );
    controller.teardown();

    output::success(&format!("Account added ({count} total)"));
    if generate {
        output::tip("Run `sencrypt list --show` to see the generated password.");
    }

    Ok(())
}

/// Work out the account password from one of four sources.
pub(crate) fn account_password(
    controller: &VaultController,
    settings: &Settings,
    value: Option<&str>,
    generate: bool,
) -> Result<Zeroizing<String>> {
    if generate {
        // Source 1: Generated with the configured defaults.
        let pw = controller
            .generate_random_password(&settings.generator_options(), settings.generator_length)?;
        Ok(Zeroizing::new(pw))
    } else if let Some(v) = value {
        // Source 2: Inline value on the command line.
        output::warning("Password provided on command line — it may appear in shell history.");
        Ok(Zeroizing::new(v.to_string()))
    } else if !io::stdin().is_terminal() {
        // Source 3: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Ok(Zeroizing::new(buf.trim_end().to_string()))
    } else {
        // Source 4: Interactive secure prompt (default).
        prompt_account_password()
    }
}
