//! `sencrypt update` — change fields of the account at an index.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::{Result, SencryptError};
use crate::vault::Account;

use super::add::account_password;

/// Field replacements requested on the command line.
pub struct UpdateArgs<'a> {
    pub website: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub generate: bool,
}

impl UpdateArgs<'_> {
    fn is_empty(&self) -> bool {
        self.website.is_none() && self.username.is_none() && self.password.is_none() && !self.generate
    }
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, index: usize, args: &UpdateArgs<'_>) -> Result<()> {
    if args.is_empty() {
        return Err(SencryptError::InvalidInput(
            "nothing to update — pass --website, --username, --password or --generate".into(),
        ));
    }

    let (controller, settings) = unlock(cli)?;

    let accounts = controller.get_all_accounts()?;
    let current = accounts.get(index).ok_or(SencryptError::IndexOutOfRange {
        index,
        len: accounts.len(),
    })?;

    let password = if args.password.is_some() || args.generate {
        account_password(&controller, &settings, args.password, args.generate)?
    } else {
        zeroize::Zeroizing::new(current.password.clone())
    };

    let updated = Account::new(
        args.website.unwrap_or(&current.website),
        args.username.unwrap_or(&current.username),
        password.as_str(),
    );
    controller.update_account(index, &updated)?;

    crate::audit::log_audit(
        &controller.config().vault_dir,
        "update",
        Some(&format!("index {index}")),
    );
    controller.teardown();

    output::success(&format!("Account {index} updated"));
    Ok(())
}
