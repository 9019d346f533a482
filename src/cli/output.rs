//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Account;

/// Placeholder shown instead of a password unless `--show` is passed.
const MASK: &str = "••••••••";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the accounts as a table (#, Website, Username, Password).
///
/// Passwords are masked unless `show` is set.
pub fn print_accounts_table(accounts: &[Account], show: bool) {
    if accounts.is_empty() {
        info("No accounts in this vault yet.");
        tip("Run `sencrypt add <WEBSITE> <USERNAME>` to add your first account.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Website", "Username", "Password"]);

    for (index, account) in accounts.iter().enumerate() {
        let password = if show {
            account.password.clone()
        } else {
            MASK.to_string()
        };
        table.add_row(vec![
            index.to_string(),
            account.website.clone(),
            account.username.clone(),
            password,
        ]);
    }

    println!("{table}");
}
