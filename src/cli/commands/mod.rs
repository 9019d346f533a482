//! One module per subcommand.  Each exposes an `execute` function that
//! `main` dispatches to.

pub mod add;
pub mod audit_cmd;
pub mod backup;
pub mod completions;
pub mod delete;
pub mod generate;
pub mod init;
pub mod list;
pub mod reset_password;
pub mod status;
pub mod update;
