use clap::Parser;
use sencrypt::cli::commands::update::UpdateArgs;
use sencrypt::cli::{BackupAction, Cli, Commands};
use sencrypt::generator::PasswordOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr log subscriber.
///
/// `SENCRYPT_LOG` takes precedence; otherwise `-v` raises the default
/// level from `warn` to `info` (`-vv` to `debug`).
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("SENCRYPT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("sencrypt={default_level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => sencrypt::cli::commands::init::execute(&cli),
        Commands::List { show } => sencrypt::cli::commands::list::execute(&cli, show),
        Commands::Add {
            ref website,
            ref username,
            ref password,
            generate,
        } => sencrypt::cli::commands::add::execute(
            &cli,
            website,
            username,
            password.as_deref(),
            generate,
        ),
        Commands::Update {
            index,
            ref website,
            ref username,
            ref password,
            generate,
        } => sencrypt::cli::commands::update::execute(
            &cli,
            index,
            &UpdateArgs {
                website: website.as_deref(),
                username: username.as_deref(),
                password: password.as_deref(),
                generate,
            },
        ),
        Commands::Delete { index, force } => {
            sencrypt::cli::commands::delete::execute(&cli, index, force)
        }
        Commands::Generate {
            length,
            lowercase,
            uppercase,
            digits,
            symbols,
        } => sencrypt::cli::commands::generate::execute(
            &cli,
            length,
            PasswordOptions {
                lowercase,
                uppercase,
                digits,
                symbols,
            },
        ),
        Commands::Backup { ref action } => match action {
            BackupAction::Export { ref path } => {
                sencrypt::cli::commands::backup::execute_export(&cli, path)
            }
            BackupAction::Import { ref path, force } => {
                sencrypt::cli::commands::backup::execute_import(&cli, path, *force)
            }
        },
        Commands::ResetPassword => sencrypt::cli::commands::reset_password::execute(&cli),
        Commands::Status => sencrypt::cli::commands::status::execute(&cli),
        Commands::Audit { last, ref since } => {
            sencrypt::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => sencrypt::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        sencrypt::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
