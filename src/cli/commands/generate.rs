//! `sencrypt generate` — print a random password.
//!
//! Works without a vault.  With no class flags, the character classes
//! and length come from `sencrypt.toml` (all classes, 20 characters by
//! default).

use crate::cli::{vault_dir, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::generator::{generate_random_password, PasswordOptions};

/// Execute the `generate` command.
pub fn execute(cli: &Cli, length: Option<usize>, flags: PasswordOptions) -> Result<()> {
    let settings = Settings::load(&vault_dir(cli))?;
    let (options, length) = resolve(&settings, length, flags);

    let password = zeroize::Zeroizing::new(generate_random_password(&options, length)?);
    println!("{}", password.as_str());
    Ok(())
}

/// Class flags win over the configured defaults only if at least one is set.
fn resolve(settings: &Settings, length: Option<usize>, flags: PasswordOptions) -> (PasswordOptions, usize) {
    let options = if flags.is_empty() {
        settings.generator_options()
    } else {
        flags
    };
    (options, length.unwrap_or(settings.generator_length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_uses_settings() {
        let settings = Settings {
            generator_symbols: false,
            generator_length: 12,
            ..Settings::default()
        };
        let (options, length) = resolve(&settings, None, PasswordOptions::default());
        assert!(!options.symbols);
        assert!(options.lowercase);
        assert_eq!(length, 12);
    }

    #[test]
    fn flags_replace_settings() {
        let flags = PasswordOptions {
            digits: true,
            ..PasswordOptions::default()
        };
        let (options, length) = resolve(&Settings::default(), Some(6), flags);
        assert_eq!(options, flags);
        assert_eq!(length, 6);
    }
}
