//! Random password generation.
//!
//! Builds the union alphabet of the enabled character classes and draws
//! every character independently and uniformly from it.  There is no
//! "at least one of each class" rule: a 4-character password with all
//! classes enabled may well contain only letters.

use serde::{Deserialize, Serialize};

use crate::crypto::random;
use crate::errors::{SencryptError, Result};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?/|~";

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 1024;

/// Which character classes to draw from.  All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordOptions {
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default)]
    pub digits: bool,
    #[serde(default)]
    pub symbols: bool,
}

impl PasswordOptions {
    /// Every class enabled.
    pub fn all() -> Self {
        Self {
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }

    /// True if no class is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.lowercase || self.uppercase || self.digits || self.symbols)
    }

    /// The union of the enabled alphabets.
    pub fn alphabet(&self) -> Vec<char> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, set)| set.chars())
        .collect()
    }
}

/// Generate a `length`-character password from the classes in `options`.
///
/// Fails with `InvalidConfiguration` if no class is enabled or `length`
/// is outside `1..=MAX_LENGTH`.
pub fn generate_random_password(options: &PasswordOptions, length: usize) -> Result<String> {
    if options.is_empty() {
        return Err(SencryptError::InvalidConfiguration(
            "at least one character class must be enabled".into(),
        ));
    }
    if !(1..=MAX_LENGTH).contains(&length) {
        return Err(SencryptError::InvalidConfiguration(format!(
            "length must be between 1 and {MAX_LENGTH} (got {length})"
        )));
    }

    let alphabet = options.alphabet();
    let mut password = String::with_capacity(length);
    for _ in 0..length {
        password.push(alphabet[random::uniform_index(alphabet.len())?]);
    }
    Ok(password)
}
