//! Website normalization.
//!
//! Accounts are keyed by host, not by the URL the user happened to paste:
//! `https://user@www.example.com:8443/login?next=/` is stored as
//! `example.com`.  The same rule runs on create, update and duplicate
//! comparison so all three always agree.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{Result, SencryptError};

/// Optional scheme, optional `userinfo@`, optional `www.`, then the host
/// token up to the first `:`, `/` or `?`.
const HOSTNAME_PATTERN: &str = r"^(?:https?://)?(?:[^@/\n]+@)?(?:www\.)?([^:/?\n]+)";

fn hostname_regex() -> Result<&'static Regex> {
    static RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(HOSTNAME_PATTERN))
        .as_ref()
        .map_err(|e| SencryptError::InvalidInput(format!("hostname pattern: {e}")))
}

/// Extract the host token from a website or URL.
///
/// Leading and trailing whitespace is ignored.  Returns an empty string
/// when the input does not start with a host token (e.g. `/path`).
pub fn normalize_website(input: &str) -> Result<String> {
    Ok(hostname_regex()?
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default())
}
