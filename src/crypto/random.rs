//! Cryptographically secure randomness backed by the operating system.
//!
//! Everything that needs unpredictable bytes (salts, nonces, generated
//! passwords) goes through this module so there is exactly one source.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{SencryptError, Result};

/// Fill `buf` with bytes from the OS CSPRNG.
pub fn fill_bytes(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| SencryptError::RandomUnavailable(e.to_string()))
}

/// Return a fixed-size array of random bytes.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill_bytes(&mut out)?;
    Ok(out)
}

/// Draw a uniformly distributed index in `0..bound`.
///
/// Uses rejection sampling over 32-bit words: values from the incomplete
/// top "bucket" are discarded so every index is equally likely.
pub fn uniform_index(bound: usize) -> Result<usize> {
    if bound == 0 {
        return Err(SencryptError::InvalidInput(
            "cannot sample from an empty range".into(),
        ));
    }
    let bound = u32::try_from(bound)
        .map_err(|_| SencryptError::InvalidInput(format!("range {bound} exceeds u32::MAX")))?;

    // Largest multiple of `bound` that fits in u32; anything at or above it is biased.
    let zone = u32::MAX - (u32::MAX % bound);

    loop {
        let word = OsRng
            .try_next_u32()
            .map_err(|e| SencryptError::RandomUnavailable(e.to_string()))?;
        if word < zone {
            return Ok((word % bound) as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_bytes_produces_different_output() {
        let a: [u8; 32] = random_array().unwrap();
        let b: [u8; 32] = random_array().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn uniform_index_stays_in_bounds() {
        for bound in [1usize, 2, 7, 26, 62, 94] {
            for _ in 0..200 {
                assert!(uniform_index(bound).unwrap() < bound);
            }
        }
    }

    #[test]
    fn uniform_index_of_one_is_zero() {
        assert_eq!(uniform_index(1).unwrap(), 0);
    }

    #[test]
    fn uniform_index_rejects_empty_range() {
        assert!(uniform_index(0).is_err());
    }

    #[test]
    fn uniform_index_hits_every_slot() {
        let mut seen = [false; 10];
        for _ in 0..1_000 {
            seen[uniform_index(10).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
