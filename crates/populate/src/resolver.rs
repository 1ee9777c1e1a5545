//! Unique contact-address assignment for customers.

use std::collections::HashSet;

use crate::rng::SeedStream;

/// Attempts per customer before the run is aborted.
pub const MAX_EMAIL_ATTEMPTS: usize = 10;

/// Length of the random disambiguation suffix.
const SUFFIX_LEN: usize = 6;

const EMAIL_DOMAIN: &str = "example.com";

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Exhausted { attempts: usize },
}

/// Hands out email addresses that are unique within one run.
///
/// Only candidates produced by this resolver are checked. Rows already in
/// the store are handled by the insert's conflict policy.
#[derive(Debug)]
pub struct EmailResolver {
    used: HashSet<String>,
    max_attempts: usize,
}

impl EmailResolver {
    pub fn new() -> Self {
        Self::with_max_attempts(MAX_EMAIL_ATTEMPTS)
    }

    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Self {
            used: HashSet::new(),
            max_attempts,
        }
    }

    /// Resolves the address for customer `sequence` (1-based).
    ///
    /// The first attempt is `customer{sequence}@example.com`; later attempts
    /// append a random suffix. Draws from `rng` only on retries.
    pub fn resolve(&mut self, sequence: usize, rng: &mut SeedStream) -> Resolution {
        for attempt in 0..self.max_attempts {
            let candidate = if attempt == 0 {
                canonical_email(sequence)
            } else {
                format!(
                    "customer{sequence}_{}@{EMAIL_DOMAIN}",
                    rng.alphanumeric(SUFFIX_LEN)
                )
            };

            if self.used.insert(candidate.clone()) {
                return Resolution::Resolved(candidate);
            }
        }

        Resolution::Exhausted {
            attempts: self.max_attempts,
        }
    }

    /// Marks an address as taken without generating it.
    pub fn reserve(&mut self, email: impl Into<String>) -> bool {
        self.used.insert(email.into())
    }

    /// Number of addresses handed out or reserved so far.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

impl Default for EmailResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// The first-choice address for a customer sequence number.
pub fn canonical_email(sequence: usize) -> String {
    format!("customer{sequence}@{EMAIL_DOMAIN}")
}
