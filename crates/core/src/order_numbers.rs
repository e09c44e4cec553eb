//! Order Numbers
//!
//! Order numbers look like `ORD-20261019-7K3QZP`: the order date followed by six random base-36
//! characters. Uniqueness is enforced by the store; callers regenerate on collision.

use std::fmt;

use jiff::civil::Date;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ORD";
const SUFFIX_LEN: usize = 6;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Human-readable order reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a new order number for an order placed on `date`.
    pub fn generate<R: Rng + ?Sized>(date: Date, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .filter_map(|_| ALPHABET.choose(rng))
            .map(|byte| char::from(*byte))
            .collect();

        Self(format!(
            "{PREFIX}-{:04}{:02}{:02}-{suffix}",
            date.year(),
            date.month(),
            date.day()
        ))
    }

    /// Wrap an order number read back from storage.
    #[must_use]
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The order number as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
