//! Serde helpers for sending integer amounts as JSON strings, e.g. `"-4599"`.
//!
//! Use with `#[serde(with = "crate::transaction::amount")]` on any integer field.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

pub fn serialize<T: Display, S: Serializer>(amount: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(amount)
}

pub fn deserialize<'de, T: FromStr, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    let text = String::deserialize(deserializer)?;

    text.parse().map_err(|_| {
        D::Error::custom(format!(
            "amount must be a whole number written as a string, got {text:?}"
        ))
    })
}
