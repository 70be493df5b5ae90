#![warn(clippy::pedantic, clippy::expect_used, clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]

use std::fmt;

pub use crate::{
    error::{ParseError, Result},
    path::PathPrefix,
    properties::{parse_line, parse_str, ParsedLine, Properties},
    publish::{publish, PublishEvent, PublishSummary},
    store::{KvStore, MemoryStore, MemoryStoreError, Operation},
};

pub mod error;
pub mod path;
pub mod properties;
pub mod publish;
pub mod store;

pub const APP_NAME: &str = "kvseed";

/// A single key-value pair ready to be written to the store.
///
/// The key already carries the full path prefix, the value is the cleaned-up
/// right-hand side of the property line.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_display() {
        let entry = Entry::new("config/dev/app/db/host", "localhost");
        assert_eq!(entry.to_string(), "config/dev/app/db/host = localhost");
    }
}
