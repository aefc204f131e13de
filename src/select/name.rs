// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the Name enum for the selection language.

use crate::errors::SelectError;
use regex::Regex;
use std::fmt;

/// Residue or atom name used in a selection query.
/// Either a literal string or a regular expression written as `r'...'`.
#[derive(Debug, Clone)]
pub enum Name {
    String(String),
    Regex(Regex),
}

impl Name {
    /// Create new `Name` enum. Strings starting with `r'` are compiled as regular expressions.
    pub fn new(string: &str) -> Result<Self, SelectError> {
        match string.strip_prefix("r'") {
            Some(pattern) => {
                let pattern = pattern.strip_suffix('\'').unwrap_or(pattern);
                Regex::new(pattern)
                    .map(Name::Regex)
                    .map_err(|_| SelectError::InvalidRegex(string.to_owned()))
            }
            None => Ok(Name::String(string.to_owned())),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Name::String(s) => write!(f, "{}", s),
            Name::Regex(r) => write!(f, "r'{}'", r),
        }
    }
}

impl PartialEq<Name> for Name {
    /// Compare `Name` enum with another `Name` enum.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Name::String(s), Name::String(t)) => s == t,
            (Name::Regex(s), Name::Regex(t)) => s.as_str() == t.as_str(),
            _ => false,
        }
    }
}

impl PartialEq<str> for Name {
    /// Compare `Name` enum with `&str`. Regular expressions match anywhere in the string.
    fn eq(&self, other: &str) -> bool {
        match self {
            Name::String(s) => s == other,
            Name::Regex(r) => r.is_match(other),
        }
    }
}
