//! The error type shared by the whole crate.
//!
//! Topological gaps (an OD pair with no candidate path) and an exhausted
//! iteration budget are deliberately absent: neither is a failure.

use std::fmt;

/// Errors that can occur while loading, checking or solving a network
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed
    Io(std::io::Error),
    /// A TOML/JSON document could not be decoded or encoded
    Parse(String),
    /// One of the required lists (nodes, edges, OD pairs) is empty
    EmptyNetwork(&'static str),
    /// An edge or OD pair refers to a node that does not exist
    UnknownNode { role: &'static str, id: String },
    /// Two nodes or two edges share an id
    DuplicateId { kind: &'static str, id: String },
    /// An OD pair carries a negative or non-finite demand
    InvalidDemand { od: String, demand: f64 },
    /// A supplied path-flow vector does not match the number of candidate paths
    ShapeMismatch { expected: usize, found: usize },
    /// Solving produced a non-finite value, usually from malformed cost parameters
    NonFinite { what: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Parse(msg) => write!(f, "Parse error: {msg}"),
            Error::EmptyNetwork(what) => write!(f, "No {what} provided"),
            Error::UnknownNode { role, id } => write!(f, "{role} node {id} not found"),
            Error::DuplicateId { kind, id } => write!(f, "Duplicate {kind} id {id}"),
            Error::InvalidDemand { od, demand } => {
                write!(f, "Invalid demand {demand} for OD pair {od}")
            }
            Error::ShapeMismatch { expected, found } => {
                write!(f, "Expected {expected} path flows, found {found}")
            }
            Error::NonFinite { what } => write!(f, "Computation error: non-finite {what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
