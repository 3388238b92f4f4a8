//! Conventional-commit types, rendering and validation.

pub mod message;
pub mod types;

pub use message::{
    MAX_HEADER_LENGTH, MessageWarning, ParsedHeader, ValidatedMessage, build, parse, validate,
};
pub use types::CommitType;
