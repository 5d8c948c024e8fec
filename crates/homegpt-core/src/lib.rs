//! Shared error taxonomy and response helpers for homegpt crates

#![allow(clippy::must_use_candidate)]

mod error;
mod time;

pub use error::{ErrorKind, HttpError, error_body};
pub use time::timestamp;
