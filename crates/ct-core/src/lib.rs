//! ct-core - Core library for catch-thread
//!
//! This crate turns the flat comment list of a catch post into a reply
//! forest, and provides the feed snapshot, audit, persistence and export
//! layers around it.

pub mod error;
pub mod types;
pub mod config;
pub mod comment;
pub mod thread;
pub mod feed;
pub mod export;

pub use error::{CatchThreadError, Result};
pub use types::*;
