//! catch-thread - threaded comments for catch feeds
//!
//! Turns the flat comment list of a catch post into a reply tree and keeps
//! per-catch comment feeds on disk.
//!
//! ## Quick Start
//!
//! ```bash
//! # Render a snapshot as an indented tree
//! catch-thread thread comments.json
//!
//! # Check a snapshot for broken reply links
//! catch-thread audit comments.json --strict
//!
//! # Store a snapshot and apply a realtime event to it
//! catch-thread feed import pike-42 comments.json
//! catch-thread feed event pike-42 insert.json
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
