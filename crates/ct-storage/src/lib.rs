//! ct-storage - Storage library for catch-thread
//!
//! This crate provides the file system backed store for comment feeds.

mod feed_store;

pub use feed_store::FileSystemStorage;
