//! Live store layout
//!
//! The record store itself is an opaque JSON file owned by another
//! component; snapvault only creates the layout around it on first run.

pub mod init;

pub use init::initialize_storage;
