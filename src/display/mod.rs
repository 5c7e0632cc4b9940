//! Display formatting for terminal output

pub mod snapshot;

pub use snapshot::{format_age, format_size, format_snapshot_details, format_snapshot_list};
