//! Operation journal for snapvault
//!
//! Records every backup, prune and restore in an append-only JSONL file in
//! the logs directory (`logs/operations.jsonl`), so the history of what was
//! done to the store travels with the store itself.
//!
//! Journal writes happen after the operation has succeeded; a failed write
//! becomes a warning on the operation's report and never fails it.

mod entry;
mod logger;

pub use entry::{JournalEntry, Operation};
pub use logger::Journal;
