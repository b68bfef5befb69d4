//! DropCraft Core
//!
//! Primitive types shared by the tree builder and the claim ledger:
//! 20-byte addresses, 32-byte digests, allow-list entries and their
//! canonical encoding, hex helpers, and allow-list ingestion.

pub mod allowlist;
pub mod hexfmt;
mod types;

pub use allowlist::{load_allow_list, parse_row, read_allow_list, AllowListError, IngestReport};
pub use hexfmt::{to_hex, ParseError};
pub use types::*;
