//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`config`] - Ingest configuration (`config.json` in the user config dir)
//! - [`encoding`] - Packed 3-bit encoding of N/A/T/C/G strings
//! - [`generate`] - Random reads for testing and benchmarking
//! - [`progress`] - Progress bars, no-op without the `progress` feature
//!
//! ## Key Functions
//!
//! ```
//! use basetrie::utils::{decode, encode};
//!
//! let packed = encode("ATCG").unwrap();
//! assert_eq!(packed.as_u64(), Some(0b101_100_011_010));
//! assert_eq!(decode(&packed), "ATCG");
//! ```

pub mod config;
pub mod encoding;
pub mod generate;
pub mod progress;

pub use config::*;
pub use encoding::*;
pub use generate::*;
