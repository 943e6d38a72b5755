//! Self-validating guarded stack
//!
//! A dynamically-growing LIFO container instrumented with runtime
//! self-diagnosis. Two independent mechanisms watch for corruption of the
//! backing memory and the descriptor itself:
//!
//! - Boundary sentinels: fixed 64-bit words placed in the same allocation
//!   immediately before and after the element region, so out-of-bounds
//!   writes are caught before they reach unrelated memory.
//! - Content checksums: CRC32 digests over the raw element region and over
//!   the descriptor fields, recomputed after every mutation and verified on
//!   entry and exit of every operation.
//!
//! Detected corruption is reported as a composite [`FaultMask`]; the
//! container never aborts the process on its own. Destroyed instances stay
//! behind in a poisoned state, so any later use is detected without ever
//! touching freed memory.
//!
//! # Example
//!
//! ```
//! use vigil_stack::{GuardedStack, provenance};
//!
//! fn main() -> vigil_stack::Result<()> {
//!     let mut stack = GuardedStack::new(0, provenance!("numbers"))?;
//!     stack.push(41)?;
//!     stack.push(42)?;
//!     assert_eq!(stack.pop()?, 42);
//!     assert!(stack.check().is_clean());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod buffer;
mod checksum;
mod macros;

pub mod element;
pub mod error;
pub mod fault;
pub mod sink;
pub mod stack;

pub use element::{Element, ElementKind};
pub use error::{Result, StackError};
pub use fault::FaultMask;
pub use sink::{ConsoleSink, FileSink, LogSink, MemorySink};
pub use stack::{GuardedStack, Lifecycle, Provenance, StackConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
