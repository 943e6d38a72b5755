//! The guarded stack and its supporting types
//!
//! ## Modules
//! - `core`: the [`GuardedStack`] engine with push/pop/destroy semantics
//! - `check`: the integrity pass producing composite fault masks
//! - `config`: configuration and the growth/shrink policy
//! - `dump`: human-readable state dumps
//! - `provenance`: creation-site metadata and the lifecycle flag

mod check;
mod config;
mod core;
mod dump;
mod provenance;

pub use config::StackConfig;
pub use self::core::GuardedStack;
pub use provenance::{Lifecycle, Provenance};
