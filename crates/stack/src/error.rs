//! Error types for guarded stack operations

use crate::fault::FaultMask;

/// Result type for stack operations
pub type Result<T> = core::result::Result<T, StackError>;

/// Stack operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// The underlying allocator could not satisfy a request. The container
    /// is left in its last known-good state.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailed {
        /// Total bytes requested, sentinel words included
        requested: usize,
    },

    /// The requested capacity does not fit in the address space
    #[error("capacity of {elements} elements overflows the allocation size")]
    CapacityOverflow {
        /// Requested element count
        elements: usize,
    },

    /// The integrity checker found corruption before, during, or after the
    /// operation
    #[error("integrity check failed: {0}")]
    Faulted(FaultMask),

    /// The supplied configuration is unusable
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StackError {
    /// The fault mask carried by this error, if any
    pub fn fault_mask(&self) -> FaultMask {
        match self {
            Self::AllocationFailed { .. } | Self::CapacityOverflow { .. } => {
                FaultMask::ALLOCATION_FAILED
            }
            Self::Faulted(mask) => *mask,
            Self::Config(_) => FaultMask::empty(),
        }
    }

    /// True for allocation failures, which leave the container usable
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. } | Self::CapacityOverflow { .. }
        )
    }
}
