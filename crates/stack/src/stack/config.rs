//! Guarded stack configuration

use crate::error::{Result, StackError};

/// Configuration for a guarded stack
///
/// The two protections toggle independently. With both disabled the
/// container keeps its functional push/pop semantics and loses all fault
/// detection beyond the structural size/capacity checks.
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Capacity adopted by the first growth from an empty allocation
    pub initial_capacity: usize,

    /// Capacity multiplier on growth; shrink divides by it. Must be at
    /// least 2.
    pub growth_factor: usize,

    /// Verify the boundary sentinel words on every integrity pass
    pub canary_protection: bool,

    /// Maintain and verify the data and descriptor checksums
    pub checksum_protection: bool,

    /// Default dump depth: 1 descriptor only, 2 truncated slots, 3+ every
    /// slot
    pub dump_verbosity: u8,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            growth_factor: 2,
            canary_protection: true,
            checksum_protection: true,
            dump_verbosity: 1,
        }
    }
}

impl StackConfig {
    /// Debug configuration: full protection, exhaustive dumps
    pub fn debug() -> Self {
        Self {
            dump_verbosity: 3,
            ..Self::default()
        }
    }

    /// Performance configuration: no fault detection, minimal overhead
    pub fn performance() -> Self {
        Self {
            canary_protection: false,
            checksum_protection: false,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.growth_factor < 2 {
            return Err(StackError::Config(format!(
                "growth_factor must be at least 2, got {}",
                self.growth_factor
            )));
        }
        if self.dump_verbosity == 0 {
            return Err(StackError::Config(
                "dump_verbosity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Next capacity after a growth request, `None` on overflow
    pub(crate) fn grown_capacity(&self, current: usize) -> Option<usize> {
        if current == 0 {
            Some(self.initial_capacity.max(1))
        } else {
            current.checked_mul(self.growth_factor)
        }
    }

    /// Shrink hysteresis: reclaim only once utilization has dropped to
    /// `1 / growth_factor²`, so alternating push/pop at a capacity boundary
    /// cannot thrash the allocator. An empty stack with allocated slots
    /// always qualifies.
    pub(crate) fn wants_shrink(&self, size: usize, capacity: usize) -> bool {
        if capacity == 0 {
            return false;
        }
        size == 0 || capacity / size >= self.growth_factor * self.growth_factor
    }

    /// Target capacity for a shrink
    pub(crate) fn shrunk_capacity(&self, capacity: usize) -> usize {
        capacity / self.growth_factor
    }
}
