//! Composite fault masks produced by the integrity checker
//!
//! A single integrity pass can observe several independent corruption
//! conditions at once, so faults are reported as a bit-set rather than a
//! first-failure enum. The per-bit description table is fixed, read-only
//! process-wide data.

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Bit-set of simultaneously detected corruption and validity conditions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FaultMask: u32 {
        /// Descriptor behind a null handle. Unreachable through the safe
        /// API; kept so masks decode the complete bit-set.
        const NULL_DESCRIPTOR = 1 << 0;

        /// The underlying allocator could not satisfy a request
        const ALLOCATION_FAILED = 1 << 1;

        /// `size` carries the poison sentinel value
        const WRONG_SIZE = 1 << 2;

        /// `capacity` carries a poison sentinel value
        const WRONG_CAPACITY = 1 << 3;

        /// `size` exceeds `capacity`
        const SIZE_EXCEEDS_CAPACITY = 1 << 4;

        /// No element buffer is attached to the descriptor
        const NULL_DATA = 1 << 5;

        /// The diagnostic log sink rejected a write
        const LOG_SINK_UNAVAILABLE = 1 << 6;

        /// The sentinel word before the element region was overwritten
        const LEFT_GUARD_DAMAGED = 1 << 7;

        /// The sentinel word after the element region was overwritten
        const RIGHT_GUARD_DAMAGED = 1 << 8;

        /// The descriptor's own checksum no longer matches its fields
        const STRUCT_CHECKSUM_MISMATCH = 1 << 9;

        /// The element region checksum no longer matches its contents
        const DATA_CHECKSUM_MISMATCH = 1 << 10;

        /// Provenance metadata is missing or carries poison values
        const PROVENANCE_DAMAGED = 1 << 11;
    }
}

/// Fixed description table, indexed by bit position
const DESCRIPTIONS: [(FaultMask, &str, &str); 12] = [
    (
        FaultMask::NULL_DESCRIPTOR,
        "NULL_DESCRIPTOR",
        "descriptor handle is null",
    ),
    (
        FaultMask::ALLOCATION_FAILED,
        "ALLOCATION_FAILED",
        "memory allocation failed",
    ),
    (
        FaultMask::WRONG_SIZE,
        "WRONG_SIZE",
        "size carries a poison value or an empty pop was attempted",
    ),
    (
        FaultMask::WRONG_CAPACITY,
        "WRONG_CAPACITY",
        "capacity carries a poison value",
    ),
    (
        FaultMask::SIZE_EXCEEDS_CAPACITY,
        "SIZE_EXCEEDS_CAPACITY",
        "size is bigger than capacity",
    ),
    (
        FaultMask::NULL_DATA,
        "NULL_DATA",
        "no element buffer is attached",
    ),
    (
        FaultMask::LOG_SINK_UNAVAILABLE,
        "LOG_SINK_UNAVAILABLE",
        "the diagnostic log sink rejected a write",
    ),
    (
        FaultMask::LEFT_GUARD_DAMAGED,
        "LEFT_GUARD_DAMAGED",
        "the left boundary sentinel was overwritten; adjacent state may be damaged too",
    ),
    (
        FaultMask::RIGHT_GUARD_DAMAGED,
        "RIGHT_GUARD_DAMAGED",
        "the right boundary sentinel was overwritten; adjacent state may be damaged too",
    ),
    (
        FaultMask::STRUCT_CHECKSUM_MISMATCH,
        "STRUCT_CHECKSUM_MISMATCH",
        "the descriptor fields were mutated behind the container's back",
    ),
    (
        FaultMask::DATA_CHECKSUM_MISMATCH,
        "DATA_CHECKSUM_MISMATCH",
        "the element region was mutated behind the container's back",
    ),
    (
        FaultMask::PROVENANCE_DAMAGED,
        "PROVENANCE_DAMAGED",
        "creation-site metadata is missing or poisoned",
    ),
];

impl FaultMask {
    /// Iterates over `(name, description)` pairs for every set bit
    pub fn describe(self) -> impl Iterator<Item = (&'static str, &'static str)> {
        DESCRIPTIONS
            .iter()
            .filter(move |(bit, _, _)| self.contains(*bit))
            .map(|(_, name, text)| (*name, *text))
    }

    /// True when the mask records no fault at all
    pub fn is_clean(self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for FaultMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("clean");
        }
        let mut first = true;
        for (name, _) in self.describe() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_mask_displays_as_clean() {
        assert_eq!(FaultMask::empty().to_string(), "clean");
        assert!(FaultMask::empty().is_clean());
    }

    #[test]
    fn display_joins_set_bits() {
        let mask = FaultMask::WRONG_SIZE | FaultMask::LEFT_GUARD_DAMAGED;
        assert_eq!(mask.to_string(), "WRONG_SIZE|LEFT_GUARD_DAMAGED");
    }

    #[test]
    fn describe_yields_one_entry_per_bit() {
        let mask = FaultMask::DATA_CHECKSUM_MISMATCH | FaultMask::PROVENANCE_DAMAGED;
        let names: Vec<_> = mask.describe().map(|(name, _)| name).collect();
        assert_eq!(names, ["DATA_CHECKSUM_MISMATCH", "PROVENANCE_DAMAGED"]);
    }

    #[test]
    fn every_flag_has_a_description() {
        for (bit, _, _) in DESCRIPTIONS {
            assert!(FaultMask::all().contains(bit));
        }
        assert_eq!(DESCRIPTIONS.len(), FaultMask::all().bits().count_ones() as usize);
    }
}
