//! Integrity checker
//!
//! A side-effect-free scan over the descriptor and its guarded buffer,
//! producing a composite fault mask. Checksums are recomputed for
//! comparison and never persisted back; the descriptor digest excludes the
//! stored checksum field itself, so the comparison cannot be
//! self-referential.

use super::core::{GuardedStack, POISON_CAPACITY, POISON_SIZE};
use super::provenance::Lifecycle;
use crate::buffer::{LEFT_SENTINEL, RIGHT_SENTINEL};
use crate::checksum;
use crate::element::Element;
use crate::fault::FaultMask;

impl<T: Element> GuardedStack<T> {
    /// Scans the instance for corruption and validity violations.
    ///
    /// Runs automatically on entry and exit of every mutating operation;
    /// call it directly for an explicit checkpoint. Structural checks
    /// (poison values, size versus capacity, buffer presence) always run;
    /// sentinel and checksum verification honor the configured protection
    /// toggles.
    pub fn check(&self) -> FaultMask {
        let mut mask = FaultMask::empty();

        if self.size == POISON_SIZE {
            mask |= FaultMask::WRONG_SIZE;
        }
        if self.capacity == POISON_CAPACITY || self.capacity == POISON_SIZE {
            mask |= FaultMask::WRONG_CAPACITY;
        }
        if self.size > self.capacity {
            mask |= FaultMask::SIZE_EXCEEDS_CAPACITY;
        }

        match self.buf.as_ref() {
            None => mask |= FaultMask::NULL_DATA,
            Some(buf) => {
                if self.config.canary_protection {
                    if buf.left_guard() != LEFT_SENTINEL {
                        mask |= FaultMask::LEFT_GUARD_DAMAGED;
                    }
                    if buf.right_guard() != RIGHT_SENTINEL {
                        mask |= FaultMask::RIGHT_GUARD_DAMAGED;
                    }
                }
                if self.config.checksum_protection
                    && checksum::digest_bytes(buf.element_bytes()) != self.data_checksum
                {
                    mask |= FaultMask::DATA_CHECKSUM_MISMATCH;
                }
            }
        }

        if self.config.checksum_protection && self.struct_digest() != self.struct_checksum {
            mask |= FaultMask::STRUCT_CHECKSUM_MISMATCH;
        }

        if self.provenance.status() == Lifecycle::Active && self.provenance.is_damaged() {
            mask |= FaultMask::PROVENANCE_DAMAGED;
        }

        mask
    }
}
