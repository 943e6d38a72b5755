//! Guarded element buffer
//!
//! A single owned heap region laid out as
//!
//! ```text
//! [left sentinel: u64][capacity x T][right sentinel: u64]
//! ```
//!
//! The sentinel words live in the same allocation as the element slots, so
//! an out-of-bounds write that walks off either end of the element region
//! lands on a sentinel before it reaches unrelated memory. Offsets are
//! computed once at allocation time and exposed only through accessors.
//!
//! # Safety
//!
//! All raw-pointer arithmetic is confined to this module:
//! - The element region starts `GUARD_BYTES` past the base pointer and is
//!   aligned for `T` because the allocation is 8-byte aligned and every
//!   `Element` impl has alignment of at most 8.
//! - The right sentinel sits immediately after the last slot and may be
//!   unaligned, so it is only accessed with unaligned reads and writes.
//! - The element region is zero-initialized at allocation, and every
//!   `Element` impl is valid for any initialized bit pattern, so slot reads
//!   never observe uninitialized memory.

use core::marker::PhantomData;
use core::mem::{align_of, size_of};
use core::ptr::{self, NonNull};
use std::alloc::{Layout, alloc_zeroed, dealloc};

use crate::element::Element;
use crate::error::{Result, StackError};

/// Width of one boundary sentinel
pub(crate) const GUARD_BYTES: usize = size_of::<u64>();

/// Fixed left sentinel pattern, written once per allocation
pub(crate) const LEFT_SENTINEL: u64 = 0xAAAA_AAAA_ADEA_DDED;

/// Fixed right sentinel pattern, the bitwise complement of the left one so
/// a single stray pattern cannot satisfy both ends at once
pub(crate) const RIGHT_SENTINEL: u64 = !LEFT_SENTINEL;

/// Owned guarded allocation holding `capacity` element slots
#[derive(Debug)]
pub(crate) struct GuardedBuf<T: Element> {
    base: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    _elems: PhantomData<T>,
}

impl<T: Element> GuardedBuf<T> {
    fn layout_for(capacity: usize) -> Result<Layout> {
        let elems = capacity
            .checked_mul(size_of::<T>())
            .and_then(|bytes| bytes.checked_add(2 * GUARD_BYTES))
            .ok_or(StackError::CapacityOverflow { elements: capacity })?;
        let align = align_of::<u64>().max(align_of::<T>());
        Layout::from_size_align(elems, align)
            .map_err(|_| StackError::CapacityOverflow { elements: capacity })
    }

    /// Allocates a zeroed region for `capacity` slots and places both
    /// sentinels. A capacity of zero still allocates the two sentinel words.
    pub(crate) fn allocate(capacity: usize) -> Result<Self> {
        let layout = Self::layout_for(capacity)?;

        // SAFETY: layout has non-zero size (at least the two sentinel words).
        let raw = unsafe { alloc_zeroed(layout) };
        let base = NonNull::new(raw).ok_or(StackError::AllocationFailed {
            requested: layout.size(),
        })?;

        let mut buf = Self {
            base,
            layout,
            capacity,
            _elems: PhantomData,
        };
        buf.write_sentinels();
        Ok(buf)
    }

    /// Reallocates to `new_capacity` slots, preserving the overlapping slot
    /// bytes and rewriting both sentinels at their new offsets.
    ///
    /// On failure the existing region is left fully intact.
    pub(crate) fn resize(&mut self, new_capacity: usize) -> Result<()> {
        let fresh = Self::allocate(new_capacity)?;

        let keep = self.capacity.min(new_capacity) * size_of::<T>();
        if keep > 0 {
            // SAFETY: Both element regions are valid for `keep` bytes:
            // - source region holds self.capacity slots, keep <= that
            // - destination holds new_capacity slots, keep <= that
            // - the regions belong to distinct allocations, so they never
            //   overlap
            unsafe {
                ptr::copy_nonoverlapping(self.elements_ptr(), fresh.elements_ptr(), keep);
            }
        }

        // Old region released here, after the copy succeeded.
        *self = fresh;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Base address of the allocation, used in diagnostics and the
    /// descriptor digest
    pub(crate) fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    fn elements_ptr(&self) -> *mut u8 {
        // SAFETY: GUARD_BYTES is within the allocation (its minimum size is
        // two sentinel words).
        unsafe { self.base.as_ptr().add(GUARD_BYTES) }
    }

    fn right_sentinel_offset(&self) -> usize {
        GUARD_BYTES + self.capacity * size_of::<T>()
    }

    fn write_sentinels(&mut self) {
        // SAFETY: Both offsets are inside the allocation by construction of
        // layout_for. The base is 8-byte aligned so the left word is an
        // aligned write; the right word may not be, hence write_unaligned.
        unsafe {
            (self.base.as_ptr().cast::<u64>()).write(LEFT_SENTINEL);
            self.base
                .as_ptr()
                .add(self.right_sentinel_offset())
                .cast::<u64>()
                .write_unaligned(RIGHT_SENTINEL);
        }
    }

    /// Current value of the left boundary sentinel
    pub(crate) fn left_guard(&self) -> u64 {
        // SAFETY: The left word is at the allocation base, aligned to 8.
        unsafe { self.base.as_ptr().cast::<u64>().read() }
    }

    /// Current value of the right boundary sentinel
    pub(crate) fn right_guard(&self) -> u64 {
        // SAFETY: The right word is inside the allocation; it may be
        // unaligned when size_of::<T>() is not a multiple of 8.
        unsafe {
            self.base
                .as_ptr()
                .add(self.right_sentinel_offset())
                .cast::<u64>()
                .read_unaligned()
        }
    }

    /// Reads the slot at `index`
    pub(crate) fn get(&self, index: usize) -> T {
        assert!(index < self.capacity, "slot index out of bounds");
        // SAFETY: index is in bounds (asserted), the slot is aligned for T,
        // and every slot always holds an initialized T (zeroed at
        // allocation, overwritten by set afterwards).
        unsafe { self.elements_ptr().cast::<T>().add(index).read() }
    }

    /// Writes `value` into the slot at `index`
    pub(crate) fn set(&mut self, index: usize, value: T) {
        assert!(index < self.capacity, "slot index out of bounds");
        // SAFETY: index is in bounds (asserted) and the slot is aligned for
        // T. T is Copy, so no drop is skipped by the overwrite.
        unsafe { self.elements_ptr().cast::<T>().add(index).write(value) };
    }

    /// Raw bytes of the full element region, `capacity` slots
    pub(crate) fn element_bytes(&self) -> &[u8] {
        // SAFETY: The element region is capacity * size_of::<T>() bytes
        // inside the allocation and is always fully initialized.
        unsafe { core::slice::from_raw_parts(self.elements_ptr(), self.capacity * size_of::<T>()) }
    }

    /// Mutable view of the entire allocation, sentinels included.
    ///
    /// Exists for fault-injection drills: tests flip bytes here to simulate
    /// out-of-bounds writes and external interference.
    #[cfg(test)]
    pub(crate) fn raw_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: The allocation is layout.size() bytes and fully
        // initialized (zeroed, then sentinel and slot writes only).
        unsafe { core::slice::from_raw_parts_mut(self.base.as_ptr(), self.layout.size()) }
    }
}

impl<T: Element> Drop for GuardedBuf<T> {
    fn drop(&mut self) {
        // SAFETY: base was returned by alloc_zeroed with exactly this
        // layout and has not been freed before; the whole allocation,
        // sentinel words included, is released at once.
        unsafe { dealloc(self.base.as_ptr(), self.layout) };
    }
}

// SAFETY: GuardedBuf exclusively owns its allocation; the raw pointer is
// never aliased outside &self/&mut self borrows, and T is Send + Sync.
unsafe impl<T: Element> Send for GuardedBuf<T> {}
// SAFETY: Shared references only permit reads of initialized memory.
unsafe impl<T: Element> Sync for GuardedBuf<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_complements() {
        assert_eq!(LEFT_SENTINEL, !RIGHT_SENTINEL);
        assert_ne!(LEFT_SENTINEL, RIGHT_SENTINEL);
    }

    #[test]
    fn allocate_places_both_sentinels() {
        let buf = GuardedBuf::<i32>::allocate(7).unwrap();
        assert_eq!(buf.capacity(), 7);
        assert_eq!(buf.left_guard(), LEFT_SENTINEL);
        assert_eq!(buf.right_guard(), RIGHT_SENTINEL);
    }

    #[test]
    fn zero_capacity_still_carries_sentinels() {
        let buf = GuardedBuf::<i64>::allocate(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.left_guard(), LEFT_SENTINEL);
        assert_eq!(buf.right_guard(), RIGHT_SENTINEL);
        assert!(buf.element_bytes().is_empty());
    }

    #[test]
    fn slots_start_zeroed_and_round_trip() {
        let mut buf = GuardedBuf::<i32>::allocate(4).unwrap();
        assert_eq!(buf.get(0), 0);
        assert_eq!(buf.get(3), 0);

        buf.set(2, -1234);
        assert_eq!(buf.get(2), -1234);
        assert_eq!(buf.left_guard(), LEFT_SENTINEL);
        assert_eq!(buf.right_guard(), RIGHT_SENTINEL);
    }

    #[test]
    fn resize_preserves_slots_and_rewrites_sentinels() {
        let mut buf = GuardedBuf::<i32>::allocate(3).unwrap();
        buf.set(0, 10);
        buf.set(1, 20);
        buf.set(2, 30);

        buf.resize(8).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.get(0), 10);
        assert_eq!(buf.get(1), 20);
        assert_eq!(buf.get(2), 30);
        assert_eq!(buf.get(7), 0); // fresh slot, zeroed
        assert_eq!(buf.left_guard(), LEFT_SENTINEL);
        assert_eq!(buf.right_guard(), RIGHT_SENTINEL);

        buf.resize(2).unwrap();
        assert_eq!(buf.capacity(), 2);
        assert_eq!(buf.get(0), 10);
        assert_eq!(buf.get(1), 20);
        assert_eq!(buf.right_guard(), RIGHT_SENTINEL);
    }

    #[test]
    fn unaligned_right_sentinel_survives_odd_capacities() {
        // 5 x i32 puts the right sentinel at byte offset 28, not a multiple
        // of 8.
        let buf = GuardedBuf::<i32>::allocate(5).unwrap();
        assert_eq!(buf.right_guard(), RIGHT_SENTINEL);
    }

    #[test]
    fn overflowing_capacity_is_rejected() {
        // unwrap_err needs the Ok side to be Debug; keep GuardedBuf that way.
        let err = GuardedBuf::<i64>::allocate(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, StackError::CapacityOverflow { .. }));
        let buf = GuardedBuf::<i64>::allocate(1).unwrap();
        assert!(format!("{buf:?}").contains("GuardedBuf"));
    }

    #[test]
    fn raw_bytes_cover_guards_and_slots() {
        let mut buf = GuardedBuf::<i32>::allocate(2).unwrap();
        let len = buf.raw_bytes_mut().len();
        assert_eq!(len, GUARD_BYTES + 2 * size_of::<i32>() + GUARD_BYTES);

        // Flipping a byte inside the left sentinel must show up through the
        // accessor.
        buf.raw_bytes_mut()[3] ^= 0xFF;
        assert_ne!(buf.left_guard(), LEFT_SENTINEL);
    }
}
