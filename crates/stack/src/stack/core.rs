//! Guarded stack engine
//!
//! The logical push/pop state machine. Every public mutating operation runs
//! an integrity pass on entry (defense against using an already-corrupted
//! instance) and again on exit, and recomputes both checksums after every
//! mutation. Corruption is surfaced as a returned fault, never as a process
//! abort; escalation is the caller's policy.

use std::fmt;

use tracing::{debug, error, warn};

use super::config::StackConfig;
use super::provenance::{Lifecycle, Provenance};
use crate::buffer::GuardedBuf;
use crate::checksum::{self, FieldDigest};
use crate::element::Element;
use crate::error::{Result, StackError};
use crate::fault::FaultMask;
use crate::sink::LogSink;

/// Poison marker written into `size` on destroy
pub(crate) const POISON_SIZE: usize = 0x7FFF_FFFF;

/// Poison marker written into `capacity` on destroy, distinct from the size
/// poison so the two faults stay distinguishable
pub(crate) const POISON_CAPACITY: usize = 0x7FFF_FFFE;

/// Dynamically-growing LIFO container with runtime self-diagnosis
///
/// Holds exactly one element kind per instantiation. The backing allocation
/// is bracketed by sentinel words, and both the element region and the
/// descriptor itself are covered by checksums; [`check`](Self::check)
/// reports every violated condition as a composite [`FaultMask`].
///
/// Destroyed instances stay around in a poisoned state: every later
/// operation is detected through the poison values, and the freed buffer is
/// unreachable because it is detached, not merely marked.
pub struct GuardedStack<T: Element> {
    pub(super) buf: Option<GuardedBuf<T>>,
    pub(super) size: usize,
    pub(super) capacity: usize,
    pub(super) data_checksum: u32,
    pub(super) struct_checksum: u32,
    pub(super) provenance: Provenance,
    pub(super) config: StackConfig,
    pub(super) sink: Option<Box<dyn LogSink>>,
    pub(super) reported: FaultMask,
}

impl<T: Element> GuardedStack<T> {
    /// Constructs a stack with `capacity` pre-allocated slots and default
    /// configuration. A capacity of zero is valid; the first push grows to
    /// the configured initial capacity.
    pub fn new(capacity: usize, provenance: Provenance) -> Result<Self> {
        Self::with_config(capacity, provenance, StackConfig::default())
    }

    /// Constructs a stack with a custom configuration
    pub fn with_config(
        capacity: usize,
        mut provenance: Provenance,
        config: StackConfig,
    ) -> Result<Self> {
        config.validate()?;

        let buf = GuardedBuf::allocate(capacity)?;
        provenance.activate();

        let mut stack = Self {
            buf: Some(buf),
            size: 0,
            capacity,
            data_checksum: 0,
            struct_checksum: 0,
            provenance,
            config,
            sink: None,
            reported: FaultMask::empty(),
        };
        stack.refresh_checksums();
        stack.conclude("construct")?;
        debug!(
            name = stack.provenance.name(),
            capacity, "guarded stack constructed"
        );
        Ok(stack)
    }

    /// Attaches a diagnostic log sink, replacing any previous one
    pub fn set_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sink = Some(sink);
    }

    /// Builder-style variant of [`set_sink`](Self::set_sink)
    pub fn with_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Count of logically present elements
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when no elements are logically present
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Allocated element slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creation-site metadata and lifecycle status
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Active configuration
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Sticky mask of non-fatal faults reported since the last
    /// [`clear_reported_faults`](Self::clear_reported_faults): shrink
    /// failures after a successful pop and log-sink write failures land
    /// here instead of failing the operation that observed them.
    pub fn reported_faults(&self) -> FaultMask {
        self.reported
    }

    /// Clears the sticky reported-fault mask
    pub fn clear_reported_faults(&mut self) {
        self.reported = FaultMask::empty();
    }

    /// Pushes `value` on top of the stack.
    ///
    /// Grows the allocation when full; an allocation failure propagates
    /// without mutating `size`, leaving the container in its last
    /// known-good state.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.ensure_sound("push")?;

        if self.size == self.capacity {
            self.grow()?;
        }

        let Some(buf) = self.buf.as_mut() else {
            return Err(StackError::Faulted(FaultMask::NULL_DATA));
        };
        buf.set(self.size, value);
        self.size += 1;
        self.refresh_checksums();

        self.conclude("push")
    }

    /// Pops the top element.
    ///
    /// Popping an empty stack is the defined `WRONG_SIZE` fault, not
    /// undefined behavior. The vacated slot is overwritten with the element
    /// poison so stale reads of popped data are detectable. A shrink
    /// failure after a successful pop keeps the pop's effect and is
    /// recorded in [`reported_faults`](Self::reported_faults).
    pub fn pop(&mut self) -> Result<T> {
        self.ensure_sound("pop")?;

        if self.size == 0 {
            let mask = FaultMask::WRONG_SIZE;
            error!(
                name = self.provenance.name(),
                "pop on an empty stack"
            );
            self.emit_fault_report("pop", mask);
            return Err(StackError::Faulted(mask));
        }

        let Some(buf) = self.buf.as_mut() else {
            return Err(StackError::Faulted(FaultMask::NULL_DATA));
        };
        self.size -= 1;
        let value = buf.get(self.size);
        buf.set(self.size, T::POISON);

        if self.config.wants_shrink(self.size, self.capacity) {
            let target = self.config.shrunk_capacity(self.capacity);
            match buf.resize(target) {
                Ok(()) => self.capacity = target,
                Err(err) => {
                    // The pop already happened and stays; the container
                    // merely keeps unreclaimed excess capacity.
                    warn!(
                        name = self.provenance.name(),
                        target, %err, "shrink failed after pop"
                    );
                    self.reported |= FaultMask::ALLOCATION_FAILED;
                }
            }
        }
        self.refresh_checksums();

        self.conclude("pop")?;
        Ok(value)
    }

    /// Destroys the instance: releases the buffer and poisons the
    /// descriptor so any later use is detected as a fault.
    ///
    /// Idempotent. Also invoked on drop of an Active instance.
    pub fn destroy(&mut self) {
        let mask = self.check();
        if !mask.is_clean() && self.provenance.status() == Lifecycle::Active {
            // Destroy proceeds regardless; a corrupted instance must still
            // be retired.
            self.emit_fault_report("destroy", mask);
        }

        self.buf = None;
        self.size = POISON_SIZE;
        self.capacity = POISON_CAPACITY;
        self.data_checksum = 0;
        self.struct_checksum = 0;
        self.provenance.deactivate();
        debug!(name = self.provenance.name(), "guarded stack destroyed");
    }

    fn grow(&mut self) -> Result<()> {
        let next = self
            .config
            .grown_capacity(self.capacity)
            .ok_or(StackError::CapacityOverflow {
                elements: self.capacity,
            })?;
        let Some(buf) = self.buf.as_mut() else {
            return Err(StackError::Faulted(FaultMask::NULL_DATA));
        };
        buf.resize(next)?;
        self.capacity = next;
        self.refresh_checksums();
        Ok(())
    }

    /// Recomputes both checksums from current state. The data checksum
    /// covers the full capacity-sized element region, then participates in
    /// the descriptor digest.
    pub(super) fn refresh_checksums(&mut self) {
        if !self.config.checksum_protection {
            return;
        }
        self.data_checksum = match self.buf.as_ref() {
            Some(buf) => checksum::digest_bytes(buf.element_bytes()),
            None => 0,
        };
        self.struct_checksum = self.struct_digest();
    }

    /// Digest over every descriptor field except the stored struct checksum
    /// itself
    pub(super) fn struct_digest(&self) -> u32 {
        let mut digest = FieldDigest::new();
        digest.word(self.buf.as_ref().map_or(0, |b| b.base_addr() as u64));
        digest.word(self.size as u64);
        digest.word(self.capacity as u64);
        digest.word(u64::from(self.data_checksum));
        digest.bytes(self.provenance.name().as_bytes());
        digest.bytes(self.provenance.function().as_bytes());
        digest.bytes(self.provenance.file().as_bytes());
        digest.word(u64::from(self.provenance.line()));
        digest.word(match self.provenance.status() {
            Lifecycle::Active => 1,
            Lifecycle::Inactive => 0,
        });
        digest.finish()
    }

    /// Entry-side integrity pass: refuses to touch an instance that is
    /// already corrupted or destroyed.
    fn ensure_sound(&mut self, operation: &'static str) -> Result<()> {
        let mask = self.check();
        if mask.is_clean() {
            return Ok(());
        }
        error!(
            name = self.provenance.name(),
            operation,
            fault = %mask,
            "integrity check failed on entry"
        );
        self.emit_fault_report(operation, mask);
        Err(StackError::Faulted(mask))
    }

    /// Exit-side integrity pass
    fn conclude(&mut self, operation: &'static str) -> Result<()> {
        let mask = self.check();
        if mask.is_clean() {
            return Ok(());
        }
        error!(
            name = self.provenance.name(),
            operation,
            fault = %mask,
            "integrity check failed on exit"
        );
        self.emit_fault_report(operation, mask);
        Err(StackError::Faulted(mask))
    }

    /// Writes a fault header, the per-bit descriptions, and a dump to the
    /// attached sink. Sink failures degrade diagnostics only.
    pub(super) fn emit_fault_report(&mut self, operation: &str, mask: FaultMask) {
        let Some(mut sink) = self.sink.take() else {
            return;
        };

        let mut failed = sink
            .append(&format!("integrity fault in {operation}: {mask}"))
            .is_err();
        for (name, text) in mask.describe() {
            failed |= sink.append(&format!("  {name}: {text}")).is_err();
        }
        for line in self.dump_lines(self.config.dump_verbosity) {
            failed |= sink.append(&line).is_err();
        }
        self.sink = Some(sink);

        if failed {
            warn!("diagnostic log sink rejected a write");
            self.reported |= FaultMask::LOG_SINK_UNAVAILABLE;
        }
    }
}

impl<T: Element> Drop for GuardedStack<T> {
    fn drop(&mut self) {
        if self.provenance.status() == Lifecycle::Active {
            self.destroy();
        }
    }
}

impl<T: Element> fmt::Debug for GuardedStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedStack")
            .field("name", &self.provenance.name())
            .field("status", &self.provenance.status())
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
