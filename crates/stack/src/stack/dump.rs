//! Human-readable state dumps
//!
//! Verbosity levels:
//! 1 shows the descriptor only, no element contents;
//! 2 adds the first and last 10 slots with a truncation marker (every slot
//!   when capacity is at most 20);
//! 3 and above list every slot. Slots holding a logically present element
//!   are marked with `*`, allocated-but-unused slots are unmarked.

use tracing::debug;

use super::core::{GuardedStack, POISON_CAPACITY, POISON_SIZE};
use super::provenance::Lifecycle;
use crate::element::Element;
use crate::fault::FaultMask;

/// Slots shown at each end of a truncated level-2 listing
const TRUNCATED_WINDOW: usize = 10;

impl<T: Element> GuardedStack<T> {
    /// Renders a dump at the configured verbosity
    pub fn dump(&self) -> String {
        self.dump_with(self.config.dump_verbosity)
    }

    /// Renders a dump at an explicit verbosity
    pub fn dump_with(&self, verbosity: u8) -> String {
        self.dump_lines(verbosity).join("\n")
    }

    /// Writes a dump line by line to the attached sink.
    ///
    /// Without a sink the dump goes to the structured log at debug level.
    /// A sink write failure is recorded in
    /// [`reported_faults`](Self::reported_faults) and never blocks.
    pub fn dump_to_sink(&mut self) {
        let lines = self.dump_lines(self.config.dump_verbosity);

        let Some(mut sink) = self.sink.take() else {
            for line in &lines {
                debug!(target: "vigil_stack::dump", "{line}");
            }
            return;
        };

        let mut failed = false;
        for line in &lines {
            failed |= sink.append(line).is_err();
        }
        self.sink = Some(sink);

        if failed {
            self.reported |= FaultMask::LOG_SINK_UNAVAILABLE;
        }
    }

    pub(super) fn dump_lines(&self, verbosity: u8) -> Vec<String> {
        let prov = &self.provenance;
        let mut lines = vec![
            format!(
                "stack \"{}\" [{}] from {} at {}({})",
                prov.name(),
                T::KIND,
                prov.function(),
                prov.file(),
                prov.line()
            ),
            format!(
                "status: {}",
                match prov.status() {
                    Lifecycle::Active => "active",
                    Lifecycle::Inactive => "inactive",
                }
            ),
        ];

        if let Some(buf) = self.buf.as_ref() {
            lines.push(format!("left guard  = {:#018X}", buf.left_guard()));
            lines.push(format!("right guard = {:#018X}", buf.right_guard()));
        }

        lines.push("{".into());
        lines.push(format!("    size            = {}", self.size));
        lines.push(format!("    capacity        = {}", self.capacity));
        lines.push(format!("    data checksum   = {:#010X}", self.data_checksum));
        lines.push(format!(
            "    struct checksum = {:#010X}",
            self.struct_checksum
        ));
        match self.buf.as_ref() {
            Some(buf) => lines.push(format!("    data @ {:#X}", buf.base_addr())),
            None => lines.push("    data = <detached>".into()),
        }

        if verbosity >= 2 {
            self.dump_slots(verbosity, &mut lines);
        }
        lines.push("}".into());
        lines
    }

    fn dump_slots(&self, verbosity: u8, lines: &mut Vec<String>) {
        let Some(buf) = self.buf.as_ref() else {
            return;
        };
        // Refuse to walk slots with an untrustworthy size; the descriptor
        // lines above still tell the story.
        if self.size == POISON_SIZE
            || self.capacity == POISON_CAPACITY
            || self.size > self.capacity
        {
            return;
        }

        let slot = |index: usize| {
            let marker = if index < self.size { "*" } else { " " };
            format!("   {marker}[{index}] = {}", buf.get(index).render())
        };

        if verbosity >= 3 || self.capacity <= 2 * TRUNCATED_WINDOW {
            for index in 0..self.capacity {
                lines.push(slot(index));
            }
        } else {
            for index in 0..TRUNCATED_WINDOW {
                lines.push(slot(index));
            }
            lines.push("    ...".into());
            for index in self.capacity - TRUNCATED_WINDOW..self.capacity {
                lines.push(slot(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::provenance;
    use crate::stack::{GuardedStack, StackConfig};

    fn filled_stack(values: usize, capacity: usize) -> GuardedStack<i32> {
        let mut stack = GuardedStack::new(capacity, provenance!("dumped")).unwrap();
        for value in 0..values {
            stack.push(value as i32).unwrap();
        }
        stack
    }

    #[test]
    fn level_one_omits_elements() {
        let stack = filled_stack(3, 10);
        let dump = stack.dump_with(1);
        assert!(dump.contains("size            = 3"));
        assert!(dump.contains("capacity        = 10"));
        assert!(!dump.contains("[0] ="));
    }

    #[test]
    fn level_two_lists_every_slot_of_a_small_stack() {
        let stack = filled_stack(2, 10);
        let dump = stack.dump_with(2);
        assert!(dump.contains("   *[0] = 0"));
        assert!(dump.contains("   *[1] = 1"));
        assert!(dump.contains("    [2] = 0")); // allocated but unused
        assert!(!dump.contains("..."));
    }

    #[test]
    fn level_two_truncates_a_large_stack() {
        let stack = filled_stack(15, 64);
        let dump = stack.dump_with(2);
        assert!(dump.contains("   *[9] = 9"));
        assert!(dump.contains("    ..."));
        assert!(dump.contains("    [63] = 0"));
        assert!(!dump.contains("[20] ="));
    }

    #[test]
    fn level_three_annotates_presence() {
        let stack = filled_stack(15, 64);
        let dump = stack.dump_with(3);
        assert!(dump.contains("   *[14] = 14"));
        assert!(dump.contains("    [15] = 0"));
        assert!(dump.contains("    [63] = 0"));
    }

    #[test]
    fn destroyed_stack_dumps_without_touching_memory() {
        let mut stack = filled_stack(3, 10);
        stack.destroy();
        let dump = stack.dump_with(3);
        assert!(dump.contains("status: inactive"));
        assert!(dump.contains("data = <detached>"));
        assert!(!dump.contains("[0] ="));
    }

    #[test]
    fn dump_to_sink_appends_every_line() {
        use std::sync::{Arc, Mutex};

        struct SharedSink(Arc<Mutex<Vec<String>>>);

        impl crate::sink::LogSink for SharedSink {
            fn append(&mut self, line: &str) -> std::io::Result<()> {
                self.0.lock().unwrap().push(line.to_owned());
                Ok(())
            }
        }

        let collected = Arc::new(Mutex::new(Vec::new()));
        let mut stack = GuardedStack::<i32>::with_config(
            4,
            provenance!("sinked"),
            StackConfig::debug(),
        )
        .unwrap();
        stack.push(5).unwrap();
        stack.set_sink(Box::new(SharedSink(Arc::clone(&collected))));

        stack.dump_to_sink();

        let lines = collected.lock().unwrap();
        assert_eq!(lines.len(), stack.dump().lines().count());
        assert!(lines.iter().any(|line| line.contains("*[0] = 5")));
        assert!(stack.reported_faults().is_clean());
    }

    #[test]
    fn failing_sink_degrades_but_never_blocks() {
        struct BrokenSink;

        impl crate::sink::LogSink for BrokenSink {
            fn append(&mut self, _line: &str) -> std::io::Result<()> {
                Err(std::io::Error::other("sink gone"))
            }
        }

        let mut stack = filled_stack(3, 10);
        stack.set_sink(Box::new(BrokenSink));
        stack.dump_to_sink();

        assert!(stack
            .reported_faults()
            .contains(crate::fault::FaultMask::LOG_SINK_UNAVAILABLE));
        // The container itself is untouched.
        assert_eq!(stack.len(), 3);
        assert!(stack.check().is_clean());
        assert_eq!(stack.pop().unwrap(), 2);
    }
}
