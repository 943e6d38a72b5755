//! Creation-site metadata
//!
//! Every stack records where and under what name it was created, so a
//! corruption report can point back at the owning code instead of at a bare
//! address. The caller constructs the `Provenance` value explicitly; the
//! [`provenance!`](crate::provenance) macro captures the call site for the
//! common case.

/// Poison marker for the line field; a live instance never carries it
pub(crate) const POISON_LINE: u32 = u32::MAX;

/// Lifecycle state of a stack instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed and legal to use
    Active,
    /// Not yet constructed, or destroyed
    Inactive,
}

/// Where and under what name a stack instance was created
#[derive(Debug, Clone)]
pub struct Provenance {
    name: String,
    function: &'static str,
    file: &'static str,
    line: u32,
    status: Lifecycle,
}

impl Provenance {
    /// Records a creation site. `function` and `file` usually come from
    /// `module_path!()` and `file!()`.
    pub fn new(
        name: impl Into<String>,
        function: &'static str,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            function,
            file,
            line,
            status: Lifecycle::Inactive,
        }
    }

    /// Human-readable instance name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Originating function or module path
    pub fn function(&self) -> &'static str {
        self.function
    }

    /// Originating source file
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Originating line number
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current lifecycle state
    pub fn status(&self) -> Lifecycle {
        self.status
    }

    pub(crate) fn activate(&mut self) {
        self.status = Lifecycle::Active;
    }

    pub(crate) fn deactivate(&mut self) {
        self.status = Lifecycle::Inactive;
    }

    /// Metadata validity check; only meaningful while the instance is
    /// supposed to be Active.
    pub(crate) fn is_damaged(&self) -> bool {
        self.name.is_empty()
            || self.function.is_empty()
            || self.file.is_empty()
            || self.line == 0
            || self.line == POISON_LINE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_provenance_is_inactive_and_sound() {
        let prov = Provenance::new("numbers", module_path!(), file!(), line!());
        assert_eq!(prov.status(), Lifecycle::Inactive);
        assert!(!prov.is_damaged());
        assert_eq!(prov.name(), "numbers");
    }

    #[test]
    fn empty_or_poisoned_fields_count_as_damage() {
        let nameless = Provenance::new("", module_path!(), file!(), line!());
        assert!(nameless.is_damaged());

        let poisoned = Provenance::new("s", module_path!(), file!(), POISON_LINE);
        assert!(poisoned.is_damaged());

        let zero_line = Provenance::new("s", module_path!(), file!(), 0);
        assert!(zero_line.is_damaged());
    }
}
