//! Element kinds storable in a guarded stack
//!
//! The stack holds exactly one element kind per instantiation. Every kind is
//! plain old data: fixed size, no padding, alignment of at most eight bytes,
//! valid for any initialized bit pattern. That is what allows the integrity
//! layer to checksum the element region as raw bytes and to lay slots out
//! directly between the two boundary sentinels.
//!
//! The trait is sealed: implementations live here, next to the layout code
//! that relies on their byte-level properties.

use core::fmt;

mod sealed {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
    impl Sealed for f64 {}
    impl Sealed for char {}
}

/// Formatting tag for an element kind
///
/// Diagnostic dumps pick a rendering per tag rather than relying on a
/// particular `Display` impl being available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Signed integers (`i32`, `i64`)
    Integer,
    /// Unsigned integers (`u64`)
    Unsigned,
    /// Floating point (`f64`)
    Float,
    /// Single characters (`char`)
    Character,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Unsigned => "unsigned",
            Self::Float => "float",
            Self::Character => "character",
        };
        f.write_str(name)
    }
}

/// A value kind the guarded stack can hold
///
/// `POISON` is the reserved slot value written into vacated slots after a
/// pop, so stale reads of popped data are detectable in dumps. It never
/// stands in for a missing result; failed operations report errors instead.
pub trait Element: sealed::Sealed + Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Formatting tag used by diagnostic dumps
    const KIND: ElementKind;

    /// Reserved value for vacated slots
    const POISON: Self;

    /// Renders one element as text for dumps and logs
    fn render(self) -> String;
}

impl Element for i32 {
    const KIND: ElementKind = ElementKind::Integer;
    const POISON: Self = i32::MAX;

    fn render(self) -> String {
        self.to_string()
    }
}

impl Element for i64 {
    const KIND: ElementKind = ElementKind::Integer;
    const POISON: Self = i64::MAX;

    fn render(self) -> String {
        self.to_string()
    }
}

impl Element for u64 {
    const KIND: ElementKind = ElementKind::Unsigned;
    const POISON: Self = u64::MAX;

    fn render(self) -> String {
        self.to_string()
    }
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float;
    const POISON: Self = f64::NAN;

    fn render(self) -> String {
        format!("{self}")
    }
}

impl Element for char {
    const KIND: ElementKind = ElementKind::Character;
    const POISON: Self = '\u{FFFD}';

    fn render(self) -> String {
        self.to_string()
    }
}
