//! Map algebra
//!
//! Set-like operations over values, all closed over the value domain:
//! - [`merge`]: join, overlay, inherit and their single-item forms
//! - [`filter`]: retain and remove
//! - [`lookup`]: value-for, has-item, map-values, erase and rename
//! - [`edit`]: the scoped item-edit guard
//!
//! Every operation treats an `Error` operand as absorbing: an error on the
//! left stays, otherwise an error on the right replaces the result.
//! `Undefined` is the identity. How `Wild` behaves is per operation.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Join, overlay and inherit
pub mod merge;

/// Retain and remove
pub mod filter;

/// Lookups and item removal
pub mod lookup;

/// Scoped item edits
pub mod edit;

pub use edit::ItemEdit;

/// Options for the algebra operations
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MergeFlags(u8);

impl MergeFlags {
    /// Default behavior
    pub const NONE: MergeFlags = MergeFlags(0);
    /// Treat nested values atomically instead of recursing into them
    pub const NO_RECURSION: MergeFlags = MergeFlags(1);
    /// Use map keys as-is instead of expanding them into nested paths
    pub const NO_FLATTEN: MergeFlags = MergeFlags(2);

    /// True if every flag in `other` is set
    #[inline]
    pub const fn contains(self, other: MergeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Nested values may be merged recursively
    #[inline]
    pub const fn recursion(self) -> bool {
        !self.contains(MergeFlags::NO_RECURSION)
    }

    /// Map keys expand into paths
    #[inline]
    pub const fn flatten(self) -> bool {
        !self.contains(MergeFlags::NO_FLATTEN)
    }
}

impl BitOr for MergeFlags {
    type Output = MergeFlags;

    fn bitor(self, rhs: MergeFlags) -> MergeFlags {
        MergeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for MergeFlags {
    fn bitor_assign(&mut self, rhs: MergeFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MergeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(MergeFlags::NO_RECURSION) {
            names.push("NO_RECURSION");
        }
        if self.contains(MergeFlags::NO_FLATTEN) {
            names.push("NO_FLATTEN");
        }
        if names.is_empty() {
            names.push("NONE");
        }
        write!(f, "MergeFlags({})", names.join(" | "))
    }
}
