//! Native window handles.

use std::fmt;

/// An opaque handle naming a native window.
///
/// The value is whatever the windowing backend uses to identify a window.
/// `0` is reserved as the null handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// The null window handle.
    pub const NULL: Self = Self(0);

    /// Wrap a raw backend handle.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw backend handle.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check whether this is the null handle.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowHandle({:#x})", self.0)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
