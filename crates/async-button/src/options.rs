use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Options configuring how the control behaves while its action runs.
///
/// The default enables every option.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ActionOptions {
    bits: u8,
}

impl ActionOptions {
    /// Disable the control while its action is running.
    pub const DISABLE_BUTTON: Self = Self { bits: 1 << 0 };
    /// Replace the label with the placeholder view while the action runs
    /// longer than the debounce window.
    pub const SHOW_PLACEHOLDER: Self = Self { bits: 1 << 1 };

    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn all() -> Self {
        Self {
            bits: Self::DISABLE_BUTTON.bits | Self::SHOW_PLACEHOLDER.bits,
        }
    }

    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl BitOr for ActionOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ActionOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for ActionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        if self.contains(Self::DISABLE_BUTTON) {
            set.entry(&"DISABLE_BUTTON");
        }
        if self.contains(Self::SHOW_PLACEHOLDER) {
            set.entry(&"SHOW_PLACEHOLDER");
        }
        set.finish()
    }
}
