use core::fmt;
use core::num::NonZeroU32;

/// Handle to a property slot, resolved once when a component is built.
///
/// Stored as `index + 1` so `Option<PropertyId>` stays four bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(NonZeroU32);

impl PropertyId {
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Slot index in the store.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.index())
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}
