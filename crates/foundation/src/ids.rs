use std::cell::Cell;

/// Identifies one viewport inside a document host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewportId(pub u64);

impl std::fmt::Display for ViewportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "viewport-{}", self.0)
    }
}

/// Monotonic id source for a single-threaded owner.
///
/// Ids start at 1 so that 0 can be used as a sentinel by callers.
#[derive(Debug)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: Cell::new(1) }
    }

    pub fn next_raw(&self) -> u64 {
        let id = self.next.get();
        self.next.set(id.wrapping_add(1));
        id
    }

    pub fn next_viewport(&self) -> ViewportId {
        ViewportId(self.next_raw())
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{IdAllocator, ViewportId};

    #[test]
    fn ids_are_monotonic_and_start_at_one() {
        let ids = IdAllocator::new();
        assert_eq!(ids.next_raw(), 1);
        assert_eq!(ids.next_raw(), 2);
        assert_eq!(ids.next_viewport(), ViewportId(3));
    }

    #[test]
    fn viewport_id_display_is_dom_friendly() {
        assert_eq!(ViewportId(7).to_string(), "viewport-7");
    }
}
