use std::cell::Cell;

/// Monotonic tag for a dispatched load.
///
/// A response is applied only if its generation is still the latest one
/// dispatched; anything older was superseded while in flight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: Cell<u64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Generation {
        let g = self.latest.get() + 1;
        self.latest.set(g);
        Generation(g)
    }

    pub fn latest(&self) -> Generation {
        Generation(self.latest.get())
    }

    pub fn is_current(&self, g: Generation) -> bool {
        self.latest.get() == g.0
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationCounter;

    #[test]
    fn only_latest_generation_is_current() {
        let c = GenerationCounter::new();
        let a = c.next();
        let b = c.next();
        assert!(a < b);
        assert!(!c.is_current(a));
        assert!(c.is_current(b));
        assert_eq!(c.latest(), b);
    }
}
