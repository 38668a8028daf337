/// Lower/upper bounds on the tricks still available to the declaring side
/// from a cached position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub lower: u8,
    pub upper: u8,
}

impl Bounds {
    pub fn new(lower: u8, upper: u8) -> Self {
        Bounds { lower, upper }
    }
}

#[derive(Clone, Copy, Default)]
struct Entry {
    hash: u64,
    generation: u32,
    lower: u8,
    upper: u8,
}

/// Preallocated power-of-two bounds cache.
///
/// Entries are stamped with a generation counter; `begin_board` bumps it,
/// which logically clears the whole table in O(1). Collisions overwrite
/// (always-replace), so a probe returns either the bounds stored for this
/// exact hash in the current generation or the trivial bounds.
pub struct TransTable {
    entries: Vec<Entry>,
    mask: usize,
    generation: u32,
}

impl TransTable {
    /// Entry footprint used for budget sizing
    const ENTRY_BYTES: usize = std::mem::size_of::<Entry>();

    const MIN_BITS: u32 = 10;
    const MAX_BITS: u32 = 24;

    pub fn new(bits: u32) -> Self {
        let bits = bits.clamp(Self::MIN_BITS, Self::MAX_BITS);
        let size = 1usize << bits;
        TransTable {
            entries: vec![Entry::default(); size],
            mask: size - 1,
            generation: 0,
        }
    }

    /// Size the table to fit a memory budget in MB
    pub fn with_budget_mb(mb: usize) -> Self {
        let budget_entries = (mb * 1024 * 1024 / Self::ENTRY_BYTES).max(1);
        let bits = usize::BITS - 1 - budget_entries.leading_zeros();
        TransTable::new(bits)
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Invalidate every cached entry without touching memory
    pub fn begin_board(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Cached bounds for `hash`, or the trivial `[0, max_tricks]`
    pub fn probe(&self, hash: u64, max_tricks: u8) -> Bounds {
        let entry = &self.entries[(hash as usize) & self.mask];
        if entry.hash == hash && entry.generation == self.generation {
            Bounds::new(entry.lower, entry.upper)
        } else {
            Bounds::new(0, max_tricks)
        }
    }

    pub fn store(&mut self, hash: u64, bounds: Bounds) {
        let entry = &mut self.entries[(hash as usize) & self.mask];
        *entry = Entry {
            hash,
            generation: self.generation,
            lower: bounds.lower,
            upper: bounds.upper,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_miss_is_trivial() {
        let tt = TransTable::new(10);
        assert_eq!(tt.probe(12345, 13), Bounds::new(0, 13));
    }

    #[test]
    fn test_store_then_probe() {
        let mut tt = TransTable::new(10);
        tt.store(12345, Bounds::new(3, 7));
        assert_eq!(tt.probe(12345, 13), Bounds::new(3, 7));
    }

    #[test]
    fn test_begin_board_invalidates() {
        let mut tt = TransTable::new(10);
        tt.store(12345, Bounds::new(3, 7));
        tt.begin_board();
        assert_eq!(tt.probe(12345, 13), Bounds::new(0, 13));
    }

    #[test]
    fn test_colliding_hash_misses() {
        let mut tt = TransTable::new(10);
        let other = 12345 + (1 << 10); // same slot, different hash
        tt.store(12345, Bounds::new(3, 7));
        assert_eq!(tt.probe(other, 13), Bounds::new(0, 13));
    }

    #[test]
    fn test_budget_sizing() {
        let tt = TransTable::with_budget_mb(16);
        assert_eq!(tt.capacity() * TransTable::ENTRY_BYTES, 16 * 1024 * 1024);
    }
}
