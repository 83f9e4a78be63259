//! # Cache Geometry Ledger
//!
//! The immutable 3-slot record of the host's data-cache hierarchy. Slot 0
//! is the L1 data cache, slot 1 is L2, slot 2 is L3. A `None` slot means
//! the level does not exist on this host or could not be determined; it is
//! never a stand-in for a zero-sized cache.
//!
//! The ledger is constructed once from a probe's output and never mutated,
//! so sharing it across threads needs no locking.

use crate::error::{check_bounds, Result};
use crate::probe::CacheProbe;
use std::ops::Index;

/// Number of cache levels tracked by the ledger (L1, L2, L3)
pub const CACHE_LEVELS: usize = 3;

/// Geometry of a single cache level
///
/// The probes guarantee a positive line size and associativity; `sets` is
/// derived by truncating division and can be zero if the host reports a
/// level size smaller than one line per way. The total byte size is
/// derived, never stored, so it is always consistent with the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Bytes per cache line
    pub line_size: usize,
    /// Ways per set
    pub associativity: usize,
    /// Number of sets
    pub sets: usize,
}

impl CacheGeometry {
    /// Create a new geometry from its three fields
    pub const fn new(line_size: usize, associativity: usize, sets: usize) -> Self {
        Self {
            line_size,
            associativity,
            sets,
        }
    }

    /// Total cache size in bytes, `sets * line_size * associativity`
    pub const fn total_size(&self) -> usize {
        self.sets * self.line_size * self.associativity
    }
}

/// One ledger slot: a known geometry, or absence
///
/// Absence means "this level is not exposed by the host", which is distinct
/// from any zero-sized value.
pub type CacheLevelSlot = Option<CacheGeometry>;

/// Immutable record of up to three cache levels, indexed 0=L1, 1=L2, 2=L3
///
/// Always holds exactly [`CACHE_LEVELS`] slots, even on hosts that report
/// fewer levels. All accessors taking a level index are total: an absent
/// level or an out-of-range index yields `None`/`false`; only [`at`] (and
/// the slice-style `Index` impl) distinguishes out-of-range as an error.
///
/// [`at`]: CacheLedger::at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLedger {
    levels: [CacheLevelSlot; CACHE_LEVELS],
}

impl CacheLedger {
    /// Build a ledger directly from three slots
    pub const fn from_slots(levels: [CacheLevelSlot; CACHE_LEVELS]) -> Self {
        Self { levels }
    }

    /// Build a ledger by running a probe once
    pub fn from_probe<P: CacheProbe + ?Sized>(probe: &P) -> Self {
        Self::from_slots(probe.probe())
    }

    /// Bounds-checked slot access
    ///
    /// Out-of-range indices return [`CacheTopoError::OutOfBounds`], which is
    /// distinct from an in-range slot that happens to be absent.
    ///
    /// [`CacheTopoError::OutOfBounds`]: crate::error::CacheTopoError::OutOfBounds
    pub fn at(&self, level: usize) -> Result<&CacheLevelSlot> {
        check_bounds(level, CACHE_LEVELS)?;
        Ok(&self.levels[level])
    }

    /// L1 data-cache slot (index 0)
    pub const fn l1(&self) -> CacheLevelSlot {
        self.levels[0]
    }

    /// L2 cache slot (index 1)
    pub const fn l2(&self) -> CacheLevelSlot {
        self.levels[1]
    }

    /// L3 cache slot (index 2)
    pub const fn l3(&self) -> CacheLevelSlot {
        self.levels[2]
    }

    /// True iff the slot at `level` holds a geometry
    pub fn is_valid(&self, level: usize) -> bool {
        self.slot(level).is_some()
    }

    /// Line size in bytes for `level`, if the level is known
    pub fn line_size(&self, level: usize) -> Option<usize> {
        self.slot(level).map(|g| g.line_size)
    }

    /// Associativity (ways per set) for `level`, if the level is known
    pub fn associativity(&self, level: usize) -> Option<usize> {
        self.slot(level).map(|g| g.associativity)
    }

    /// Number of sets for `level`, if the level is known
    pub fn sets(&self, level: usize) -> Option<usize> {
        self.slot(level).map(|g| g.sets)
    }

    /// Total size in bytes for `level`, if the level is known
    ///
    /// Derived as `sets * line_size * associativity`.
    pub fn size(&self, level: usize) -> Option<usize> {
        self.slot(level).map(|g| g.total_size())
    }

    /// Number of slots, always [`CACHE_LEVELS`]
    pub const fn len(&self) -> usize {
        CACHE_LEVELS
    }

    /// Always false; the ledger has a fixed slot count
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the slots in level order, L1 first
    pub fn iter(&self) -> std::slice::Iter<'_, CacheLevelSlot> {
        self.levels.iter()
    }

    fn slot(&self, level: usize) -> Option<&CacheGeometry> {
        self.levels.get(level).and_then(|slot| slot.as_ref())
    }
}

impl Index<usize> for CacheLedger {
    type Output = CacheLevelSlot;

    fn index(&self, level: usize) -> &Self::Output {
        &self.levels[level]
    }
}

impl<'a> IntoIterator for &'a CacheLedger {
    type Item = &'a CacheLevelSlot;
    type IntoIter = std::slice::Iter<'a, CacheLevelSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
