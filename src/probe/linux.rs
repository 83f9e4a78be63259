//! Linux cache probe backed by `sysconf(3)`.
//!
//! glibc exposes per-level cache attributes as `_SC_LEVEL*` variables. A
//! non-positive return means "not reported", which is glibc's convention
//! for unknown cache attributes.

use super::{level_from_queries, L3_PROBE_ENABLED};
use crate::defaults;
use crate::ledger::{CacheLevelSlot, CACHE_LEVELS};

pub(super) fn probe() -> [CacheLevelSlot; CACHE_LEVELS] {
    [level_one(), level_two(), level_three()]
}

fn sysconf(name: libc::c_int) -> Option<usize> {
    let out = unsafe { libc::sysconf(name) };
    if out > 0 {
        Some(out as usize)
    } else {
        None
    }
}

fn level_one() -> CacheLevelSlot {
    level_from_queries(
        1,
        sysconf(libc::_SC_LEVEL1_DCACHE_LINESIZE),
        sysconf(libc::_SC_LEVEL1_DCACHE_ASSOC),
        sysconf(libc::_SC_LEVEL1_DCACHE_SIZE),
        defaults::l1(),
    )
}

fn level_two() -> CacheLevelSlot {
    level_from_queries(
        2,
        sysconf(libc::_SC_LEVEL2_CACHE_LINESIZE),
        sysconf(libc::_SC_LEVEL2_CACHE_ASSOC),
        sysconf(libc::_SC_LEVEL2_CACHE_SIZE),
        defaults::l2(),
    )
}

fn level_three() -> CacheLevelSlot {
    if !L3_PROBE_ENABLED {
        return None;
    }
    level_from_queries(
        3,
        sysconf(libc::_SC_LEVEL3_CACHE_LINESIZE),
        sysconf(libc::_SC_LEVEL3_CACHE_ASSOC),
        sysconf(libc::_SC_LEVEL3_CACHE_SIZE),
        defaults::l3(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_shape() {
        let slots = probe();
        assert_eq!(slots.len(), CACHE_LEVELS);
        for geometry in slots.iter().flatten() {
            assert!(geometry.line_size > 0);
            assert!(geometry.associativity > 0);
        }
    }

    #[test]
    fn test_sysconf_rejects_unreported() {
        // _SC_LEVEL1_DCACHE_ASSOC returns 0 on hosts that do not report it;
        // the helper must map that to None, not Some(0).
        if let Some(assoc) = sysconf(libc::_SC_LEVEL1_DCACHE_ASSOC) {
            assert!(assoc > 0);
        }
    }
}
