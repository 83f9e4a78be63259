//! Windows cache probe backed by `GetLogicalProcessorInformation`.
//!
//! Unlike the per-level query platforms, Windows hands back every cache
//! descriptor on the system in one enumeration, each tagged with a level
//! and a type. The probe keeps level-1 data caches and level-2/3 caches of
//! any type; instruction-only L1 caches, trace caches and levels beyond 3
//! are discarded without diagnostics. Geometry comes entirely from the
//! descriptor, so the default table is not consulted on this path.

use crate::ledger::{CacheGeometry, CacheLevelSlot, CACHE_LEVELS};
use std::mem;
use std::ptr;
use winapi::um::sysinfoapi::GetLogicalProcessorInformation;
use winapi::um::winnt::{CacheData, RelationCache, SYSTEM_LOGICAL_PROCESSOR_INFORMATION};

pub(super) fn probe() -> [CacheLevelSlot; CACHE_LEVELS] {
    let mut slots = [None; CACHE_LEVELS];

    let mut needed = 0u32;
    unsafe {
        GetLogicalProcessorInformation(ptr::null_mut(), &mut needed);
    }
    if needed == 0 {
        log::debug!("processor information buffer size query failed, reporting all levels absent");
        return slots;
    }

    let count = needed as usize / mem::size_of::<SYSTEM_LOGICAL_PROCESSOR_INFORMATION>();
    let mut buffer: Vec<SYSTEM_LOGICAL_PROCESSOR_INFORMATION> =
        vec![unsafe { mem::zeroed() }; count];
    let ok = unsafe { GetLogicalProcessorInformation(buffer.as_mut_ptr(), &mut needed) };
    if ok == 0 {
        log::debug!("cache descriptor enumeration failed, reporting all levels absent");
        return slots;
    }

    for info in &buffer {
        if info.Relationship != RelationCache {
            continue;
        }
        let cache = unsafe { info.u.Cache() };

        let level = cache.Level as usize;
        if !(1..=CACHE_LEVELS).contains(&level) {
            continue;
        }
        // L1 must be a data cache; L2/L3 descriptors of any type count.
        if level == 1 && cache.Type != CacheData {
            continue;
        }

        let line_size = cache.LineSize as usize;
        let associativity = cache.Associativity as usize;
        if line_size == 0 || associativity == 0 {
            continue;
        }
        let sets = cache.Size as usize / (associativity * line_size);
        slots[level - 1] = Some(CacheGeometry::new(line_size, associativity, sets));
    }

    slots
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
            assert_eq!(
                geometry.total_size(),
                geometry.sets * geometry.line_size * geometry.associativity
            );
        }
    }
}
