//! macOS cache probe backed by `sysctlbyname(3)`.
//!
//! Darwin reports cache attributes under mixed value widths: `hw.*` keys
//! are 64-bit, `machdep.cpu.cache.*` keys are 32-bit. The helper reads into
//! an 8-byte buffer and dispatches on the length the kernel wrote back.
//! Apple-silicon hosts under-report associativity, which is why the default
//! table carries ARM-tuned values.

use super::{level_from_queries, L3_PROBE_ENABLED};
use crate::defaults;
use crate::ledger::{CacheLevelSlot, CACHE_LEVELS};
use std::ffi::CString;

pub(super) fn probe() -> [CacheLevelSlot; CACHE_LEVELS] {
    [level_one(), level_two(), level_three()]
}

fn sysctl_by_name(name: &str) -> Option<usize> {
    let cname = CString::new(name).ok()?;
    let mut buf = [0u8; 8];
    let mut len: libc::size_t = buf.len();

    let rc = unsafe {
        libc::sysctlbyname(
            cname.as_ptr(),
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc < 0 {
        return None;
    }

    let value = match len {
        4 => i64::from(i32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]])),
        8 => i64::from_ne_bytes(buf),
        _ => return None,
    };
    if value > 0 {
        Some(value as usize)
    } else {
        None
    }
}

fn level_one() -> CacheLevelSlot {
    level_from_queries(
        1,
        sysctl_by_name("hw.cachelinesize"),
        sysctl_by_name("machdep.cpu.cache.L1_associativity"),
        sysctl_by_name("hw.l1dcachesize"),
        defaults::l1(),
    )
}

fn level_two() -> CacheLevelSlot {
    level_from_queries(
        2,
        sysctl_by_name("hw.cachelinesize"),
        sysctl_by_name("machdep.cpu.cache.L2_associativity"),
        sysctl_by_name("hw.l2cachesize"),
        defaults::l2(),
    )
}

fn level_three() -> CacheLevelSlot {
    if !L3_PROBE_ENABLED {
        return None;
    }
    level_from_queries(
        3,
        sysctl_by_name("hw.cachelinesize"),
        sysctl_by_name("machdep.cpu.cache.L3_associativity"),
        sysctl_by_name("hw.l3cachesize"),
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
    fn test_l1_size_is_reported_on_darwin() {
        // hw.l1dcachesize exists on every shipping Darwin kernel; if it is
        // somehow missing, L1 must be absent rather than partially filled.
        match sysctl_by_name("hw.l1dcachesize") {
            Some(size) => assert!(size > 0),
            None => assert!(level_one().is_none()),
        }
    }

    #[test]
    fn test_unknown_key_fails_cleanly() {
        assert_eq!(sysctl_by_name("hw.cachetopo.does_not_exist"), None);
    }
}
