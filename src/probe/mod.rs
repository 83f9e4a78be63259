//! # Platform Probe
//!
//! One native probe implementation per supported OS, selected at compile
//! time, plus the process-wide singleton that runs whichever probe was
//! compiled in exactly once.
//!
//! Linux and macOS query each level field by field: line size and
//! associativity fall back to the [default table](crate::defaults) when the
//! OS does not report them, while the level's total size is authoritative:
//! if it cannot be queried, the level is reported absent. Windows instead
//! enumerates every cache descriptor on the system in a single call and
//! filters the result. A failed native query is never an error and is never
//! retried; each field gets one best-effort query at construction.
//!
//! With the `custom-probe` feature the native probes are not compiled at
//! all and the embedding application must register its own probe through
//! `install_probe` before the first call to [`cache_topology`].

use crate::ledger::{CacheLedger, CacheLevelSlot, CACHE_LEVELS};
use std::sync::OnceLock;

#[cfg(all(target_os = "linux", not(feature = "custom-probe")))]
mod linux;
#[cfg(all(target_os = "macos", not(feature = "custom-probe")))]
mod macos;
#[cfg(all(windows, not(feature = "custom-probe")))]
mod windows;

#[cfg(not(any(target_os = "linux", target_os = "macos", windows, feature = "custom-probe")))]
compile_error!(
    "cachetopo has no native cache probe for this target OS; \
     enable the `custom-probe` feature and register one with `install_probe`"
);

/// Capability contract for producing the three cache-level slots
///
/// Implementations perform their queries synchronously and must not fail:
/// anything a probe cannot determine is expressed as an absent slot.
pub trait CacheProbe {
    /// Probe the host once, returning one slot per cache level (L1, L2, L3)
    fn probe(&self) -> [CacheLevelSlot; CACHE_LEVELS];
}

/// The probe compiled in for the build target's OS
#[cfg(all(
    any(target_os = "linux", target_os = "macos", windows),
    not(feature = "custom-probe")
))]
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProbe;

#[cfg(all(target_os = "linux", not(feature = "custom-probe")))]
impl CacheProbe for NativeProbe {
    fn probe(&self) -> [CacheLevelSlot; CACHE_LEVELS] {
        linux::probe()
    }
}

#[cfg(all(target_os = "macos", not(feature = "custom-probe")))]
impl CacheProbe for NativeProbe {
    fn probe(&self) -> [CacheLevelSlot; CACHE_LEVELS] {
        macos::probe()
    }
}

#[cfg(all(windows, not(feature = "custom-probe")))]
impl CacheProbe for NativeProbe {
    fn probe(&self) -> [CacheLevelSlot; CACHE_LEVELS] {
        windows::probe()
    }
}

/// Whether L3 is probed on per-level-query platforms.
///
/// Non-x86 targets report L3 absent unless an explicit `CACHETOPO_L3`
/// override was supplied at build time; many ARM/embedded hosts have no
/// unified L3 or do not expose it uniformly.
#[cfg(all(any(target_os = "linux", target_os = "macos"), not(feature = "custom-probe")))]
pub(crate) const L3_PROBE_ENABLED: bool =
    cfg!(any(target_arch = "x86", target_arch = "x86_64")) || cfg!(cachetopo_l3_override);

/// Assemble one level slot from the three per-field query results.
///
/// Line size and associativity substitute the level default on failure;
/// a missing size makes the whole level absent. Sets are derived with
/// truncating division (vendor-documented configurations are exact
/// multiples in practice).
#[cfg(any(
    all(any(target_os = "linux", target_os = "macos"), not(feature = "custom-probe")),
    test
))]
pub(crate) fn level_from_queries(
    level: usize,
    line_size: Option<usize>,
    associativity: Option<usize>,
    size: Option<usize>,
    default: crate::ledger::CacheGeometry,
) -> CacheLevelSlot {
    let line_size = line_size.unwrap_or_else(|| {
        log::debug!(
            "L{} line size not reported, using default {}",
            level,
            default.line_size
        );
        default.line_size
    });
    let associativity = associativity.unwrap_or_else(|| {
        log::debug!(
            "L{} associativity not reported, using default {}",
            level,
            default.associativity
        );
        default.associativity
    });
    let Some(size) = size else {
        log::debug!("L{} size not reported, treating level as absent", level);
        return None;
    };
    Some(crate::ledger::CacheGeometry::new(
        line_size,
        associativity,
        size / (associativity * line_size),
    ))
}

#[cfg(feature = "custom-probe")]
static CUSTOM_PROBE: OnceLock<Box<dyn CacheProbe + Send + Sync>> = OnceLock::new();

/// Register the probe used to build the process-wide topology.
///
/// Only available with the `custom-probe` feature. Must be called before
/// the first [`cache_topology`] access and at most once; a second
/// registration fails with a configuration error.
#[cfg(feature = "custom-probe")]
pub fn install_probe<P>(probe: P) -> crate::error::Result<()>
where
    P: CacheProbe + Send + Sync + 'static,
{
    CUSTOM_PROBE
        .set(Box::new(probe))
        .map_err(|_| crate::error::CacheTopoError::configuration("cache probe already installed"))
}

static TOPOLOGY: OnceLock<CacheLedger> = OnceLock::new();

/// Shared, immutable view of the host's cache topology.
///
/// The probe runs at most once per process, on the first call; every call
/// returns a reference to the same ledger and later reads take no locks.
///
/// # Panics
///
/// With the `custom-probe` feature, panics if no probe was registered via
/// `install_probe` before the first access.
pub fn cache_topology() -> &'static CacheLedger {
    TOPOLOGY.get_or_init(build_ledger)
}

#[cfg(not(feature = "custom-probe"))]
fn build_ledger() -> CacheLedger {
    CacheLedger::from_probe(&NativeProbe)
}

#[cfg(feature = "custom-probe")]
fn build_ledger() -> CacheLedger {
    match CUSTOM_PROBE.get() {
        Some(probe) => CacheLedger::from_probe(probe.as_ref()),
        None => panic!("cache_topology() called before install_probe() registered a cache probe"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CacheGeometry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubProbe([CacheLevelSlot; CACHE_LEVELS]);

    impl CacheProbe for StubProbe {
        fn probe(&self) -> [CacheLevelSlot; CACHE_LEVELS] {
            self.0
        }
    }

    #[test]
    fn test_ledger_from_stub_probe() {
        let probe = StubProbe([Some(CacheGeometry::new(64, 4, 256)), None, None]);
        let ledger = CacheLedger::from_probe(&probe);
        assert!(ledger.is_valid(0));
        assert_eq!(ledger.size(0), Some(65536));
        assert!(!ledger.is_valid(1));
        assert!(!ledger.is_valid(2));
    }

    #[test]
    fn test_level_from_queries_size_is_authoritative() {
        let default = CacheGeometry::new(64, 8, 64);
        // Line size and associativity succeeded, size failed: level absent.
        assert_eq!(
            level_from_queries(1, Some(64), Some(8), None, default),
            None
        );
    }

    #[test]
    fn test_level_from_queries_defaults_substituted() {
        let default = CacheGeometry::new(64, 8, 64);
        let slot = level_from_queries(1, None, None, Some(32 * 1024), default);
        assert_eq!(slot, Some(CacheGeometry::new(64, 8, 64)));

        // Native values win over defaults when present.
        let slot = level_from_queries(1, Some(128), Some(4), Some(64 * 1024), default);
        assert_eq!(slot, Some(CacheGeometry::new(128, 4, 128)));
    }

    #[test]
    fn test_level_from_queries_truncates_sets() {
        let default = CacheGeometry::new(64, 8, 64);
        // 100_000 / (8 * 64) = 195 with truncation.
        let slot = level_from_queries(2, None, None, Some(100_000), default);
        assert_eq!(slot.map(|g| g.sets), Some(195));
    }

    #[test]
    fn test_level_from_queries_undersized_report_truncates_to_zero_sets() {
        let default = CacheGeometry::new(64, 8, 64);
        // A reported size smaller than one line per way truncates to zero
        // sets; the level is still present because the size query succeeded.
        let slot = level_from_queries(1, None, None, Some(256), default);
        assert_eq!(slot.map(|g| g.sets), Some(0));
        assert_eq!(slot.map(|g| g.total_size()), Some(0));
    }

    #[test]
    fn test_singleton_probes_exactly_once() {
        // Mirror of the global holder with a counted probe: the OnceLock
        // discipline must resolve the construction race to one invocation.
        struct CountingProbe(Arc<AtomicUsize>);

        impl CacheProbe for CountingProbe {
            fn probe(&self) -> [CacheLevelSlot; CACHE_LEVELS] {
                self.0.fetch_add(1, Ordering::SeqCst);
                [Some(CacheGeometry::new(64, 4, 256)), None, None]
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let probe = CountingProbe(Arc::clone(&calls));
        let holder: OnceLock<CacheLedger> = OnceLock::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let ledger = holder.get_or_init(|| CacheLedger::from_probe(&probe));
                    assert_eq!(ledger.len(), CACHE_LEVELS);
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(not(feature = "custom-probe"))]
    #[test]
    fn test_global_topology_is_stable() {
        let first = cache_topology();
        let second = cache_topology();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), CACHE_LEVELS);
    }

    #[cfg(all(
        not(feature = "custom-probe"),
        not(any(target_arch = "x86", target_arch = "x86_64")),
        not(cachetopo_l3_override),
        any(target_os = "linux", target_os = "macos")
    ))]
    #[test]
    fn test_l3_absent_without_override_on_non_x86() {
        assert!(!cache_topology().is_valid(2));
    }
}
