//! # Default Geometry Table
//!
//! Architecture-conditioned fallback triples used when the OS does not
//! report a level's line size or associativity. x86-family targets get
//! x86-tuned values; everything else gets conservative 128-byte-line
//! defaults chosen to match ARM/Apple-silicon parts, whose hosts tend to
//! under-report. L3 has a single default with no architecture branch.
//!
//! Each table can be overridden at build time through the `CACHETOPO_L1`,
//! `CACHETOPO_L2` and `CACHETOPO_L3` environment variables
//! (`"line_size,associativity,sets"`). `build.rs` validates overrides to be
//! exactly three positive integers and fails the build otherwise, then
//! re-emits them in canonical form for this module to pick up.

use crate::ledger::CacheGeometry;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const L1: CacheGeometry = CacheGeometry::new(64, 8, 64);
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
const L1: CacheGeometry = CacheGeometry::new(128, 4, 128);

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const L2: CacheGeometry = CacheGeometry::new(64, 4, 1024);
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
const L2: CacheGeometry = CacheGeometry::new(128, 16, 2048);

const L3: CacheGeometry = CacheGeometry::new(64, 16, 16384);

/// Default L1 data-cache geometry for the build target
pub fn l1() -> CacheGeometry {
    override_or(option_env!("CACHETOPO_DEFAULT_L1"), L1)
}

/// Default L2 cache geometry for the build target
pub fn l2() -> CacheGeometry {
    override_or(option_env!("CACHETOPO_DEFAULT_L2"), L2)
}

/// Default L3 cache geometry (no architecture branch)
pub fn l3() -> CacheGeometry {
    override_or(option_env!("CACHETOPO_DEFAULT_L3"), L3)
}

/// Apply a build-script-emitted override, falling back to the arch default.
///
/// The build script already rejected malformed overrides, so the parse here
/// cannot fail for real builds; the fallback keeps this total regardless.
fn override_or(raw: Option<&str>, fallback: CacheGeometry) -> CacheGeometry {
    raw.and_then(parse_triple).unwrap_or(fallback)
}

fn parse_triple(raw: &str) -> Option<CacheGeometry> {
    let mut fields = raw.split(',').map(|f| f.trim().parse::<usize>());
    let line_size = fields.next()?.ok()?;
    let associativity = fields.next()?.ok()?;
    let sets = fields.next()?.ok()?;
    if fields.next().is_some() || line_size == 0 || associativity == 0 || sets == 0 {
        return None;
    }
    Some(CacheGeometry::new(line_size, associativity, sets))
}
