//! # cachetopo: Host CPU Data-Cache Topology Discovery
//!
//! This crate discovers the host CPU's data-cache hierarchy (L1-L3: line
//! size, associativity, set count) once per process and exposes it as an
//! immutable, read-only ledger for cache-aware numeric code such as
//! blocking/tiling decisions.
//!
//! ## Key Properties
//!
//! - **One probe per process**: the potentially syscall-heavy platform
//!   query runs at most once, lazily on first access, behind a one-time
//!   initialization gate. All later reads are lock-free.
//! - **Total query API**: detection never fails. A level the OS cannot size
//!   is reported absent, which is distinct from a zero-sized cache; partial
//!   per-field failures degrade to architecture-tuned defaults.
//! - **Fixed 3-slot model**: the ledger always holds exactly three slots
//!   (index 0=L1 data, 1=L2, 2=L3), on every platform and probe outcome.
//! - **Per-OS probes without dynamic dispatch**: Linux (`sysconf`), macOS
//!   (`sysctlbyname`) and Windows (`GetLogicalProcessorInformation`)
//!   backends are selected at compile time. Other targets build only with
//!   the `custom-probe` feature and a probe registered by the embedder.
//!
//! ## Quick Start
//!
//! ```rust
//! use cachetopo::cache_topology;
//!
//! let topo = cache_topology();
//!
//! // Tile to the L1 data cache when it is known, else fall back.
//! let tile_bytes = topo.size(0).unwrap_or(32 * 1024);
//! assert!(tile_bytes > 0);
//!
//! for (level, slot) in topo.iter().enumerate() {
//!     match slot {
//!         Some(g) => println!(
//!             "L{}: {} bytes/line, {}-way, {} sets",
//!             level + 1,
//!             g.line_size,
//!             g.associativity,
//!             g.sets
//!         ),
//!         None => println!("L{}: not reported", level + 1),
//!     }
//! }
//! ```
//!
//! ## Build-Time Overrides
//!
//! The fallback geometry tables can be replaced per level by setting
//! `CACHETOPO_L1`, `CACHETOPO_L2` or `CACHETOPO_L3` to
//! `"line_size,associativity,sets"` when building. Overrides are validated
//! by the build script; anything other than three positive integers fails
//! the build. Supplying `CACHETOPO_L3` also enables L3 probing on non-x86
//! targets, which otherwise report L3 absent.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod defaults;
pub mod error;
pub mod ledger;
pub mod probe;

// Re-export core types
pub use error::{CacheTopoError, Result};
pub use ledger::{CacheGeometry, CacheLedger, CacheLevelSlot, CACHE_LEVELS};
pub use probe::{cache_topology, CacheProbe};

#[cfg(all(
    any(target_os = "linux", target_os = "macos", windows),
    not(feature = "custom-probe")
))]
pub use probe::NativeProbe;

#[cfg(feature = "custom-probe")]
pub use probe::install_probe;
