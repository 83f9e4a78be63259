//! Build-Time Override Validation for Cache Geometry Defaults
//!
//! Validates the optional `CACHETOPO_L1` / `CACHETOPO_L2` / `CACHETOPO_L3`
//! environment overrides ("line_size,associativity,sets") and re-emits them
//! for the crate to consume. A malformed override aborts the build before
//! any topology code is compiled.

use std::env;

const OVERRIDE_VARS: [(&str, &str); 3] = [
    ("CACHETOPO_L1", "CACHETOPO_DEFAULT_L1"),
    ("CACHETOPO_L2", "CACHETOPO_DEFAULT_L2"),
    ("CACHETOPO_L3", "CACHETOPO_DEFAULT_L3"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo::rustc-check-cfg=cfg(cachetopo_l3_override)");

    for (var, out_var) in OVERRIDE_VARS {
        println!("cargo:rerun-if-env-changed={}", var);

        let Ok(raw) = env::var(var) else { continue };

        match validate_override(&raw) {
            Ok(triple) => {
                // Re-emit in canonical form so the crate never re-validates.
                println!(
                    "cargo:rustc-env={}={},{},{}",
                    out_var, triple[0], triple[1], triple[2]
                );
                if var == "CACHETOPO_L3" {
                    // An explicit L3 override enables L3 probing on non-x86
                    // targets (see src/probe).
                    println!("cargo:rustc-cfg=cachetopo_l3_override");
                }
            }
            Err(msg) => panic!("invalid {} override {:?}: {}", var, raw, msg),
        }
    }
}

/// Parse an override string into exactly 3 positive integers.
fn validate_override(raw: &str) -> Result<[u64; 3], String> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!(
            "expected 3 comma-separated fields (line_size,associativity,sets), got {}",
            fields.len()
        ));
    }

    let mut triple = [0u64; 3];
    for (i, field) in fields.iter().enumerate() {
        let value: u64 = field
            .parse()
            .map_err(|_| format!("field {} ({:?}) is not an integer", i + 1, field))?;
        if value == 0 {
            return Err(format!("field {} must be positive", i + 1));
        }
        triple[i] = value;
    }
    Ok(triple)
}
