//! Build script for saivpp-xlate.
//!
//! With the `vpp-link` feature enabled, links against the native translation
//! library that implements the dataplane calls. `VPPXLATE_LIB_DIR` adds a
//! library search path for non-standard install locations.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=VPPXLATE_LIB_DIR");

    if env::var_os("CARGO_FEATURE_VPP_LINK").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("VPPXLATE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
    println!("cargo:rustc-link-lib=vppxlate");
}
