//! Build script for threadstate-core
//!
//! Checks the minimum Rust version before compilation.
//!
//! ## Requirements
//!
//! - **Rust**: 1.66.0 or newer (`u32::wrapping_add_signed` in const context,
//!   `let`-`else`)

fn main()
{
    let Ok(rustc_version) = rustc_version::version() else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
        return;
    };

    let min_rust_version = rustc_version::Version::new(1, 66, 0);
    if rustc_version < min_rust_version {
        panic!(
            "threadstate-core requires Rust {} or newer, found {}",
            min_rust_version, rustc_version
        );
    }
}
