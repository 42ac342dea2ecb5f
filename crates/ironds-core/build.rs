//! Build script for ironds-core
//!
//! Checks the toolchain and tells the user when the target has no live
//! register backend:
//! - Minimum Rust version
//! - Target OS and architecture (the ptrace backend is Linux x86/x86-64 only)

const MIN_RUST_VERSION: &str = "1.70.0";

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    match (rustc_version::version(), rustc_version::Version::parse(MIN_RUST_VERSION)) {
        (Ok(found), Ok(min)) => {
            if found < min {
                panic!("ironds-core requires Rust {min} or newer, found {found}");
            }
        }
        _ => println!("cargo:warning=could not verify Rust version"),
    }

    // Cargo describes the *target* here; `cfg!` would describe the host.
    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if os != "linux" || !matches!(arch.as_str(), "x86" | "x86_64") {
        println!(
            "cargo:warning=ironds-core: no ptrace backend for {arch}-{os}; only names and the register codec are available"
        );
    }
}
