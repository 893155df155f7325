use std::process::Command;

fn main() {
    // Expose the compiling toolchain's version for the analytics signature.
    println!("cargo:rerun-if-env-changed=RUSTC");

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let Ok(output) = Command::new(rustc).arg("--version").output() else {
        return;
    };

    // "rustc 1.82.0 (f6e511eec 2024-10-15)"
    let stdout = String::from_utf8_lossy(&output.stdout);
    if let Some(version) = stdout.split_whitespace().nth(1) {
        println!("cargo:rustc-env=CLD_RUSTC_VERSION={}", version);
    }
}
