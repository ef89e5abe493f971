use std::path::Path;
use std::process::Command;

/// Embeds the short commit hash so `touchboard --version` can report the build it came from.
fn main() {
    let hash = short_commit_hash().unwrap_or_else(|| "unknown".into());
    println!("cargo:rustc-env=TOUCHBOARD_GIT_HASH={hash}");

    for watched in [".git/HEAD", ".git/refs", ".git/packed-refs"] {
        if Path::new(watched).exists() {
            println!("cargo:rerun-if-changed={watched}");
        }
    }
}

fn short_commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}
