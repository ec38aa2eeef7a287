//! Stamps the mcn-guide binary with the commit, build time, and profile it
//! was built from. `main` logs them at startup.

use std::env;
use std::process::Command;

/// Short commit hash, or `MCN_GIT_HASH` when building outside a checkout
fn commit_hash() -> String {
    if let Ok(hash) = env::var("MCN_GIT_HASH") {
        return hash;
    }
    let output = match Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() {
        Ok(output) if output.status.success() => output,
        _ => return "unknown".to_string(),
    };
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn main() {
    let stamps = [
        ("GIT_HASH", commit_hash()),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        (
            "BUILD_PROFILE",
            env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];
    for (key, value) in stamps {
        println!("cargo:rustc-env={}={}", key, value);
    }
}
