//! Embeds build provenance for the startup banner: `GIT_HASH`,
//! `BUILD_TIMESTAMP` and `BUILD_PROFILE`.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-env-changed=PROFILE");

    let stamps = [
        ("GIT_HASH", git_short_hash()),
        ("BUILD_TIMESTAMP", Some(build_timestamp())),
        ("BUILD_PROFILE", std::env::var("PROFILE").ok()),
    ];

    for (key, value) in stamps {
        println!(
            "cargo:rustc-env={}={}",
            key,
            value.as_deref().unwrap_or(UNKNOWN)
        );
    }
}

/// Abbreviated commit of the checkout, if building inside one
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

/// Build time in UTC, RFC 3339
fn build_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
