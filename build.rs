//! Embeds the release version and git revision reported by `/status` and
//! the startup log. CI sets S24_VERSION/S24_GIT_SHA; local builds fall back
//! to the package version and the checkout's HEAD.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=S24_VERSION");
    println!("cargo:rerun-if-env-changed=S24_GIT_SHA");

    let version = env::var("S24_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| "dev".into());
    println!("cargo:rustc-env=S24_VERSION={version}");

    let sha = env::var("S24_GIT_SHA").unwrap_or_else(|_| local_revision());
    println!("cargo:rustc-env=S24_GIT_SHA={sha}");
}

fn local_revision() -> String {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output();
    match output {
        Ok(o) if o.status.success() => String::from_utf8_lossy(&o.stdout).trim().to_string(),
        _ => "dev".into(),
    }
}
