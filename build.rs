use std::process::Command;

/// Ask git for the nearest release tag (vX.Y.Z only, no pre-release suffixes).
fn describe_release() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--match", "v[0-9]*", "--exclude", "*-*", "--always"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if described.is_empty() {
        return None;
    }

    // v1.2.0-4-gdeadbee -> 1.2.0-4-gdeadbee, bare hash -> 0.0.0-g<hash>
    match described.strip_prefix('v') {
        Some(version) => Some(version.to_string()),
        None => Some(format!("0.0.0-g{}", described)),
    }
}

fn main() {
    let version = std::env::var("RELEASE_VERSION")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(describe_release)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=SPIEGEL_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=RELEASE_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}
