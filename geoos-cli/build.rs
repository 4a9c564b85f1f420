// Sets GEOOS_VERSION for `geoos --version`.

use std::process::Command;

fn main() {
    let version = describe_tag().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=GEOOS_VERSION={}", version);
    println!("cargo:rerun-if-changed=../.git/HEAD");
}

/// Nearest release tag (`v0.2.0-3-gabc123` becomes `0.2.0-3-gabc123`)
fn describe_tag() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    if described.is_empty() {
        return None;
    }
    Some(described.trim_start_matches('v').to_string())
}
