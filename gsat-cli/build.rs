use std::{env, path::Path, process::Command, str::from_utf8};

/// Version from `git describe`, if building from a checkout with git available.
fn git_version() -> Option<String> {
    if !Path::new("../.git").exists() {
        return None;
    }
    let output = Command::new("git")
        .args(&["describe", "--tags", "--match=v[0-9]*", "--dirty=-d", "--always"])
        .output()
        .ok()
        .filter(|result| result.status.success())?;
    let version = from_utf8(&output.stdout).ok()?.trim();
    Some(version.trim_start_matches('v').to_owned())
}

fn main() {
    let rustc = env::var("RUSTC").unwrap();

    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|result| result.status.success())
        .expect("Failed to query rustc version");

    let version =
        git_version().unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap());

    println!("cargo:rustc-env=GSAT_VERSION={}", version);
    println!(
        "cargo:rustc-env=GSAT_RUSTC_VERSION={}",
        from_utf8(&rustc_version.stdout).unwrap().trim()
    );
    println!("cargo:rustc-env=GSAT_PROFILE={}", env::var("PROFILE").unwrap());
}
