use std::process::Command;

fn main() {
    let build_date = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    println!("cargo:rustc-env=SHMSEG_BUILD_DATE={}", build_date);

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty());

    if let Some(hash) = git_hash {
        println!("cargo:rustc-env=SHMSEG_GIT_HASH={}", hash);
    }

    println!("cargo:rerun-if-changed=build.rs");
}
