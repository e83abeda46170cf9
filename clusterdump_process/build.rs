// Include the git commit in the `GIT_HASH` and `GIT_HASH_SHORT` environment variables at build
// time. Builds from a source tarball have no repository and fall back to "unknown".
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=GIT_HASH");
    println!("cargo:rustc-env=GIT_HASH={}", git_rev_parse(&["HEAD"]));
    println!(
        "cargo:rustc-env=GIT_HASH_SHORT={}",
        git_rev_parse(&["--short", "HEAD"])
    );
}

fn git_rev_parse(args: &[&str]) -> String {
    if let Ok(hash) = std::env::var("GIT_HASH") {
        return hash;
    }

    Command::new("git")
        .arg("rev-parse")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
