//! Facts about the running process that are fixed at build time.

use std::sync::LazyLock;

/// The version of this build.
pub const CLUSTERDUMP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The git commit this build was made from.
pub const CLUSTERDUMP_GIT_HASH_SHORT: &str = env!("GIT_HASH_SHORT");

/// Version string shown by `--version` and logged at startup.
pub static VERSION_STRING: LazyLock<&'static str> = LazyLock::new(|| {
    let s = format!("{CLUSTERDUMP_VERSION}, revision {CLUSTERDUMP_GIT_HASH_SHORT}");
    s.leak()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_names_version_and_revision() {
        assert!(VERSION_STRING.starts_with(CLUSTERDUMP_VERSION));
        assert!(VERSION_STRING.contains(", revision "));
        assert!(!CLUSTERDUMP_GIT_HASH_SHORT.contains('\n'));
    }
}
