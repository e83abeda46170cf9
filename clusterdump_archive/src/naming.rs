//! Backup instance naming.

use clusterdump_time::Time;
use regex::Regex;
use std::{fmt::Display, sync::LazyLock};

/// Principal used when the connection string carries no credentials.
pub const UNKNOWN_PRINCIPAL: &str = "unknownUser";

/// Cluster used when the connection string carries no credentials.
pub const UNKNOWN_CLUSTER: &str = "unknownCluster";

static CONNECTION_IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://([^:]+):[^@]+@([^/?]+)")
        .expect("connection identity pattern is valid")
});

/// The display identity extracted from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub principal: String,
    pub cluster: String,
}

impl Identity {
    /// Extract `<principal>` and `<host>` from a `<scheme>://<principal>:<secret>@<host>/...`
    /// connection string. Dots in the host become dashes.
    ///
    /// Never fails: anything that does not match yields the placeholder identity.
    pub fn from_connection(connection: &str) -> Self {
        match CONNECTION_IDENTITY.captures(connection) {
            Some(caps) => Self {
                principal: caps[1].to_string(),
                cluster: caps[2].replace('.', "-"),
            },
            None => Self::unknown(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            principal: UNKNOWN_PRINCIPAL.to_string(),
            cluster: UNKNOWN_CLUSTER.to_string(),
        }
    }
}

/// Name of a backup instance directory: `{principal}@{cluster}_{YYYY-MM-DD_HH-MM-SS}`.
///
/// Two backups taken within the same second by the same identity get the same name and
/// share a directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceName(String);

impl InstanceName {
    pub fn derive(connection: &str, now: Time) -> Self {
        Self::new(&Identity::from_connection(connection), now)
    }

    pub fn new(identity: &Identity, now: Time) -> Self {
        let Identity { principal, cluster } = identity;
        Self(format!("{principal}@{cluster}_{}", timestamp(now)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InstanceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// ISO 8601 with the date/time separator turned into `_`, colons into `-`, and everything from
/// the fractional seconds on dropped.
fn timestamp(now: Time) -> String {
    let iso = now.to_iso8601().replacen('T', "_", 1).replace(':', "-");
    match iso.split_once('.') {
        Some((whole_seconds, _)) => whole_seconds.to_string(),
        None => iso,
    }
}
