//! Test helpers for generating unique test data
//!
//! ULID suffixes keep usernames distinct across tests sharing a process.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Four distinct usernames for a full table, creator first.
pub fn unique_table(prefix: &str) -> [String; 4] {
    ["creator", "p1", "p2", "p3"].map(|seat| unique_str(&format!("{prefix}-{seat}")))
}
