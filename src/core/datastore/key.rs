//! core::datastore::key
//!
//! Hierarchical datastore keys.
//!
//! Keys are slash-separated paths that are always rooted at `/`. They are
//! cleaned at construction, so two spellings of the same path compare
//! equal and sort together.

use std::fmt;

/// A cleaned, slash-rooted datastore key.
///
/// Cleaning rules:
/// - A leading `/` is added if missing
/// - Repeated slashes collapse, a trailing slash is dropped
/// - `.` segments are dropped and `..` pops the previous segment
///
/// # Example
///
/// ```
/// use filminerctl::core::datastore::Key;
///
/// assert_eq!(Key::new("miner-address").as_str(), "/miner-address");
/// assert_eq!(Key::new("//storage/./nextid/").as_str(), "/storage/nextid");
/// assert_eq!(Key::new("/a/../b").as_str(), "/b");
/// assert!(Key::new("").is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Create a key from any path-like string, cleaning it.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.as_ref().split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        Self(format!("/{}", segments.join("/")))
    }

    /// The root key `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the cleaned key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the key as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Check whether this is the root key.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Key::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_leading_slash() {
        assert_eq!(Key::new("miner-address").as_str(), "/miner-address");
    }

    #[test]
    fn keeps_clean_keys() {
        assert_eq!(Key::new("/storage/nextid").as_str(), "/storage/nextid");
    }

    #[test]
    fn collapses_and_trims_slashes() {
        assert_eq!(Key::new("//a///b/").as_str(), "/a/b");
    }

    #[test]
    fn resolves_dot_segments() {
        assert_eq!(Key::new("/a/./b/../c").as_str(), "/a/c");
        assert_eq!(Key::new("/../../a").as_str(), "/a");
    }

    #[test]
    fn root_variants() {
        assert!(Key::new("").is_root());
        assert!(Key::new("/").is_root());
        assert!(Key::new("/a/..").is_root());
        assert_eq!(Key::root(), Key::new("///"));
    }

    #[test]
    fn orders_by_path() {
        let mut keys = vec![Key::new("/b"), Key::new("/a/z"), Key::new("/a")];
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(Key::as_str).collect();
        assert_eq!(ordered, vec!["/a", "/a/z", "/b"]);
    }
}
