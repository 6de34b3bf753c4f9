//! Host allow-list for outbound requests

use std::fmt;

/// Read-only set of upstream URL prefixes
///
/// A URL is allowed when it starts with one of the prefixes and the match
/// ends on a path boundary, so `https://api.example.com` does not admit
/// `https://api.example.com.evil.test`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    prefixes: Vec<String>,
}

impl AllowList {
    /// Build an allow-list from base URLs
    ///
    /// Trailing slashes are ignored and empty entries are dropped.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        prefixes.sort();
        prefixes.dedup();
        Self { prefixes }
    }

    /// Check whether `url` may be fetched
    #[must_use]
    pub fn is_allowed(&self, url: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            url.strip_prefix(prefix.as_str()).is_some_and(|rest| {
                rest.is_empty() || rest.starts_with(['/', '?', '#'])
            })
        })
    }

    /// Configured prefixes
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Number of configured prefixes
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether nothing is allowed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefixes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> AllowList {
        AllowList::new([
            "https://api.open-meteo.com/v1/",
            "https://v6.db.transport.rest",
        ])
    }

    #[test]
    fn allows_prefixed_urls() {
        let list = list();
        assert!(list.is_allowed("https://api.open-meteo.com/v1/forecast?latitude=1"));
        assert!(list.is_allowed("https://v6.db.transport.rest/locations?query=x"));
        assert!(list.is_allowed("https://v6.db.transport.rest"));
    }

    #[test]
    fn rejects_other_hosts() {
        let list = list();
        assert!(!list.is_allowed("https://example.com/"));
        assert!(!list.is_allowed("http://api.open-meteo.com/v1/forecast"));
        assert!(!list.is_allowed(""));
    }

    #[test]
    fn rejects_host_suffix_tricks() {
        let list = list();
        assert!(!list.is_allowed("https://v6.db.transport.rest.evil.test/x"));
        assert!(!list.is_allowed("https://v6.db.transport.rest@evil.test/"));
        assert!(!list.is_allowed("https://api.open-meteo.com/v10/forecast"));
    }

    #[test]
    fn drops_empty_and_duplicate_entries() {
        let list = AllowList::new(["", "  ", "https://a.test/", "https://a.test"]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.prefixes(), ["https://a.test"]);
    }

    #[test]
    fn empty_list_allows_nothing() {
        let list = AllowList::default();
        assert!(list.is_empty());
        assert!(!list.is_allowed("https://a.test/"));
    }
}
