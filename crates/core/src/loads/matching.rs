/// Decides whether a user-supplied location filter matches a catalog field.
pub trait LocationMatcher: Send + Sync {
    fn matches(&self, filter: &str, field: &str) -> bool;
}

/// Case-insensitive substring containment. `"TX"` matches any field containing
/// `tx` anywhere, not only the state token.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubstringMatcher;

impl LocationMatcher for SubstringMatcher {
    fn matches(&self, filter: &str, field: &str) -> bool {
        field.to_lowercase().contains(&filter.to_lowercase())
    }
}
