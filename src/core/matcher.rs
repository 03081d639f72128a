//! Value matchers backing each requirement dimension of a guard.

/// A predicate strategy over a single value.
///
/// `Whitelist` and `Blacklist` hold an ordered, de-duplicated set of values.
/// Comparison is plain equality; for attribute values `None` is an ordinary
/// member, so a whitelist only accepts an unset attribute when it lists
/// `None` itself.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Matcher;
///
/// let matcher = Matcher::whitelist(vec![Some("parked"), Some("idling")]);
///
/// assert!(matcher.matches(&Some("parked")));
/// assert!(!matcher.matches(&Some("first_gear")));
/// assert!(!matcher.matches(&None));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Matcher<V> {
    /// Matches every value, including an unset one.
    All,
    /// Matches only the listed values.
    Whitelist(Vec<V>),
    /// Matches everything except the listed values.
    Blacklist(Vec<V>),
}

impl<V: PartialEq> Matcher<V> {
    /// Build a whitelist, dropping repeated values.
    pub fn whitelist(values: impl IntoIterator<Item = V>) -> Self {
        Matcher::Whitelist(dedup(values))
    }

    /// Build a blacklist, dropping repeated values.
    pub fn blacklist(values: impl IntoIterator<Item = V>) -> Self {
        Matcher::Blacklist(dedup(values))
    }

    pub fn matches(&self, value: &V) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Whitelist(values) => values.contains(value),
            Matcher::Blacklist(values) => !values.contains(value),
        }
    }

    /// Literal values referenced by this matcher. Empty for `All`.
    pub fn values(&self) -> &[V] {
        match self {
            Matcher::All => &[],
            Matcher::Whitelist(values) | Matcher::Blacklist(values) => values,
        }
    }
}

impl<V> Default for Matcher<V> {
    fn default() -> Self {
        Matcher::All
    }
}

fn dedup<V: PartialEq>(values: impl IntoIterator<Item = V>) -> Vec<V> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_everything() {
        let matcher: Matcher<Option<&str>> = Matcher::All;

        assert!(matcher.matches(&Some("parked")));
        assert!(matcher.matches(&None));
        assert!(matcher.values().is_empty());
    }

    #[test]
    fn whitelist_rejects_unset_value_unless_listed() {
        let strict = Matcher::whitelist(vec![Some("parked")]);
        let lenient = Matcher::whitelist(vec![Some("parked"), None]);

        assert!(!strict.matches(&None));
        assert!(lenient.matches(&None));
    }

    #[test]
    fn blacklist_matches_values_outside_the_set() {
        let matcher = Matcher::blacklist(vec![Some("parked")]);

        assert!(matcher.matches(&Some("idling")));
        assert!(matcher.matches(&None));
        assert!(!matcher.matches(&Some("parked")));
    }

    #[test]
    fn construction_drops_duplicates_in_order() {
        let matcher = Matcher::whitelist(vec!["idling", "parked", "idling"]);

        assert_eq!(matcher.values(), &["idling", "parked"]);
    }

    #[test]
    fn equality_does_not_coerce() {
        let matcher = Matcher::whitelist(vec![1u8]);

        assert!(matcher.matches(&1));
        assert!(!matcher.matches(&0));
    }
}
