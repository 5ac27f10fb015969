use std::collections::BTreeSet;

/// Named boolean flags of one story session. Every operation takes a
/// whitespace-separated list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagStore {
    flags: BTreeSet<String>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if at least one flag was not already set.
    pub fn set_flags(&mut self, names: &str) -> bool {
        let mut added = false;
        for name in names.split_whitespace() {
            added |= self.flags.insert(name.to_string());
        }
        added
    }

    /// Returns true if at least one flag was set before.
    pub fn clear_flags(&mut self, names: &str) -> bool {
        let mut removed = false;
        for name in names.split_whitespace() {
            removed |= self.flags.remove(name);
        }
        removed
    }

    pub fn check_flags(&self, names: &str) -> bool {
        names.split_whitespace().all(|name| self.flags.contains(name))
    }

    /// True when none of the names is set.
    pub fn check_clear(&self, names: &str) -> bool {
        !names.split_whitespace().any(|name| self.flags.contains(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_clear_disjoint_lists() {
        let mut flags = FlagStore::new();
        assert!(flags.set_flags("met-guard  has-key\tdoor-open"));
        assert!(flags.clear_flags("lamp-lit door-open"));

        assert!(flags.check_flags("met-guard has-key"));
        assert!(!flags.check_flags("door-open"));
        assert!(!flags.check_flags("lamp-lit"));
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec!["has-key", "met-guard"]);
    }

    #[test]
    fn repeated_operations_are_no_ops() {
        let mut flags = FlagStore::new();
        assert!(flags.set_flags("a"));
        assert!(!flags.set_flags("a"));
        assert!(flags.set_flags("a b"));
        assert!(flags.clear_flags("b"));
        assert!(!flags.clear_flags("b"));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn check_clear_requires_every_name_unset() {
        let mut flags = FlagStore::new();
        flags.set_flags("x");
        assert!(flags.check_clear("y z"));
        assert!(!flags.check_clear("y x"));
    }

    #[test]
    fn empty_list_is_vacuously_true() {
        let mut flags = FlagStore::new();
        assert!(flags.check_flags(""));
        assert!(flags.check_clear("   "));
        assert!(!flags.set_flags(""));
        assert!(flags.is_empty());
    }
}
