use std::collections::btree_map::{self, BTreeMap, Entry};

use crate::header::metadata_names;

/// Name/value pairs attached to a document or a data array.
///
/// Names are unique. Entries iterate in name order, which is also the order
/// they are written in.
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    entries: BTreeMap<String, String>,
    modified: bool,
}

impl PartialEq for MetaData {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl MetaData {
    pub fn new() -> MetaData {
        MetaData::default()
    }

    /// Sets `name` to `value`. Only marks the metadata modified when something changed.
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let value = value.into();
        match self.entries.entry(name.into()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() != value {
                    entry.insert(value);
                    self.modified = true;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
                self.modified = true;
            }
        }
    }

    pub fn set_int<N: Into<String>>(&mut self, name: N, value: i32) {
        self.set(name, value.to_string());
    }

    pub fn set_float<N: Into<String>>(&mut self, name: N, value: f32) {
        self.set(name, value.to_string());
    }

    /// Value for `name`, or an empty string when there is none.
    pub fn get(&self, name: &str) -> &str {
        self.entries.get(name).map(String::as_str).unwrap_or("")
    }

    /// Value for `name` parsed as an integer.
    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.entries.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Value for `name` parsed as a float.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.entries.get(name).and_then(|v| v.trim().parse().ok())
    }

    #[inline(always)]
    pub fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let removed = self.entries.remove(name);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.modified = true;
        }
    }

    /// Copies every entry of `other` except its unique identifier.
    pub fn append(&mut self, other: &MetaData) {
        for (name, value) in other.iter() {
            if name != metadata_names::UNIQUE_ID {
                self.set(name.as_str(), value.as_str());
            }
        }
        self.modified = true;
    }

    /// Moves the value stored under `old` to `new`, replacing any value already at `new`.
    pub fn replace_name(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        if let Some(value) = self.entries.remove(old) {
            self.entries.insert(new.to_string(), value);
            self.modified = true;
        }
    }

    /// Applies [`MetaData::replace_name`] for each `(old, new)` pair.
    pub fn update_names<'a, I>(&mut self, renames: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (old, new) in renames {
            self.replace_name(old, new);
        }
    }

    #[inline(always)]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline(always)]
    pub fn set_modified(&mut self) {
        self.modified = true;
    }

    #[inline(always)]
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }
}

impl<'a> IntoIterator for &'a MetaData {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_only_marks_changes() {
        let mut md = MetaData::new();
        assert!(!md.is_modified());
        md.set("Name", "left");
        assert!(md.is_modified());

        md.clear_modified();
        md.set("Name", "left");
        assert!(!md.is_modified());

        md.set("Name", "right");
        assert!(md.is_modified());
        assert_eq!(md.get("Name"), "right");
    }

    #[test]
    fn missing_values_are_empty() {
        let md = MetaData::new();
        assert_eq!(md.get("Nothing"), "");
        assert_eq!(md.get_int("Nothing"), None);
        assert!(!md.exists("Nothing"));
    }

    #[test]
    fn numbers() {
        let mut md = MetaData::new();
        md.set_int("Count", 42);
        md.set_float("Scale", 0.5);
        md.set("Bad", "abc");
        assert_eq!(md.get_int("Count"), Some(42));
        assert_eq!(md.get_float("Scale"), Some(0.5));
        assert_eq!(md.get_int("Bad"), None);
    }

    #[test]
    fn append_skips_unique_id() {
        let mut a = MetaData::new();
        a.set("UniqueID", "a");
        let mut b = MetaData::new();
        b.set("UniqueID", "b");
        b.set("Comment", "from b");
        a.append(&b);
        assert_eq!(a.get("UniqueID"), "a");
        assert_eq!(a.get("Comment"), "from b");
    }

    #[test]
    fn rename_and_remove() {
        let mut md = MetaData::new();
        md.set("old", "v");
        md.replace_name("old", "new");
        assert!(!md.exists("old"));
        assert_eq!(md.get("new"), "v");

        md.update_names([("new", "newer")]);
        assert_eq!(md.names().collect::<Vec<_>>(), vec!["newer"]);

        assert_eq!(md.remove("newer").as_deref(), Some("v"));
        assert!(md.is_empty());
    }
}
