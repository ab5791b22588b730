use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

pub mod constants {
    pub const UNASSIGNED_KEY: i32 = 0;
    pub const UNASSIGNED_NAME: &str = "???";
    pub const DEFAULT_RGBA: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const GENERATED_NAME_PREFIX: &str = "Name";
}

use self::constants::*;

/// Colours handed out by [`LabelTable::create_labels_for_keys`], in order.
const GENERATED_COLORS: [[f32; 3]; 17] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 0.5],
    [1.0, 0.0, 1.0],
    [1.0, 0.5, 0.0],
    [1.0, 0.5, 0.5],
    [1.0, 0.5, 1.0],
    [0.0, 0.0, 0.5],
    [0.0, 0.0, 1.0],
    [0.5, 0.0, 0.0],
    [0.5, 0.0, 0.5],
    [0.5, 0.0, 1.0],
    [0.5, 0.5, 0.0],
    [0.5, 0.5, 0.5],
    [0.5, 0.5, 1.0],
    [0.5, 1.0, 0.0],
    [0.5, 1.0, 0.5],
    [0.5, 1.0, 1.0],
];

/// A named colour for one label key.
#[derive(Debug, Clone)]
pub struct Label {
    /// Negative keys ask [`LabelTable::add_label`] to pick an unused key.
    pub key: i32,
    pub name: String,
    /// Red, green, blue and alpha in `0.0..=1.0`.
    pub rgba: [f32; 4],
    pub xyz: Option<[f32; 3]>,
    pub selected: bool,
    /// Usage counter maintained by callers, never written.
    pub count: usize,
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.name == other.name && self.rgba == other.rgba
    }
}

impl Label {
    pub fn new<S: Into<String>>(key: i32, name: S, rgba: [f32; 4]) -> Label {
        Label {
            key,
            name: name.into(),
            rgba,
            xyz: None,
            selected: true,
            count: 0,
        }
    }

    /// Builds a label from 8-bit colour components.
    pub fn from_rgba8<S: Into<String>>(key: i32, name: S, rgba: [u8; 4]) -> Label {
        let [r, g, b, a] = rgba;
        let scale = |c: u8| c as f32 / 255.0;
        Label::new(key, name, [scale(r), scale(g), scale(b), scale(a)])
    }

    pub fn with_xyz(mut self, xyz: [f32; 3]) -> Label {
        self.xyz = Some(xyz);
        self
    }

    #[inline(always)]
    pub fn alpha(&self) -> f32 {
        self.rgba[3]
    }
}

/// Label keys mapped to names and colours.
///
/// A table always holds the unassigned label `???` under key 0 after
/// construction or [`LabelTable::clear`].
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: BTreeMap<i32, Label>,
    modified: bool,
}

impl Default for LabelTable {
    fn default() -> Self {
        LabelTable::new()
    }
}

impl PartialEq for LabelTable {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl LabelTable {
    pub fn new() -> LabelTable {
        let mut table = LabelTable {
            labels: BTreeMap::new(),
            modified: false,
        };
        table.clear();
        table
    }

    /// Removes every label, then restores the unassigned label.
    pub fn clear(&mut self) {
        self.labels.clear();
        self.labels.insert(
            UNASSIGNED_KEY,
            Label::new(UNASSIGNED_KEY, UNASSIGNED_NAME, DEFAULT_RGBA),
        );
        self.modified = false;
    }

    /// Adds `label`, returning the key it is stored under.
    ///
    /// A negative key is replaced with an unused one. When the key already
    /// exists only the name and colour of the stored label are updated.
    pub fn add_label(&mut self, mut label: Label) -> i32 {
        self.modified = true;
        if label.key < 0 {
            let key = self.generate_unused_key();
            label.key = key;
            self.labels.insert(key, label);
            return key;
        }

        let key = label.key;
        match self.labels.get_mut(&key) {
            Some(existing) => {
                existing.name = label.name;
                existing.rgba = label.rgba;
            }
            None => {
                self.labels.insert(key, label);
            }
        }
        key
    }

    /// Adds a label under a newly generated key.
    pub fn add_label_named<S: Into<String>>(&mut self, name: S, rgba: [f32; 4]) -> i32 {
        self.add_label(Label::new(-1, name, rgba))
    }

    /// Stores `label` under its key, replacing any existing label outright.
    pub fn insert_label(&mut self, mut label: Label) {
        if label.key < 0 {
            label.key = self.generate_unused_key();
        }
        self.labels.insert(label.key, label);
        self.modified = true;
    }

    /// Smallest positive key not in use.
    pub fn generate_unused_key(&self) -> i32 {
        let mut key = 1;
        while self.labels.contains_key(&key) {
            key += 1;
        }
        key
    }

    pub fn delete_label(&mut self, key: i32) -> Option<Label> {
        let removed = self.labels.remove(&key);
        if removed.is_some() {
            self.modified = true;
        }
        removed
    }

    /// Keeps only the labels whose keys are in `used`.
    pub fn delete_unused_labels(&mut self, used: &BTreeSet<i32>) {
        self.labels.retain(|key, _| used.contains(key));
        self.modified = true;
    }

    #[inline(always)]
    pub fn label(&self, key: i32) -> Option<&Label> {
        self.labels.get(&key)
    }

    #[inline(always)]
    pub fn label_mut(&mut self, key: i32) -> Option<&mut Label> {
        self.labels.get_mut(&key)
    }

    pub fn label_by_name(&self, name: &str) -> Option<&Label> {
        self.labels.values().find(|label| label.name == name)
    }

    pub fn label_key_from_name(&self, name: &str) -> Option<i32> {
        self.label_by_name(name).map(|label| label.key)
    }

    /// Label whose name is the longest prefix of `name`.
    ///
    /// The match is computed but never returned; this always yields `None`.
    pub fn best_matching_label(&self, name: &str) -> Option<&Label> {
        let _best = self
            .labels
            .values()
            .filter(|label| name.starts_with(label.name.as_str()))
            .max_by_key(|label| label.name.len());
        None
    }

    /// Key of the `???` label, if it is still present.
    pub fn unassigned_label_key(&self) -> Option<i32> {
        self.label_key_from_name(UNASSIGNED_NAME)
    }

    /// Name stored for `key`, or an empty string.
    pub fn label_name(&self, key: i32) -> &str {
        self.labels.get(&key).map(|l| l.name.as_str()).unwrap_or("")
    }

    pub fn set_label_name<S: Into<String>>(&mut self, key: i32, name: S) {
        if let Some(label) = self.labels.get_mut(&key) {
            label.name = name.into();
            self.modified = true;
        }
    }

    /// Updates or creates the label for `key`.
    pub fn set_label<S: Into<String>>(
        &mut self,
        key: i32,
        name: S,
        rgba: [f32; 4],
        xyz: Option<[f32; 3]>,
    ) {
        let name = name.into();
        match self.labels.get_mut(&key) {
            Some(label) => {
                label.name = name;
                label.rgba = rgba;
                if xyz.is_some() {
                    label.xyz = xyz;
                }
                self.modified = true;
            }
            None => {
                let mut label = Label::new(key, name, rgba);
                label.xyz = xyz;
                self.add_label(label);
            }
        }
    }

    pub fn is_label_selected(&self, key: i32) -> bool {
        self.labels.get(&key).map(|l| l.selected).unwrap_or(false)
    }

    pub fn set_label_selected(&mut self, key: i32, selected: bool) {
        if let Some(label) = self.labels.get_mut(&key) {
            label.selected = selected;
        }
    }

    pub fn set_selection_status_for_all(&mut self, selected: bool) {
        for label in self.labels.values_mut() {
            label.selected = selected;
        }
    }

    /// Alpha of the label for `key`, zero when there is none.
    pub fn label_alpha(&self, key: i32) -> f32 {
        self.labels.get(&key).map(Label::alpha).unwrap_or(0.0)
    }

    pub fn label_color(&self, key: i32) -> Option<[f32; 4]> {
        self.labels.get(&key).map(|l| l.rgba)
    }

    pub fn set_label_color(&mut self, key: i32, rgba: [f32; 4]) {
        if let Some(label) = self.labels.get_mut(&key) {
            label.rgba = rgba;
            self.modified = true;
        }
    }

    pub fn reset_label_counts(&mut self) {
        for label in self.labels.values_mut() {
            label.count = 0;
        }
    }

    /// Creates a label named `Name_<n>` with a generated colour for each key
    /// in `keys` that has no label yet.
    pub fn create_labels_for_keys(&mut self, keys: &BTreeSet<i32>) {
        let mut name_count = 0;
        let mut colors = GENERATED_COLORS.iter().cycle();
        for &key in keys {
            if self.labels.contains_key(&key) {
                continue;
            }

            let name = loop {
                let candidate = format!("{}_{}", GENERATED_NAME_PREFIX, name_count);
                name_count += 1;
                if self.label_by_name(&candidate).is_none() {
                    break candidate;
                }
            };

            let [r, g, b] = colors.next().copied().unwrap_or([1.0, 1.0, 1.0]);
            self.add_label(Label::new(key, name, [r, g, b, 1.0]));
        }
    }

    /// Adds every label of `other` to this table.
    ///
    /// Returns a map from each key in `other` to the key it now has here.
    pub fn append(&mut self, other: &LabelTable) -> BTreeMap<i32, i32> {
        other
            .labels
            .iter()
            .map(|(&key, label)| (key, self.add_label(label.clone())))
            .collect()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.labels.keys().copied()
    }

    pub fn keys_sorted_by_name(&self) -> Vec<i32> {
        let mut labels: Vec<&Label> = self.labels.values().collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name).then(a.key.cmp(&b.key)));
        labels.into_iter().map(|l| l.key).collect()
    }

    pub fn iter(&self) -> btree_map::Values<'_, i32, Label> {
        self.labels.values()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline(always)]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline(always)]
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }
}
