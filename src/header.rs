//! Column name to index mapping.

use std::collections::HashMap;

/// Maps a column name to its position in every record of a reader.
///
/// Built once from the header record and shared by reference with each
/// [`Row`](crate::Row). Duplicate names keep the last position seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        for (i, name) in names.into_iter().enumerate() {
            let name = name.into();
            if let Some(previous) = index.insert(name, i) {
                tracing::warn!(column = previous, replaced_by = i, "duplicate header name");
            }
        }
        Self { index }
    }

    /// Position of `name`, if known.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The names ordered by position.
    ///
    /// A name whose position falls outside `0..len()` (only possible after
    /// duplicate names collapsed) is left out, and its slot stays empty.
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![String::new(); self.index.len()];
        for (name, &i) in &self.index {
            if let Some(slot) = names.get_mut(i) {
                slot.clone_from(name);
            }
        }
        names
    }
}
