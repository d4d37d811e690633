//! Ordered parameter storage for Content-Type values.

/// An insertion-ordered mapping from parameter name to value.
///
/// Names are normalized to lowercase ASCII on insert, which makes lookups
/// case-insensitive and keeps serialization deterministic. Setting an
/// existing name overwrites its value in place, so first-insertion order is
/// preserved while the last written value wins.
///
/// Every mutating call raises an internal dirty flag; the owning
/// [`ContentType`](crate::ContentType) uses it to decide when its cached
/// serialization is stale.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    entries: Vec<(String, String)>,
    dirty: bool,
}

impl ParameterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a parameter value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Reports whether a parameter with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or overwrites a parameter.
    ///
    /// An existing entry keeps its position; a new entry is appended.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        self.dirty = true;
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((name, value.to_string())),
        }
    }

    /// Removes a parameter. Returns whether an entry was present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.dirty = true;
        let before = self.entries.len();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.entries.len() != before
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reports whether the store has been mutated since the flag was last
    /// cleared (after a successful parse or a serialization).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
