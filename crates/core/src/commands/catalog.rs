use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// A host registry that lookup parameters resolve identifiers against.
pub trait Catalog<T>: Send + Sync {
    /// Case-insensitive lookup.
    fn get(&self, id: &str) -> Option<T>;

    /// Every identifier, used for completion.
    fn ids(&self) -> Vec<String>;
}

/// A fixed set of named values kept in memory.
pub struct MemoryCatalog<T> {
    entries: Vec<(String, T)>,
    index: FxHashMap<String, usize>,
}

impl<T> Default for MemoryCatalog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> MemoryCatalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, value: T) -> Self {
        self.insert(id, value);
        self
    }

    /// Replaces the value of an identifier that differs from `id` only by case.
    pub fn insert(&mut self, id: impl Into<String>, value: T) {
        let id = id.into();
        match self.index.get(&id.to_lowercase()) {
            Some(&i) => self.entries[i] = (id, value),
            None => {
                self.index.insert(id.to_lowercase(), self.entries.len());
                self.entries.push((id, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T, I: Into<String>> FromIterator<(I, T)> for MemoryCatalog<T> {
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let mut catalog = MemoryCatalog::new();
        for (id, value) in iter {
            catalog.insert(id, value);
        }
        catalog
    }
}

impl<T: Clone + Send + Sync> Catalog<T> for MemoryCatalog<T> {
    fn get(&self, id: &str) -> Option<T> {
        self.index
            .get(&id.to_lowercase())
            .map(|&i| self.entries[i].1.clone())
    }

    fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }
}

/// A named group of permission subjects, such as `user` or `group`.
pub struct SubjectCollection<T> {
    identifier: String,
    subjects: Arc<dyn Catalog<T>>,
}

impl<T> SubjectCollection<T> {
    pub fn new(identifier: impl Into<String>, subjects: Arc<dyn Catalog<T>>) -> Self {
        Self {
            identifier: identifier.into(),
            subjects,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn subjects(&self) -> &dyn Catalog<T> {
        self.subjects.as_ref()
    }
}

impl<T> Clone for SubjectCollection<T> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            subjects: Arc::clone(&self.subjects),
        }
    }
}

impl<T> fmt::Debug for SubjectCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectCollection")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// A closed set of named constants, parsed by [`enum_value`](super::standard::enum_value).
pub trait EnumValue: Copy + Send + Sync + 'static {
    /// Shown in "not found" errors.
    const NAME: &'static str;
    const VARIANTS: &'static [Self];

    fn id(&self) -> &'static str;

    fn from_id(id: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.id().eq_ignore_ascii_case(id))
    }
}
