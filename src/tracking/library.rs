use std::collections::HashSet;

/// Names of the reference images the backend is able to recognize.
#[derive(Debug, Clone, Default)]
pub struct ReferenceImageLibrary {
    names: HashSet<String>,
}

impl ReferenceImageLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut library = Self::new();
        for name in names {
            library.add(name);
        }
        library
    }

    pub fn add(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
