//! Published link directory (description → URL).

/// Links every fresh process starts with.
pub const DEFAULT_LINKS: &[(&str, &str)] = &[
    (
        "W3Schools Python (English)",
        "https://www.w3schools.com/python/",
    ),
    (
        "CS50 (Harvard Computer Science Course)",
        "https://cs50.harvard.edu/",
    ),
    (
        "OOP in Python (Object-Oriented Programming)",
        "https://realpython.com/python3-object-oriented-programming/",
    ),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub description: String,
    pub url: String,
}

/// Ordered description → URL mapping.
///
/// Insertion order is display order. Inserting an existing description keeps
/// its position and replaces the URL. There is no removal path.
#[derive(Clone, Debug, Default)]
pub struct LinkDirectory {
    entries: Vec<DirectoryEntry>,
}

impl LinkDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut dir = Self::new();
        for &(description, url) in DEFAULT_LINKS {
            dir.insert(description, url);
        }
        dir
    }

    pub fn insert(&mut self, description: impl Into<String>, url: impl Into<String>) {
        let description = description.into();
        let url = url.into();
        match self
            .entries
            .iter_mut()
            .find(|e| e.description == description)
        {
            Some(existing) => existing.url = url,
            None => self.entries.push(DirectoryEntry { description, url }),
        }
    }

    pub fn get(&self, description: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.description == description)
            .map(|e| e.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
