//! In-memory queue of pending link/PDF suggestions.
//!
//! Users address suggestions by their 1-based position in the current
//! listing. Positions shift after every removal, so each position is resolved
//! to a [`SuggestionId`] first and the removal itself is done by id.

use std::fmt;

use crate::directory::LinkDirectory;

/// Process-unique suggestion identifier. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuggestionId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionKind {
    Link,
    Pdf,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionKind::Link => f.write_str("link"),
            SuggestionKind::Pdf => f.write_str("PDF"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSuggestion {
    pub url: String,
    pub description: String,
    pub author: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfSuggestion {
    pub description: String,
    pub file_reference: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no attachment accompanies the suggestion")]
    MissingAttachment,

    #[error("no pending suggestions")]
    NoPendingSuggestions,

    #[error("{kind} suggestion {id:?} is no longer pending")]
    UnknownSuggestion { kind: SuggestionKind, id: SuggestionId },

    #[error("{kind} suggestion index {index} is outside 1..={len}")]
    IndexOutOfRange {
        kind: SuggestionKind,
        index: i64,
        len: usize,
    },
}

#[derive(Clone, Debug)]
pub struct Pending<T> {
    pub id: SuggestionId,
    pub item: T,
}

#[derive(Clone, Debug)]
struct Queue<T> {
    kind: SuggestionKind,
    entries: Vec<Pending<T>>,
}

impl<T> Queue<T> {
    fn new(kind: SuggestionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    fn resolve(&self, index: i64) -> Result<SuggestionId, RegistryError> {
        let len = self.entries.len();
        let out_of_range = RegistryError::IndexOutOfRange {
            kind: self.kind,
            index,
            len,
        };
        let pos = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .ok_or_else(|| out_of_range.clone())?;
        self.entries
            .get(pos)
            .map(|p| p.id)
            .ok_or(out_of_range)
    }

    fn take(&mut self, id: SuggestionId) -> Option<T> {
        let pos = self.entries.iter().position(|p| p.id == id)?;
        Some(self.entries.remove(pos).item)
    }
}

/// Snapshot of the pending queues, in display order.
#[derive(Clone, Debug)]
pub struct PendingListing<'a> {
    pub links: &'a [Pending<LinkSuggestion>],
    pub pdfs: &'a [Pending<PdfSuggestion>],
}

#[derive(Clone, Debug)]
pub struct SuggestionRegistry {
    next_id: u64,
    links: Queue<LinkSuggestion>,
    pdfs: Queue<PdfSuggestion>,
}

impl Default for SuggestionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            links: Queue::new(SuggestionKind::Link),
            pdfs: Queue::new(SuggestionKind::Pdf),
        }
    }

    fn allocate_id(&mut self) -> SuggestionId {
        let id = SuggestionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn submit_link(
        &mut self,
        url: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> SuggestionId {
        let id = self.allocate_id();
        self.links.entries.push(Pending {
            id,
            item: LinkSuggestion {
                url: url.into(),
                description: description.into(),
                author: author.into(),
            },
        });
        id
    }

    pub fn submit_pdf(
        &mut self,
        description: impl Into<String>,
        author: impl Into<String>,
        attachment: Option<String>,
    ) -> Result<SuggestionId, RegistryError> {
        let file_reference = attachment.ok_or(RegistryError::MissingAttachment)?;
        let id = self.allocate_id();
        self.pdfs.entries.push(Pending {
            id,
            item: PdfSuggestion {
                description: description.into(),
                file_reference,
                author: author.into(),
            },
        });
        Ok(id)
    }

    pub fn list(&self) -> Result<PendingListing<'_>, RegistryError> {
        if self.is_empty() {
            return Err(RegistryError::NoPendingSuggestions);
        }
        Ok(PendingListing {
            links: &self.links.entries,
            pdfs: &self.pdfs.entries,
        })
    }

    /// Remove the link shown at `index` and publish it into `directory`.
    pub fn approve_link(
        &mut self,
        index: i64,
        directory: &mut LinkDirectory,
    ) -> Result<LinkSuggestion, RegistryError> {
        let id = self.links.resolve(index)?;
        self.approve_link_by_id(id, directory)
    }

    pub fn approve_link_by_id(
        &mut self,
        id: SuggestionId,
        directory: &mut LinkDirectory,
    ) -> Result<LinkSuggestion, RegistryError> {
        let link = self.links.take(id).ok_or(RegistryError::UnknownSuggestion {
            kind: SuggestionKind::Link,
            id,
        })?;
        directory.insert(link.description.clone(), link.url.clone());
        Ok(link)
    }

    /// Remove the PDF shown at `index`. Approved PDFs are not stored anywhere.
    pub fn approve_pdf(&mut self, index: i64) -> Result<PdfSuggestion, RegistryError> {
        let id = self.pdfs.resolve(index)?;
        self.approve_pdf_by_id(id)
    }

    pub fn approve_pdf_by_id(&mut self, id: SuggestionId) -> Result<PdfSuggestion, RegistryError> {
        self.pdfs.take(id).ok_or(RegistryError::UnknownSuggestion {
            kind: SuggestionKind::Pdf,
            id,
        })
    }

    pub fn pending_links(&self) -> usize {
        self.links.entries.len()
    }

    pub fn pending_pdfs(&self) -> usize {
        self.pdfs.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.entries.is_empty() && self.pdfs.entries.is_empty()
    }
}
