//! Static FAQ document used to answer free-form questions.

use std::path::Path;

/// The FAQ text loaded at startup. Empty when the file could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqDocument {
    content: String,
}

impl FaqDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Loads the document, falling back to an empty one on any read error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "FAQ document loaded");
                Self { content }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "FAQ document unavailable, answering without it");
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
