//! Retrieval of imported documents
//!
//! The engine never touches the filesystem directly: `import` elements are
//! resolved through a [`DocumentLoader`]. [`FileLoader`] reads JSON document
//! trees from disk; [`MemoryLoader`] serves trees registered in memory.

use crate::document::DocNode;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading an imported document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Reading the document failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid JSON document tree.
    #[error("Failed to parse '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A retrieved document
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Canonical identity, used for cycle detection and as the importer of
    /// nested imports
    pub id: String,
    pub root: DocNode,
}

/// Resolves import references to document trees
pub trait DocumentLoader: Send + Sync {
    /// Load `reference` as imported by the document identified by `importer`.
    fn load(&self, reference: &str, importer: Option<&str>) -> Result<LoadedDocument, LoadError>;

    /// Canonical identity of a top-level document reference
    fn canonical_id(&self, reference: &str) -> String {
        reference.to_string()
    }
}

/// Loads JSON document trees from the filesystem, relative to the importer
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    base_dir: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve top-level relative references against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, reference: &str, importer: Option<&str>) -> PathBuf {
        let reference = Path::new(reference);
        if reference.is_absolute() {
            return reference.to_path_buf();
        }

        let importer_dir = importer
            .map(Path::new)
            .and_then(Path::parent)
            .map(Path::to_path_buf);
        match importer_dir.or_else(|| self.base_dir.clone()) {
            Some(dir) => dir.join(reference),
            None => reference.to_path_buf(),
        }
    }
}

impl DocumentLoader for FileLoader {
    fn load(&self, reference: &str, importer: Option<&str>) -> Result<LoadedDocument, LoadError> {
        let path = self.resolve(reference, importer);
        let display = path.display().to_string();

        if !path.exists() {
            return Err(LoadError::NotFound(display));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: display.clone(),
            source,
        })?;
        let root: DocNode = serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: display.clone(),
            source,
        })?;

        let id = canonical_path(&path);
        Ok(LoadedDocument { id, root })
    }

    fn canonical_id(&self, reference: &str) -> String {
        canonical_path(&self.resolve(reference, None))
    }
}

fn canonical_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Serves documents registered by name
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: BTreeMap<String, DocNode>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, name: impl Into<String>, root: DocNode) -> Self {
        self.insert(name, root);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, root: DocNode) {
        self.documents.insert(name.into(), root);
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, reference: &str, _importer: Option<&str>) -> Result<LoadedDocument, LoadError> {
        self.documents
            .get(reference)
            .map(|root| LoadedDocument {
                id: reference.to_string(),
                root: root.clone(),
            })
            .ok_or_else(|| LoadError::NotFound(reference.to_string()))
    }
}
