//! Registry of resource codecs keyed by format tag.
//!
//! The registry is populated once by the embedding application and read
//! concurrently afterwards. Tags are compared case-insensitively.
//!
//! ```rust
//! use transolution::Registry;
//!
//! let registry = Registry::with_defaults();
//! assert!(registry.select("RESX").is_some());
//! assert!(registry.select("xliff").is_none());
//! assert_eq!(registry.keys(), vec!["csv", "resx"]);
//! ```

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use crate::{
    formats::{CsvCodec, FormatType, ResxCodec},
    traits::ResourceCodec,
};

/// Thread-safe mapping from format tag to codec.
#[derive(Default)]
pub struct Registry {
    codecs: RwLock<BTreeMap<String, Arc<dyn ResourceCodec>>>,
}

fn normalize(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in `resx` and `csv` codecs.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(FormatType::Resx.to_string(), Arc::new(ResxCodec::default()));
        registry.register(FormatType::Csv.to_string(), Arc::new(CsvCodec::default()));
        registry
    }

    /// Registers `codec` under `tag`, returning the codec it replaced.
    pub fn register(
        &self,
        tag: impl AsRef<str>,
        codec: Arc<dyn ResourceCodec>,
    ) -> Option<Arc<dyn ResourceCodec>> {
        self.codecs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(tag.as_ref()), codec)
    }

    /// Looks up the codec for `tag`. Unknown tags yield `None`.
    pub fn select(&self, tag: &str) -> Option<Arc<dyn ResourceCodec>> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize(tag))
            .cloned()
    }

    /// Looks up the codec registered for the extension of `path`.
    pub fn select_for_path(&self, path: impl AsRef<Path>) -> Option<Arc<dyn ResourceCodec>> {
        let extension = path.as_ref().extension()?.to_str()?;
        self.select(extension)
    }

    /// All registered tags, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// All registered codecs, in tag order.
    pub fn values(&self) -> Vec<Arc<dyn ResourceCodec>> {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Returns the process-wide registry with the built-in codecs.
///
/// The registry is built on first access.
pub fn default_registry() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(Registry::with_defaults)
}
