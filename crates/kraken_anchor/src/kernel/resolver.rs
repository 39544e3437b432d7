//! Asset path resolution boundary
//!
//! The scene runtime owns real asset resolution; the window layer only needs
//! a way to turn a dropped or configured asset path into a file on disk.

use std::path::{Path, PathBuf};

/// Turns an asset path into a concrete location
pub trait AssetResolver {
    /// Resolved path, `None` if the asset cannot be found
    fn resolve(&self, asset_path: &str) -> Option<String>;
}

/// Resolver that tries each search directory in order
#[derive(Debug, Clone, Default)]
pub struct SearchPathResolver {
    search_paths: Vec<PathBuf>,
}

impl SearchPathResolver {
    /// Resolver with no search paths; only absolute paths resolve
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search directory
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    /// Search directories in lookup order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl AssetResolver for SearchPathResolver {
    fn resolve(&self, asset_path: &str) -> Option<String> {
        if asset_path.is_empty() {
            return None;
        }
        let path = Path::new(asset_path);
        if path.is_absolute() {
            return path.exists().then(|| asset_path.to_string());
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists())
            .map(|found| found.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_in_search_order() {
        let root = std::env::temp_dir().join(format!("kraken_resolver_{}", std::process::id()));
        let first = root.join("first");
        let second = root.join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(second.join("shot.usda"), "#usda 1.0").unwrap();

        let resolver = SearchPathResolver::new().with_search_path(&first).with_search_path(&second);
        let resolved = resolver.resolve("shot.usda").unwrap();
        assert_eq!(PathBuf::from(resolved), second.join("shot.usda"));
        assert!(resolver.resolve("missing.usda").is_none());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_empty_path_does_not_resolve() {
        assert!(SearchPathResolver::new().resolve("").is_none());
    }
}
