//! Icon registry
//!
//! Icons are looked up by name from any thread, including background
//! loaders. A single mutex guards every lookup and insertion.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Errors raised while loading icons
#[derive(thiserror::Error, Debug)]
pub enum IconError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding failed
    #[error("Failed to decode icon '{name}': {reason}")]
    Decode {
        /// Icon name
        name: String,
        /// Decoder message
        reason: String,
    },

    /// File name has no usable stem
    #[error("Invalid icon path: {0}")]
    InvalidPath(String),
}

/// RGBA icon image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// Lookup name
    pub name: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA8 pixels, row-major
    pub pixels: Vec<u8>,
}

impl Icon {
    /// Decode an icon from encoded image bytes
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, IconError> {
        let name = name.into();
        let image = image::load_from_memory(bytes).map_err(|e| IconError::Decode {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self { name, width, height, pixels: rgba.into_raw() })
    }

    /// Solid color icon
    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            name: name.into(),
            width,
            height,
            pixels: color.repeat(count),
        }
    }
}

/// Shared name → icon table
#[derive(Debug, Default)]
pub struct IconRegistry {
    icons: Mutex<HashMap<String, Arc<Icon>>>,
}

impl IconRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Icon>>> {
        self.icons.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Icon registered under `name`
    pub fn lookup(&self, name: &str) -> Option<Arc<Icon>> {
        self.lock().get(name).cloned()
    }

    /// Register an icon, replacing any icon of the same name
    pub fn insert(&self, icon: Icon) -> Arc<Icon> {
        let icon = Arc::new(icon);
        self.lock().insert(icon.name.clone(), Arc::clone(&icon));
        icon
    }

    /// Number of registered icons
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Load an image file, registered under its file stem
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Arc<Icon>, IconError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| IconError::InvalidPath(path.display().to_string()))?
            .to_string();

        // Decode outside the lock.
        let image = image::open(path).map_err(|e| IconError::Decode {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Loaded icon '{}' {}x{} from {:?}", name, width, height, path);

        Ok(self.insert(Icon { name, width, height, pixels: rgba.into_raw() }))
    }

    /// Load every `.png` in `dir`
    ///
    /// Files that fail to decode are skipped with a warning. Returns how many
    /// icons were registered.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize, IconError> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if !is_png {
                continue;
            }
            match self.load_file(&path) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("Skipping icon {:?}: {}", path, e),
            }
        }
        log::info!("Loaded {} icons from {:?}", loaded, dir.as_ref());
        Ok(loaded)
    }
}
