//! System paths and version metadata
//!
//! Fields are byte-bounded: values longer than the bound are truncated at
//! the last character boundary that fits.

use std::fmt;
use std::ops::Deref;
use std::path::Path;

/// String of at most `N` bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedString<const N: usize>(String);

impl<const N: usize> BoundedString<N> {
    /// Maximum length in bytes
    pub const CAPACITY: usize = N;

    /// Copy `value`, truncated to fit
    pub fn new(value: &str) -> Self {
        let mut end = value.len().min(N);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        if end < value.len() {
            log::debug!("Truncating {:?} to {} bytes", value, N);
        }
        Self(value[..end].to_string())
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bound of every path field
pub const PATH_MAX: usize = 256;
/// Bound of every version field
pub const VERSION_MAX: usize = 64;

type PathField = BoundedString<PATH_MAX>;
type VersionField = BoundedString<VERSION_MAX>;

/// Locations the editor reads from and writes to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemPaths {
    /// Running executable
    pub exe_path: PathField,
    /// Scratch directory
    pub temp_dir: PathField,
    /// Icon images
    pub icons_path: PathField,
    /// Bundled data files
    pub datafiles_path: PathField,
    /// Stage opened at startup
    pub stage_path: PathField,
}

impl SystemPaths {
    /// Paths derived from the running executable
    ///
    /// Data files live in `datafiles/` next to the executable and icons in
    /// `datafiles/icons/`.
    pub fn detect() -> Self {
        let exe = std::env::current_exe().unwrap_or_default();
        let root = exe.parent().map(Path::to_path_buf).unwrap_or_default();
        let datafiles = root.join("datafiles");
        Self {
            exe_path: PathField::new(&exe.to_string_lossy()),
            temp_dir: PathField::new(&std::env::temp_dir().to_string_lossy()),
            icons_path: PathField::new(&datafiles.join("icons").to_string_lossy()),
            datafiles_path: PathField::new(&datafiles.to_string_lossy()),
            stage_path: PathField::default(),
        }
    }

    /// Replace the icon directory
    pub fn with_icons_path(mut self, path: &str) -> Self {
        self.icons_path = PathField::new(path);
        self
    }

    /// Set the stage to open at startup
    pub fn with_stage_path(mut self, path: &str) -> Self {
        self.stage_path = PathField::new(path);
        self
    }
}

/// Build and version identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemVersion {
    /// Source revision the binary was built from
    pub build_hash: VersionField,
    /// Editor version
    pub kraken_version: VersionField,
    /// Scene runtime version
    pub pixar_version: VersionField,
    /// Seconds since the Unix epoch at startup
    pub launch_time: u64,
}

impl SystemVersion {
    /// Version of this build, launched now
    pub fn current(build_hash: &str, pixar_version: &str) -> Self {
        let launch_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self {
            build_hash: VersionField::new(build_hash),
            kraken_version: VersionField::new(env!("CARGO_PKG_VERSION")),
            pixar_version: VersionField::new(pixar_version),
            launch_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_values_are_kept() {
        let field = BoundedString::<8>::new("abc");
        assert_eq!(field.as_str(), "abc");
        assert_eq!(BoundedString::<8>::CAPACITY, 8);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // "é" is two bytes; a 3 byte bound cannot split the second one.
        let field = BoundedString::<3>::new("aéé");
        assert_eq!(field.as_str(), "aé");
        assert_eq!(BoundedString::<4>::new("abcdef").len(), 4);
    }

    #[test]
    fn test_path_fields_are_bounded() {
        let long = "x".repeat(400);
        let paths = SystemPaths::default().with_stage_path(&long);
        assert_eq!(paths.stage_path.len(), PATH_MAX);
    }

    #[test]
    fn test_current_version() {
        let version = SystemVersion::current("abc123", "24.08");
        assert_eq!(version.kraken_version.as_str(), env!("CARGO_PKG_VERSION"));
        assert_eq!(version.build_hash.as_str(), "abc123");
        assert!(version.launch_time > 0);
    }

    #[test]
    fn test_detect_points_into_datafiles() {
        let paths = SystemPaths::detect();
        assert!(paths.icons_path.ends_with("icons"));
        assert!(paths.stage_path.is_empty());
    }
}
