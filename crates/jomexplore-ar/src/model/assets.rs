use std::io;
use std::path::{Path, PathBuf};

/// Read-only store of model assets addressed by relative path.
pub trait AssetSource: Send {
    /// Size of the asset in bytes.
    fn size(&self, path: &str) -> io::Result<u64>;

    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Assets stored under a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let rel = Path::new(path);
        if rel.is_absolute() || rel.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset path escapes the asset root: {path}"),
            ));
        }
        Ok(self.root.join(rel))
    }
}

impl AssetSource for DirAssetSource {
    fn size(&self, path: &str) -> io::Result<u64> {
        let meta = std::fs::metadata(self.resolve(path)?)?;
        if !meta.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("not a file: {path}")));
        }
        Ok(meta.len())
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path)?)
    }
}

/// Empty store. Every model falls back to its procedural geometry.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn size(&self, path: &str) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_rejects_escaping_paths() {
        let src = DirAssetSource::new(std::env::temp_dir());
        assert_eq!(src.size("../etc/passwd").unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn dir_source_reports_missing_files() {
        let src = DirAssetSource::new(std::env::temp_dir().join("jomexplore-no-such-dir"));
        assert!(src.size("ar_assets/blue_mosque.glb").is_err());
    }
}
