use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::host::Workspace;

fn get_modified_time(path: &Path) -> Option<u64> {
    fs::metadata(path)
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
}

/// Resolves a file reference (a `file://` URI or a plain path) to a path.
/// Relative plain paths are taken relative to `root`.
pub fn resolve_ref(root: &Path, file: &str) -> PathBuf {
    if file.starts_with("file:")
        && let Ok(url) = Url::parse(file)
        && let Ok(path) = url.to_file_path()
    {
        return path;
    }
    let path = PathBuf::from(file);
    if path.is_absolute() { path } else { root.join(path) }
}

/// File-system backed workspace rooted at a directory
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, file: &str) -> PathBuf {
        resolve_ref(&self.root, file)
    }
}

impl Workspace for FsWorkspace {
    fn read_text(&self, file: &str) -> Result<String> {
        let path = self.resolve(file);
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn display_path(&self, file: &str) -> String {
        let path = self.resolve(file);
        path.strip_prefix(&self.root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn absolute_path(&self, file: &str) -> String {
        self.resolve(file).to_string_lossy().to_string()
    }

    fn modified(&self, file: &str) -> u64 {
        get_modified_time(&self.resolve(file)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_plain_and_uri_refs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir(temp_dir.path().join("src"))?;
        fs::write(temp_dir.path().join("src/main.rs"), "fn main() {}\n")?;

        let ws = FsWorkspace::new(temp_dir.path());
        let absolute = ws.root().join("src/main.rs");
        let uri = Url::from_file_path(&absolute).unwrap().to_string();

        assert_eq!(ws.read_text("src/main.rs")?, "fn main() {}\n");
        assert_eq!(ws.read_text(&uri)?, "fn main() {}\n");
        assert_eq!(ws.display_path(&uri), "src/main.rs");
        assert_eq!(ws.absolute_path("src/main.rs"), absolute.to_string_lossy());
        assert_eq!(ws.line_count(&uri)?, 2);
        assert!(ws.modified("src/main.rs") > 0);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let ws = FsWorkspace::new(temp_dir.path());
        assert!(ws.read_text("nope.rs").is_err());
        assert_eq!(ws.modified("nope.rs"), 0);
    }

    #[test]
    fn test_outside_root_keeps_full_path() {
        let temp_dir = TempDir::new().unwrap();
        let ws = FsWorkspace::new(temp_dir.path().join("inner"));
        let outside = temp_dir.path().join("other.rs");
        let shown = ws.display_path(&outside.to_string_lossy());
        assert!(shown.ends_with("other.rs"));
        assert!(Path::new(&shown).is_absolute());
    }
}
