//! # File Management Module
//!
//! Questo modulo gestisce la discovery delle immagini sorgente e le operazioni sui file.
//!
//! ## Responsabilità:
//! - Scansione NON ricorsiva della directory di input
//! - Filtro per estensione (case-insensitive): JPG, JPEG, PNG
//! - Ordinamento lessicografico per un output deterministico
//! - Preparazione della directory di output
//! - Formattazione human-readable delle dimensioni
//!
//! ## Regole di scansione:
//! - Directory e symlink a directory vengono esclusi
//! - Symlink a file regolari vengono inclusi
//! - Qualsiasi errore di listing è fatale: nessuna scansione parziale
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_source_images(Path::new("/path/to/photos"))?;
//! for file in &files {
//!     println!("{} -> {}.webp", file.file_name(), file.stem());
//! }
//! ```

use crate::error::{ConvertError, ScanError};
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Extensions accepted as conversion sources, lowercase
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// An input image discovered by the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    stem: String,
    extension: String,
}

impl SourceFile {
    /// Build a source file from a path with a supported extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_string();
        if !SOURCE_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            return None;
        }
        let stem = path.file_stem()?.to_string_lossy().to_string();

        Some(Self {
            path: path.to_path_buf(),
            stem,
            extension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without the extension
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Original extension, case preserved
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// Manages source discovery and output directory preparation
pub struct FileManager;

impl FileManager {
    /// Find the convertible images directly inside `input_dir`, sorted by file name
    pub fn find_source_images(input_dir: &Path) -> Result<Vec<SourceFile>, ScanError> {
        let metadata = std::fs::metadata(input_dir)
            .map_err(|e| ScanError::from_io(input_dir.to_path_buf(), e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(input_dir.to_path_buf()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input_dir).to_path_buf();
                match e.into_io_error() {
                    Some(io_err) => ScanError::from_io(path, io_err),
                    None => ScanError::Io {
                        path,
                        source: std::io::Error::new(
                            std::io::ErrorKind::Other,
                            "filesystem loop detected",
                        ),
                    },
                }
            })?;

            // Follows symlinks: a link to a directory is not a file
            if !entry.path().is_file() {
                continue;
            }

            if let Some(source) = SourceFile::from_path(entry.path()) {
                files.push(source);
            }
        }

        Ok(files)
    }

    /// Create the output directory if needed and check it can receive files
    pub async fn prepare_output_dir(output_dir: &Path) -> Result<(), ConvertError> {
        let prep_error = |reason: String| ConvertError::OutputPrep {
            path: output_dir.to_path_buf(),
            reason,
        };

        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| prep_error(e.to_string()))?;

        let metadata = fs::metadata(output_dir)
            .await
            .map_err(|e| prep_error(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(prep_error("not a directory".to_string()));
        }
        if metadata.permissions().readonly() {
            return Err(prep_error("directory is read-only".to_string()));
        }

        Ok(())
    }

    /// Size of a file in bytes, 0 if it cannot be read
    pub async fn file_size(path: &Path) -> u64 {
        fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"data").unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "b.png");
        touch(dir, "a.jpg");
        touch(dir, "c.txt");
        touch(dir, "D.JPEG");
        touch(dir, "noext");
        std::fs::create_dir(dir.join("folder.jpg")).unwrap();
        std::fs::create_dir(dir.join("nested")).unwrap();
        touch(&dir.join("nested"), "deep.jpg");

        let files = FileManager::find_source_images(dir).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();

        assert_eq!(names, vec!["D.JPEG", "a.jpg", "b.png"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = FileManager::find_source_images(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = FileManager::find_source_images(&missing).unwrap_err();
        assert!(matches!(err, ScanError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_scan_file_instead_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.jpg");

        let err = FileManager::find_source_images(&temp_dir.path().join("a.jpg")).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let target = TempDir::new().unwrap();
        touch(target.path(), "real.png");
        std::os::unix::fs::symlink(target.path(), dir.join("linked_dir.jpg")).unwrap();
        std::os::unix::fs::symlink(target.path().join("real.png"), dir.join("link.png")).unwrap();

        let files = FileManager::find_source_images(dir).unwrap();
        let names: Vec<String> = files.iter().map(|f| f.file_name()).collect();

        assert_eq!(names, vec!["link.png"]);
    }

    #[test]
    fn test_source_file_attributes() {
        let source = SourceFile::from_path(Path::new("/photos/holiday.final.JPG")).unwrap();
        assert_eq!(source.stem(), "holiday.final");
        assert_eq!(source.extension(), "JPG");
        assert_eq!(source.file_name(), "holiday.final.JPG");

        assert!(SourceFile::from_path(Path::new("/photos/notes.txt")).is_none());
        assert!(SourceFile::from_path(Path::new("/photos/README")).is_none());
    }

    #[tokio::test]
    async fn test_prepare_output_dir_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out").join("jxl");

        FileManager::prepare_output_dir(&output).await.unwrap();
        assert!(output.is_dir());

        // Already existing is fine
        FileManager::prepare_output_dir(&output).await.unwrap();
    }

    #[tokio::test]
    async fn test_prepare_output_dir_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "out");

        let err = FileManager::prepare_output_dir(&temp_dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::OutputPrep { .. }));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
