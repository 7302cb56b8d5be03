use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug)]
pub enum ScanError {
    IoError(std::io::Error),
    MissingSource(PathBuf),
    InvalidPath(PathBuf),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::IoError(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::IoError(e) => write!(f, "IO error: {}", e),
            ScanError::MissingSource(p) => {
                write!(f, "Source directory does not exist: {}", p.display())
            }
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// A file found under a filesystem source, addressed by its path relative to
/// the source root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
}

pub struct SourceScanner {
    root: PathBuf,
}

impl SourceScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Markdown files, recursively. A missing source directory is an error;
    /// an empty one is just an empty site section.
    pub fn markdown_files(&self) -> Result<Vec<SourceFile>, ScanError> {
        self.files_with_extensions(&["md", "markdown"])
    }

    pub fn image_files(&self) -> Result<Vec<SourceFile>, ScanError> {
        self.files_with_extensions(&IMAGE_EXTENSIONS)
    }

    fn files_with_extensions(&self, extensions: &[&str]) -> Result<Vec<SourceFile>, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::MissingSource(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path().is_file()
                    && e.path()
                        .extension()
                        .map(|ext| {
                            let ext = ext.to_string_lossy().to_lowercase();
                            extensions.contains(&ext.as_str())
                        })
                        .unwrap_or(false)
            })
        {
            let path = entry.path().to_path_buf();
            let relative = path
                .strip_prefix(&self.root)
                .map_err(|_| ScanError::InvalidPath(path.clone()))?;
            files.push(SourceFile {
                name: relative.to_string_lossy().replace('\\', "/"),
                path,
            });
        }

        Ok(files)
    }
}
