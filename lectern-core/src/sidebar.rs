use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::{SidebarSection, SiteConfig};
use crate::links::CONTENT_EXTENSION;
use crate::markdown::page_title;

#[derive(Debug)]
pub enum ScanError {
    Io(std::io::Error),
    MissingDirectory(PathBuf),
    InvalidPath(PathBuf),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "IO error: {}", e),
            ScanError::MissingDirectory(p) => {
                write!(f, "Sidebar source directory not found: {}", p.display())
            }
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

/// One sidebar entry, as the host pipeline consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub text: String,
    pub link: String,
}

/// A labelled group of sidebar entries, auto-populated from one content
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub label: String,
    pub items: Vec<NavItem>,
}

/// Fills sidebar sections from the content directory: every markdown
/// file under a section's source directory becomes one entry, titled by
/// its first heading and linked by its canonical local path.
pub struct SidebarScanner {
    content_dir: PathBuf,
    base_path: String,
}

impl SidebarScanner {
    pub fn new<P: AsRef<Path>>(content_dir: P, site: &SiteConfig) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            base_path: site.base_path.clone(),
        }
    }

    pub fn scan(&self, sections: &[SidebarSection]) -> Result<Vec<NavSection>, ScanError> {
        println!("Scanning: {}", self.content_dir.display());

        sections
            .iter()
            .map(|section| self.scan_section(section))
            .collect()
    }

    fn scan_section(&self, section: &SidebarSection) -> Result<NavSection, ScanError> {
        let dir = self.content_dir.join(&section.directory);
        if !dir.is_dir() {
            return Err(ScanError::MissingDirectory(dir));
        }

        let mut items = Vec::new();
        for path in markdown_files(&dir) {
            let relative = path
                .strip_prefix(&self.content_dir)
                .map_err(|_| ScanError::InvalidPath(path.clone()))?;
            let content = std::fs::read_to_string(&path)?;
            let text = page_title(&content)
                .or_else(|| file_stem(relative))
                .ok_or_else(|| ScanError::InvalidPath(path.clone()))?;
            items.push(NavItem {
                text,
                link: self.page_link(relative),
            });
        }

        Ok(NavSection {
            label: section.label.clone(),
            items,
        })
    }

    /// Canonical local path for a page: the base path verbatim, then the
    /// lowercased relative path with the extension replaced by a trailing
    /// separator. An index file collapses to its directory's path.
    fn page_link(&self, relative: &Path) -> String {
        let without_ext = if is_index(relative) {
            relative.parent().unwrap_or(Path::new("")).to_path_buf()
        } else {
            relative.with_extension("")
        };

        let mut link = self.base_path.clone();
        for component in without_ext.components() {
            if let Component::Normal(part) = component {
                link.push('/');
                link.push_str(&part.to_string_lossy().to_lowercase());
            }
        }
        link.push('/');
        link
    }
}

fn is_index(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().eq_ignore_ascii_case("index.md"))
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

/// All markdown files under a directory, in stable name order.
fn markdown_files<P: AsRef<Path>>(path: P) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .to_string_lossy()
                    .ends_with(CONTENT_EXTENSION)
        })
    {
        paths.push(entry.path().to_path_buf());
    }

    paths
}
