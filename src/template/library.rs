//! Loading named templates from a directory.
//!
//! Every `png`/`jpg`/`jpeg` file becomes one template named after its file
//! stem. Problems never abort loading: a missing directory, an unreadable
//! file, or an empty result each produce a `TemplateWarning` and matching
//! simply has fewer (or no) templates to work with.

use crate::raster::io::load_gray_image;
use crate::template::Template;
use crate::trace::trace_warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const TEMPLATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A non-fatal problem encountered while loading templates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateWarning {
    /// File or directory the warning refers to.
    pub path: PathBuf,
    /// Human-readable description.
    pub reason: String,
}

/// Immutable-after-load map from template name to decoded template.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, Template>,
    warnings: Vec<TemplateWarning>,
}

impl TemplateLibrary {
    /// Creates a library with no templates and no warnings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every template image found directly inside `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mut library = Self::empty();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                library.warn(dir, format!("templates directory not readable: {err}"));
                library.warn(dir, "no templates loaded".to_string());
                return library;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for ext in TEMPLATE_EXTENSIONS {
            for path in files.iter().filter(|p| has_extension(p, ext)) {
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    library.warn(path, "file name is not valid UTF-8".to_string());
                    continue;
                };
                match load_gray_image(path).and_then(Template::from_gray) {
                    Ok(template) => {
                        library.templates.insert(name.to_string(), template);
                    }
                    Err(err) => library.warn(path, format!("failed to load template: {err}")),
                }
            }
        }

        if library.templates.is_empty() {
            library.warn(dir, "no templates loaded".to_string());
        }
        library
    }

    fn warn(&mut self, path: &Path, reason: String) {
        trace_warn!(
            "template warning",
            path = path.display().to_string().as_str(),
            reason = reason.as_str()
        );
        self.warnings.push(TemplateWarning {
            path: path.to_path_buf(),
            reason,
        });
    }

    /// Adds or replaces a template, returning the previous one with that name.
    pub fn insert(&mut self, name: impl Into<String>, template: Template) -> Option<Template> {
        self.templates.insert(name.into(), template)
    }

    /// Removes a template by name.
    pub fn remove(&mut self, name: &str) -> Option<Template> {
        self.templates.remove(name)
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, template)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when no templates are loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Warnings collected while loading.
    pub fn warnings(&self) -> &[TemplateWarning] {
        &self.warnings
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::TemplateLibrary;
    use image::{GrayImage, Luma};
    use std::fs;

    #[test]
    fn missing_directory_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let library = TemplateLibrary::load_dir(dir.path().join("nope"));
        assert!(library.is_empty());
        assert_eq!(library.warnings().len(), 2);
        assert!(library.warnings()[1].reason.contains("no templates"));
    }

    #[test]
    fn loads_images_and_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let img = GrayImage::from_fn(16, 12, |x, y| Luma([(x * 9 + y * 5) as u8]));
        img.save(dir.path().join("pe_stamp.png")).unwrap();
        fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let library = TemplateLibrary::load_dir(dir.path());
        assert_eq!(library.names(), vec!["pe_stamp"]);
        assert_eq!(library.get("pe_stamp").unwrap().width(), 16);
        assert_eq!(library.warnings().len(), 1);
        assert!(library.warnings()[0].path.ends_with("broken.jpg"));
    }

    #[test]
    fn insert_and_remove() {
        let mut library = TemplateLibrary::empty();
        let tpl = crate::template::Template::new((0u8..100).collect(), 10, 10).unwrap();
        assert!(library.insert("a", tpl).is_none());
        assert_eq!(library.len(), 1);
        assert!(library.remove("a").is_some());
        assert!(library.remove("a").is_none());
    }
}
