// this_file: src/fonts.rs

//! Font loading, family resolution, and caching.
//!
//! This module provides zero-copy font loading via memory mapping, a
//! concurrent cache of loaded font instances, and resolution of a style's
//! font family name to a font file on disk.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use dashmap::DashMap;
use harfbuzz_rs::{Face as HbFace, Owned};
use memmap2::Mmap;
use read_fonts::{FileRef, FontRef};
use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Memory-mapped font loader with an instance cache.
pub struct FontLoader {
    cache: Arc<DashMap<String, Arc<FontInstance>>>,
    max_capacity: usize,
    current_size: Arc<AtomicUsize>,
}

/// Font cache statistics for observability.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Maximum number of cached font instances.
    pub capacity: usize,
    /// Currently cached font instances.
    pub entries: usize,
}

/// A loaded font: parsed tables plus a pre-built HarfBuzz font.
pub struct FontInstance {
    /// Memory-mapped font data
    #[allow(dead_code)]
    mmap: Arc<Mmap>,
    /// Font reference (zero-copy view into mmap)
    font_ref: FontRef<'static>,
    /// Cached HarfBuzz font (built once so measurement never re-parses)
    hb_font: Arc<Mutex<Owned<harfbuzz_rs::Font<'static>>>>,
    /// Path the instance was loaded from
    path: Utf8PathBuf,
}

impl std::fmt::Debug for FontInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontInstance")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FontLoader {
    /// Create a new font loader with specified cache size.
    pub fn new(cache_size: usize) -> Self {
        let cache_size = cache_size.max(1);
        Self {
            cache: Arc::new(DashMap::with_capacity(cache_size)),
            max_capacity: cache_size,
            current_size: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Load a font file, returning a cached instance if available.
    pub fn load_font(&self, path: &Utf8Path) -> Result<Arc<FontInstance>> {
        let cache_key = path.to_string();

        // Fast path: lock-free cache read
        if let Some(instance) = self.cache.get(&cache_key) {
            return Ok(Arc::clone(instance.value()));
        }

        // Slow path: load from disk
        let instance = Arc::new(Self::load_font_impl(path)?);

        // Store in cache with simple size-based eviction
        let current = self.current_size.fetch_add(1, Ordering::Relaxed);
        if current >= self.max_capacity {
            if let Some(first_key) = self.cache.iter().next().map(|e| e.key().clone()) {
                self.cache.remove(&first_key);
                self.current_size.fetch_sub(1, Ordering::Relaxed);
            }
        }

        self.cache.insert(cache_key, Arc::clone(&instance));
        Ok(instance)
    }

    /// Clear all cached font instances.
    pub fn clear(&self) {
        self.cache.clear();
        self.current_size.store(0, Ordering::Relaxed);
    }

    /// Return current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.max_capacity,
            entries: self.cache.len(),
        }
    }

    /// Internal implementation: memory-map and parse a font file.
    fn load_font_impl(path: &Utf8Path) -> Result<FontInstance> {
        let std_path = path.as_std_path();
        let file = File::open(std_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FontNotFound {
                path: std_path.to_path_buf(),
            },
            _ => Error::Font(format!("Failed to open font {}: {}", path, e)),
        })?;

        let mmap = unsafe {
            Mmap::map(&file)
                .map_err(|e| Error::Font(format!("Failed to mmap font {}: {}", path, e)))?
        };
        let mmap = Arc::new(mmap);

        // Convert mmap bytes to 'static lifetime (safe because mmap is Arc'd
        // and lives as long as the instance)
        let font_data: &'static [u8] =
            unsafe { std::slice::from_raw_parts(mmap.as_ptr(), mmap.len()) };

        let file_ref = FileRef::new(font_data)
            .map_err(|e| Error::Font(format!("Failed to parse font file {}: {}", path, e)))?;

        let font_ref = match file_ref {
            FileRef::Font(f) => f,
            FileRef::Collection(c) => c.get(0).map_err(|e| {
                Error::Font(format!("Failed to get font from collection {}: {}", path, e))
            })?,
        };

        let hb_font = Self::create_harfbuzz_font(&mmap);

        Ok(FontInstance {
            mmap,
            font_ref,
            hb_font: Arc::new(Mutex::new(hb_font)),
            path: path.to_owned(),
        })
    }

    /// Create a HarfBuzz font from memory-mapped data.
    fn create_harfbuzz_font(mmap: &Arc<Mmap>) -> Owned<harfbuzz_rs::Font<'static>> {
        let font_data: &'static [u8] =
            unsafe { std::slice::from_raw_parts(mmap.as_ptr(), mmap.len()) };
        let face = HbFace::from_bytes(font_data, 0);
        harfbuzz_rs::Font::new(face)
    }
}

impl FontInstance {
    /// Get the font reference.
    pub fn font_ref(&self) -> &FontRef<'static> {
        &self.font_ref
    }

    /// Get reference to the cached HarfBuzz font.
    pub fn hb_font(&self) -> &Arc<Mutex<Owned<harfbuzz_rs::Font<'static>>>> {
        &self.hb_font
    }

    /// Get the raw font data bytes.
    pub fn font_data(&self) -> &[u8] {
        self.mmap.as_ref()
    }

    /// Path the instance was loaded from.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// Resolves a style's font family name to a font file.
///
/// Scans configured directories for `.ttf`/`.otf` files whose stem matches
/// the family name (case-insensitive, ignoring spaces and dashes). Pinned
/// families take precedence over directory scans.
pub struct FontCatalog {
    dirs: Vec<Utf8PathBuf>,
    pinned: HashMap<String, Utf8PathBuf>,
}

impl FontCatalog {
    /// Catalog over the platform's conventional font directories.
    pub fn system() -> Self {
        let mut dirs = vec![
            Utf8PathBuf::from("/usr/share/fonts"),
            Utf8PathBuf::from("/usr/local/share/fonts"),
            Utf8PathBuf::from("/System/Library/Fonts"),
            Utf8PathBuf::from("/Library/Fonts"),
            Utf8PathBuf::from("C:\\Windows\\Fonts"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(Utf8PathBuf::from(format!("{}/.fonts", home)));
            dirs.push(Utf8PathBuf::from(format!("{}/.local/share/fonts", home)));
        }
        Self {
            dirs,
            pinned: HashMap::new(),
        }
    }

    /// Catalog over explicit directories only.
    pub fn with_dirs(dirs: Vec<Utf8PathBuf>) -> Self {
        Self {
            dirs,
            pinned: HashMap::new(),
        }
    }

    /// Add a directory to scan.
    pub fn add_dir(&mut self, dir: Utf8PathBuf) {
        self.dirs.push(dir);
    }

    /// Pin a family name directly to a font file, bypassing the scan.
    pub fn pin_family(&mut self, family: impl Into<String>, path: Utf8PathBuf) {
        self.pinned.insert(normalize(&family.into()), path);
    }

    /// Resolve a family name to a font file path.
    pub fn resolve(&self, family: &str) -> Result<Utf8PathBuf> {
        let needle = normalize(family);
        if needle.is_empty() {
            return Err(Error::InvalidParameter(
                "font family must not be empty".to_string(),
            ));
        }

        if let Some(path) = self.pinned.get(&needle) {
            return Ok(path.clone());
        }

        let mut candidates = Vec::new();
        for dir in &self.dirs {
            collect_fonts(dir.as_std_path(), &needle, 0, &mut candidates);
        }

        if candidates.is_empty() {
            return Err(Error::Font(format!(
                "No font file found for family '{}'",
                family
            )));
        }

        // Exact stem match wins; otherwise shortest (then lexicographic)
        // prefix match, so "Literata" prefers Literata.ttf over
        // Literata-BoldItalic.ttf. Deterministic for a fixed directory tree.
        candidates.sort_by(|a, b| {
            let exact_a = normalize(a.0.as_str()) == needle;
            let exact_b = normalize(b.0.as_str()) == needle;
            exact_b
                .cmp(&exact_a)
                .then(a.0.len().cmp(&b.0.len()))
                .then(a.1.cmp(&b.1))
        });
        Ok(candidates.remove(0).1)
    }

    /// List every resolvable family stem under the configured directories.
    pub fn list_families(&self) -> Vec<String> {
        let mut stems = Vec::new();
        for dir in &self.dirs {
            collect_fonts(dir.as_std_path(), "", 0, &mut stems);
        }
        let mut families: Vec<String> = stems.into_iter().map(|(stem, _)| stem).collect();
        families.sort();
        families.dedup();
        families
    }
}

const MAX_SCAN_DEPTH: u32 = 4;

/// Lowercase a family or file stem, dropping spaces, dashes, and underscores.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Recursively collect font files whose normalized stem starts with `needle`.
/// An empty needle collects everything.
fn collect_fonts(dir: &std::path::Path, needle: &str, depth: u32, out: &mut Vec<(String, Utf8PathBuf)>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fonts(&path, needle, depth + 1, out);
            continue;
        }
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
            .unwrap_or(false);
        if !ext_ok {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if needle.is_empty() || normalize(stem).starts_with(needle) {
            if let Ok(utf8) = Utf8PathBuf::from_path_buf(path.clone()) {
                out.push((stem.to_string(), utf8));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &std::path::Path, name: &str) {
        fs::write(dir.join(name), b"stub").unwrap();
    }

    #[test]
    fn test_font_loader_creation() {
        let loader = FontLoader::new(256);
        let stats = loader.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.capacity, 256);
    }

    #[test]
    fn missing_font_file_reports_not_found() {
        let loader = FontLoader::new(4);
        let err = loader
            .load_font(Utf8Path::new("/nonexistent/NoSuchFont.ttf"))
            .unwrap_err();
        assert!(matches!(err, Error::FontNotFound { .. }));
    }

    #[test]
    fn normalize_folds_case_and_separators() {
        assert_eq!(normalize("DejaVu Sans"), "dejavusans");
        assert_eq!(normalize("Literata-Bold_Italic"), "literatabolditalic");
    }

    #[test]
    fn catalog_resolves_exact_stem_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Literata-Bold.ttf");
        touch(dir.path(), "Literata.ttf");
        touch(dir.path(), "Lora.ttf");

        let catalog =
            FontCatalog::with_dirs(vec![Utf8PathBuf::from_path_buf(dir.path().into()).unwrap()]);
        let resolved = catalog.resolve("Literata").unwrap();
        assert!(resolved.as_str().ends_with("Literata.ttf"));
    }

    #[test]
    fn catalog_matches_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "DejaVuSans.ttf");

        let catalog =
            FontCatalog::with_dirs(vec![Utf8PathBuf::from_path_buf(dir.path().into()).unwrap()]);
        let resolved = catalog.resolve("dejavu sans").unwrap();
        assert!(resolved.as_str().ends_with("DejaVuSans.ttf"));
    }

    #[test]
    fn catalog_scans_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("lora");
        fs::create_dir_all(&nested).unwrap();
        touch(&nested, "Lora-Regular.otf");

        let catalog =
            FontCatalog::with_dirs(vec![Utf8PathBuf::from_path_buf(dir.path().into()).unwrap()]);
        let resolved = catalog.resolve("Lora").unwrap();
        assert!(resolved.as_str().ends_with("Lora-Regular.otf"));
    }

    #[test]
    fn catalog_errors_for_unknown_family() {
        let dir = tempfile::tempdir().unwrap();
        let catalog =
            FontCatalog::with_dirs(vec![Utf8PathBuf::from_path_buf(dir.path().into()).unwrap()]);
        assert!(matches!(
            catalog.resolve("NoSuchFamily"),
            Err(Error::Font(_))
        ));
    }

    #[test]
    fn pinned_family_bypasses_scan() {
        let mut catalog = FontCatalog::with_dirs(vec![]);
        catalog.pin_family("Literata", Utf8PathBuf::from("/tmp/custom.ttf"));
        assert_eq!(
            catalog.resolve("literata").unwrap(),
            Utf8PathBuf::from("/tmp/custom.ttf")
        );
    }

    #[test]
    fn list_families_dedups_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "B.ttf");
        touch(dir.path(), "A.ttf");
        touch(dir.path(), "notes.txt");

        let catalog =
            FontCatalog::with_dirs(vec![Utf8PathBuf::from_path_buf(dir.path().into()).unwrap()]);
        assert_eq!(catalog.list_families(), vec!["A".to_string(), "B".to_string()]);
    }
}
