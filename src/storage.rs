use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::bitmap::Bitmap;
use crate::error::{Result, ShadowError};

const COVER_EXTENSION: &str = "bmp";

/// Trait defining where cover images come from and where shadows go
///
/// Cover `index` (0-based) hosts shadow number `index + 1`. Implementations
/// are shared across per-shadow tasks, hence the `Sync` bound; each index is
/// stored by exactly one task.
///
/// # Example
/// ```
/// use std::sync::Mutex;
/// use shadow_share::{Bitmap, ShadowStore};
///
/// struct MemoryStore(Mutex<Vec<Bitmap>>);
///
/// impl ShadowStore for MemoryStore {
///     fn cover_count(&self) -> usize { self.0.lock().unwrap().len() }
///     fn load_cover(&self, index: usize) -> shadow_share::Result<Bitmap> {
///         Ok(self.0.lock().unwrap()[index].clone())
///     }
///     fn store_shadow(&self, index: usize, shadow: &Bitmap) -> shadow_share::Result<()> {
///         self.0.lock().unwrap()[index] = shadow.clone();
///         Ok(())
///     }
/// }
/// ```
pub trait ShadowStore: Sync {
    /// Number of covers available
    fn cover_count(&self) -> usize;

    /// Loads the cover at `index`
    fn load_cover(&self, index: usize) -> Result<Bitmap>;

    /// Persists the finished shadow image for `index`
    fn store_shadow(&self, index: usize, shadow: &Bitmap) -> Result<()>;
}

/// File system implementation of ShadowStore
///
/// Covers are the `.bmp` files of one directory, ordered by file name. That
/// order fixes which shadow number each cover receives. Shadows overwrite
/// their cover file in place: the header and pixel array are rewritten from
/// offset zero and the file is never truncated or extended.
///
/// # Example
/// ```
/// use shadow_share::{Bitmap, FileShadowStore, ShadowStore};
/// use tempfile::tempdir;
///
/// let temp_dir = tempdir().unwrap();
/// let cover = Bitmap::blank(4, 4, 8).unwrap().to_bytes();
/// for name in ["b.bmp", "a.bmp", "notes.txt"] {
///     std::fs::write(temp_dir.path().join(name), &cover).unwrap();
/// }
///
/// let store = FileShadowStore::open(temp_dir.path()).unwrap();
/// assert_eq!(store.cover_count(), 2);
/// assert!(store.paths()[0].ends_with("a.bmp"));
/// ```
pub struct FileShadowStore {
    covers: Vec<PathBuf>,
}

impl FileShadowStore {
    /// Enumerates the covers of `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut covers = Vec::new();

        for entry in fs::read_dir(dir.as_ref())? {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }
            let is_bitmap = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(COVER_EXTENSION));
            if is_bitmap {
                covers.push(path);
            }
        }

        covers.sort_unstable();
        log::debug!(
            "found {} cover images in {}",
            covers.len(),
            dir.as_ref().display()
        );
        Ok(Self { covers })
    }

    /// Keeps only the first `count` covers
    ///
    /// # Errors
    /// [`ShadowError::CoverCountMismatch`] if fewer than `count` exist.
    pub fn with_limit(mut self, count: usize) -> Result<Self> {
        if self.covers.len() < count {
            return Err(ShadowError::CoverCountMismatch {
                needed: count,
                got: self.covers.len(),
            });
        }
        self.covers.truncate(count);
        Ok(self)
    }

    /// Cover paths in shadow order
    pub fn paths(&self) -> &[PathBuf] {
        &self.covers
    }

    /// Whether `path` names one of the covers, after resolving links and
    /// relative components
    ///
    /// # Errors
    /// I/O errors from canonicalizing `path` or a cover path.
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let target = fs::canonicalize(path)?;
        for cover in &self.covers {
            if fs::canonicalize(cover)? == target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn cover_path(&self, index: usize) -> Result<&Path> {
        self.covers
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(ShadowError::CoverCountMismatch {
                needed: index + 1,
                got: self.covers.len(),
            })
    }
}

impl ShadowStore for FileShadowStore {
    fn cover_count(&self) -> usize {
        self.covers.len()
    }

    fn load_cover(&self, index: usize) -> Result<Bitmap> {
        Bitmap::open(self.cover_path(index)?)
    }

    fn store_shadow(&self, index: usize, shadow: &Bitmap) -> Result<()> {
        let path = self.cover_path(index)?;
        let mut file = OpenOptions::new().write(true).open(path)?;
        file.seek(SeekFrom::Start(0))?;

        let mut writer = BufWriter::new(file);
        shadow.write_to(&mut writer)?;
        log::debug!("wrote {} bytes to {}", shadow.file_size(), path.display());
        Ok(())
    }
}
