//! Directory walking and output path mirroring.

use std::collections::{BTreeSet, VecDeque};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::pipeline::normalize_extension;

/// A source directory tree filtered by an extension allow-list.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    extensions: BTreeSet<String>,
    excluded: Option<PathBuf>,
}

impl SourceTree {
    /// Open a source tree.
    ///
    /// `extensions` are matched case-insensitively against file extensions;
    /// a leading dot is optional.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRoot`] if `root` is missing, is not a directory,
    /// or cannot be listed.
    pub fn open<P: Into<PathBuf>, S: AsRef<str>>(root: P, extensions: &[S]) -> Result<Self> {
        let root = root.into();

        let metadata = fs::metadata(&root).map_err(|err| Error::SourceRoot {
            path: root.clone(),
            reason: err.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(Error::SourceRoot {
                path: root,
                reason: "not a directory".to_string(),
            });
        }
        fs::read_dir(&root).map_err(|err| Error::SourceRoot {
            path: root.clone(),
            reason: err.to_string(),
        })?;

        let extensions = extensions
            .iter()
            .map(|ext| normalize_extension(&ext.as_ref().to_lowercase()))
            .collect();

        Ok(Self {
            root,
            extensions,
            excluded: None,
        })
    }

    /// Leave out `dir` and everything below it when it lies inside the tree.
    ///
    /// Used to keep the output tree out of the walk when it is nested in the
    /// source tree. `dir` must exist; paths are compared after
    /// canonicalization.
    #[must_use]
    pub fn exclude(mut self, dir: &Path) -> Self {
        let (Ok(root), Ok(dir)) = (fs::canonicalize(&self.root), fs::canonicalize(dir)) else {
            return self;
        };
        match dir.strip_prefix(&root) {
            Ok(relative) if !relative.as_os_str().is_empty() => {
                tracing::debug!("Excluding {} from the walk", relative.display());
                self.excluded = Some(relative.to_path_buf());
            }
            Ok(_) => tracing::warn!(
                "Target directory {} is the source directory; tiles land next to their sources",
                dir.display()
            ),
            Err(_) => {}
        }
        self
    }

    /// Whether `path` carries an allow-listed extension.
    #[must_use]
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .map(|ext| normalize_extension(&ext.to_lowercase()))
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Directories that contain at least one image, bottom-up.
    ///
    /// Entries are visited in file-name order and a directory is yielded
    /// once everything below it has been, so subdirectories come before
    /// their parent. Symlinks are followed. Unreadable entries (including
    /// broken links and link loops) are logged and skipped, and an excluded
    /// subtree is never descended into.
    pub fn directories(&self) -> impl Iterator<Item = SourceDir> + '_ {
        let mut entries = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(entry.path()));

        // open[d] collects the files of the directory at depth d on the current path
        let mut open: Vec<PendingDir> = Vec::new();
        let mut finished: VecDeque<PendingDir> = VecDeque::new();

        std::iter::from_fn(move || loop {
            if let Some(dir) = finished.pop_front() {
                return Some(dir);
            }
            match entries.next() {
                Some(Ok(entry)) => {
                    while open.len() > entry.depth() {
                        finished.extend(open.pop());
                    }
                    if entry.file_type().is_dir() {
                        open.push(PendingDir {
                            path: entry.into_path(),
                            files: Vec::new(),
                        });
                    } else if entry.file_type().is_file() {
                        if let Some(parent) = open.last_mut() {
                            parent.files.push(entry.into_path());
                        }
                    }
                }
                Some(Err(source)) => {
                    let err = Error::Walk {
                        path: source.path().unwrap_or(&self.root).to_path_buf(),
                        source,
                    };
                    tracing::warn!("{err}, skipping");
                }
                None if open.is_empty() => return None,
                None => finished.extend(open.drain(..).rev()),
            }
        })
        .filter_map(move |dir| self.finish_dir(dir))
    }

    /// Every image in the tree, in the same order as [`Self::directories`].
    pub fn images(&self) -> impl Iterator<Item = SourceImage> + '_ {
        self.directories().flat_map(|dir| dir.images)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.as_deref().is_some_and(|excluded| {
            path.strip_prefix(&self.root)
                .is_ok_and(|relative| relative.starts_with(excluded))
        })
    }

    fn finish_dir(&self, dir: PendingDir) -> Option<SourceDir> {
        let relative_dir = dir
            .path
            .strip_prefix(&self.root)
            .map_or_else(|_| PathBuf::new(), Path::to_path_buf);

        let file_count = dir.files.len();
        let images: Vec<SourceImage> = dir
            .files
            .into_iter()
            .filter(|p| self.is_image(p))
            .map(|p| SourceImage {
                path: p,
                relative_dir: relative_dir.clone(),
            })
            .collect();

        if images.is_empty() {
            return None;
        }

        Some(SourceDir {
            path: dir.path,
            file_count,
            images,
        })
    }
}

/// A directory whose files are still being collected by the walk.
#[derive(Debug)]
struct PendingDir {
    path: PathBuf,
    files: Vec<PathBuf>,
}

/// One directory of the source tree and the images directly inside it.
#[derive(Debug, Clone)]
pub struct SourceDir {
    /// Directory path as walked (prefixed by the tree root).
    pub path: PathBuf,
    /// Number of files directly in the directory, images or not. Symlinks
    /// count when they resolve to a file.
    pub file_count: usize,
    /// Images in file-name order.
    pub images: Vec<SourceImage>,
}

/// An image file discovered below the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    path: PathBuf,
    relative_dir: PathBuf,
}

impl SourceImage {
    /// Path of the source file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Containing directory relative to the source root.
    #[must_use]
    pub fn relative_dir(&self) -> &Path {
        &self.relative_dir
    }

    /// File name without its extension.
    #[must_use]
    pub fn stem(&self) -> &OsStr {
        self.path.file_stem().unwrap_or_default()
    }

    /// Output pattern mirroring this image under `target_root`.
    #[must_use]
    pub fn tile_pattern(&self, target_root: &Path, target_extension: &str) -> TilePattern {
        TilePattern::new(
            target_root.join(&self.relative_dir),
            self.stem(),
            target_extension,
        )
    }
}

/// Numbered output file names for the tiles of one image:
/// `<dir>/<stem>-NNN<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePattern {
    dir: PathBuf,
    stem: OsString,
    extension: String,
}

impl TilePattern {
    /// `extension` gets a leading dot if it lacks one.
    #[must_use]
    pub fn new<P: Into<PathBuf>, S: AsRef<OsStr>>(dir: P, stem: S, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.as_ref().to_os_string(),
            extension: normalize_extension(extension),
        }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the tile with 1-based `index`, zero-padded to three digits.
    #[must_use]
    pub fn path_for(&self, index: usize) -> PathBuf {
        let mut name = self.stem.clone();
        name.push(format!("-{index:03}{}", self.extension));
        self.dir.join(name)
    }
}

impl fmt::Display for TilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-NNN{}",
            self.dir.join(&self.stem).display(),
            self.extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.png"));
        touch(&root.join("notes.txt"));
        touch(&root.join("sub").join("B.JPG"));
        touch(&root.join("sub").join("deeper").join("c.png"));
        touch(&root.join("empty").join("readme.md"));
        dir
    }

    #[test]
    fn test_images_bottom_up_and_filtered() {
        let dir = sample_tree();
        let tree = SourceTree::open(dir.path(), &["png", ".jpg"]).unwrap();

        let found: Vec<(PathBuf, PathBuf)> = tree
            .images()
            .map(|img| {
                (
                    img.relative_dir().to_path_buf(),
                    img.path().file_name().unwrap().into(),
                )
            })
            .collect();

        assert_eq!(
            found,
            vec![
                (PathBuf::from("sub/deeper"), PathBuf::from("c.png")),
                (PathBuf::from("sub"), PathBuf::from("B.JPG")),
                (PathBuf::new(), PathBuf::from("a.png")),
            ]
        );
    }

    #[test]
    fn test_directories_count_all_files() {
        let dir = sample_tree();
        let tree = SourceTree::open(dir.path(), &["png"]).unwrap();

        let root_dir = tree.directories().last().unwrap();

        assert_eq!(root_dir.file_count, 2);
        assert_eq!(root_dir.images.len(), 1);
        assert!(tree.directories().all(|d| !d.path.ends_with("empty")));
    }

    #[test]
    fn test_excluded_subtree_is_skipped() {
        let dir = sample_tree();
        let converted = dir.path().join("sub").join("converted");
        touch(&converted.join("a-001.png"));

        let tree = SourceTree::open(dir.path(), &["png", "jpg"])
            .unwrap()
            .exclude(&converted);

        assert_eq!(tree.images().count(), 3);
        assert!(tree.images().all(|img| !img.path().starts_with(&converted)));
    }

    #[test]
    fn test_exclude_outside_tree_is_ignored() {
        let dir = sample_tree();
        let elsewhere = tempfile::tempdir().unwrap();

        let tree = SourceTree::open(dir.path(), &["png", "jpg"])
            .unwrap()
            .exclude(elsewhere.path());

        assert_eq!(tree.images().count(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_is_skipped() {
        let dir = sample_tree();
        let sub = dir.path().join("sub");
        std::os::unix::fs::symlink(sub.join("gone.png"), sub.join("A-ghost.png")).unwrap();

        let tree = SourceTree::open(dir.path(), &["png", "jpg"]).unwrap();
        let names: Vec<PathBuf> = tree
            .images()
            .map(|img| img.path().file_name().unwrap().into())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("c.png"),
                PathBuf::from("B.JPG"),
                PathBuf::from("a.png"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_file_is_walked_and_counted() {
        let dir = sample_tree();
        std::os::unix::fs::symlink(dir.path().join("a.png"), dir.path().join("z.png")).unwrap();

        let tree = SourceTree::open(dir.path(), &["png"]).unwrap();
        let root_dir = tree.directories().last().unwrap();

        assert_eq!(root_dir.file_count, 3);
        assert_eq!(root_dir.images.len(), 2);
        assert!(root_dir.images[1].path().ends_with("z.png"));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let tree = SourceTree::open(dir.path(), &["JPEG"]).unwrap();

        assert!(tree.is_image(Path::new("x/photo.jpeg")));
        assert!(tree.is_image(Path::new("x/photo.JpEg")));
        assert!(!tree.is_image(Path::new("x/photo.png")));
        assert!(!tree.is_image(Path::new("x/jpeg")));
    }

    #[test]
    fn test_missing_root_fails_fast() {
        let err = SourceTree::open("/nonexistent/tilecutter/root", &["png"]).unwrap_err();

        assert!(matches!(err, Error::SourceRoot { .. }));
    }

    #[test]
    fn test_file_root_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("image.png");
        touch(&file);

        let err = SourceTree::open(&file, &["png"]).unwrap_err();

        assert!(matches!(err, Error::SourceRoot { .. }));
    }

    #[test]
    fn test_tile_pattern_mirrors_relative_dir() {
        let image = SourceImage {
            path: PathBuf::from("/data/src/sub/photo.jpeg"),
            relative_dir: PathBuf::from("sub"),
        };

        let pattern = image.tile_pattern(Path::new("/data/out"), ".png");

        assert_eq!(pattern.dir(), Path::new("/data/out/sub"));
        assert_eq!(pattern.path_for(1), PathBuf::from("/data/out/sub/photo-001.png"));
        assert_eq!(pattern.path_for(42), PathBuf::from("/data/out/sub/photo-042.png"));
        assert_eq!(pattern.path_for(1234), PathBuf::from("/data/out/sub/photo-1234.png"));
    }

    #[test]
    fn test_tile_pattern_adds_missing_dot() {
        let pattern = TilePattern::new("out", "img", "webp");

        assert_eq!(pattern.path_for(7), PathBuf::from("out/img-007.webp"));
        assert_eq!(pattern.to_string(), format!("{}-NNN.webp", Path::new("out/img").display()));
    }
}
