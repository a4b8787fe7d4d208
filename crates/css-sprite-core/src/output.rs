use crate::compositing::flatten_onto;
use crate::error::{Result, SpriteError};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, warn};

/// True for formats whose encoder keeps an alpha channel.
pub fn format_has_alpha(format: ImageFormat) -> bool {
    !matches!(format, ImageFormat::Jpeg | ImageFormat::Pnm)
}

/// Encode the canvas in the format implied by `path`'s extension.
///
/// Formats without alpha get the canvas flattened onto `background`. An
/// empty (0x0) canvas encodes to zero bytes since no raster format can hold it;
/// the extension is still required to name a known format.
pub fn encode_image(canvas: &RgbaImage, path: &Path, background: [u8; 3]) -> Result<Vec<u8>> {
    let format = ImageFormat::from_path(path).map_err(|e| SpriteError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;
    if canvas.width() == 0 || canvas.height() == 0 {
        return Ok(Vec::new());
    }
    let image = if format_has_alpha(format) {
        DynamicImage::ImageRgba8(canvas.clone())
    } else {
        DynamicImage::ImageRgb8(flatten_onto(canvas, background))
    };
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .map_err(|e| SpriteError::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(buf.into_inner())
}

fn parent_dir(dest: &Path) -> &Path {
    match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// A fully written temporary file waiting to be renamed onto `dest`.
/// Dropping it without [`Staged::commit`] deletes the temporary file.
pub struct Staged {
    tmp: NamedTempFile,
    dest: PathBuf,
}

/// A destination that now holds the new bytes.
///
/// `backup` holds whatever file was there before; dropping it discards the
/// old contents, [`Committed::roll_back`] puts them back.
pub struct Committed {
    dest: PathBuf,
    backup: Option<TempPath>,
}

impl Staged {
    /// Write `bytes` to a temporary file next to `dest`.
    pub fn write(dest: &Path, bytes: &[u8]) -> Result<Self> {
        let dir = parent_dir(dest);
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SpriteError::io(dir, e))?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SpriteError::io(dest, e))?;
        debug!(tmp = ?tmp.path(), dest = ?dest, "staged");
        Ok(Self {
            tmp,
            dest: dest.to_path_buf(),
        })
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Atomically rename onto the destination.
    ///
    /// An existing file at `dest` is first moved to a backup in the same
    /// directory. If the rename fails the backup is moved back.
    pub fn commit(self) -> Result<Committed> {
        let dest = self.dest;
        let backup = set_aside(&dest)?;
        if let Err(e) = self.tmp.persist(&dest) {
            if let Some(b) = backup {
                restore(b, &dest);
            }
            return Err(SpriteError::io(&dest, e.error));
        }
        Ok(Committed { dest, backup })
    }
}

impl Committed {
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Undo the commit: restore the previous file, or remove the new one
    /// when there was none.
    pub fn roll_back(self) {
        match self.backup {
            Some(b) => restore(b, &self.dest),
            None => {
                if let Err(rm) = fs::remove_file(&self.dest) {
                    warn!(path = ?self.dest, error = %rm, "could not remove partial output");
                }
            }
        }
    }
}

fn set_aside(dest: &Path) -> Result<Option<TempPath>> {
    if !dest.is_file() {
        return Ok(None);
    }
    let dir = parent_dir(dest);
    let backup = NamedTempFile::new_in(dir)
        .map_err(|e| SpriteError::io(dir, e))?
        .into_temp_path();
    fs::rename(dest, &backup).map_err(|e| SpriteError::io(dest, e))?;
    debug!(dest = ?dest, backup = ?backup.to_path_buf(), "previous output set aside");
    Ok(Some(backup))
}

fn restore(backup: TempPath, dest: &Path) {
    match fs::rename(&backup, dest) {
        Ok(()) => {
            // path now belongs to `dest`; disarm the guard
            let _ = backup.keep();
        }
        Err(e) => {
            warn!(path = ?dest, error = %e, "could not restore previous output");
        }
    }
}

/// Write all artifacts or none.
///
/// Every artifact is staged first; renames happen only once all staging
/// succeeded. If a later rename fails, the already committed destinations are
/// returned to their previous state: restored when a file existed before,
/// removed otherwise.
pub fn write_all_or_nothing(artifacts: &[(&Path, &[u8])]) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for (dest, bytes) in artifacts {
        staged.push(Staged::write(dest, bytes)?);
    }
    let mut committed: Vec<Committed> = Vec::with_capacity(staged.len());
    for s in staged {
        match s.commit() {
            Ok(c) => committed.push(c),
            Err(e) => {
                for c in committed.into_iter().rev() {
                    c.roll_back();
                }
                return Err(e);
            }
        }
    }
    Ok(committed.into_iter().map(|c| c.dest).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn commits_every_artifact() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "old").unwrap();
        let written = write_all_or_nothing(&[
            (a.as_path(), b"one".as_slice()),
            (b.as_path(), b"two".as_slice()),
        ])
        .unwrap();
        assert_eq!(written, vec![a.clone(), b.clone()]);
        assert_eq!(fs::read_to_string(&a).unwrap(), "one");
        assert_eq!(fs::read_to_string(&b).unwrap(), "two");
        assert_eq!(entries(dir.path()), ["a.txt", "b.txt"]);
    }

    #[test]
    fn failed_rename_restores_earlier_destinations() {
        let dir = TempDir::new().unwrap();
        let kept = dir.path().join("kept.txt");
        let fresh = dir.path().join("fresh.txt");
        let blocked = dir.path().join("blocked");
        fs::write(&kept, "previous").unwrap();
        fs::create_dir(&blocked).unwrap();

        let bytes = b"new".as_slice();
        let err = write_all_or_nothing(&[
            (kept.as_path(), bytes),
            (fresh.as_path(), bytes),
            (blocked.as_path(), bytes),
        ])
        .unwrap_err();
        assert!(matches!(err, SpriteError::Io { ref path, .. } if path == &blocked));
        assert_eq!(fs::read_to_string(&kept).unwrap(), "previous");
        assert!(!fresh.exists());
        assert!(blocked.is_dir());
        assert_eq!(entries(dir.path()), ["blocked", "kept.txt"]);
    }

    #[test]
    fn empty_canvas_still_checks_the_extension() {
        let empty = RgbaImage::new(0, 0);
        assert!(encode_image(&empty, Path::new("out.png"), [255; 3]).unwrap().is_empty());
        let err = encode_image(&empty, Path::new("out.xyz"), [255; 3]).unwrap_err();
        assert!(matches!(err, SpriteError::Encode { .. }));
    }
}
