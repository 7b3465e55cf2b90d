use crate::error::Error;
use crate::policy::ConflictPolicy;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Make `dir` ready to receive copies under `policy`.
///
/// A missing directory is created (with parents). An existing one with
/// entries fails under `Fail`, is emptied under `OverwriteClear` and left
/// alone under `Append`.
pub fn prepare_destination(dir: &Path, policy: ConflictPolicy) -> Result<(), Error> {
    if dir.exists() {
        let entries: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<_>>()?;

        if !entries.is_empty() {
            match policy {
                ConflictPolicy::Fail => {
                    return Err(Error::DestinationNotEmpty(dir.to_path_buf()));
                }
                ConflictPolicy::OverwriteClear => {
                    info!("Deleting files in destination folder {}", dir.display());
                    for entry in &entries {
                        debug!("Removing {}", entry.display());
                        if entry.is_dir() {
                            fs::remove_dir_all(entry)?;
                        } else {
                            fs::remove_file(entry)?;
                        }
                    }
                }
                ConflictPolicy::Append => {
                    debug!("Appending files to existing destination");
                }
            }
        }
    }

    fs::create_dir_all(dir)?;
    Ok(())
}

/// Copy `src` into `dir` as `name`, returning the path written.
///
/// Under `Append` a taken name is retried as `<stem>-<n>.<ext>` for
/// n = 1, 2, ... until a free one is found. Under any other policy a taken
/// name is a `NameCollision` error. Existing files are never overwritten.
pub fn place_file(
    src: &Path,
    dir: &Path,
    name: &str,
    policy: ConflictPolicy,
) -> Result<PathBuf, Error> {
    let mut counter: u32 = 0;
    loop {
        let candidate = if counter == 0 {
            name.to_string()
        } else {
            collision_name(name, counter)
        };
        let dst = dir.join(&candidate);
        debug!("Attempting to copy {} -> {}", src.display(), dst.display());

        match copy_file(src, &dst) {
            Ok(bytes) => {
                debug!("Copied {} bytes to {}", bytes, dst.display());
                return Ok(dst);
            }
            Err(Error::NameCollision(taken)) if policy == ConflictPolicy::Append => {
                debug!("Filename collision at {}", taken.display());
                counter += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// `photo.jpg` → `photo-<n>.jpg`; names without an extension get `-<n>`
/// appended.
pub fn collision_name(name: &str, counter: u32) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{}-{}.{}",
            stem.to_string_lossy(),
            counter,
            ext.to_string_lossy()
        ),
        _ => format!("{}-{}", name, counter),
    }
}

/// Copy a regular file to a destination that must not exist yet.
fn copy_file(src: &Path, dst: &Path) -> Result<u64, Error> {
    let copy_failed = |source: io::Error| Error::CopyFailed {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(src).map_err(copy_failed)?;
    if !metadata.is_file() {
        return Err(Error::NotRegularFile(src.to_path_buf()));
    }

    let mut source = File::open(src).map_err(copy_failed)?;
    let mut destination = match OpenOptions::new().write(true).create_new(true).open(dst) {
        Ok(f) => f,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::NameCollision(dst.to_path_buf()));
        }
        Err(err) => return Err(copy_failed(err)),
    };

    match io::copy(&mut source, &mut destination) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            drop(destination);
            let _ = fs::remove_file(dst);
            Err(copy_failed(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collision_names() {
        assert_eq!(collision_name("photo.jpg", 1), "photo-1.jpg");
        assert_eq!(collision_name("archive.tar.gz", 2), "archive.tar-2.gz");
        assert_eq!(collision_name("README", 3), "README-3");
        assert_eq!(collision_name(".bashrc", 1), ".bashrc-1");
    }

    #[test]
    fn test_prepare_creates_missing_destination() {
        let tmp = tempdir().unwrap();
        let dst = tmp.path().join("a/b/out");
        prepare_destination(&dst, ConflictPolicy::Fail).unwrap();
        assert!(dst.is_dir());
    }

    #[test]
    fn test_prepare_fail_on_non_empty_leaves_contents() {
        let tmp = tempdir().unwrap();
        let dst = tmp.path().join("out");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("keep.txt"), "keep").unwrap();

        let err = prepare_destination(&dst, ConflictPolicy::Fail).unwrap_err();
        assert!(matches!(err, Error::DestinationNotEmpty(_)));
        assert_eq!(fs::read_to_string(dst.join("keep.txt")).unwrap(), "keep");
    }

    #[test]
    fn test_prepare_fail_accepts_empty_existing_folder() {
        let tmp = tempdir().unwrap();
        prepare_destination(tmp.path(), ConflictPolicy::Fail).unwrap();
    }

    #[test]
    fn test_prepare_overwrite_clear_empties_folder() {
        let tmp = tempdir().unwrap();
        let dst = tmp.path().join("out");
        fs::create_dir_all(dst.join("nested")).unwrap();
        fs::write(dst.join("old.txt"), "old").unwrap();
        fs::write(dst.join("nested/older.txt"), "older").unwrap();

        prepare_destination(&dst, ConflictPolicy::OverwriteClear).unwrap();

        assert!(dst.is_dir());
        assert_eq!(fs::read_dir(&dst).unwrap().count(), 0);
    }

    #[test]
    fn test_append_renames_on_collision() {
        let tmp = tempdir().unwrap();
        let src_a = tmp.path().join("a");
        let src_b = tmp.path().join("b");
        let dst = tmp.path().join("out");
        fs::create_dir_all(&src_a).unwrap();
        fs::create_dir_all(&src_b).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("existing.txt"), "existing").unwrap();
        fs::write(src_a.join("pic.jpg"), "from a").unwrap();
        fs::write(src_b.join("pic.jpg"), "from b").unwrap();

        prepare_destination(&dst, ConflictPolicy::Append).unwrap();
        let first =
            place_file(&src_a.join("pic.jpg"), &dst, "pic.jpg", ConflictPolicy::Append).unwrap();
        let second =
            place_file(&src_b.join("pic.jpg"), &dst, "pic.jpg", ConflictPolicy::Append).unwrap();

        assert_eq!(first, dst.join("pic.jpg"));
        assert_eq!(second, dst.join("pic-1.jpg"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "from a");
        assert_eq!(fs::read_to_string(&second).unwrap(), "from b");
        assert_eq!(fs::read_to_string(dst.join("existing.txt")).unwrap(), "existing");
        // Sources untouched
        assert_eq!(fs::read_to_string(src_a.join("pic.jpg")).unwrap(), "from a");
    }

    #[test]
    fn test_collision_without_append_is_an_error() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("out");
        fs::create_dir_all(&dst).unwrap();
        fs::write(&src, "new").unwrap();
        fs::write(dst.join("src.txt"), "old").unwrap();

        let err = place_file(&src, &dst, "src.txt", ConflictPolicy::OverwriteClear).unwrap_err();
        assert!(matches!(err, Error::NameCollision(_)));
        assert_eq!(fs::read_to_string(dst.join("src.txt")).unwrap(), "old");
    }

    #[test]
    fn test_missing_source_is_copy_failure() {
        let tmp = tempdir().unwrap();
        let err = place_file(
            &tmp.path().join("vanished.txt"),
            tmp.path(),
            "vanished.txt",
            ConflictPolicy::Append,
        )
        .unwrap_err();
        assert!(matches!(err, Error::CopyFailed { .. }));
    }

    #[test]
    fn test_directory_source_is_not_regular() {
        let tmp = tempdir().unwrap();
        let dir_src = tmp.path().join("folder");
        fs::create_dir_all(&dir_src).unwrap();
        let dst = tmp.path().join("out");
        fs::create_dir_all(&dst).unwrap();

        let err = place_file(&dir_src, &dst, "folder", ConflictPolicy::Append).unwrap_err();
        assert!(matches!(err, Error::NotRegularFile(_)));
    }
}
