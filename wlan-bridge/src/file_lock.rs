use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Advisory lock on a sidecar `<path>.lock` file.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Blocks until the exclusive lock guarding `target` is held.
    pub fn acquire(target: &Path) -> io::Result<Self> {
        let (file, path) = open_lock_file(target)?;
        file.lock_exclusive()?;

        Ok(Self { file, path })
    }

    /// Takes a shared lock guarding `target` without blocking.
    ///
    /// Returns `None` while another holder has it exclusively.
    pub fn try_acquire_shared(target: &Path) -> io::Result<Option<Self>> {
        let (file, path) = open_lock_file(target)?;
        match FileExt::try_lock_shared(&file) {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("Failed to release {}: {e}", self.path.display());
        }
    }
}

fn open_lock_file(target: &Path) -> io::Result<(File, PathBuf)> {
    let path = lock_path(target);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)?;
    Ok((file, path))
}

fn lock_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_sits_next_to_target() {
        let dir = std::env::temp_dir().join(format!("wlan-lock-{}", uuid::Uuid::new_v4()));
        let target = dir.join("permissions.json");

        let lock = FileLock::acquire(&target).unwrap();
        assert_eq!(lock.path(), dir.join("permissions.json.lock"));
        assert!(lock.path().exists());
        drop(lock);

        // Released on drop, so it can be taken again.
        let again = FileLock::acquire(&target).unwrap();
        drop(again);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn shared_lock_is_refused_while_held_exclusively() {
        let dir = std::env::temp_dir().join(format!("wlan-lock-{}", uuid::Uuid::new_v4()));
        let target = dir.join("permissions.json");

        let writer = FileLock::acquire(&target).unwrap();
        assert!(FileLock::try_acquire_shared(&target).unwrap().is_none());
        drop(writer);

        let first = FileLock::try_acquire_shared(&target).unwrap();
        let second = FileLock::try_acquire_shared(&target).unwrap();
        assert!(first.is_some() && second.is_some());
        drop((first, second));
        fs::remove_dir_all(dir).unwrap();
    }
}
