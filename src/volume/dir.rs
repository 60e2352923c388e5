// CLASSIFICATION: COMMUNITY
// Filename: dir.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Host-directory volumes.
//!
//! Maps volume identifiers to existing directories so collectors can
//! run on a host or in simulation without block devices. Mount state is
//! tracked so callers can check that every mount was released. A volume
//! registered read-only refuses writable mounts, the way a
//! write-protected device does.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use super::VolumeMounter;

/// [`VolumeMounter`] over plain host directories.
#[derive(Debug, Default)]
pub struct DirVolumes {
    roots: HashMap<String, PathBuf>,
    read_only: HashSet<String>,
    /// Mounted roots and whether each was mounted writable.
    mounted: Mutex<HashMap<PathBuf, bool>>,
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "volume table lock poisoned")
}

impl DirVolumes {
    /// Empty volume table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dir` as the backing directory of `volume`.
    pub fn with_volume(mut self, volume: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.roots.insert(volume.into(), dir.into());
        self
    }

    /// Register `dir` as a volume that only mounts read-only.
    pub fn with_read_only_volume(
        mut self,
        volume: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        let volume = volume.into();
        self.read_only.insert(volume.clone());
        self.roots.insert(volume, dir.into());
        self
    }

    /// True if `volume` is currently mounted.
    pub fn is_mounted(&self, volume: &str) -> bool {
        match (self.roots.get(volume), self.mounted.lock()) {
            (Some(root), Ok(set)) => set.contains_key(root),
            _ => false,
        }
    }

    /// True if `volume` is currently mounted writable.
    pub fn is_writable(&self, volume: &str) -> bool {
        match (self.roots.get(volume), self.mounted.lock()) {
            (Some(root), Ok(set)) => set.get(root).copied().unwrap_or(false),
            _ => false,
        }
    }

    /// Number of volumes currently mounted.
    pub fn mounted_count(&self) -> usize {
        self.mounted.lock().map(|set| set.len()).unwrap_or(0)
    }
}

impl VolumeMounter for DirVolumes {
    fn mount(&self, volume: &str, writable: bool) -> io::Result<PathBuf> {
        let root = self.roots.get(volume).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("volume {:?} not registered", volume),
            )
        })?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("volume directory {:?} missing", root),
            ));
        }
        if writable && self.read_only.contains(volume) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("volume {:?} is read-only", volume),
            ));
        }
        let mut set = self.mounted.lock().map_err(|_| poisoned())?;
        if set.contains_key(root) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("volume {:?} already mounted", volume),
            ));
        }
        set.insert(root.clone(), writable);
        debug!("volume: {} attached at {:?} (writable={})", volume, root, writable);
        Ok(root.clone())
    }

    fn unmount(&self, mount_root: &Path, _force: bool, _lazy: bool) -> io::Result<()> {
        let mut set = self.mounted.lock().map_err(|_| poisoned())?;
        if set.remove(mount_root).is_some() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} is not mounted", mount_root),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{persist, PersistError};

    #[test]
    fn mount_and_unmount_track_state() {
        let dir = tempfile::tempdir().unwrap();
        let vols = DirVolumes::new().with_volume("vol0", dir.path());

        let root = vols.mount("vol0", true).unwrap();
        assert_eq!(root, dir.path());
        assert!(vols.is_mounted("vol0"));
        assert!(vols.mount("vol0", true).is_err());

        vols.unmount(&root, true, false).unwrap();
        assert!(!vols.is_mounted("vol0"));
        assert_eq!(vols.mounted_count(), 0);
    }

    #[test]
    fn unknown_volume_is_not_found() {
        let vols = DirVolumes::new();
        let err = vols.mount("sdz", true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn double_unmount_fails() {
        let dir = tempfile::tempdir().unwrap();
        let vols = DirVolumes::new().with_volume("vol0", dir.path());
        let root = vols.mount("vol0", false).unwrap();
        vols.unmount(&root, true, false).unwrap();
        assert!(vols.unmount(&root, true, false).is_err());
    }

    #[test]
    fn read_only_volume_refuses_writable_mount() {
        let dir = tempfile::tempdir().unwrap();
        let vols = DirVolumes::new().with_read_only_volume("ro0", dir.path());

        let err = vols.mount("ro0", true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!vols.is_mounted("ro0"));

        let root = vols.mount("ro0", false).unwrap();
        assert!(vols.is_mounted("ro0"));
        assert!(!vols.is_writable("ro0"));
        vols.unmount(&root, true, false).unwrap();
    }

    #[test]
    fn writable_flag_is_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let vols = DirVolumes::new().with_volume("vol0", dir.path());
        let root = vols.mount("vol0", true).unwrap();
        assert!(vols.is_writable("vol0"));
        vols.unmount(&root, true, false).unwrap();
        assert!(!vols.is_writable("vol0"));
    }

    #[test]
    fn persist_to_read_only_volume_fails_to_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let vols = DirVolumes::new().with_read_only_volume("ro0", dir.path());

        let err = persist(&vols, b"evidence", "ro0:/boot/cpuid.txt", "cpuid.txt")
            .unwrap_err();

        assert!(matches!(err, PersistError::Resolve { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
