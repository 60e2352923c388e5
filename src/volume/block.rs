// CLASSIFICATION: COMMUNITY
// Filename: block.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Block-device mounting for Linux.
//!
//! Volumes are named `sda1`, `/dev/sda1`, `UUID=<uuid>` or
//! `LABEL=<label>`. Each mount gets its own freshly created directory
//! under the temp dir; the filesystem type is found by trying every
//! block filesystem the kernel lists in `/proc/filesystems`.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::VolumeMounter;

const PROC_FILESYSTEMS: &str = "/proc/filesystems";

/// [`VolumeMounter`] backed by the kernel `mount(2)` / `umount2(2)` calls.
#[derive(Clone, Debug)]
pub struct BlockDeviceMounter {
    dev_root: PathBuf,
    mount_base: PathBuf,
    filesystems: PathBuf,
}

impl Default for BlockDeviceMounter {
    fn default() -> Self {
        Self {
            dev_root: PathBuf::from("/dev"),
            mount_base: std::env::temp_dir(),
            filesystems: PathBuf::from(PROC_FILESYSTEMS),
        }
    }
}

impl BlockDeviceMounter {
    /// Mounter creating its mount points under `mount_base`.
    pub fn with_mount_base(mount_base: impl Into<PathBuf>) -> Self {
        Self {
            mount_base: mount_base.into(),
            ..Self::default()
        }
    }

    /// Read candidate filesystem types from `list` instead of
    /// `/proc/filesystems`.
    pub fn with_filesystems_list(mut self, list: impl Into<PathBuf>) -> Self {
        self.filesystems = list.into();
        self
    }

    /// Device node for a volume identifier.
    pub fn device_path(&self, volume: &str) -> PathBuf {
        if volume.starts_with('/') {
            PathBuf::from(volume)
        } else if let Some(uuid) = volume.strip_prefix("UUID=") {
            self.dev_root.join("disk/by-uuid").join(uuid)
        } else if let Some(label) = volume.strip_prefix("LABEL=") {
            self.dev_root.join("disk/by-label").join(label)
        } else {
            self.dev_root.join(volume)
        }
    }
}

/// Block filesystems listed in `list`, in file order.
fn block_filesystems(list: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(list)?;
    Ok(parse_filesystems(&text))
}

fn parse_filesystems(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.starts_with("nodev"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn cpath(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))
}

fn sys_mount(device: &Path, target: &Path, fstype: &str, flags: libc::c_ulong) -> io::Result<()> {
    let device = cpath(device)?;
    let target = cpath(target)?;
    let fstype = CString::new(fstype)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "fstype contains NUL"))?;
    // SAFETY: all pointers are valid NUL-terminated strings for the call.
    let rc = unsafe {
        libc::mount(
            device.as_ptr(),
            target.as_ptr(),
            fstype.as_ptr(),
            flags,
            std::ptr::null(),
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

fn sys_umount(target: &Path, flags: libc::c_int) -> io::Result<()> {
    let target = cpath(target)?;
    // SAFETY: target is a valid NUL-terminated string for the call.
    let rc = unsafe { libc::umount2(target.as_ptr(), flags) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

impl VolumeMounter for BlockDeviceMounter {
    fn mount(&self, volume: &str, writable: bool) -> io::Result<PathBuf> {
        let device = self.device_path(volume);
        if !device.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("device {:?} not found", device),
            ));
        }

        let filesystems = block_filesystems(&self.filesystems)?;
        // Dropping the guard removes the mount point on every failure path.
        let mount_point = tempfile::Builder::new()
            .prefix("slaunch-")
            .tempdir_in(&self.mount_base)?;
        let flags = if writable { 0 } else { libc::MS_RDONLY };

        let mut last_err =
            io::Error::new(io::ErrorKind::Unsupported, "no block filesystem available");
        for fstype in &filesystems {
            match sys_mount(&device, mount_point.path(), fstype, flags) {
                Ok(()) => {
                    let mount_root = mount_point.keep();
                    debug!("volume: mounted {:?} ({}) at {:?}", device, fstype, mount_root);
                    return Ok(mount_root);
                }
                Err(e) => last_err = e,
            }
        }
        debug!("volume: no filesystem accepted {:?}: {}", device, last_err);
        Err(last_err)
    }

    fn unmount(&self, mount_root: &Path, force: bool, lazy: bool) -> io::Result<()> {
        let mut flags = 0;
        if force {
            flags |= libc::MNT_FORCE;
        }
        if lazy {
            flags |= libc::MNT_DETACH;
        }
        sys_umount(mount_root, flags)?;
        if let Err(e) = fs::remove_dir(mount_root) {
            warn!("volume: could not remove mount point {:?}: {}", mount_root, e);
        }
        Ok(())
    }
}
