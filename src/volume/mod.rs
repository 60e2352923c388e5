// CLASSIFICATION: COMMUNITY
// Filename: mod.rs · volume
// Date Modified: 2026-10-18
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// Evidence persistence onto storage volumes
//
// A target is written as `<volume>:<absolute path>`, e.g.
// `sda:/boot/cpuid.txt`. The volume is mounted on a private
// mount point, the evidence written, and the volume force-
// unmounted again whatever the write outcome was.
//
// ## Public API
// * [`VolumeTarget::parse`] – split and validate a target spec.
// * [`resolve`]             – mount the volume, locate the file.
// * [`write_to_file`]       – write with parent creation/default name.
// * [`persist`]             – resolve, write, unmount.
// ─────────────────────────────────────────────────────────────

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use log::{debug, error, info};
use thiserror::Error;

#[cfg(target_os = "linux")]
pub mod block;
pub mod dir;

#[cfg(target_os = "linux")]
pub use block::BlockDeviceMounter;
pub use dir::DirVolumes;

/// Mount and unmount capability for storage volumes.
pub trait VolumeMounter {
    /// Mount `volume` on a fresh private mount point and return it.
    fn mount(&self, volume: &str, writable: bool) -> io::Result<PathBuf>;
    /// Detach the volume mounted at `mount_root`.
    fn unmount(&self, mount_root: &Path, force: bool, lazy: bool) -> io::Result<()>;
}

/// Errors raised while persisting evidence.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The target spec is invalid or its volume could not be mounted.
    #[error("target {target:?} could not be located: {source}")]
    Resolve {
        /// Target spec as configured.
        target: String,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// Writing the evidence file failed; the volume was unmounted.
    #[error("writing {path:?} failed: {source}")]
    Write {
        /// Resolved destination.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The volume could not be unmounted. Not continuable.
    #[error(
        "unmounting {mount_root:?} failed (fatal): {source}{}",
        write_suffix(.write_error)
    )]
    Unmount {
        /// Mount point left behind.
        mount_root: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
        /// Write failure that preceded the unmount attempt, if any.
        write_error: Option<Box<PersistError>>,
    },
}

fn write_suffix(write_error: &Option<Box<PersistError>>) -> String {
    match write_error {
        Some(e) => format!("; preceding write error: {}", e),
        None => String::new(),
    }
}

/// Parsed `<volume>:<absolute path>` target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeTarget {
    /// Volume identifier, e.g. `sda1` or `UUID=...`.
    pub volume: String,
    /// Absolute path on the volume.
    pub path: String,
}

impl VolumeTarget {
    /// Split `spec` at the first `:` and validate both halves.
    pub fn parse(spec: &str) -> io::Result<Self> {
        let invalid = |msg: &str| io::Error::new(io::ErrorKind::InvalidInput, msg.to_string());
        if spec.is_empty() {
            return Err(invalid("empty target"));
        }
        let (volume, path) = spec
            .split_once(':')
            .ok_or_else(|| invalid("expected <volume>:<path>"))?;
        if volume.is_empty() {
            return Err(invalid("missing volume identifier"));
        }
        if !path.starts_with('/') {
            return Err(invalid("path must be absolute"));
        }
        if Path::new(path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(invalid("path must not leave the volume"));
        }
        Ok(Self {
            volume: volume.to_string(),
            path: path.to_string(),
        })
    }

    /// True when the path names a directory rather than a file.
    pub fn is_dir_path(&self) -> bool {
        self.path.ends_with('/')
    }
}

/// A volume mounted for one persist call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountedVolume {
    /// Target path beneath `mount_root`.
    pub file_path: PathBuf,
    /// Mount point to unmount afterwards.
    pub mount_root: PathBuf,
    /// Target was given with a trailing separator.
    pub names_dir: bool,
}

impl MountedVolume {
    /// File to write: `file_path`, or `default_name` inside it when the
    /// target names a directory or an existing directory.
    pub fn destination(&self, default_name: &str) -> PathBuf {
        if self.names_dir || self.file_path.is_dir() {
            self.file_path.join(default_name)
        } else {
            self.file_path.clone()
        }
    }
}

/// Mount the volume named by `spec` and locate its target path.
pub fn resolve(
    mounter: &dyn VolumeMounter,
    spec: &str,
    writable: bool,
) -> Result<MountedVolume, PersistError> {
    let resolve_err = |source| PersistError::Resolve {
        target: spec.to_string(),
        source,
    };
    let target = VolumeTarget::parse(spec).map_err(resolve_err)?;
    let mount_root = mounter
        .mount(&target.volume, writable)
        .map_err(resolve_err)?;
    let file_path = mount_root.join(target.path.trim_start_matches('/'));
    debug!(
        "volume: {} mounted at {:?}, target {:?}",
        target.volume, mount_root, file_path
    );
    Ok(MountedVolume {
        file_path,
        mount_root,
        names_dir: target.is_dir_path(),
    })
}

/// Fail unless `path`, or its deepest existing ancestor, resolves
/// beneath `root`. `root` must already be canonical.
fn ensure_within(root: &Path, path: &Path) -> io::Result<()> {
    let mut existing = path;
    while fs::symlink_metadata(existing).is_err() {
        match existing.parent() {
            Some(parent) => existing = parent,
            None => break,
        }
    }
    let real = existing.canonicalize()?;
    if real.starts_with(root) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{:?} resolves to {:?}, outside the volume", path, real),
        ))
    }
}

/// Write `data` to the destination of `mounted`, creating parent
/// directories. Returns the file written.
///
/// Symlinks on the volume may not redirect the write outside
/// `mount_root`, and the file itself may not be a symlink.
pub fn write_to_file(
    data: &[u8],
    mounted: &MountedVolume,
    default_name: &str,
) -> io::Result<PathBuf> {
    let root = mounted.mount_root.canonicalize()?;
    let target = mounted.destination(default_name);
    let parent = target.parent().unwrap_or(mounted.mount_root.as_path());

    ensure_within(&root, parent)?;
    fs::create_dir_all(parent)?;
    ensure_within(&root, parent)?;
    if let Ok(meta) = fs::symlink_metadata(&target) {
        if meta.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{:?} is a symlink", target),
            ));
        }
    }

    let mut file = File::create(&target)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(target)
}

/// Persist `data` at `spec`, mounting and unmounting its volume.
///
/// The volume is always force-unmounted after the write attempt. A
/// failed unmount wins over a write error and carries it along.
pub fn persist(
    mounter: &dyn VolumeMounter,
    data: &[u8],
    spec: &str,
    default_name: &str,
) -> Result<PathBuf, PersistError> {
    let mounted = resolve(mounter, spec, true)?;

    let written = write_to_file(data, &mounted, default_name).map_err(|source| {
        PersistError::Write {
            path: mounted.file_path.clone(),
            source,
        }
    });
    if let Err(e) = &written {
        error!("persist: {}", e);
    }

    if let Err(source) = mounter.unmount(&mounted.mount_root, true, false) {
        error!(
            "persist: unmount of {:?} failed, volume left mounted: {}",
            mounted.mount_root, source
        );
        return Err(PersistError::Unmount {
            mount_root: mounted.mount_root,
            source,
            write_error: written.err().map(Box::new),
        });
    }

    let target = written?;
    info!("persist: evidence written to {:?}", target);
    Ok(target)
}
