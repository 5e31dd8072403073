use crate::device::{DeviceSizeQuery, Ioctl};
use crate::error::{Error, ProbeError, Result};
use crate::filter::Filter;
use crate::residency::{Mincore, ResidencyProvider};
use chrono::{DateTime, Local};
use log::debug;
use serde::Serialize;
use std::fs::{File, Metadata};
use std::path::{Path, PathBuf};

/// Page cache status of one file at one point in time.
///
/// When a probe succeeds, `pages == cached + uncached`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PcStatus {
    #[serde(rename = "filename")]
    pub name: PathBuf,
    pub size: u64,
    // taken right before the residency probe
    pub timestamp: Option<DateTime<Local>>,
    pub mtime: Option<DateTime<Local>>,
    pub pages: usize,
    pub cached: usize,
    pub uncached: usize,
    pub percent: f64,
}

impl PcStatus {
    fn new(name: PathBuf) -> PcStatus {
        PcStatus {
            name,
            ..PcStatus::default()
        }
    }
}

/// Probes files using a residency provider and a device size query.
///
/// The size of a block device is resolved with the device query, everything
/// else uses the stat size. If the file changes size between resolution and
/// the residency probe, the record describes the size seen at resolution.
#[derive(Debug, Default, Clone)]
pub struct Prober<R = Mincore, D = Ioctl> {
    residency: R,
    device: D,
}

impl Prober {
    pub fn new() -> Prober {
        Prober::default()
    }
}

impl<R: ResidencyProvider, D: DeviceSizeQuery> Prober<R, D> {
    pub fn with(residency: R, device: D) -> Prober<R, D> {
        Prober { residency, device }
    }

    /// Opens `path`, runs `filter` on it, and reports how much of it is in
    /// the page cache. The file is closed before returning.
    pub fn probe<P, F>(&self, path: P, filter: &F) -> Result<PcStatus>
    where
        P: AsRef<Path>,
        F: Filter + ?Sized,
    {
        let path = path.as_ref();
        let mut status = PcStatus::new(path.to_path_buf());

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => return fail(status, Error::Open { path: path.into(), source }),
        };

        if let Err(source) = filter.check(&file) {
            return fail(status, Error::Filter { path: path.into(), source });
        }

        let meta = match file.metadata() {
            Ok(meta) => meta,
            Err(source) => return fail(status, Error::Stat { path: path.into(), source }),
        };
        if meta.is_dir() {
            return fail(status, Error::Directory { path: path.into() });
        }

        status.size = match self.resolve_size(path, &file, &meta) {
            Ok(size) => size,
            Err(error) => return fail(status, error),
        };
        status.timestamp = Some(Local::now());
        status.mtime = match meta.modified() {
            Ok(mtime) => Some(DateTime::from(mtime)),
            Err(err) => {
                debug!("{}: mtime unavailable: {}", path.display(), err);
                None
            }
        };

        let residency = match self.residency.residency(&file, status.size) {
            Ok(Some(residency)) => residency,
            Ok(None) => return Ok(status),
            Err(source) => return fail(status, Error::Residency { path: path.into(), source }),
        };

        status.cached = residency.cached;
        status.pages = residency.pages();
        status.uncached = residency.miss;
        if status.pages > 0 {
            status.percent = status.cached as f64 / status.pages as f64 * 100.0;
        }
        Ok(status)
    }

    fn resolve_size(&self, path: &Path, file: &File, meta: &Metadata) -> core::result::Result<u64, Error> {
        let is_block = self.device.is_block_device(path).map_err(|source| Error::Stat {
            path: path.into(),
            source,
        })?;
        if !is_block {
            return Ok(meta.len());
        }

        let size = self
            .device
            .block_device_size(file)
            .map_err(|source| Error::DeviceSize {
                path: path.into(),
                source,
            })?;
        debug!("{}: block device of {} bytes", path.display(), size);
        Ok(size)
    }
}

fn fail(partial: PcStatus, error: Error) -> Result<PcStatus> {
    Err(ProbeError::new(partial, error))
}

/// Probes `path` with the platform providers.
pub fn probe<P: AsRef<Path>, F: Filter + ?Sized>(path: P, filter: &F) -> Result<PcStatus> {
    Prober::new().probe(path, filter)
}
