use crate::filter::FilterError;
use crate::pcstatus::PcStatus;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stage at which a probe failed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open {} for read: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("{} rejected by filter: {source}", .path.display())]
    Filter { path: PathBuf, source: FilterError },
    #[error("could not stat {}: {source}", .path.display())]
    Stat { path: PathBuf, source: io::Error },
    #[error("{} is a directory", .path.display())]
    Directory { path: PathBuf },
    #[error("could not get block device size of {}: {source}", .path.display())]
    DeviceSize { path: PathBuf, source: io::Error },
    #[error("could not probe page residency of {}: {source}", .path.display())]
    Residency { path: PathBuf, source: io::Error },
}

/// A failed probe: the error plus the record as far as it was built.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ProbeError {
    partial: PcStatus,
    error: Error,
}

impl ProbeError {
    pub(crate) fn new(partial: PcStatus, error: Error) -> ProbeError {
        ProbeError { partial, error }
    }

    pub fn partial(&self) -> &PcStatus {
        &self.partial
    }

    pub fn error(&self) -> &Error {
        &self.error
    }

    pub fn into_parts(self) -> (PcStatus, Error) {
        (self.partial, self.error)
    }
}

pub type Result<T> = core::result::Result<T, ProbeError>;
