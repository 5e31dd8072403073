//! Reports how much of a file currently resides in the page cache.

pub mod device;
pub mod error;
pub mod filter;
pub mod output;
pub mod pcstatus;
pub mod residency;

pub use crate::error::{Error, ProbeError};
pub use crate::pcstatus::{probe, PcStatus, Prober};
