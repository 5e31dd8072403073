use log::{debug, warn};
use nix::errno::Errno;
use nix::libc;
use nix::sys::mman;
use nix::unistd;
use std::convert::TryFrom;
use std::ffi::c_void;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr::null_mut;

#[cfg(target_os = "linux")]
type MincoreChar = u8;

#[cfg(target_os = "macos")]
type MincoreChar = i8;

/// Page counts covering a probed byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Residency {
    pub cached: usize,
    pub miss: usize,
}

impl Residency {
    pub fn pages(&self) -> usize {
        self.cached + self.miss
    }
}

/// Reports which pages of `[0, len)` of an open file are in the page cache.
///
/// `Ok(None)` means there was nothing to probe (`len == 0`).
pub trait ResidencyProvider {
    fn residency(&self, file: &File, len: u64) -> io::Result<Option<Residency>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Mincore;

impl ResidencyProvider for Mincore {
    fn residency(&self, file: &File, len: u64) -> io::Result<Option<Residency>> {
        if len == 0 {
            return Ok(None);
        }
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length exceeds address space"))?;
        let page_size = page_size()?;
        let pages = (len + page_size - 1) / page_size;

        let mapping = Mapping::new(file, len)?;
        let mut vec: Vec<MincoreChar> = vec![0; pages];
        unsafe {
            // vec holds one entry per page of the mapping, as mincore(2) requires
            Errno::result(libc::mincore(mapping.addr, mapping.len, vec.as_mut_ptr()))
                .map_err(errno_to_io)?;
        }

        let cached = vec.iter().filter(|&&b| b & 0x1 != 0).count();
        debug!("mincore: {}/{} pages resident", cached, pages);
        Ok(Some(Residency {
            cached,
            miss: pages - cached,
        }))
    }
}

struct Mapping {
    addr: *mut c_void,
    len: usize,
}

impl Mapping {
    fn new(file: &File, len: usize) -> io::Result<Mapping> {
        let addr = unsafe {
            mman::mmap(
                null_mut(),
                len,
                mman::ProtFlags::PROT_READ,
                mman::MapFlags::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        }
        .map_err(errno_to_io)?;
        Ok(Mapping { addr, len })
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        unsafe {
            if let Err(err) = mman::munmap(self.addr, self.len) {
                warn!("failed to unmap. error: {}", err.desc());
            }
        }
    }
}

pub fn page_size() -> io::Result<usize> {
    match unistd::sysconf(unistd::SysconfVar::PAGE_SIZE) {
        Ok(Some(size)) if size > 0 => Ok(size as usize),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::Other,
            "page size is not available",
        )),
        Err(err) => Err(errno_to_io(err)),
    }
}

pub(crate) fn errno_to_io(err: Errno) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_empty_range_has_nothing_to_probe() {
        let file = tempfile::tempfile().unwrap();
        assert_eq!(Mincore.residency(&file, 0).unwrap(), None);
    }

    #[test]
    fn test_freshly_read_file_is_resident() {
        let page_size = page_size().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0xa5u8; page_size * 2]).unwrap();
        file.flush().unwrap();

        let mut reopened = File::open(file.path()).unwrap();
        let mut buf = Vec::new();
        reopened.read_to_end(&mut buf).unwrap();

        let residency = Mincore
            .residency(&reopened, (page_size * 2) as u64)
            .unwrap()
            .unwrap();
        assert_eq!(residency.pages(), 2);
        assert_eq!(residency.cached, 2);
        assert_eq!(residency.miss, 0);
    }

    #[test]
    fn test_partial_page_rounds_up() {
        let page_size = page_size().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![1u8; page_size + 1]).unwrap();
        file.flush().unwrap();

        let residency = Mincore
            .residency(file.as_file(), (page_size + 1) as u64)
            .unwrap()
            .unwrap();
        assert_eq!(residency.pages(), 2);
    }
}
