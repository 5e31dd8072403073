use std::fs::{self, File};
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

/// Size lookup for block devices, whose stat size is not their capacity.
pub trait DeviceSizeQuery {
    /// Whether `path` names a block device. Follows symlinks.
    fn is_block_device(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.file_type().is_block_device())
    }

    fn block_device_size(&self, file: &File) -> io::Result<u64>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ioctl;

impl DeviceSizeQuery for Ioctl {
    fn block_device_size(&self, file: &File) -> io::Result<u64> {
        sys::block_device_size(file)
    }
}

#[cfg(target_os = "linux")]
mod sys {
    use crate::residency::errno_to_io;
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    // BLKGETSIZE64
    nix::ioctl_read!(blkgetsize64, 0x12, 114, u64);

    pub fn block_device_size(file: &File) -> io::Result<u64> {
        let mut size: u64 = 0;
        unsafe { blkgetsize64(file.as_raw_fd(), &mut size) }.map_err(errno_to_io)?;
        Ok(size)
    }
}

#[cfg(target_os = "macos")]
mod sys {
    use crate::residency::errno_to_io;
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    // DKIOCGETBLOCKSIZE, DKIOCGETBLOCKCOUNT
    nix::ioctl_read!(dkiocgetblocksize, b'd', 24, u32);
    nix::ioctl_read!(dkiocgetblockcount, b'd', 25, u64);

    pub fn block_device_size(file: &File) -> io::Result<u64> {
        let fd = file.as_raw_fd();
        let mut block_size: u32 = 0;
        let mut block_count: u64 = 0;
        unsafe {
            dkiocgetblocksize(fd, &mut block_size).map_err(errno_to_io)?;
            dkiocgetblockcount(fd, &mut block_count).map_err(errno_to_io)?;
        }
        block_count
            .checked_mul(u64::from(block_size))
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "device size overflows u64"))
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod sys {
    use std::fs::File;
    use std::io;

    pub fn block_device_size(_file: &File) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "block device size query is not supported on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_file_is_not_block_device() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(!Ioctl.is_block_device(file.path()).unwrap());
    }

    #[test]
    fn test_char_device_is_not_block_device() {
        assert!(!Ioctl.is_block_device(Path::new("/dev/null")).unwrap());
    }

    #[test]
    fn test_missing_path_fails_inspection() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Ioctl.is_block_device(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_size_query_on_regular_file_fails() {
        let file = tempfile::tempfile().unwrap();
        assert!(Ioctl.block_device_size(&file).is_err());
    }
}
