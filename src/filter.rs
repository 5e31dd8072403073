//! Policy checks run on a freshly opened file before it is probed.

use std::fs::File;
use std::os::unix::fs::FileTypeExt;

pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Accepts or rejects an opened file. A rejection aborts the probe before
/// any size resolution or residency work happens.
pub trait Filter {
    fn check(&self, file: &File) -> Result<(), FilterError>;
}

impl<F> Filter for F
where
    F: Fn(&File) -> Result<(), FilterError>,
{
    fn check(&self, file: &File) -> Result<(), FilterError> {
        self(file)
    }
}

pub fn accept_all(_file: &File) -> Result<(), FilterError> {
    Ok(())
}

/// Rejects anything that is neither a regular file nor a block device.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegularOnly;

impl Filter for RegularOnly {
    fn check(&self, file: &File) -> Result<(), FilterError> {
        let file_type = file.metadata()?.file_type();
        if file_type.is_file() || file_type.is_block_device() {
            Ok(())
        } else {
            Err(format!("not a regular file ({:?})", file_type).into())
        }
    }
}

/// Rejects files whose stat size exceeds the limit.
#[derive(Debug, Clone, Copy)]
pub struct MaxSize(pub u64);

impl Filter for MaxSize {
    fn check(&self, file: &File) -> Result<(), FilterError> {
        let len = file.metadata()?.len();
        if len > self.0 {
            Err(format!("size {} exceeds limit of {} bytes", len, self.0).into())
        } else {
            Ok(())
        }
    }
}

/// Runs each filter in order, stopping at the first rejection.
pub struct Chain(Vec<Box<dyn Filter>>);

impl Chain {
    pub fn new() -> Chain {
        Chain(Vec::new())
    }

    pub fn push<F: Filter + 'static>(&mut self, filter: F) {
        self.0.push(Box::new(filter));
    }
}

impl Default for Chain {
    fn default() -> Chain {
        Chain::new()
    }
}

impl Filter for Chain {
    fn check(&self, file: &File) -> Result<(), FilterError> {
        self.0.iter().try_for_each(|filter| filter.check(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_regular_only() {
        let file = tempfile::tempfile().unwrap();
        assert!(RegularOnly.check(&file).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let handle = File::open(dir.path()).unwrap();
        assert!(RegularOnly.check(&handle).is_err());

        let null = File::open("/dev/null").unwrap();
        assert!(RegularOnly.check(&null).is_err());
    }

    #[test]
    fn test_max_size() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&[0u8; 100]).unwrap();
        assert!(MaxSize(100).check(&file).is_ok());
        assert!(MaxSize(99).check(&file).is_err());
    }

    #[test]
    fn test_chain_stops_at_first_rejection() {
        let mut chain = Chain::new();
        chain.push(accept_all);
        chain.push(|_: &File| -> Result<(), FilterError> { Err("first".into()) });
        chain.push(|_: &File| -> Result<(), FilterError> { Err("second".into()) });

        let file = tempfile::tempfile().unwrap();
        assert_eq!(chain.check(&file).unwrap_err().to_string(), "first");
        assert!(Chain::new().check(&file).is_ok());
    }
}
