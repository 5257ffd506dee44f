//! Helper capabilities for smartbin_core

use smartbin_traits::{DeviceError, RemoteStore};

/// A remote store that is never ready; the default when no store is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl RemoteStore for OfflineRemote {
    fn is_ready(&self) -> bool {
        false
    }

    fn read_int(&mut self, _path: &str) -> Result<Option<i64>, DeviceError> {
        Err(Box::new(std::io::Error::other("remote offline")))
    }

    fn write_f32(&mut self, _path: &str, _value: f32) -> Result<(), DeviceError> {
        Err(Box::new(std::io::Error::other("remote offline")))
    }

    fn write_int(&mut self, _path: &str, _value: i64) -> Result<(), DeviceError> {
        Err(Box::new(std::io::Error::other("remote offline")))
    }
}
