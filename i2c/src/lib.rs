pub mod delay;
pub mod hal;
pub mod lcd;
pub mod raw;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum I2cError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("device did not acknowledge")]
    NoAcknowledge,
    #[error("bus timed out")]
    Timeout,
    #[error("bus error: {0:?}")]
    Bus(embedded_hal::i2c::ErrorKind),
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for I2cError {
    fn from(err: std::io::Error) -> Self {
        I2cError::Io(err.kind())
    }
}

pub type I2cResult<T> = Result<T, I2cError>;

/// Largest address representable on a 7-bit I2C bus.
pub const MAX_ADDRESS: u8 = 0x7F;

/// A blocking, write-only I2C bus master.
///
/// Implementations are borrowed by the devices driving them, so the caller keeps ownership of the
/// bus and decides when it gets closed.
pub trait I2cBus: Debug {
    /// Writes `bytes` to the device at the 7-bit `address`, in a single transfer.
    ///
    /// # Errors
    /// - `I2cError::InvalidArgument` if the address does not fit in 7 bits.
    /// - `I2cError::NoAcknowledge` if the device did not acknowledge the transfer.
    /// - Any other backend-specific failure.
    fn write(&mut self, address: u8, bytes: &[u8]) -> I2cResult<()>;

    /// Writes a single byte to the device at the given address.
    fn write_byte(&mut self, address: u8, byte: u8) -> I2cResult<()> {
        self.write(address, &[byte])
    }
}
