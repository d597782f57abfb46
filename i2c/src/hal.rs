//! Adapter exposing any [embedded-hal](embedded_hal) blocking I2C implementation as an [I2cBus].
use crate::{I2cBus, I2cError, I2cResult, MAX_ADDRESS};
use embedded_hal::i2c::{Error, ErrorKind, I2c};
use log::trace;
use std::fmt::{Debug, Formatter};

pub struct EmbeddedHalI2c<I> {
    i2c: I,
}

impl<I: I2c> EmbeddedHalI2c<I> {
    pub fn new(i2c: I) -> Self {
        EmbeddedHalI2c { i2c }
    }

    /// Gets the wrapped bus back.
    pub fn release(self) -> I {
        self.i2c
    }

    pub fn inner_mut(&mut self) -> &mut I {
        &mut self.i2c
    }
}

impl<I> Debug for EmbeddedHalI2c<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmbeddedHalI2c({})", std::any::type_name::<I>())
    }
}

impl<I: I2c> I2cBus for EmbeddedHalI2c<I> {
    fn write(&mut self, address: u8, bytes: &[u8]) -> I2cResult<()> {
        if address > MAX_ADDRESS {
            return Err(I2cError::InvalidArgument);
        }

        trace!("Writing {:02x?} to {:#04x}", bytes, address);

        self.i2c.write(address, bytes).map_err(|err| match err.kind() {
            ErrorKind::NoAcknowledge(_) => I2cError::NoAcknowledge,
            kind => I2cError::Bus(kind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn forwards_writes() {
        let expectations = [
            I2cTransaction::write(0x27, vec![0b0011_1100]),
            I2cTransaction::write(0x27, vec![0x01, 0x02]),
        ];
        let mut bus = EmbeddedHalI2c::new(I2cMock::new(&expectations));

        assert_eq!(bus.write_byte(0x27, 0b0011_1100), Ok(()));
        assert_eq!(bus.write(0x27, &[0x01, 0x02]), Ok(()));

        bus.release().done();
    }

    #[test]
    fn maps_failures_to_bus_errors() {
        let expectations = [I2cTransaction::write(0x27, vec![0x08])
            .with_error(ErrorKind::Other)];
        let mut bus = EmbeddedHalI2c::new(I2cMock::new(&expectations));

        assert_eq!(bus.write_byte(0x27, 0x08), Err(I2cError::Bus(ErrorKind::Other)));

        bus.release().done();
    }

    #[test]
    fn maps_nack_to_no_acknowledge() {
        let expectations = [I2cTransaction::write(0x27, vec![0x08])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))];
        let mut bus = EmbeddedHalI2c::new(I2cMock::new(&expectations));

        assert_eq!(bus.write_byte(0x27, 0x08), Err(I2cError::NoAcknowledge));

        bus.release().done();
    }

    #[test]
    fn rejects_wide_addresses() {
        let mut bus = EmbeddedHalI2c::new(I2cMock::new(&[]));

        assert_eq!(bus.write_byte(0x80, 0x00), Err(I2cError::InvalidArgument));

        bus.release().done();
    }
}
