use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use pilcd_i2c::hal::EmbeddedHalI2c;
use pilcd_i2c::lcd::hd44780::driver::{HD44780Driver, I2cHD44780Driver};

const ADDRESS: u8 = 0x27;

/// The four writes latching one byte: each nibble with E high, then with E low.
fn byte(data: u8, rs: bool) -> Vec<I2cTransaction> {
    let control = 0b0000_1000 | rs as u8;
    let high = (data & 0xF0) | control;
    let low = ((data << 4) & 0xF0) | control;
    vec![
        I2cTransaction::write(ADDRESS, vec![high | 0b0000_0100]),
        I2cTransaction::write(ADDRESS, vec![high]),
        I2cTransaction::write(ADDRESS, vec![low | 0b0000_0100]),
        I2cTransaction::write(ADDRESS, vec![low]),
    ]
}

fn init_transactions() -> Vec<I2cTransaction> {
    [0x03, 0x03, 0x03, 0x02, 0x28, 0x01, 0x06, 0x0C, 0x02]
        .into_iter()
        .flat_map(|command| byte(command, false))
        .collect()
}

#[test]
fn init_writes_documented_sequence() {
    let expected = init_transactions();

    let mut bus = EmbeddedHalI2c::new(I2cMock::new(&expected));
    let mut delay = NoopDelay::new();

    let driver = I2cHD44780Driver::new(&mut bus, &mut delay, ADDRESS, 16, 2).unwrap();
    assert_eq!(driver.failed_writes(), 0);
    drop(driver);

    bus.inner_mut().done();
}

#[test]
fn hello_on_second_row() {
    let mut expected = init_transactions();
    expected.extend(byte(0xC0, false));
    for c in "Hi".bytes() {
        expected.extend(byte(c, true));
    }

    let mut bus = EmbeddedHalI2c::new(I2cMock::new(&expected));
    let mut delay = NoopDelay::new();

    let mut driver = I2cHD44780Driver::new(&mut bus, &mut delay, ADDRESS, 16, 2).unwrap();
    driver.go_to(0, 1);
    driver.put_str("Hi");
    drop(driver);

    bus.inner_mut().done();
}

#[test]
fn nack_is_swallowed() {
    let mut expected = init_transactions();
    expected[4] = expected[4].clone().with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
    expected.extend(byte(b'!', true));

    let mut bus = EmbeddedHalI2c::new(I2cMock::new(&expected));
    let mut delay = NoopDelay::new();

    let mut driver = I2cHD44780Driver::new(&mut bus, &mut delay, ADDRESS, 16, 2).unwrap();
    driver.put_char(b'!');
    assert_eq!(driver.failed_writes(), 1);
    drop(driver);

    bus.inner_mut().done();
}
