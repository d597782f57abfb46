//! Raw BSC (Broadcom Serial Controller) driver.
//!
//! Drives the I2C master peripheral of the BCM283x directly through its registers, mapped from
//! `/dev/mem`. Only the write path is implemented, which is all the displays need.
//!
//! Each BSC block has six 32-bit registers:
//!
//! | Offset | Name   | Purpose                                     |
//! |--------|--------|---------------------------------------------|
//! | `0x00` | `C`    | control: enable, start transfer, clear FIFO |
//! | `0x04` | `S`    | status: done, FIFO state, NACK, timeout     |
//! | `0x08` | `DLEN` | number of bytes in the transfer             |
//! | `0x0C` | `A`    | 7-bit slave address                         |
//! | `0x10` | `FIFO` | 16-byte data FIFO                           |
//! | `0x14` | `DIV`  | clock divider from the core clock           |
//!
//! The SDA and SCL pins must already be switched to their ALT0 function, which is what the kernel
//! does when I2C is enabled (`dtparam=i2c_arm=on`).
use crate::{I2cBus, I2cError, I2cResult, MAX_ADDRESS};
use log::{debug, trace};
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;
use std::time::{Duration, Instant};

const REG_C: usize = 0x00 / 4;
const REG_S: usize = 0x04 / 4;
const REG_DLEN: usize = 0x08 / 4;
const REG_A: usize = 0x0C / 4;
const REG_FIFO: usize = 0x10 / 4;
const REG_DIV: usize = 0x14 / 4;

const C_I2CEN: u32 = 1 << 15;
const C_ST: u32 = 1 << 7;
const C_CLEAR: u32 = 0b11 << 4;

const S_DONE: u32 = 1 << 1;
const S_TXD: u32 = 1 << 4;
const S_ERR: u32 = 1 << 8;
const S_CLKT: u32 = 1 << 9;

/// Raw BSC driver, implementing [I2cBus].
pub struct RawI2cDriver {
    mmap: MmapRaw,
    controller: u8,
    /// How long a single transfer may take before it's abandoned.
    pub timeout: Duration,
}

impl RawI2cDriver {
    /// The base address of the peripherals in the ARM physical address space.
    pub const PERIPHERAL_BASE: u32 = 0x3F000000;

    /// Core clock feeding the BSC dividers.
    pub const CORE_CLOCK_HZ: u32 = 250_000_000;

    const BSC_OFFSETS: [u32; 2] = [0x205000, 0x804000];

    /// Maps the registers of the given BSC controller (`0` or `1`). BSC1 is the one exposed on the
    /// header pins 3 and 5.
    pub fn new_mem(controller: u8) -> I2cResult<Self> {
        let offset = *Self::BSC_OFFSETS
            .get(controller as usize)
            .ok_or(I2cError::InvalidArgument)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/mem")?;

        let mmap = MmapOptions::new()
            .offset(Self::PERIPHERAL_BASE as u64 + offset as u64)
            .len(0x18)
            .map_raw(&file)?;

        debug!("BSC{} mapped", controller);

        Ok(RawI2cDriver {
            mmap,
            controller,
            timeout: Duration::from_millis(100),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Computes the `DIV` register value for the requested SCL frequency.
    ///
    /// The hardware rounds odd dividers down, so the result is always even.
    ///
    /// # Errors
    /// - `I2cError::InvalidArgument` if the frequency can't be reached from the core clock.
    pub fn divider_for(core_clock_hz: u32, scl_hz: u32) -> I2cResult<u16> {
        if scl_hz == 0 {
            return Err(I2cError::InvalidArgument);
        }
        let divider = core_clock_hz / scl_hz;
        if !(2..=0xFFFE).contains(&divider) {
            return Err(I2cError::InvalidArgument);
        }
        Ok((divider as u16) & !1)
    }

    /// Sets the SCL frequency. 100 kHz is the standard mode every PCF8574 backpack supports.
    pub fn set_clock(&mut self, scl_hz: u32) -> I2cResult<()> {
        let divider = Self::divider_for(Self::CORE_CLOCK_HZ, scl_hz)?;
        debug!("BSC{} clock divider set to {}", self.controller, divider);
        self.write_register(REG_DIV, divider as u32);
        Ok(())
    }

    fn read_register(&self, register: usize) -> u32 {
        let mmap = self.mmap.as_ptr() as *const u32;
        unsafe { mmap.add(register).read_volatile() }
    }

    fn write_register(&self, register: usize, value: u32) {
        let mmap = self.mmap.as_mut_ptr() as *mut u32;
        unsafe { mmap.add(register).write_volatile(value) };
    }

    fn reset_status(&self) {
        // Flags are cleared by writing 1s
        self.write_register(REG_S, S_DONE | S_ERR | S_CLKT);
    }
}

impl Debug for RawI2cDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawI2cDriver(BSC{}, {:?})", self.controller, self.mmap.as_ptr().addr())
    }
}

impl I2cBus for RawI2cDriver {
    fn write(&mut self, address: u8, bytes: &[u8]) -> I2cResult<()> {
        if address > MAX_ADDRESS || bytes.len() > 0xFFFF {
            return Err(I2cError::InvalidArgument);
        }

        trace!("BSC{} writing {:02x?} to {:#04x}", self.controller, bytes, address);

        self.write_register(REG_C, C_CLEAR);
        self.reset_status();
        self.write_register(REG_A, address as u32);
        self.write_register(REG_DLEN, bytes.len() as u32);

        let mut remaining = bytes.iter();
        let mut pending = remaining.next();

        // Preload as much as the FIFO takes, the rest is fed while the transfer runs
        while let Some(&byte) = pending {
            if self.read_register(REG_S) & S_TXD == 0 {
                break;
            }
            self.write_register(REG_FIFO, byte as u32);
            pending = remaining.next();
        }

        self.write_register(REG_C, C_I2CEN | C_ST);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            let status = self.read_register(REG_S);
            if status & (S_DONE | S_ERR | S_CLKT) != 0 {
                break status;
            }
            if let Some(&byte) = pending {
                if status & S_TXD != 0 {
                    self.write_register(REG_FIFO, byte as u32);
                    pending = remaining.next();
                    continue;
                }
            }
            if Instant::now() >= deadline {
                self.write_register(REG_C, C_CLEAR);
                self.reset_status();
                return Err(I2cError::Timeout);
            }
        };

        self.reset_status();

        if status & S_ERR != 0 {
            Err(I2cError::NoAcknowledge)
        } else if status & S_CLKT != 0 {
            Err(I2cError::Timeout)
        } else {
            Ok(())
        }
    }
}
