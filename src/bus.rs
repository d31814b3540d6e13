//! Byte-level bus transport.
//!
//! The DS7505 driver only needs three primitives from the host: a complete
//! write transaction, a read request, and a non-blocking receive of one
//! requested byte. Adapters for embedded-hal 1.0 and 0.2 I²C buses are
//! provided.

use embedded_hal_02::blocking::i2c as i2c_02;
use embedded_hal_1::i2c::I2c;

/// Largest read the adapters buffer. The DS7505 never returns more than two bytes.
pub const RX_CAPACITY: usize = 2;

pub trait Transport {
    type Error: core::fmt::Debug;

    /// Begin a transaction to `address`, send `bytes`, end the transaction.
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Request `len` bytes from `address`, collected afterwards with [`Transport::read_byte`].
    fn request(&mut self, address: u8, len: usize) -> Result<(), Self::Error>;

    /// Receive one requested byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while nothing is available yet.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;
}

#[derive(Debug, Default)]
struct RxBuffer {
    data: [u8; RX_CAPACITY],
    len: usize,
    pos: usize,
}

impl RxBuffer {
    /// Reset and hand out the slot a read of `len` bytes lands in.
    /// Requests above [`RX_CAPACITY`] are truncated.
    fn prepare(&mut self, len: usize) -> &mut [u8] {
        self.len = 0;
        self.pos = 0;
        &mut self.data[..len.min(RX_CAPACITY)]
    }

    fn fill(&mut self, len: usize) {
        self.len = len.min(RX_CAPACITY);
    }

    fn pop(&mut self) -> Option<u8> {
        if self.pos < self.len {
            let byte = self.data[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            None
        }
    }
}

/// [`Transport`] over an embedded-hal 1.0 I²C bus.
#[derive(Debug)]
pub struct I2cTransport<I2C> {
    i2c: I2C,
    rx: RxBuffer,
}

impl<I2C: I2c> I2cTransport<I2C> {
    pub fn new(i2c: I2C) -> Self {
        I2cTransport {
            i2c,
            rx: RxBuffer::default(),
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Transport for I2cTransport<I2C> {
    type Error = I2C::Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, bytes)
    }

    fn request(&mut self, address: u8, len: usize) -> Result<(), Self::Error> {
        let buf = self.rx.prepare(len);
        let n = buf.len();
        self.i2c.read(address, buf)?;
        self.rx.fill(n);
        Ok(())
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.pop().ok_or(nb::Error::WouldBlock)
    }
}

/// [`Transport`] over an embedded-hal 0.2 blocking I²C bus.
#[derive(Debug)]
pub struct LegacyI2cTransport<I2C> {
    i2c: I2C,
    rx: RxBuffer,
}

impl<I2C, E> LegacyI2cTransport<I2C>
where
    I2C: i2c_02::Write<Error = E> + i2c_02::Read<Error = E>,
    E: core::fmt::Debug,
{
    pub fn new(i2c: I2C) -> Self {
        LegacyI2cTransport {
            i2c,
            rx: RxBuffer::default(),
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Transport for LegacyI2cTransport<I2C>
where
    I2C: i2c_02::Write<Error = E> + i2c_02::Read<Error = E>,
    E: core::fmt::Debug,
{
    type Error = E;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), E> {
        self.i2c.write(address, bytes)
    }

    fn request(&mut self, address: u8, len: usize) -> Result<(), E> {
        let buf = self.rx.prepare(len);
        let n = buf.len();
        self.i2c.read(address, buf)?;
        self.rx.fill(n);
        Ok(())
    }

    fn read_byte(&mut self) -> nb::Result<u8, E> {
        self.rx.pop().ok_or(nb::Error::WouldBlock)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use super::*;
    use embedded_hal_mock::eh0::i2c::{Mock as LegacyI2cMock, Transaction as LegacyI2cTransaction};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn read_byte_before_request_would_block() {
        let mut bus = I2cTransport::new(I2cMock::new(&[]));
        assert!(matches!(bus.read_byte(), Err(nb::Error::WouldBlock)));
        bus.release().done();
    }

    #[test]
    fn request_buffers_bytes_in_order() {
        let expectations = [
            I2cTransaction::write(0x48, vec![0x00]),
            I2cTransaction::read(0x48, vec![0x19, 0x80]),
        ];
        let mut bus = I2cTransport::new(I2cMock::new(&expectations));

        bus.write(0x48, &[0x00]).unwrap();
        bus.request(0x48, 2).unwrap();
        assert_eq!(bus.read_byte().unwrap(), 0x19);
        assert_eq!(bus.read_byte().unwrap(), 0x80);
        assert!(matches!(bus.read_byte(), Err(nb::Error::WouldBlock)));

        bus.release().done();
    }

    #[test]
    fn new_request_discards_unread_bytes() {
        let expectations = [
            I2cTransaction::read(0x4b, vec![0x01, 0x02]),
            I2cTransaction::read(0x4b, vec![0x60]),
        ];
        let mut bus = I2cTransport::new(I2cMock::new(&expectations));

        bus.request(0x4b, 2).unwrap();
        assert_eq!(bus.read_byte().unwrap(), 0x01);
        bus.request(0x4b, 1).unwrap();
        assert_eq!(bus.read_byte().unwrap(), 0x60);
        assert!(matches!(bus.read_byte(), Err(nb::Error::WouldBlock)));

        bus.release().done();
    }

    #[test]
    fn legacy_transport_moves_the_same_bytes() {
        let expectations = [
            LegacyI2cTransaction::write(0x4f, vec![0x01, 0x60]),
            LegacyI2cTransaction::read(0x4f, vec![0xb7, 0x00]),
        ];
        let mut bus = LegacyI2cTransport::new(LegacyI2cMock::new(&expectations));

        bus.write(0x4f, &[0x01, 0x60]).unwrap();
        bus.request(0x4f, 2).unwrap();
        assert_eq!(bus.read_byte().unwrap(), 0xb7);
        assert_eq!(bus.read_byte().unwrap(), 0x00);

        bus.release().done();
    }
}
