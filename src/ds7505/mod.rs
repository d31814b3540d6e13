//! DS7505 digital thermometer and thermostat.
//!
//! - Range: -55°C to +125°C
//! - Resolution: 9 to 12 bits, 0.0625°C at 12 bits
//! - Address(7bit): 0x48 to 0x4F, selected by the A2 A1 A0 pins
//!
//! Thermostat limits and configuration can be copied to NV memory so they
//! survive power cycles.

use embedded_hal_1::delay::DelayNs;
use embedded_hal_1::i2c::I2c;

use crate::bus::{I2cTransport, Transport};

pub mod config;
pub mod temperature;

pub use self::config::{Config, FaultTolerance, Polarity, Resolution, ThermostatMode};
use self::temperature::{celsius_to_fahrenheit, fahrenheit_to_celsius, TEMP_MAX, TEMP_MIN};

const DS7505_I2C_ADDR_BASE: u8 = 0x48;

/// Receive polls per byte before a read gives up.
pub const DEFAULT_POLL_LIMIT: u32 = 1000;

const NV_POLL_INTERVAL_MS: u32 = 1;
const NV_MAX_POLLS: u32 = 100;

/// `set_trip_point` places hysteresis this far below the trip point.
const DEFAULT_HYSTERESIS_SPAN: f32 = 5.0;

/// DS7505 errors
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E>
where
    E: core::fmt::Debug,
{
    /// I²C bus error
    #[error("I2C error: {0:?}")]
    I2c(E),
    /// Device did not deliver the requested bytes in time
    #[error("timed out waiting for the device")]
    Timeout,
    /// Trip point below hysteresis
    #[error("trip point is below the hysteresis limit")]
    InvertedLimits,
    /// Limit outside -55..=125°C, or not a number
    #[error("thermostat limit outside -55..=125 degrees C")]
    OutOfRange,
}

/// 7-bit bus address, `0b1001_A2A1A0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Address from the levels of the A2, A1 and A0 pins.
    pub const fn from_straps(a2: bool, a1: bool, a0: bool) -> Self {
        Address(DS7505_I2C_ADDR_BASE | (a2 as u8) << 2 | (a1 as u8) << 1 | a0 as u8)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::from_straps(false, false, false)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Register pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Temperature = 0x00,
    Configuration = 0x01,
    Hysteresis = 0x02,
    Trip = 0x03,
}

/// The registers holding a temperature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TempRegister {
    /// Last conversion result
    Temperature,
    /// Thermostat low point, T_HYST
    Hysteresis,
    /// Thermostat high point, T_OS
    Trip,
}

impl From<TempRegister> for Register {
    fn from(register: TempRegister) -> Self {
        match register {
            TempRegister::Temperature => Register::Temperature,
            TempRegister::Hysteresis => Register::Hysteresis,
            TempRegister::Trip => Register::Trip,
        }
    }
}

/// Device commands. Sent in place of a register pointer, without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Reload T_HYST, T_OS and configuration from NV memory.
    RecallData = 0xb8,
    /// Store T_HYST, T_OS and configuration to NV memory.
    CopyData = 0x48,
    /// Software power-on reset.
    PowerOnReset = 0x54,
}

/// Representation of a DS7505
#[derive(Debug)]
pub struct Ds7505<T> {
    transport: T,
    address: Address,
    /// last configuration successfully written
    config: Config,
    poll_limit: u32,
}

impl<I2C: I2c> Ds7505<I2cTransport<I2C>> {
    /// Create a driver on an embedded-hal 1.0 I²C bus.
    pub fn new_i2c(i2c: I2C, address: Address) -> Self {
        Self::new(I2cTransport::new(i2c), address)
    }
}

impl<T> Ds7505<T>
where
    T: Transport,
{
    /// Create device driver instance. No bus traffic until [`Ds7505::init`].
    pub fn new(transport: T, address: Address) -> Self {
        Ds7505 {
            transport,
            address,
            config: Config::default(),
            poll_limit: DEFAULT_POLL_LIMIT,
        }
    }

    /// Receive polls allowed per byte before [`Error::Timeout`]. At least one.
    pub fn with_poll_limit(mut self, poll_limit: u32) -> Self {
        self.poll_limit = poll_limit.max(1);
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Configuration as last written.
    pub fn config(&self) -> Config {
        self.config
    }

    pub fn release(self) -> T {
        self.transport
    }

    /// Write a configuration holding only `resolution`.
    ///
    /// Fault tolerance, polarity, thermostat mode and shutdown return to their
    /// power-up defaults.
    pub fn init(&mut self, resolution: Resolution) -> Result<(), Error<T::Error>> {
        self.write_config(Config::new(resolution))
    }

    /// Overwrite all 8 configuration bits.
    pub fn write_config(&mut self, config: Config) -> Result<(), Error<T::Error>> {
        self.write(&[Register::Configuration as u8, config.bits()])?;
        self.config = config;
        Ok(())
    }

    /// Read the configuration register back. The cached value is left alone.
    pub fn read_config(&mut self) -> Result<Config, Error<T::Error>> {
        let [bits] = self.read_register::<1>(Register::Configuration)?;
        Ok(Config::from_bits(bits))
    }

    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error<T::Error>> {
        self.write_config(self.config.with_resolution(resolution))
    }

    pub fn set_polarity(&mut self, polarity: Polarity) -> Result<(), Error<T::Error>> {
        self.write_config(self.config.with_polarity(polarity))
    }

    pub fn set_thermostat_mode(&mut self, mode: ThermostatMode) -> Result<(), Error<T::Error>> {
        self.write_config(self.config.with_thermostat_mode(mode))
    }

    /// Stop or resume conversions. Registers stay accessible while shut down.
    pub fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Error<T::Error>> {
        self.write_config(self.config.with_shutdown(shutdown))
    }

    pub fn send_command(&mut self, command: Command) -> Result<(), Error<T::Error>> {
        self.write(&[command as u8])
    }

    pub fn recall_from_nv(&mut self) -> Result<(), Error<T::Error>> {
        self.send_command(Command::RecallData)
    }

    pub fn power_on_reset(&mut self) -> Result<(), Error<T::Error>> {
        self.send_command(Command::PowerOnReset)
    }

    /// Copy limits and configuration to NV memory, then wait until NVB clears.
    pub fn copy_to_nv<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<T::Error>> {
        self.send_command(Command::CopyData)?;
        for _ in 0..NV_MAX_POLLS {
            delay.delay_ms(NV_POLL_INTERVAL_MS);
            if !self.read_config()?.is_nv_busy() {
                return Ok(());
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("ds7505 {=u8:x}: NV copy still busy", self.address.bits());
        Err(Error::Timeout)
    }

    /// Read one of the temperature registers, in °C.
    pub fn read_temperature(&mut self, register: TempRegister) -> Result<f32, Error<T::Error>> {
        let [msb, lsb] = self.read_register::<2>(register.into())?;
        Ok(temperature::decode(msb, lsb))
    }

    /// Read one of the temperature registers, in °F.
    pub fn read_temperature_f(&mut self, register: TempRegister) -> Result<f32, Error<T::Error>> {
        self.read_temperature(register).map(celsius_to_fahrenheit)
    }

    /// Current temperature in °C.
    pub fn temperature(&mut self) -> Result<f32, Error<T::Error>> {
        self.read_temperature(TempRegister::Temperature)
    }

    /// Current temperature in °F.
    pub fn temperature_f(&mut self) -> Result<f32, Error<T::Error>> {
        self.read_temperature_f(TempRegister::Temperature)
    }

    /// Program the thermostat, temperatures in °C.
    ///
    /// Writes T_HYST, then T_OS, then the configuration with the new fault
    /// tolerance. Invalid limits are rejected before anything goes on the bus.
    pub fn set_thermostat(
        &mut self,
        trip: f32,
        hysteresis: f32,
        fault_tolerance: FaultTolerance,
    ) -> Result<(), Error<T::Error>> {
        validate_limits(trip, hysteresis)?;

        let [msb, lsb] = temperature::encode(hysteresis);
        self.write(&[Register::Hysteresis as u8, msb, lsb])?;
        let [msb, lsb] = temperature::encode(trip);
        self.write(&[Register::Trip as u8, msb, lsb])?;

        self.write_config(self.config.with_fault_tolerance(fault_tolerance))
    }

    /// Program the thermostat, temperatures in °F.
    pub fn set_thermostat_f(
        &mut self,
        trip: f32,
        hysteresis: f32,
        fault_tolerance: FaultTolerance,
    ) -> Result<(), Error<T::Error>> {
        self.set_thermostat(
            fahrenheit_to_celsius(trip),
            fahrenheit_to_celsius(hysteresis),
            fault_tolerance,
        )
    }

    /// Program the thermostat in °C with a fault tolerance of one.
    pub fn set_limits(&mut self, trip: f32, hysteresis: f32) -> Result<(), Error<T::Error>> {
        self.set_thermostat(trip, hysteresis, FaultTolerance::One)
    }

    /// Program the thermostat in °F with a fault tolerance of one.
    pub fn set_limits_f(&mut self, trip: f32, hysteresis: f32) -> Result<(), Error<T::Error>> {
        self.set_thermostat_f(trip, hysteresis, FaultTolerance::One)
    }

    /// Trip at `trip` °C, release 5°C below it.
    pub fn set_trip_point(&mut self, trip: f32) -> Result<(), Error<T::Error>> {
        self.set_limits(trip, trip - DEFAULT_HYSTERESIS_SPAN)
    }

    /// Trip at `trip` °F, release 5°F below it.
    pub fn set_trip_point_f(&mut self, trip: f32) -> Result<(), Error<T::Error>> {
        self.set_limits_f(trip, trip - DEFAULT_HYSTERESIS_SPAN)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error<T::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("ds7505 {=u8:x} write {=[u8]:x}", self.address.bits(), bytes);
        self.transport.write(self.address.bits(), bytes).map_err(Error::I2c)
    }

    fn read_register<const N: usize>(&mut self, register: Register) -> Result<[u8; N], Error<T::Error>> {
        self.write(&[register as u8])?;
        self.transport.request(self.address.bits(), N).map_err(Error::I2c)?;
        let mut data = [0u8; N];
        for byte in data.iter_mut() {
            *byte = self.poll_byte()?;
        }
        Ok(data)
    }

    fn poll_byte(&mut self) -> Result<u8, Error<T::Error>> {
        for _ in 0..self.poll_limit {
            match self.transport.read_byte() {
                Ok(byte) => return Ok(byte),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(Error::I2c(e)),
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "ds7505 {=u8:x}: no data after {=u32} polls",
            self.address.bits(),
            self.poll_limit
        );
        Err(Error::Timeout)
    }
}

fn validate_limits<E: core::fmt::Debug>(trip: f32, hysteresis: f32) -> Result<(), Error<E>> {
    let in_range = |t: f32| (TEMP_MIN..=TEMP_MAX).contains(&t);
    if !in_range(trip) || !in_range(hysteresis) {
        return Err(Error::OutOfRange);
    }
    if trip < hysteresis {
        return Err(Error::InvertedLimits);
    }
    Ok(())
}
