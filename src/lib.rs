//! Platform-agnostic driver for the Maxim DS7505 digital thermometer and
//! thermostat.
//!
//! ```no_run
//! # fn demo<I: embedded_hal_1::i2c::I2c>(i2c: I, delay: &mut impl embedded_hal_1::delay::DelayNs) -> Result<(), ds7505_driver::Error<I::Error>> {
//! use ds7505_driver::{Address, Ds7505, FaultTolerance, Resolution, TempRegister};
//!
//! // A2, A1, A0 tied to ground
//! let mut ds = Ds7505::new_i2c(i2c, Address::from_straps(false, false, false));
//! ds.init(Resolution::Twelve)?;
//!
//! ds.set_thermostat(32.45, 30.14, FaultTolerance::Six)?;
//! let _trip = ds.read_temperature(TempRegister::Trip)?;
//! let _hysteresis = ds.read_temperature(TempRegister::Hysteresis)?;
//!
//! // keep the limits over power cycles
//! ds.copy_to_nv(delay)?;
//!
//! let _celsius = ds.temperature()?;
//! # Ok(())
//! # }
//! ```

#![no_std]

pub mod bus;
pub mod ds7505;

pub use crate::bus::{I2cTransport, LegacyI2cTransport, Transport};
pub use crate::ds7505::{
    Address, Command, Config, Ds7505, Error, FaultTolerance, Polarity, Register, Resolution, TempRegister,
    ThermostatMode,
};
