//! Configuration register.
//!
//! `[NVB R1 R0 F1 F0 POL TM SD]`, bit 7 to bit 0.

const NVB_MSK: u8 = 0x80;

const RESOLUTION_MSK: u8 = 0x60;
const RESOLUTION_POS: u8 = 5;

const FAULT_TOLERANCE_MSK: u8 = 0x18;
const FAULT_TOLERANCE_POS: u8 = 3;

const POLARITY_MSK: u8 = 0x04;
const POLARITY_POS: u8 = 2;

const THERMOSTAT_MODE_MSK: u8 = 0x02;
const THERMOSTAT_MODE_POS: u8 = 1;

const SHUTDOWN_MSK: u8 = 0x01;

macro_rules! set_bits {
    ($reg_data:expr, $mask:expr, $pos:expr, $data:expr) => {
        ($reg_data & !$mask) | (($data << $pos) & $mask)
    };
}

/// Conversion resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Resolution {
    /// 0.5°C
    Nine = 0b00,
    /// 0.25°C
    Ten = 0b01,
    /// 0.125°C
    Eleven = 0b10,
    /// 0.0625°C
    Twelve = 0b11,
}

impl Resolution {
    fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0b00 => Resolution::Nine,
            0b01 => Resolution::Ten,
            0b10 => Resolution::Eleven,
            _ => Resolution::Twelve,
        }
    }

    pub fn bits(&self) -> u8 {
        match self {
            Resolution::Nine => 9,
            Resolution::Ten => 10,
            Resolution::Eleven => 11,
            Resolution::Twelve => 12,
        }
    }

    /// Maximum conversion time from the datasheet.
    pub fn conversion_time_ms(&self) -> u16 {
        match self {
            Resolution::Nine => 25,
            Resolution::Ten => 50,
            Resolution::Eleven => 100,
            Resolution::Twelve => 200,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Nine
    }
}

/// How many consecutive out-of-limit conversions trip the thermostat output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultTolerance {
    One = 0b00,
    Two = 0b01,
    Four = 0b10,
    Six = 0b11,
}

impl FaultTolerance {
    fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0b00 => FaultTolerance::One,
            0b01 => FaultTolerance::Two,
            0b10 => FaultTolerance::Four,
            _ => FaultTolerance::Six,
        }
    }

    pub fn count(&self) -> u8 {
        match self {
            FaultTolerance::One => 1,
            FaultTolerance::Two => 2,
            FaultTolerance::Four => 4,
            FaultTolerance::Six => 6,
        }
    }
}

impl Default for FaultTolerance {
    fn default() -> Self {
        FaultTolerance::One
    }
}

/// O.S. output polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Polarity {
    ActiveLow = 0,
    ActiveHigh = 1,
}

impl Default for Polarity {
    fn default() -> Self {
        Polarity::ActiveLow
    }
}

/// Thermostat operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ThermostatMode {
    /// O.S. stays active until the temperature falls below the hysteresis limit.
    Comparator = 0,
    /// O.S. stays active until any register is read.
    Interrupt = 1,
}

impl Default for ThermostatMode {
    fn default() -> Self {
        ThermostatMode::Comparator
    }
}

/// Configuration register contents.
///
/// `Config::default()` is the power-up value `0x00`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config(u8);

impl Config {
    /// Given resolution, every other field cleared.
    pub const fn new(resolution: Resolution) -> Self {
        Config((resolution as u8) << RESOLUTION_POS)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Config(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// NV memory copy in progress. Read-only on the device.
    pub fn is_nv_busy(&self) -> bool {
        self.0 & NVB_MSK != 0
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::from_code((self.0 & RESOLUTION_MSK) >> RESOLUTION_POS)
    }

    pub fn with_resolution(self, resolution: Resolution) -> Self {
        Config(set_bits!(self.0, RESOLUTION_MSK, RESOLUTION_POS, resolution as u8))
    }

    pub fn fault_tolerance(&self) -> FaultTolerance {
        FaultTolerance::from_code((self.0 & FAULT_TOLERANCE_MSK) >> FAULT_TOLERANCE_POS)
    }

    pub fn with_fault_tolerance(self, fault_tolerance: FaultTolerance) -> Self {
        Config(set_bits!(
            self.0,
            FAULT_TOLERANCE_MSK,
            FAULT_TOLERANCE_POS,
            fault_tolerance as u8
        ))
    }

    pub fn polarity(&self) -> Polarity {
        if self.0 & POLARITY_MSK != 0 {
            Polarity::ActiveHigh
        } else {
            Polarity::ActiveLow
        }
    }

    pub fn with_polarity(self, polarity: Polarity) -> Self {
        Config(set_bits!(self.0, POLARITY_MSK, POLARITY_POS, polarity as u8))
    }

    pub fn thermostat_mode(&self) -> ThermostatMode {
        if self.0 & THERMOSTAT_MODE_MSK != 0 {
            ThermostatMode::Interrupt
        } else {
            ThermostatMode::Comparator
        }
    }

    pub fn with_thermostat_mode(self, mode: ThermostatMode) -> Self {
        Config(set_bits!(self.0, THERMOSTAT_MODE_MSK, THERMOSTAT_MODE_POS, mode as u8))
    }

    pub fn is_shutdown(&self) -> bool {
        self.0 & SHUTDOWN_MSK != 0
    }

    pub fn with_shutdown(self, shutdown: bool) -> Self {
        Config(set_bits!(self.0, SHUTDOWN_MSK, 0, shutdown as u8))
    }
}

impl From<u8> for Config {
    fn from(bits: u8) -> Self {
        Config(bits)
    }
}

impl From<Config> for u8 {
    fn from(config: Config) -> Self {
        config.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_lands_in_bits_6_5() {
        assert_eq!(Config::new(Resolution::Nine).bits(), 0x00);
        assert_eq!(Config::new(Resolution::Ten).bits(), 0x20);
        assert_eq!(Config::new(Resolution::Eleven).bits(), 0x40);
        assert_eq!(Config::new(Resolution::Twelve).bits(), 0x60);
    }

    #[test]
    fn fault_tolerance_replaces_only_bits_4_3() {
        let config = Config::from_bits(0b0111_1111).with_fault_tolerance(FaultTolerance::Four);
        assert_eq!(config.bits(), 0b0111_0111);
        assert_eq!(config.fault_tolerance(), FaultTolerance::Four);

        let config = Config::new(Resolution::Twelve).with_fault_tolerance(FaultTolerance::Six);
        assert_eq!(config.bits(), 0x78);
        assert_eq!(config.resolution(), Resolution::Twelve);
    }

    #[test]
    fn single_bit_fields() {
        let config = Config::default()
            .with_polarity(Polarity::ActiveHigh)
            .with_thermostat_mode(ThermostatMode::Interrupt)
            .with_shutdown(true);
        assert_eq!(config.bits(), 0b0000_0111);
        assert_eq!(config.polarity(), Polarity::ActiveHigh);
        assert_eq!(config.thermostat_mode(), ThermostatMode::Interrupt);
        assert!(config.is_shutdown());

        let config = config.with_shutdown(false).with_polarity(Polarity::ActiveLow);
        assert_eq!(config.bits(), 0b0000_0010);
    }

    #[test]
    fn nv_busy_flag() {
        assert!(Config::from_bits(0x80).is_nv_busy());
        assert!(!Config::from_bits(0x7f).is_nv_busy());
    }

    #[test]
    fn field_counts() {
        assert_eq!(Resolution::Eleven.bits(), 11);
        assert_eq!(Resolution::Twelve.conversion_time_ms(), 200);
        assert_eq!(FaultTolerance::Six.count(), 6);
    }
}
