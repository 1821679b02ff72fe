//! ADS1115 16-bit ADC driver
//!
//! Runs the converter in continuous mode on one single-ended channel and
//! reads the latest conversion on demand.

use embedded_hal::i2c::{Error as _, I2c};

use super::{AnalogInput, HardwareError, HardwareResult};

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

// Config register fields
const MUX_SINGLE_ENDED_BASE: u16 = 0b100 << 12;
const PGA_4_096V: u16 = 0b001 << 9;
const MODE_CONTINUOUS: u16 = 0;
const DR_128_SPS: u16 = 0b100 << 5;
const COMP_QUE_DISABLE: u16 = 0b11;

pub struct Ads1115<I> {
    i2c: I,
    address: u8,
    channel: u8,
}

impl<I: I2c> Ads1115<I> {
    /// Configure the converter and start continuous conversion
    pub fn new(i2c: I, address: u8, channel: u8) -> HardwareResult<Self> {
        if channel > 3 {
            return Err(HardwareError::InvalidValue(format!(
                "ADS1115 channel must be 0-3, got {}",
                channel
            )));
        }

        let mut adc = Self {
            i2c,
            address,
            channel,
        };
        adc.write_config()?;
        Ok(adc)
    }

    /// Config word for the selected channel
    pub fn config_word(channel: u8) -> u16 {
        MUX_SINGLE_ENDED_BASE
            | (u16::from(channel) << 12)
            | PGA_4_096V
            | MODE_CONTINUOUS
            | DR_128_SPS
            | COMP_QUE_DISABLE
    }

    fn write_config(&mut self) -> HardwareResult<()> {
        let [hi, lo] = Self::config_word(self.channel).to_be_bytes();
        self.i2c
            .write(self.address, &[REG_CONFIG, hi, lo])
            .map_err(|e| HardwareError::I2c(format!("config write failed: {:?}", e.kind())))
    }

    /// Read the latest conversion result
    pub fn read(&mut self) -> HardwareResult<i16> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONVERSION], &mut buf)
            .map_err(|e| HardwareError::I2c(format!("conversion read failed: {:?}", e.kind())))?;
        Ok(i16::from_be_bytes(buf))
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c + Send> AnalogInput for Ads1115<I> {
    fn read_raw(&mut self) -> HardwareResult<i16> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Register-level stand-in for the chip
    #[derive(Default)]
    struct FakeBus {
        writes: Vec<(u8, Vec<u8>)>,
        conversion: [u8; 2],
        fail: bool,
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Bus);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buf) => buf.copy_from_slice(&self.conversion[..buf.len()]),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_config_word_channel_0() {
        assert_eq!(Ads1115::<FakeBus>::config_word(0), 0x4283);
        assert_eq!(Ads1115::<FakeBus>::config_word(3), 0x7283);
    }

    #[test]
    fn test_new_writes_config_register() {
        let adc = Ads1115::new(FakeBus::default(), 0x48, 1).unwrap();
        let bus = adc.release();
        assert_eq!(bus.writes, vec![(0x48, vec![REG_CONFIG, 0x52, 0x83])]);
    }

    #[test]
    fn test_read_decodes_big_endian() {
        let bus = FakeBus {
            conversion: [0x40, 0x00],
            ..Default::default()
        };
        let mut adc = Ads1115::new(bus, 0x48, 0).unwrap();
        assert_eq!(adc.read().unwrap(), 0x4000);

        let bus = FakeBus {
            conversion: [0xFF, 0xFE],
            ..Default::default()
        };
        let mut adc = Ads1115::new(bus, 0x48, 0).unwrap();
        assert_eq!(adc.read_raw().unwrap(), -2);
    }

    #[test]
    fn test_rejects_bad_channel() {
        let result = Ads1115::new(FakeBus::default(), 0x48, 4);
        assert!(matches!(result, Err(HardwareError::InvalidValue(_))));
    }

    #[test]
    fn test_bus_error_maps_to_i2c() {
        let bus = FakeBus {
            fail: true,
            ..Default::default()
        };
        let result = Ads1115::new(bus, 0x48, 0);
        assert!(matches!(result, Err(HardwareError::I2c(_))));
    }
}
