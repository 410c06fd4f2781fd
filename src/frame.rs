/// Number of bytes in one sensor frame.
pub const FRAME_LEN: usize = 5;

/// The 40-bit payload of one sensor transaction.
///
/// Layout: humidity (2 bytes, big-endian), temperature (2 bytes, bit 15 is
/// the sign), checksum (low 8 bits of the sum of the first four bytes).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawFrame(pub [u8; FRAME_LEN]);

impl RawFrame {
    /// Builds a well-formed frame carrying `reading`.
    ///
    /// The temperature magnitude is 15 bits wide; `i16::MIN` saturates to
    /// -3276.7 C.
    pub fn from_reading(reading: Reading) -> Self {
        let [hum_hi, hum_lo] = reading.humidity_tenths.to_be_bytes();
        let magnitude = reading.temperature_tenths.unsigned_abs().min(0x7FFF);
        let [mut temp_hi, temp_lo] = magnitude.to_be_bytes();
        if reading.temperature_tenths < 0 {
            temp_hi |= 0x80;
        }
        let data = [hum_hi, hum_lo, temp_hi, temp_lo];
        let checksum = Self::sum(&data);

        RawFrame([hum_hi, hum_lo, temp_hi, temp_lo, checksum])
    }

    /// The four data bytes, without the checksum.
    pub fn data(&self) -> [u8; 4] {
        let [a, b, c, d, _] = self.0;
        [a, b, c, d]
    }

    /// The checksum byte as transmitted by the sensor.
    pub fn checksum(&self) -> u8 {
        self.0[4]
    }

    /// Whether the transmitted checksum matches the data bytes.
    pub fn checksum_ok(&self) -> bool {
        Self::sum(&self.data()) == self.checksum()
    }

    /// Decodes humidity and temperature, ignoring the checksum.
    pub fn decode(&self) -> Reading {
        let [hum_hi, hum_lo, temp_hi, temp_lo] = self.data();

        let humidity_tenths = i16::from_be_bytes([hum_hi, hum_lo]);

        let is_temp_negative = (temp_hi >> 7) != 0;
        let magnitude = i16::from_be_bytes([temp_hi & 0b0111_1111, temp_lo]);
        let temperature_tenths = if is_temp_negative {
            -magnitude
        } else {
            magnitude
        };

        Reading {
            temperature_tenths,
            humidity_tenths,
        }
    }

    fn sum(data: &[u8; 4]) -> u8 {
        data.iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }
}

/// Reading decoded from the AM2301, in tenths of a unit.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reading {
    /// Temperature in tenths of a degree Celsius.
    pub temperature_tenths: i16,
    /// Relative humidity in tenths of a percent.
    pub humidity_tenths: i16,
}

impl Reading {
    pub const fn new(temperature_tenths: i16, humidity_tenths: i16) -> Self {
        Reading {
            temperature_tenths,
            humidity_tenths,
        }
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature_tenths as f32 / 10.0
    }

    /// Relative humidity in percent.
    pub fn relative_humidity(&self) -> f32 {
        self.humidity_tenths as f32 / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_matches_wrapping_sum() {
        // 0xFF + 0xFF + 0x01 + 0x03 = 0x202 -> 0x02
        assert!(RawFrame([0xFF, 0xFF, 0x01, 0x03, 0x02]).checksum_ok());
        assert!(!RawFrame([0xFF, 0xFF, 0x01, 0x03, 0x03]).checksum_ok());
        assert!(RawFrame([0, 0, 0, 0, 0]).checksum_ok());
    }

    #[test]
    fn test_checksum_exhaustive_last_byte() {
        let data = [0x01, 0x90, 0x00, 0xF6];
        for checksum in 0..=u8::MAX {
            let frame = RawFrame([data[0], data[1], data[2], data[3], checksum]);
            assert_eq!(frame.checksum_ok(), checksum == 0x87);
        }
    }

    #[test]
    fn test_decode_positive_temp() {
        // Humidity: 55.5% -> [0x02, 0x2B] => 555
        // Temperature: 24.6C -> [0x00, 0xF6] => 246
        let reading = RawFrame([0x02, 0x2B, 0x00, 0xF6, 0x23]).decode();

        assert_eq!(reading, Reading::new(246, 555));
        assert_eq!(reading.temperature(), 24.6);
        assert_eq!(reading.relative_humidity(), 55.5);
    }

    #[test]
    fn test_decode_negative_temp() {
        // Bit 7 of temp_hi is 1 => negative, magnitude 0x0032 = 50
        let reading = RawFrame([0x01, 0x90, 0x80, 0x32, 0x43]).decode();

        assert_eq!(reading.temperature_tenths, -50);
        assert_eq!(reading.temperature(), -5.0);
        assert_eq!(reading.humidity_tenths, 400);
    }

    #[test]
    fn test_decode_humidity_is_signed() {
        let reading = RawFrame([0xFF, 0xF6, 0x00, 0x00, 0xF5]).decode();
        assert_eq!(reading.humidity_tenths, -10);
    }

    #[test]
    fn test_from_reading_builds_valid_frame() {
        let frame = RawFrame::from_reading(Reading::new(-50, 400));

        assert_eq!(frame, RawFrame([0x01, 0x90, 0x80, 0x32, 0x43]));
        assert!(frame.checksum_ok());
        assert_eq!(frame.decode(), Reading::new(-50, 400));
    }

    #[test]
    fn test_from_reading_saturates_temperature_magnitude() {
        let frame = RawFrame::from_reading(Reading::new(i16::MIN, 0));

        assert!(frame.checksum_ok());
        assert_eq!(frame.decode().temperature_tenths, -0x7FFF);
    }
}
