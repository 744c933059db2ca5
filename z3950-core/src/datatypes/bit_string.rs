//! Bit string type used for Z39.50 protocol version and option masks

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits, numbered from the most significant bit of the
/// first byte. A bit string value can have any length including zero.
///
/// The byte buffer always holds exactly `ceil(num_bits / 8)` bytes, so the
/// number of unused trailing bits is always in `0..=7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBitString")]
pub struct BitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: usize,
}

#[derive(Deserialize)]
struct RawBitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: usize,
}

impl TryFrom<RawBitString> for BitString {
    type Error = CoreError;

    fn try_from(raw: RawBitString) -> CoreResult<Self> {
        Self::new(raw.bytes, raw.num_bits)
    }
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The bit string as a byte array
    /// * `num_bits` - The number of bits
    ///
    /// # Errors
    ///
    /// Returns an error unless `bytes.len() == ceil(num_bits / 8)`.
    pub fn new(bytes: Vec<u8>, num_bits: usize) -> CoreResult<Self> {
        let needed = num_bits.div_ceil(8);
        if bytes.len() != needed {
            return Err(CoreError::InvalidBitString(format!(
                "{} bits need exactly {} bytes, got {}",
                num_bits,
                needed,
                bytes.len()
            )));
        }

        Ok(Self { bytes, num_bits })
    }

    /// Create an all-zero bit string of the given length
    pub fn zeroed(num_bits: usize) -> Self {
        Self {
            bytes: vec![0; num_bits.div_ceil(8)],
            num_bits,
        }
    }

    /// Create a bit string from individual bits, first element is bit 0
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut result = Self::zeroed(bits.len());
        for (index, &bit) in bits.iter().enumerate() {
            if bit {
                result.bytes[index / 8] |= 0x80 >> (index % 8);
            }
        }
        result
    }

    /// Get the bit string as byte array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bits in the byte array.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of unused bits in the last byte (0-7)
    pub fn unused_bits(&self) -> u8 {
        (self.bytes.len() * 8 - self.num_bits) as u8
    }

    /// Get the bit at a specific position
    ///
    /// # Arguments
    /// * `index` - The bit index (0-based, MSB first)
    ///
    /// # Returns
    /// * `true` if the bit is set, `false` otherwise
    /// * `Err` if the index is out of bounds
    pub fn get_bit(&self, index: usize) -> CoreResult<bool> {
        if index >= self.num_bits {
            return Err(CoreError::InvalidBitString(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        Ok((self.bytes[byte_index] >> bit_index) & 1 == 1)
    }

    /// Set the bit at a specific position
    ///
    /// # Returns
    /// * `Err` if the index is out of bounds
    pub fn set_bit(&mut self, index: usize, value: bool) -> CoreResult<()> {
        if index >= self.num_bits {
            return Err(CoreError::InvalidBitString(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        if value {
            self.bytes[byte_index] |= 1 << bit_index;
        } else {
            self.bytes[byte_index] &= !(1 << bit_index);
        }
        Ok(())
    }

    /// Indices of all set bits, in ascending order
    pub fn set_bits(&self) -> Vec<usize> {
        (0..self.num_bits)
            .filter(|&i| (self.bytes[i / 8] >> (7 - i % 8)) & 1 == 1)
            .collect()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.num_bits {
            let bit = (self.bytes[index / 8] >> (7 - index % 8)) & 1;
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_new() {
        let bytes = vec![0xFF, 0x00, 0xAA];
        let bit_string = BitString::new(bytes.clone(), 24).unwrap();
        assert_eq!(bit_string.as_bytes(), &bytes);
        assert_eq!(bit_string.num_bits(), 24);
        assert_eq!(bit_string.unused_bits(), 0);
    }

    #[test]
    fn test_bit_string_invalid() {
        assert!(BitString::new(vec![0xFF], 16).is_err());
        // Surplus byte cannot be described by an unused-bits count
        assert!(BitString::new(vec![0xFF, 0x00], 4).is_err());
    }

    #[test]
    fn test_bit_string_partial_byte() {
        let bit_string = BitString::new(vec![0xF0], 4).unwrap();
        assert_eq!(bit_string.num_bits(), 4);
        assert_eq!(bit_string.unused_bits(), 4);
        assert_eq!(bit_string.to_string(), "1111");
    }

    #[test]
    fn test_from_bits_and_set_bits() {
        let mut bits = BitString::from_bits(&[true, false, true]);
        assert_eq!(bits.as_bytes(), &[0xA0]);
        assert_eq!(bits.set_bits(), vec![0, 2]);

        bits.set_bit(1, true).unwrap();
        assert!(bits.get_bit(1).unwrap());
        assert!(bits.get_bit(3).is_err());
    }

    #[test]
    fn test_empty_bit_string() {
        let bits = BitString::zeroed(0);
        assert!(bits.as_bytes().is_empty());
        assert_eq!(bits.unused_bits(), 0);
    }
}
