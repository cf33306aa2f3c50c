use super::error::DecodeError;
use super::layout;

/// MSB-first bit cursor over a hex-decoded transmission.
///
/// The position only moves forward: every successful `read_bits(n)` advances
/// it by exactly `n`. Bits between `bit_len` and the end of the backing
/// buffer are never readable.
#[derive(Debug, Clone)]
pub struct BitReader {
    data: Vec<u8>,
    bit_len: usize,
    position: usize,
}

impl BitReader {
    pub fn new(data: Vec<u8>) -> Self {
        let bit_len = data.len() * 8;
        Self {
            data,
            bit_len,
            position: 0,
        }
    }

    /// Build a reader exposing only the first `bit_len` bits of `data`.
    pub fn with_bit_len(data: Vec<u8>, bit_len: usize) -> Self {
        let bit_len = bit_len.min(data.len() * 8);
        Self {
            data,
            bit_len,
            position: 0,
        }
    }

    /// Decode a hex string, one nibble per digit.
    ///
    /// An odd number of digits is accepted; the stream length stays
    /// `digits * 4` bits.
    pub fn from_hex(hex_str: &str) -> Result<Self, DecodeError> {
        let nibbles = hex_str.len();
        let data = if nibbles % 2 == 0 {
            hex::decode(hex_str)?
        } else {
            let mut padded = String::with_capacity(nibbles + 1);
            padded.push_str(hex_str);
            padded.push('0');
            hex::decode(padded)?
        };
        Ok(Self::with_bit_len(data, nibbles * layout::BITS_PER_NIBBLE))
    }

    /// Read `count` bits (1..=32) as an unsigned integer, MSB first.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, DecodeError> {
        if count == 0 || count > layout::MAX_READ_BITS {
            return Err(DecodeError::InvalidBitCount { count });
        }
        self.require_bits(count)?;

        let mut result = 0u64;
        let mut remaining = count as usize;
        while remaining > 0 {
            let byte_idx = self.position / 8;
            let bit_offset = self.position % 8;
            let bits_in_byte = 8 - bit_offset;
            let bits_to_read = remaining.min(bits_in_byte);

            let byte = self.data[byte_idx];
            let mask = ((1u16 << bits_to_read) - 1) as u8;
            let bits = (byte >> (bits_in_byte - bits_to_read)) & mask;
            result = (result << bits_to_read) | u64::from(bits);

            self.position += bits_to_read;
            remaining -= bits_to_read;
        }

        Ok(result as u32)
    }

    pub fn read_flag(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_bits(1)? == 1)
    }

    pub fn require_bits(&self, count: u32) -> Result<(), DecodeError> {
        if count as usize > self.bits_remaining() {
            return Err(DecodeError::OutOfBounds {
                requested: count,
                position: self.position,
                bit_len: self.bit_len,
            });
        }
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn bits_remaining(&self) -> usize {
        self.bit_len - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.bit_len
    }

    /// True when every unread bit is zero (trailing padding).
    pub fn remaining_is_zero(&self) -> bool {
        (self.position..self.bit_len).all(|idx| (self.data[idx / 8] & (0x80 >> (idx % 8))) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::BitReader;
    use crate::transmission::error::DecodeError;

    #[test]
    fn reads_across_byte_boundaries() {
        let mut reader = BitReader::new(vec![0b1011_0011, 0b0101_1100]);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(7).unwrap(), 0b1_0011_01);
        assert_eq!(reader.read_bits(6).unwrap(), 0b01_1100);
        assert!(reader.is_empty());
    }

    #[test]
    fn reads_full_32_bits() {
        let mut reader = BitReader::new(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x80]);
        assert_eq!(reader.read_bits(32).unwrap(), 0xDEAD_BEEF);
        assert!(reader.read_flag().unwrap());
        assert_eq!(reader.position(), 33);
    }

    #[test]
    fn out_of_range_read_fails_without_advancing() {
        let mut reader = BitReader::new(vec![0xFF]);
        reader.read_bits(6).unwrap();
        let err = reader.read_bits(3).unwrap_err();
        assert_eq!(
            err,
            DecodeError::OutOfBounds {
                requested: 3,
                position: 6,
                bit_len: 8,
            }
        );
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn rejects_invalid_bit_counts() {
        let mut reader = BitReader::new(vec![0u8; 8]);
        assert!(matches!(
            reader.read_bits(0),
            Err(DecodeError::InvalidBitCount { count: 0 })
        ));
        assert!(matches!(
            reader.read_bits(33),
            Err(DecodeError::InvalidBitCount { count: 33 })
        ));
    }

    #[test]
    fn from_hex_keeps_nibble_length() {
        let reader = BitReader::from_hex("D2FE28").unwrap();
        assert_eq!(reader.bit_len(), 24);

        let mut odd = BitReader::from_hex("abc").unwrap();
        assert_eq!(odd.bit_len(), 12);
        assert_eq!(odd.read_bits(12).unwrap(), 0xABC);
        assert!(odd.read_bits(1).is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let err = BitReader::from_hex("D2FZ").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHex(_)));
    }

    #[test]
    fn remaining_is_zero_detects_padding() {
        let mut reader = BitReader::from_hex("F0").unwrap();
        assert!(!reader.remaining_is_zero());
        reader.read_bits(4).unwrap();
        assert!(reader.remaining_is_zero());
        reader.read_bits(4).unwrap();
        assert!(reader.remaining_is_zero());
    }
}
