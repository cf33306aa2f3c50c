pub const VERSION_BITS: u32 = 3;
pub const TYPE_ID_BITS: u32 = 3;

pub const LITERAL_TYPE_ID: u8 = 4;
pub const LITERAL_CONTINUE_BITS: u32 = 1;
pub const LITERAL_NIBBLE_BITS: u32 = 4;

pub const LENGTH_TYPE_BITS: u32 = 1;
pub const TOTAL_BIT_LENGTH_BITS: u32 = 15;
pub const SUBPACKET_COUNT_BITS: u32 = 11;

pub const LENGTH_TYPE_TOTAL_BITS: u32 = 0;
pub const LENGTH_TYPE_SUBPACKET_COUNT: u32 = 1;

pub const MAX_READ_BITS: u32 = 32;
pub const BITS_PER_NIBBLE: usize = 4;

/// Largest value representable in `width` bits (`width` <= 32).
pub const fn max_field_value(width: u32) -> u64 {
    (1u64 << width) - 1
}
