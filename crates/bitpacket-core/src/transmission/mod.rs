//! Transmission bit format.
//!
//! The format follows the same layering as the rest of the crate:
//! - `layout`: field widths and type ids (source of truth)
//! - `reader`: bit cursor over the hex-decoded buffer
//! - `parser`: recursive packet decoding (no direct bit arithmetic)
//! - `writer`: packet encoding back to hex
//! - `error`: explicit, actionable errors
//!
//! Every packet starts with a 3-bit version and a 3-bit type id. Literals
//! (type 4) carry 5-bit groups, a continuation flag plus one nibble each.
//! Operators carry a 1-bit length type followed by either a 15-bit total
//! child length or an 11-bit child count. Decoding consumes exactly the bits
//! of each packet, so siblings and parents resume at the right offset.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use parser::{LengthType, decode_all, decode_hex, decode_packet};
pub use reader::BitReader;
pub use writer::{BitWriter, LengthPolicy, encode_hex, encode_packet};
