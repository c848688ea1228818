//! # Fixed-Width Encoding
//!
//! Byte-order-aware encode/decode for the primitive wire types.
//!
//! Every numeric value goes through [`Primitive`], which converts explicitly
//! between a value and its byte array instead of reinterpreting memory. The
//! order is picked once per buffer through [`ByteOrder`].
//!
//! | Type   | Width |
//! |--------|-------|
//! | short  | 2     |
//! | int    | 4     |
//! | long   | 8     |
//! | float  | 4     |
//! | double | 8     |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order for fixed-width values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Host order. Peers must share endianness.
    #[default]
    Native,
    /// Little endian regardless of host
    Little,
    /// Big endian (network order) regardless of host
    Big,
}

impl ByteOrder {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Native => "native",
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(ByteOrder::Native),
            "little" | "le" => Ok(ByteOrder::Little),
            "big" | "be" | "network" => Ok(ByteOrder::Big),
            other => Err(format!("Unknown byte order: {other}")),
        }
    }
}

/// A fixed-width value with an explicit wire representation
pub trait Primitive: Copy + Sized {
    /// Encoded width in bytes
    const WIDTH: usize;

    /// Write the encoded value into the first `WIDTH` bytes of `out`
    fn encode(self, order: ByteOrder, out: &mut [u8]);

    /// Decode from exactly `WIDTH` bytes
    fn decode(order: ByteOrder, bytes: &[u8]) -> Self;
}

macro_rules! primitive_codec {
    ($type:ty) => {
        impl Primitive for $type {
            const WIDTH: usize = std::mem::size_of::<$type>();

            fn encode(self, order: ByteOrder, out: &mut [u8]) {
                let bytes = match order {
                    ByteOrder::Native => self.to_ne_bytes(),
                    ByteOrder::Little => self.to_le_bytes(),
                    ByteOrder::Big => self.to_be_bytes(),
                };
                out[..Self::WIDTH].copy_from_slice(&bytes);
            }

            fn decode(order: ByteOrder, bytes: &[u8]) -> Self {
                let mut buffer = [0u8; std::mem::size_of::<$type>()];
                buffer.copy_from_slice(&bytes[..Self::WIDTH]);
                match order {
                    ByteOrder::Native => <$type>::from_ne_bytes(buffer),
                    ByteOrder::Little => <$type>::from_le_bytes(buffer),
                    ByteOrder::Big => <$type>::from_be_bytes(buffer),
                }
            }
        }
    };
}
primitive_codec!(u8);
primitive_codec!(i16);
primitive_codec!(u16);
primitive_codec!(i32);
primitive_codec!(u32);
primitive_codec!(i64);
primitive_codec!(u64);
primitive_codec!(f32);
primitive_codec!(f64);
