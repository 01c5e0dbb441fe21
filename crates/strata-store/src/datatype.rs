//! Element-type descriptors.
//!
//! A [`Datatype`] is a runtime description of one element kind from the
//! closed supported set: fixed-width integers, IEEE floats, and fixed-length
//! byte strings. Equality is structural, so two byte-string types with
//! different declared lengths compare unequal even though both are strings.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::StoreError;

/// Class tag bytes used in the encoded form.
const CLASS_FIXED_POINT: u8 = 0;
const CLASS_FLOATING_POINT: u8 = 1;
const CLASS_BYTES: u8 = 2;

/// A parsed element-type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datatype {
    /// Fixed-point (integer) types.
    FixedPoint {
        /// Byte width.
        size: u32,
        /// Two's-complement signedness.
        signed: bool,
    },
    /// IEEE floating-point types.
    FloatingPoint {
        /// Byte width.
        size: u32,
    },
    /// Fixed-length byte string, sized to the declared length.
    Bytes {
        /// Declared length in bytes.
        size: u32,
    },
}

impl Datatype {
    /// Byte width of one element of this type.
    pub fn size(&self) -> usize {
        match self {
            Datatype::FixedPoint { size, .. }
            | Datatype::FloatingPoint { size }
            | Datatype::Bytes { size } => *size as usize,
        }
    }

    /// Serialize to the encoded form: class byte, then a LE `u32` size,
    /// then class-specific fields.
    pub fn serialize(&self, buf: &mut Vec<u8>) {
        match self {
            Datatype::FixedPoint { size, signed } => {
                buf.push(CLASS_FIXED_POINT);
                buf.extend_from_slice(&size.to_le_bytes());
                buf.push(u8::from(*signed));
            }
            Datatype::FloatingPoint { size } => {
                buf.push(CLASS_FLOATING_POINT);
                buf.extend_from_slice(&size.to_le_bytes());
            }
            Datatype::Bytes { size } => {
                buf.push(CLASS_BYTES);
                buf.extend_from_slice(&size.to_le_bytes());
            }
        }
    }

    /// Parse a descriptor from `data`, returning it and the bytes consumed.
    pub fn parse(data: &[u8]) -> Result<(Datatype, usize), StoreError> {
        ensure_len(data, 5)?;
        let class = data[0];
        let size = LittleEndian::read_u32(&data[1..5]);
        match class {
            CLASS_FIXED_POINT => {
                ensure_len(data, 6)?;
                let signed = match data[5] {
                    0 => false,
                    1 => true,
                    v => {
                        return Err(StoreError::InvalidTag {
                            what: "signedness",
                            value: v,
                        })
                    }
                };
                Ok((Datatype::FixedPoint { size, signed }, 6))
            }
            CLASS_FLOATING_POINT => Ok((Datatype::FloatingPoint { size }, 5)),
            CLASS_BYTES => Ok((Datatype::Bytes { size }, 5)),
            v => Err(StoreError::InvalidTag {
                what: "datatype class",
                value: v,
            }),
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::FixedPoint { size, signed: true } => write!(f, "int{}", size * 8),
            Datatype::FixedPoint {
                size,
                signed: false,
            } => write!(f, "uint{}", size * 8),
            Datatype::FloatingPoint { size } => write!(f, "float{}", size * 8),
            Datatype::Bytes { size } => write!(f, "bytes[{size}]"),
        }
    }
}

fn ensure_len(data: &[u8], needed: usize) -> Result<(), StoreError> {
    if data.len() < needed {
        Err(StoreError::UnexpectedEof {
            expected: needed,
            available: data.len(),
        })
    } else {
        Ok(())
    }
}
