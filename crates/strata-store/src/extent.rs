//! Shape descriptors for stored arrays.

use crate::error::StoreError;

/// Type-of-extent tag bytes used in the encoded form.
const EXTENT_NULL: u8 = 0;
const EXTENT_SCALAR: u8 = 1;
const EXTENT_SIMPLE: u8 = 2;

/// The shape of a stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extent {
    /// No data: rank 0, zero elements. The empty/default shape.
    Null,
    /// A single element: rank 0, one element.
    Scalar,
    /// An N-dimensional array; rank is the number of dimensions.
    Simple(Vec<u64>),
}

impl Extent {
    /// Number of dimensions. `Null` and `Scalar` are rank 0.
    pub fn rank(&self) -> usize {
        match self {
            Extent::Null | Extent::Scalar => 0,
            Extent::Simple(dims) => dims.len(),
        }
    }

    /// Total number of elements. Null = 0, Scalar = 1.
    pub fn num_elements(&self) -> u64 {
        match self {
            Extent::Null => 0,
            Extent::Scalar => 1,
            Extent::Simple(dims) => dims.iter().product(),
        }
    }

    /// The per-axis sizes; empty for rank-0 extents.
    pub fn dims(&self) -> &[u64] {
        match self {
            Extent::Null | Extent::Scalar => &[],
            Extent::Simple(dims) => dims,
        }
    }

    /// Serialize to the encoded form: tag byte, then for `Simple` a LE `u16`
    /// rank followed by LE `u64` sizes.
    pub fn serialize(&self, buf: &mut Vec<u8>) {
        match self {
            Extent::Null => buf.push(EXTENT_NULL),
            Extent::Scalar => buf.push(EXTENT_SCALAR),
            Extent::Simple(dims) => {
                buf.push(EXTENT_SIMPLE);
                buf.extend_from_slice(&(dims.len() as u16).to_le_bytes());
                for &d in dims {
                    buf.extend_from_slice(&d.to_le_bytes());
                }
            }
        }
    }

    /// Parse an extent from `data`, returning it and the bytes consumed.
    pub fn parse(data: &[u8]) -> Result<(Extent, usize), StoreError> {
        ensure_len(data, 1)?;
        match data[0] {
            EXTENT_NULL => Ok((Extent::Null, 1)),
            EXTENT_SCALAR => Ok((Extent::Scalar, 1)),
            EXTENT_SIMPLE => {
                ensure_len(data, 3)?;
                let rank = u16::from_le_bytes([data[1], data[2]]) as usize;
                ensure_len(data, 3 + rank * 8)?;
                let mut dims = Vec::with_capacity(rank);
                let mut pos = 3;
                for _ in 0..rank {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(&data[pos..pos + 8]);
                    dims.push(u64::from_le_bytes(raw));
                    pos += 8;
                }
                Ok((Extent::Simple(dims), pos))
            }
            v => Err(StoreError::InvalidTag {
                what: "extent",
                value: v,
            }),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(e: &Extent) -> Extent {
        let mut buf = Vec::new();
        e.serialize(&mut buf);
        let (parsed, consumed) = Extent::parse(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        parsed
    }

    #[test]
    fn null_extent() {
        let e = Extent::Null;
        assert_eq!(e.rank(), 0);
        assert_eq!(e.num_elements(), 0);
        assert!(e.dims().is_empty());
    }

    #[test]
    fn scalar_extent() {
        let e = Extent::Scalar;
        assert_eq!(e.rank(), 0);
        assert_eq!(e.num_elements(), 1);
    }

    #[test]
    fn simple_extent() {
        let e = Extent::Simple(vec![10, 10, 10]);
        assert_eq!(e.rank(), 3);
        assert_eq!(e.num_elements(), 1000);
        assert_eq!(e.dims(), &[10, 10, 10]);

        assert_eq!(Extent::Simple(vec![10, 21]).num_elements(), 210);
    }

    #[test]
    fn serialize_roundtrip() {
        for e in [
            Extent::Null,
            Extent::Scalar,
            Extent::Simple(vec![5]),
            Extent::Simple(vec![3, 4, 5]),
        ] {
            assert_eq!(roundtrip(&e), e);
        }
    }

    #[test]
    fn parse_bad_tag() {
        let err = Extent::parse(&[7]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTag {
                what: "extent",
                value: 7
            }
        ));
    }

    #[test]
    fn parse_truncated_dims() {
        let mut buf = Vec::new();
        Extent::Simple(vec![1, 2]).serialize(&mut buf);
        buf.truncate(buf.len() - 3);
        let err = Extent::parse(&buf).unwrap_err();
        assert!(matches!(err, StoreError::UnexpectedEof { .. }));
    }
}
