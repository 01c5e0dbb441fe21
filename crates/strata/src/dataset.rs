//! Datasets and the typed read/write protocol.
//!
//! Every operation follows the same sequence: derive the in-memory datatype
//! and dataspace from the value (or the requested target type), check them
//! against the stored ones, and only then move bytes. Type checks are exact
//! structural equality — an `int32` is never coerced to a `float32`, and a
//! selection that does not fit the extent is rejected before any I/O.

use byteorder::{ByteOrder, LittleEndian};
use strata_store::{registry, Extent, Selection};

use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::slice::Slice;

/// An open dataset: element type and layout are fixed at creation.
#[derive(Debug)]
pub struct Dataset {
    handle: Handle,
}

/// An element kind with a deterministic on-disk descriptor and byte layout.
trait Element: Copy {
    fn datatype() -> Datatype;
    fn to_bytes(values: &[Self]) -> Vec<u8>;
    fn from_bytes(bytes: &[u8]) -> Vec<Self>;
}

macro_rules! element_impl {
    ($ty:ty, $datatype:expr, $write:ident, $read:ident) => {
        impl Element for $ty {
            fn datatype() -> Datatype {
                $datatype
            }

            fn to_bytes(values: &[Self]) -> Vec<u8> {
                let mut buf = vec![0u8; values.len() * std::mem::size_of::<$ty>()];
                LittleEndian::$write(values, &mut buf);
                buf
            }

            fn from_bytes(bytes: &[u8]) -> Vec<Self> {
                let mut out = vec![<$ty>::default(); bytes.len() / std::mem::size_of::<$ty>()];
                LittleEndian::$read(bytes, &mut out);
                out
            }
        }
    };
}

element_impl!(i32, Datatype::int32(), write_i32_into, read_i32_into);
element_impl!(i64, Datatype::int64(), write_i64_into, read_i64_into);
element_impl!(f32, Datatype::float32(), write_f32_into, read_f32_into);
element_impl!(f64, Datatype::float64(), write_f64_into, read_f64_into);

impl Dataset {
    pub(crate) fn from_handle(handle: Handle) -> Dataset {
        Dataset { handle }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Release the dataset handle; a second close is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    /// The stored element type.
    pub fn datatype(&self) -> Result<Datatype> {
        Ok(Datatype::from_raw(registry::dataset_datatype(
            self.handle.id()?,
        )?))
    }

    /// The stored layout, selecting every element.
    pub fn dataspace(&self) -> Result<Dataspace> {
        Ok(Dataspace::from_extent(registry::dataset_extent(
            self.handle.id()?,
        )?))
    }

    /// The stored per-axis sizes; empty for scalars.
    pub fn shape(&self) -> Result<Vec<u64>> {
        Ok(self.dataspace()?.dims().to_vec())
    }

    // -- scalars ------------------------------------------------------------

    pub fn write_scalar_i32(&self, value: i32) -> Result<()> {
        self.write_scalar(value)
    }

    pub fn write_scalar_i64(&self, value: i64) -> Result<()> {
        self.write_scalar(value)
    }

    pub fn write_scalar_f32(&self, value: f32) -> Result<()> {
        self.write_scalar(value)
    }

    pub fn write_scalar_f64(&self, value: f64) -> Result<()> {
        self.write_scalar(value)
    }

    pub fn read_scalar_i32(&self) -> Result<i32> {
        self.read_scalar()
    }

    pub fn read_scalar_i64(&self) -> Result<i64> {
        self.read_scalar()
    }

    pub fn read_scalar_f32(&self) -> Result<f32> {
        self.read_scalar()
    }

    pub fn read_scalar_f64(&self) -> Result<f64> {
        self.read_scalar()
    }

    // -- sequences ----------------------------------------------------------

    pub fn write_i32(&self, values: &[i32]) -> Result<()> {
        self.write_seq(values)
    }

    pub fn write_i64(&self, values: &[i64]) -> Result<()> {
        self.write_seq(values)
    }

    pub fn write_f32(&self, values: &[f32]) -> Result<()> {
        self.write_seq(values)
    }

    pub fn write_f64(&self, values: &[f64]) -> Result<()> {
        self.write_seq(values)
    }

    pub fn read_i32(&self) -> Result<Vec<i32>> {
        self.read_seq()
    }

    pub fn read_i64(&self) -> Result<Vec<i64>> {
        self.read_seq()
    }

    pub fn read_f32(&self) -> Result<Vec<f32>> {
        self.read_seq()
    }

    pub fn read_f64(&self) -> Result<Vec<f64>> {
        self.read_seq()
    }

    // -- hyperslab selections -----------------------------------------------

    pub fn write_slab_i32(&self, slices: &[Slice], values: &[i32]) -> Result<()> {
        self.write_slab(slices, values)
    }

    pub fn write_slab_i64(&self, slices: &[Slice], values: &[i64]) -> Result<()> {
        self.write_slab(slices, values)
    }

    pub fn write_slab_f32(&self, slices: &[Slice], values: &[f32]) -> Result<()> {
        self.write_slab(slices, values)
    }

    pub fn write_slab_f64(&self, slices: &[Slice], values: &[f64]) -> Result<()> {
        self.write_slab(slices, values)
    }

    pub fn read_slab_i32(&self, slices: &[Slice]) -> Result<Vec<i32>> {
        self.read_slab(slices)
    }

    pub fn read_slab_i64(&self, slices: &[Slice]) -> Result<Vec<i64>> {
        self.read_slab(slices)
    }

    pub fn read_slab_f32(&self, slices: &[Slice]) -> Result<Vec<f32>> {
        self.read_slab(slices)
    }

    pub fn read_slab_f64(&self, slices: &[Slice]) -> Result<Vec<f64>> {
        self.read_slab(slices)
    }

    // -- fixed-length strings -----------------------------------------------

    /// Write a string into a scalar byte-string dataset. The in-memory type
    /// is a byte string sized to the value, so the stored declared length
    /// must match exactly.
    pub fn write_string(&self, value: &str) -> Result<()> {
        Datatype::bytes(value.len()).check_against(&self.datatype()?)?;
        self.require_scalar()?;
        registry::write_dataset(self.handle.id()?, &Selection::All, value.as_bytes())?;
        Ok(())
    }

    /// Read a scalar byte-string dataset, sized to the stored declared
    /// length.
    pub fn read_string(&self) -> Result<String> {
        let stored = self.datatype()?;
        if !stored.is_bytes() {
            return Err(stored.mismatch("bytes"));
        }
        self.require_scalar()?;
        let bytes = registry::read_dataset(self.handle.id()?, &Selection::All)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // -- protocol internals -------------------------------------------------

    fn write_scalar<T: Element>(&self, value: T) -> Result<()> {
        T::datatype().check_against(&self.datatype()?)?;
        self.require_scalar()?;
        registry::write_dataset(self.handle.id()?, &Selection::All, &T::to_bytes(&[value]))?;
        Ok(())
    }

    fn read_scalar<T: Element>(&self) -> Result<T> {
        T::datatype().check_against(&self.datatype()?)?;
        self.require_scalar()?;
        let bytes = registry::read_dataset(self.handle.id()?, &Selection::All)?;
        let mut values = T::from_bytes(&bytes);
        match values.pop() {
            Some(v) => Ok(v),
            None => Err(Error::SpaceMismatch {
                memory: 1,
                stored: 0,
            }),
        }
    }

    fn write_seq<T: Element>(&self, values: &[T]) -> Result<()> {
        T::datatype().check_against(&self.datatype()?)?;
        let stored = self.dataspace()?.size();
        if stored != values.len() as u64 {
            return Err(Error::SpaceMismatch {
                memory: values.len() as u64,
                stored,
            });
        }
        registry::write_dataset(self.handle.id()?, &Selection::All, &T::to_bytes(values))?;
        Ok(())
    }

    fn read_seq<T: Element>(&self) -> Result<Vec<T>> {
        T::datatype().check_against(&self.datatype()?)?;
        let bytes = registry::read_dataset(self.handle.id()?, &Selection::All)?;
        Ok(T::from_bytes(&bytes))
    }

    fn write_slab<T: Element>(&self, slices: &[Slice], values: &[T]) -> Result<()> {
        T::datatype().check_against(&self.datatype()?)?;
        let space = self.dataspace()?.select(slices)?;
        let selected = space.selection_size();
        if selected != values.len() as u64 {
            return Err(Error::SpaceMismatch {
                memory: values.len() as u64,
                stored: selected,
            });
        }
        registry::write_dataset(self.handle.id()?, space.selection(), &T::to_bytes(values))?;
        Ok(())
    }

    fn read_slab<T: Element>(&self, slices: &[Slice]) -> Result<Vec<T>> {
        T::datatype().check_against(&self.datatype()?)?;
        let space = self.dataspace()?.select(slices)?;
        let bytes = registry::read_dataset(self.handle.id()?, space.selection())?;
        Ok(T::from_bytes(&bytes))
    }

    /// Scalar reads/writes require the stored scalar extent.
    fn require_scalar(&self) -> Result<()> {
        let space = self.dataspace()?;
        if *space.extent() == Extent::Scalar {
            Ok(())
        } else {
            Err(Error::SpaceMismatch {
                memory: 1,
                stored: space.size(),
            })
        }
    }
}
