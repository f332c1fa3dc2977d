//! Contiguous, 32-byte aligned 2D numeric buffers.
//!
//! A [`Grid`] owns one backing block holding `width * height` elements in
//! row-major order. Row `y` starts `y * width` elements into the block, so a
//! whole image is released by a single drop and row scans stay cache friendly.


use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice::{ChunksExact, ChunksExactMut};

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};

/// Alignment of every grid allocation in bytes.
pub const GRID_ALIGNMENT: usize = 32;

/// Storage unit that carries the allocation alignment.
#[derive(Clone, Copy)]
#[repr(C, align(32))]
struct Block([u32; 8]);

// SAFETY: `Block` is 32 bytes of plain `u32`s with 32-byte alignment, so it has
// no padding and every bit pattern is valid.
unsafe impl Zeroable for Block {}
unsafe impl Pod for Block {}

const BLOCK_BYTES: usize = size_of::<Block>();

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for u32 {}
}

/// Element types a [`Grid`] can hold: 32-bit floats and 32-bit unsigned pixels.
pub trait Element: sealed::Sealed + Pod + Default + PartialEq + fmt::Debug + Send + Sync {}

impl Element for f32 {}
impl Element for u32 {}

pub struct Grid<T: Element> {
    storage: Vec<Block>,
    width: usize,
    height: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Element> Grid<T> {
    /// Allocate a zero-filled grid.
    ///
    /// Fails with [`Error::Allocation`] when the size overflows or the
    /// allocator refuses the request.
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        let fail = |bytes: usize| {
            tracing::error!(width, height, bytes, "grid allocation failed");
            Error::Allocation {
                width,
                height,
                bytes,
            }
        };

        let bytes = width
            .checked_mul(height)
            .and_then(|len| len.checked_mul(size_of::<T>()))
            .ok_or_else(|| fail(usize::MAX))?;
        let blocks = bytes.div_ceil(BLOCK_BYTES);

        let mut storage = Vec::new();
        storage.try_reserve_exact(blocks).map_err(|_| fail(bytes))?;
        storage.resize(blocks, Block::zeroed());

        Ok(Self {
            storage,
            width,
            height,
            _marker: std::marker::PhantomData,
        })
    }

    /// Allocate a grid and copy `pixels` (row-major) into it.
    pub fn try_from_slice(width: usize, height: usize, pixels: &[T]) -> Result<Self> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(Error::DimensionMismatch {
                expected: (width, height),
                actual: (pixels.len(), 1),
            });
        }
        let mut grid = Self::try_new(width, height)?;
        grid.as_mut_slice().copy_from_slice(pixels);
        Ok(grid)
    }

    /// Allocate a grid where each element is produced by `f(x, y)`.
    pub fn try_from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Result<Self> {
        let mut grid = Self::try_new(width, height)?;
        for (y, row) in grid.rows_mut().enumerate() {
            for (x, value) in row.iter_mut().enumerate() {
                *value = f(x, y);
            }
        }
        Ok(grid)
    }

    /// Allocate a grid with the same dimensions and contents.
    pub fn try_clone(&self) -> Result<Self> {
        Self::try_from_slice(self.width, self.height, self.as_slice())
    }

    /// Copy the `width x height` window starting at `(x, y)` into a new grid.
    pub fn try_crop(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        let fits = x.checked_add(width).is_some_and(|end| end <= self.width)
            && y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits {
            return Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (x.saturating_add(width), y.saturating_add(height)),
            });
        }

        let mut cropped = Self::try_new(width, height)?;
        for (dst, src_y) in cropped.rows_mut().zip(y..y + height) {
            dst.copy_from_slice(&self.row(src_y)[x..x + width]);
        }
        Ok(cropped)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of row `y` from the start of the backing block, in elements.
    #[inline]
    pub fn row_offset(&self, y: usize) -> usize {
        y * self.width
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        let len = self.len();
        &bytemuck::cast_slice(&self.storage)[..len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        &mut bytemuck::cast_slice_mut(&mut self.storage)[..len]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row {} out of bounds ({})", y, self.height);
        let start = self.row_offset(y);
        &self.as_slice()[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {} out of bounds ({})", y, self.height);
        let start = self.row_offset(y);
        let width = self.width;
        &mut self.as_mut_slice()[start..start + width]
    }

    #[inline]
    pub fn rows(&self) -> ChunksExact<'_, T> {
        let width = self.width.max(1);
        self.as_slice().chunks_exact(width)
    }

    #[inline]
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, T> {
        let width = self.width.max(1);
        self.as_mut_slice().chunks_exact_mut(width)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.width && y < self.height {
            Some(self.as_slice()[self.row_offset(y) + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T: Element> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        assert!(x < self.width, "column {} out of bounds ({})", x, self.width);
        &self.row(y)[x]
    }
}

impl<T: Element> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        assert!(x < self.width, "column {} out of bounds ({})", x, self.width);
        &mut self.row_mut(y)[x]
    }
}

impl<T: Element> PartialEq for Grid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.as_slice() == other.as_slice()
    }
}

impl<T: Element> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
