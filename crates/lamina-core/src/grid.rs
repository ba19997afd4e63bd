//! Image representation for the editing pipeline.

use std::fmt;

use crate::error::EditError;
use crate::pixel::Pixel;

/// A raw `(x, y, r, g, b)` sample: `x` is the column, `y` the row.
pub type Sample = (i64, i64, i32, i32, i32);

/// Immutable, row-major grid of RGB pixels.
///
/// Always at least 1×1 with every row the same length. Operators never
/// mutate a grid; they build a new one. The `name` is display/export
/// metadata and is ignored by `==`.
#[derive(Clone)]
pub struct PixelGrid {
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Build a grid from a flat row-major pixel buffer.
    pub fn from_raw(
        name: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<Pixel>,
    ) -> Result<Self, EditError> {
        if width == 0 || height == 0 {
            return Err(EditError::InvalidShape(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EditError::InvalidShape(format!(
                "{width}x{height} grid needs {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            pixels,
        })
    }

    /// Build a grid from a 2D array of rows. Rows must all have the same length.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Pixel>>) -> Result<Self, EditError> {
        let sparse = rows
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        Self::from_sparse_rows(name, sparse)
    }

    /// Build a grid from rows whose cells may be absent. Any absent cell or
    /// ragged row is an `InvalidShape` error.
    pub fn from_sparse_rows(
        name: impl Into<String>,
        rows: Vec<Vec<Option<Pixel>>>,
    ) -> Result<Self, EditError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(EditError::InvalidShape("grid has no pixels".into()));
        }

        let mut pixels = Vec::with_capacity(width * height);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(EditError::InvalidShape(format!(
                    "row {row_idx} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for (col_idx, cell) in row.into_iter().enumerate() {
                let px = cell.ok_or_else(|| {
                    EditError::InvalidShape(format!("cell ({row_idx}, {col_idx}) is missing"))
                })?;
                pixels.push(px);
            }
        }

        Self::from_raw(name, dimension(width)?, dimension(height)?, pixels)
    }

    /// Build a `width`×`height` grid from `(x, y, r, g, b)` samples.
    ///
    /// Negative or out-of-grid coordinates and channels outside `[0, 255]`
    /// are `OutOfRange`; a cell no sample covers is `InvalidShape`. A later
    /// sample for the same cell replaces an earlier one.
    pub fn from_samples<I>(
        name: impl Into<String>,
        width: u32,
        height: u32,
        samples: I,
    ) -> Result<Self, EditError>
    where
        I: IntoIterator<Item = Sample>,
    {
        if width == 0 || height == 0 {
            return Err(EditError::InvalidShape(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        let mut cells: Vec<Option<Pixel>> = vec![None; width as usize * height as usize];

        for (x, y, r, g, b) in samples {
            let col = coordinate("x", x, width)?;
            let row = coordinate("y", y, height)?;
            cells[row * width as usize + col] = Some(Pixel::try_new(r, g, b)?);
        }

        let mut pixels = Vec::with_capacity(cells.len());
        for (idx, cell) in cells.into_iter().enumerate() {
            let px = cell.ok_or_else(|| {
                let row = idx / width as usize;
                let col = idx % width as usize;
                EditError::InvalidShape(format!("no sample for cell ({row}, {col})"))
            })?;
            pixels.push(px);
        }
        Self::from_raw(name, width, height, pixels)
    }

    /// A grid with every pixel set to `fill`.
    pub fn filled(
        name: impl Into<String>,
        width: u32,
        height: u32,
        fill: Pixel,
    ) -> Result<Self, EditError> {
        Self::from_raw(
            name,
            width,
            height,
            vec![fill; width as usize * height as usize],
        )
    }

    /// A checkerboard of `tile`-sized squares. The top-left tile is `first`.
    ///
    /// ```text
    /// color(row, col) = if (row / tile + col / tile) % 2 == 0 { first } else { second }
    /// ```
    pub fn checkerboard(
        name: impl Into<String>,
        width: u32,
        height: u32,
        tile: u32,
        first: Pixel,
        second: Pixel,
    ) -> Result<Self, EditError> {
        if tile == 0 {
            return Err(EditError::invalid_argument("checkerboard tile size must be positive"));
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height {
            for col in 0..width {
                let parity = (row / tile + col / tile) % 2;
                pixels.push(if parity == 0 { first } else { second });
            }
        }
        Self::from_raw(name, width, height, pixels)
    }

    /// Display/source name used for export naming.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same pixels under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false: a grid holds at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Bounds-checked pixel lookup.
    pub fn get(&self, row: usize, col: usize) -> Result<Pixel, EditError> {
        if row >= self.height as usize || col >= self.width as usize {
            return Err(EditError::IndexOutOfBounds {
                row,
                col,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.pixels[row * self.width as usize + col])
    }

    /// Flat row-major pixel buffer.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width as usize)
    }

    /// Compare pixels *and* name.
    pub fn same_with_name(&self, other: &Self) -> bool {
        self == other && self.name == other.name
    }

    /// Edge-replicating lookup: each axis is clamped independently.
    pub(crate) fn clamped(&self, row: isize, col: isize) -> Pixel {
        let r = row.clamp(0, self.height as isize - 1) as usize;
        let c = col.clamp(0, self.width as isize - 1) as usize;
        self.pixels[r * self.width as usize + c]
    }

    /// A grid of the same name and size holding `pixels`.
    pub(crate) fn derive(&self, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        Self {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// A grid of the same name with new dimensions.
    pub(crate) fn derive_sized(&self, width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            name: self.name.clone(),
            width,
            height,
            pixels,
        }
    }
}

impl PartialEq for PixelGrid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.pixels == other.pixels
    }
}

impl Eq for PixelGrid {}

impl fmt::Debug for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelGrid")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn dimension(len: usize) -> Result<u32, EditError> {
    u32::try_from(len)
        .map_err(|_| EditError::InvalidShape(format!("dimension {len} does not fit in u32")))
}

fn coordinate(what: &'static str, value: i64, limit: u32) -> Result<usize, EditError> {
    if value < 0 || value >= i64::from(limit) {
        return Err(EditError::OutOfRange {
            what,
            value,
            expected: format!("0..{limit}"),
        });
    }
    Ok(value as usize)
}
