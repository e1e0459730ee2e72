//! Cubic 3D color lookup table with trilinear sampling.

use crate::error::TableError;

/// An immutable N×N×N grid of RGB output colors.
///
/// Entry values are in table units (normally 0.0..=1.0). The entry for grid
/// coordinate `(r, g, b)` is stored at `r + g*N + b*N*N`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    size: usize,
    entries: Vec<[f32; 3]>,
}

impl ColorTable {
    /// Build a table from its edge length and flat entries.
    ///
    /// # Errors
    ///
    /// - `size` is zero ([`TableError::ZeroSize`])
    /// - `size^3` overflows `usize` ([`TableError::TooLarge`])
    /// - `entries.len() != size^3` ([`TableError::EntryCount`])
    /// - an entry holds NaN or infinity ([`TableError::NonFinite`])
    pub fn new(size: usize, entries: Vec<[f32; 3]>) -> Result<Self, TableError> {
        if size == 0 {
            return Err(TableError::ZeroSize);
        }
        let needed = size
            .checked_pow(3)
            .ok_or(TableError::TooLarge { size })?;
        if entries.len() != needed {
            return Err(TableError::EntryCount {
                size,
                found: entries.len(),
            });
        }
        if let Some(index) = entries
            .iter()
            .position(|e| e.iter().any(|c| !c.is_finite()))
        {
            return Err(TableError::NonFinite { index });
        }

        Ok(Self { size, entries })
    }

    /// Grid edge length N.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat entries in file order.
    pub fn entries(&self) -> &[[f32; 3]] {
        &self.entries
    }

    /// Entry at grid coordinate `(r, g, b)`.
    ///
    /// # Panics
    /// Panics if any coordinate is `>= size`.
    #[inline]
    pub fn node(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let n = self.size;
        self.entries[r + g * n + b * n * n]
    }

    /// Sample the table at fractional grid coordinates.
    ///
    /// Coordinates are in grid units (`0.0..=N-1`) and clamped to the grid.
    /// Blends along red first, then green, then blue.
    pub fn sample_grid(&self, coords: [f32; 3]) -> [f32; 3] {
        let max = (self.size - 1) as f32;
        let [r, g, b] = coords.map(|c| c.clamp(0.0, max));

        let (r0, r1, fr) = split(r, self.size);
        let (g0, g1, fg) = split(g, self.size);
        let (b0, b1, fb) = split(b, self.size);

        let c000 = self.node(r0, g0, b0);
        let c100 = self.node(r1, g0, b0);
        let c010 = self.node(r0, g1, b0);
        let c110 = self.node(r1, g1, b0);
        let c001 = self.node(r0, g0, b1);
        let c101 = self.node(r1, g0, b1);
        let c011 = self.node(r0, g1, b1);
        let c111 = self.node(r1, g1, b1);

        let c00 = lerp3(c000, c100, fr);
        let c10 = lerp3(c010, c110, fr);
        let c01 = lerp3(c001, c101, fr);
        let c11 = lerp3(c011, c111, fr);

        let c0 = lerp3(c00, c10, fg);
        let c1 = lerp3(c01, c11, fg);

        lerp3(c0, c1, fb)
    }

    /// Map one 8-bit RGB pixel through the table.
    ///
    /// Output is `round(value * 255)` clamped to 0..=255.
    #[inline]
    pub fn map_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let scale = (self.size - 1) as f32;
        // Multiply before dividing so grid nodes land on exact integers.
        let coords = rgb.map(|c| c as f32 * scale / 255.0);
        self.sample_grid(coords).map(|v| to_u8(v * 255.0))
    }
}

/// Split a clamped grid coordinate into floor, ceil and fractional part.
#[inline]
fn split(coord: f32, size: usize) -> (usize, usize, f32) {
    let lo = coord.floor();
    let hi = coord.ceil();
    let last = size - 1;
    ((lo as usize).min(last), (hi as usize).min(last), coord - lo)
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

#[inline]
pub(crate) fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
