//! Apply a grading operation to an interleaved pixel buffer.

use crate::error::GradeError;
use crate::table::ColorTable;
use crate::tone::ToneAdjustments;

/// One grading operation, borrowed for the duration of a pass.
#[derive(Debug, Clone, Copy)]
pub enum Grade<'a> {
    /// Trilinear lookup through a 3D table
    Table(&'a ColorTable),
    /// Sequential tonal pipeline
    Tone(&'a ToneAdjustments),
}

impl Grade<'_> {
    /// Grade a single RGB pixel.
    #[inline]
    pub fn map_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        match self {
            Grade::Table(table) => table.map_pixel(rgb),
            Grade::Tone(adj) => adj.apply(rgb),
        }
    }

    /// Grade an interleaved buffer in place.
    ///
    /// `channels` must be 3 (RGB) or 4 (RGBA). The fourth channel is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`GradeError::UnsupportedChannels`] for any other channel count
    /// - [`GradeError::TruncatedBuffer`] if the buffer ends mid-pixel
    pub fn apply(&self, pixels: &mut [u8], channels: usize) -> Result<(), GradeError> {
        if channels != 3 && channels != 4 {
            return Err(GradeError::UnsupportedChannels(channels));
        }
        if pixels.len() % channels != 0 {
            return Err(GradeError::TruncatedBuffer {
                len: pixels.len(),
                channels,
            });
        }

        // A neutral tone set is the identity; skip the pass entirely.
        if let Grade::Tone(adj) = self {
            if adj.is_neutral() {
                return Ok(());
            }
        }

        for px in pixels.chunks_exact_mut(channels) {
            let [r, g, b] = self.map_pixel([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }

        Ok(())
    }
}
