//! Tonal adjustment set and its per-pixel pipeline.

use crate::table::to_u8;

/// Swing in 8-bit units for temperature/tint at +/-100.
const COLOR_SHIFT: f32 = 30.0;

/// Brightness that separates highlights from shadows.
const MIDPOINT: f32 = 128.0;

/// Rec. 601 luma weights used for saturation and vibrance.
const LUMA: [f32; 3] = [0.299, 0.587, 0.114];

/// Twelve named tonal parameters extracted from an editing preset.
///
/// Every field defaults to 0.0, which is neutral. `exposure` is in stops;
/// the others use the editor's -100..=100 slider scale, with `temperature`
/// already converted from Kelvin to that scale.
///
/// `whites`, `blacks`, `clarity` and `dehaze` are carried so presets round
/// trip intact, but the pixel pipeline does not render them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToneAdjustments {
    pub exposure: f32,
    pub contrast: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub whites: f32,
    pub blacks: f32,
    pub vibrance: f32,
    pub saturation: f32,
    pub temperature: f32,
    pub tint: f32,
    pub clarity: f32,
    pub dehaze: f32,
}

impl ToneAdjustments {
    /// Field names paired with their values, in declaration order.
    pub fn fields(&self) -> [(&'static str, f32); 12] {
        [
            ("exposure", self.exposure),
            ("contrast", self.contrast),
            ("highlights", self.highlights),
            ("shadows", self.shadows),
            ("whites", self.whites),
            ("blacks", self.blacks),
            ("vibrance", self.vibrance),
            ("saturation", self.saturation),
            ("temperature", self.temperature),
            ("tint", self.tint),
            ("clarity", self.clarity),
            ("dehaze", self.dehaze),
        ]
    }

    /// True when every field is exactly zero.
    pub fn is_neutral(&self) -> bool {
        self.fields().iter().all(|(_, v)| *v == 0.0)
    }

    /// Run one 8-bit RGB pixel through the pipeline.
    pub fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        self.apply_f32(rgb.map(|c| c as f32)).map(to_u8)
    }

    /// Pipeline on 0..255 floats, unclamped.
    pub fn apply_f32(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut px = rgb;

        if self.exposure != 0.0 {
            let gain = 2f32.powf(self.exposure);
            px = px.map(|c| c * gain);
        }

        if self.contrast != 0.0 {
            let factor = (self.contrast + 100.0) / 100.0;
            px = px.map(|c| ((c / 255.0 - 0.5) * factor + 0.5) * 255.0);
        }

        if self.highlights != 0.0 {
            let mean = brightness(px);
            if mean > MIDPOINT {
                let weight = (mean - MIDPOINT) / MIDPOINT;
                let factor = 1.0 + self.highlights / 100.0 * weight;
                px = px.map(|c| c * factor);
            }
        }

        if self.shadows != 0.0 {
            let mean = brightness(px);
            if mean < MIDPOINT {
                let weight = (MIDPOINT - mean) / MIDPOINT;
                let factor = 1.0 + self.shadows / 100.0 * weight;
                px = px.map(|c| c * factor);
            }
        }

        if self.saturation != 0.0 {
            px = blend_from_gray(px, 1.0 + self.saturation / 100.0);
        }

        if self.vibrance != 0.0 {
            let max = px[0].max(px[1]).max(px[2]);
            let min = px[0].min(px[1]).min(px[2]);
            let current = ((max - min) / 255.0).clamp(0.0, 1.0);
            let amount = self.vibrance / 100.0 * (1.0 - current);
            px = blend_from_gray(px, 1.0 + amount);
        }

        if self.temperature != 0.0 {
            let shift = self.temperature / 100.0 * COLOR_SHIFT;
            px[0] += shift;
            px[2] -= shift;
        }

        if self.tint != 0.0 {
            px[1] += self.tint / 100.0 * COLOR_SHIFT;
        }

        px
    }
}

#[inline]
fn brightness(px: [f32; 3]) -> f32 {
    (px[0] + px[1] + px[2]) / 3.0
}

/// Scale each channel's distance from luma-weighted gray by `factor`.
#[inline]
fn blend_from_gray(px: [f32; 3], factor: f32) -> [f32; 3] {
    let gray = px[0] * LUMA[0] + px[1] * LUMA[1] + px[2] * LUMA[2];
    px.map(|c| gray + (c - gray) * factor)
}
