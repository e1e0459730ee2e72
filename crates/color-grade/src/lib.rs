//! color-grade: per-pixel color grading for 8-bit photos
//!
//! Two independent grading operations are provided, and a caller applies
//! exactly one of them per image pass:
//!
//! - [`ColorTable`]: a cubic 3D lookup table sampled with trilinear
//!   interpolation.
//! - [`ToneAdjustments`]: a fixed set of twelve tonal parameters applied as a
//!   sequential pipeline.
//!
//! Both operate on raw interleaved RGB or RGBA buffers through [`Grade`].
//! Alpha is never modified.
//!
//! # Quick Start
//!
//! ```
//! use color_grade::{ColorTable, Grade, ToneAdjustments};
//!
//! // Identity 2x2x2 table: corners of the unit cube, red varying fastest.
//! let entries = vec![
//!     [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0],
//! ];
//! let table = ColorTable::new(2, entries).unwrap();
//!
//! let mut pixels = vec![10, 20, 30, 255];
//! Grade::Table(&table).apply(&mut pixels, 4).unwrap();
//! assert_eq!(pixels, vec![10, 20, 30, 255]);
//!
//! let warm = ToneAdjustments { temperature: 50.0, ..Default::default() };
//! let mut pixels = vec![100, 100, 100];
//! Grade::Tone(&warm).apply(&mut pixels, 3).unwrap();
//! assert_eq!(pixels, vec![115, 100, 85]);
//! ```
//!
//! # Table Layout
//!
//! Entries are stored flat in the order they appear in a `.cube` file. The
//! entry for grid coordinate `(r, g, b)` lives at `r + g*N + b*N*N`: red is
//! the fastest-varying axis. Any other ordering samples the wrong cells.
//!
//! # Tonal Pipeline Order
//!
//! ```text
//! exposure -> contrast -> highlights -> shadows
//!          -> saturation -> vibrance -> temperature -> tint -> clamp
//! ```
//!
//! Every stage reads the previous stage's unclamped output. Reordering the
//! stages changes the result.

mod error;
mod grade;
mod table;
mod tone;


pub use error::{GradeError, TableError};
pub use grade::Grade;
pub use table::ColorTable;
pub use tone::ToneAdjustments;
