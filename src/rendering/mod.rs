pub mod photo;

pub use photo::{grade_bytes, mime_for, render_graded};
