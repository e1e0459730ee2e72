//! `.cube` 3D lookup table parser.

use color_grade::ColorTable;

use super::PresetError;

/// Directives that carry no data for a unit-domain 3D table.
const IGNORED_DIRECTIVES: [&str; 3] = ["DOMAIN_MIN", "DOMAIN_MAX", "LUT_3D_INPUT_RANGE"];

/// Parse `.cube` text into a [`ColorTable`].
///
/// Comment (`#`) and `TITLE` lines are skipped, `LUT_3D_SIZE` declares the
/// edge length, and every other non-blank line is an `R G B` triple
/// appended in file order (red varying fastest).
pub fn parse_cube(text: &str) -> Result<ColorTable, PresetError> {
    let mut size: Option<usize> = None;
    let mut entries: Vec<[f32; 3]> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("TITLE") {
            continue;
        }

        if let Some(rest) = line.strip_prefix("LUT_3D_SIZE") {
            let invalid = || PresetError::InvalidSize {
                line: line_no,
                text: line.to_string(),
            };
            let n = rest.trim().parse::<usize>().map_err(|_| invalid())?;
            let cap = n.checked_pow(3).ok_or_else(invalid)?;
            entries.reserve(cap.min(1 << 20));
            size = Some(n);
            continue;
        }

        if line.starts_with("LUT_1D_SIZE") {
            return Err(PresetError::Unsupported1d);
        }

        if IGNORED_DIRECTIVES.iter().any(|d| line.starts_with(d)) {
            continue;
        }

        entries.push(parse_triple(line).ok_or_else(|| PresetError::InvalidEntry {
            line: line_no,
            text: line.to_string(),
        })?);
    }

    let size = size.ok_or(PresetError::MissingSize)?;
    if entries.is_empty() {
        return Err(PresetError::NoEntries);
    }

    Ok(ColorTable::new(size, entries)?)
}

fn parse_triple(line: &str) -> Option<[f32; 3]> {
    let mut parts = line.split_whitespace().map(|p| p.parse::<f32>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([r, g, b])
}
