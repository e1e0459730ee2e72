//! Test fixtures: photos, preset files and a preset catalog.

use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// A 2x2 table whose output is the inverted input
pub const INVERT_CUBE: &str = "\
TITLE \"Invert\"
LUT_3D_SIZE 2
1 1 1
0 1 1
1 0 1
0 0 1
1 1 0
0 1 0
1 0 0
0 0 0
";

/// Tonal preset brightening by one stop
pub const BRIGHTEN_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
      xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/"
      crs:Exposure2012="+1.00"
      crs:Temperature="6500"/>
  </rdf:RDF>
</x:xmpmeta>"#;

/// Write a solid-color PNG and return its path
pub fn write_png(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(4, 4, Rgb(color))
        .save_with_format(&path, ImageFormat::Png)
        .expect("Failed to write PNG fixture");
    path
}

/// Write a solid-color JPEG and return its path
pub fn write_jpeg(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(8, 8, Rgb(color))
        .save_with_format(&path, ImageFormat::Jpeg)
        .expect("Failed to write JPEG fixture");
    path
}

/// Write `presets/` with a catalog, one table and one tonal preset
pub fn write_preset_catalog(root: &Path) -> PathBuf {
    let presets = root.join("presets");
    std::fs::create_dir_all(presets.join("luts")).unwrap();
    std::fs::create_dir_all(presets.join("xmp")).unwrap();
    std::fs::write(presets.join("luts/invert.cube"), INVERT_CUBE).unwrap();
    std::fs::write(presets.join("xmp/brighten.xmp"), BRIGHTEN_XMP).unwrap();
    std::fs::write(presets.join("luts/broken.cube"), "LUT_3D_SIZE 2\n0 0 0\n").unwrap();

    let catalog = serde_json::json!({
        "presets": [
            {"id": "original", "name": "Original", "type": "none", "file": null},
            {"id": "invert", "name": "Invert", "type": "cube", "file": "invert.cube"},
            {"id": "brighten", "name": "Brighten", "type": "xmp", "file": "brighten.xmp"},
            {"id": "broken", "name": "Broken", "type": "cube", "file": "broken.cube"}
        ]
    });
    let path = presets.join("presets.json");
    std::fs::write(&path, catalog.to_string()).unwrap();
    path
}
