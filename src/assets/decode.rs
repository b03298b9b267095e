use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::{core::PixelBuffer, error::FxResult};

/// File extensions (lowercase, without the dot) recognized as raster images.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff"];

/// Decode encoded image bytes into a BGR [`PixelBuffer`].
pub fn decode_frame(bytes: &[u8]) -> FxResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    PixelBuffer::from_rgb_image(&dyn_img.to_rgb8())
}

/// Read and decode an image file into a BGR [`PixelBuffer`].
pub fn load_frame(path: &Path) -> FxResult<PixelBuffer> {
    let dyn_img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    PixelBuffer::from_rgb_image(&dyn_img.to_rgb8())
}

/// Write a frame as PNG, creating parent directories as needed.
pub fn save_png(frame: &PixelBuffer, path: &Path) -> FxResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .to_rgb_image()
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(e))
        })
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_image_files(dir: &Path) -> FxResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list directory '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
