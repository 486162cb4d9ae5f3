//! PNG output of rasterized frames.
//!
//! This module is feature-gated behind `png` (default on) so the registry can
//! be used without pulling in the `image` encoder. Rasterization itself lives
//! in [`crate::pixel`] (always available).

use gallery_core::draw::Frame;
use gallery_core::error::EngineError;
use std::path::Path;

use crate::pixel::Raster;

/// Writes a raster as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the raster dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(raster: &Raster, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(raster.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(raster.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, raster.as_bytes().to_vec())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    log::info!("snapshot: wrote {w}x{h} PNG to {}", path.display());
    Ok(())
}

/// Rasterizes a single frame onto a transparent buffer and writes it.
pub fn write_frame_png(frame: &Frame, path: &Path) -> Result<(), EngineError> {
    let surface = frame.surface();
    let mut raster = Raster::new(surface.pixel_width(), surface.pixel_height())?;
    raster.draw(frame)?;
    write_png(&raster, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::color::Rgba;
    use gallery_core::draw::Surface;

    #[test]
    fn write_png_round_trip() {
        let mut frame = Frame::new(Surface::css(16.0, 12.0).unwrap());
        frame.fill_rect(0.0, 0.0, 8.0, 12.0, Rgba::rgb8(52, 211, 153));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");

        write_frame_png(&frame, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(2, 2).0, [52, 211, 153, 255]);
        assert_eq!(img.get_pixel(12, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let raster = Raster::new(2, 2).unwrap();
        assert!(matches!(write_png(&raster, &path), Err(EngineError::Io(_))));
    }
}
