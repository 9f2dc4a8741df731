// Raster export: turn the canvas snapshot into a PNG on disk (and back).
// Uses the `image` crate so the pad itself never deals with encoders.

use crate::error::{Error, Result};
use crate::types::RasterImage;
use image::RgbaImage;
use std::path::Path;
use tracing::info;

/// Copy the pixels into an `image` buffer.
pub fn to_rgba_image(raster: &RasterImage) -> Result<RgbaImage> {
    raster.validate()?;
    RgbaImage::from_raw(raster.width as u32, raster.height as u32, raster.data.clone())
        .ok_or_else(|| Error::InvalidInput("raster does not fit an RGBA buffer".into()))
}

pub fn from_rgba_image(image: RgbaImage) -> Result<RasterImage> {
    let (w, h) = image.dimensions();
    RasterImage::from_rgba(w as usize, h as usize, image.into_raw())
}

/// Encode as PNG (transparency preserved).
pub fn save_png(raster: &RasterImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let image = to_rgba_image(raster)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    info!("exported {}x{} image to {}", raster.width, raster.height, path.display());
    Ok(())
}

/// Decode any supported image file into RGBA.
pub fn load_png(path: impl AsRef<Path>) -> Result<RasterImage> {
    let decoded = image::open(path.as_ref())?;
    from_rgba_image(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_keeps_pixels_and_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.png");

        let mut raster = RasterImage::new(3, 2);
        raster.put_pixel(0, 0, [13, 61, 120, 255]);
        raster.put_pixel(2, 1, [255, 0, 0, 128]);
        save_png(&raster, &path).unwrap();

        let back = load_png(&path).unwrap();
        assert_eq!(back, raster);
    }

    #[test]
    fn refuses_malformed_rasters() {
        let dir = tempfile::tempdir().unwrap();
        let bad = RasterImage {
            width: 4,
            height: 4,
            data: vec![0; 12],
        };
        assert!(matches!(save_png(&bad, dir.path().join("x.png")), Err(Error::InvalidInput(_))));
        assert!(!dir.path().join("x.png").exists());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_png(dir.path().join("nope.png")).is_err());
    }
}
