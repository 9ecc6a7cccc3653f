//! Stand-in camera images.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};

use jomexplore_ar::tracking::CameraImage;

/// Loads an image file with its EXIF orientation applied, as RGBA8, downscaled to fit
/// within `max_w` x `max_h`.
pub fn load_oriented(path: &Path, max_w: u32, max_h: u32) -> Result<CameraImage> {
    let mut decoder = ImageReader::open(path)
        .with_context(|| format!("failed to open backdrop {}", path.display()))?
        .with_guessed_format()
        .context("failed to sniff backdrop format")?
        .into_decoder()
        .with_context(|| format!("unsupported backdrop {}", path.display()))?;

    let orientation = decoder.orientation().context("failed to read orientation")?;
    let mut img = DynamicImage::from_decoder(decoder)
        .with_context(|| format!("failed to decode backdrop {}", path.display()))?;
    img.apply_orientation(orientation);

    let rgba = fit_within(img, max_w, max_h).to_rgba8();
    log::info!(
        "backdrop {} loaded ({}x{}, {orientation:?})",
        path.display(),
        rgba.width(),
        rgba.height()
    );
    Ok(CameraImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: Arc::from(rgba.into_raw()),
    })
}

/// Shrinks `img` to fit the bounds, keeping its aspect ratio. Never upscales.
fn fit_within(img: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (max_w, max_h) = (max_w.max(1), max_h.max(1));
    if img.width() <= max_w && img.height() <= max_h {
        return img;
    }
    log::debug!("downscaling backdrop {}x{} to fit {max_w}x{max_h}", img.width(), img.height());
    img.resize(max_w, max_h, FilterType::Triangle)
}

/// Sky-over-floor gradient with a tile grid on the lower half.
pub fn pattern(width: u32, height: u32) -> CameraImage {
    let width = width.max(1);
    let height = height.max(1);
    let horizon = height / 2;

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let px = if y < horizon {
                let t = y as f32 / horizon.max(1) as f32;
                [
                    (90.0 + 80.0 * t) as u8,
                    (140.0 + 60.0 * t) as u8,
                    (200.0 + 30.0 * t) as u8,
                ]
            } else {
                let tile = ((x / 32) + ((y - horizon) / 32)) % 2 == 0;
                if tile { [150, 130, 110] } else { [120, 105, 90] }
            };
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
    }

    CameraImage {
        width,
        height,
        rgba: Arc::from(rgba),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_is_tightly_packed() {
        let img = pattern(64, 48);
        assert_eq!(img.rgba.len(), 64 * 48 * 4);
        assert!(img.rgba.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn pattern_clamps_zero_size() {
        let img = pattern(0, 0);
        assert_eq!((img.width, img.height), (1, 1));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_oriented(Path::new("/nonexistent/backdrop.png"), 1024, 1024).is_err());
    }

    #[test]
    fn large_image_is_downscaled_keeping_aspect() {
        let img = fit_within(DynamicImage::new_rgba8(400, 100), 100, 100);
        assert_eq!((img.width(), img.height()), (100, 25));
    }

    #[test]
    fn small_image_is_left_alone() {
        let img = fit_within(DynamicImage::new_rgba8(40, 30), 100, 100);
        assert_eq!((img.width(), img.height()), (40, 30));
    }
}
