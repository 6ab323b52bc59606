use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::{
    error::{ImageError, Result},
    images::{ImageAsset, ImageSource},
    video::Frame,
};

/// Fits images onto the output canvas.
///
/// Every image is scaled uniformly until it covers the whole canvas and the
/// overflow is cropped evenly from both sides, so the result always has
/// exactly the target resolution and is never stretched.
#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    target: (u32, u32),
}

impl ImageNormalizer {
    pub fn new(target: (u32, u32)) -> Self {
        Self { target }
    }

    pub fn target(&self) -> (u32, u32) {
        self.target
    }

    /// Decode `asset` and fit it to the target resolution
    pub fn normalize(&self, asset: &ImageAsset) -> Result<Frame> {
        let image = Self::decode(asset)?;
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(ImageError::UnsupportedFormat {
                source_name: asset.label.clone(),
                reason: "image has no pixels".to_string(),
            }
            .into());
        }

        debug!("Normalizing {} ({}x{}) to {}x{}",
               asset.label, width, height, self.target.0, self.target.1);

        Ok(self.fit(&image))
    }

    fn decode(asset: &ImageAsset) -> Result<DynamicImage> {
        let decoded = match &asset.source {
            ImageSource::File(path) => image::open(path),
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
        };

        decoded.map_err(|e| {
            ImageError::UnsupportedFormat {
                source_name: asset.label.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn fit(&self, image: &DynamicImage) -> Frame {
        let (target_w, target_h) = self.target;
        let (x, y, width, height) = cover_crop(image.dimensions(), self.target);

        // Crop before scaling so memory stays bounded by the source and the canvas
        let region = image.crop_imm(x, y, width, height).to_rgb8();
        let fitted = if region.dimensions() == self.target {
            region
        } else {
            imageops::resize(&region, target_w, target_h, FilterType::Lanczos3)
        };

        Frame::new(fitted)
    }
}

/// Centered region of `source` with the aspect ratio of `target`.
///
/// Returns `(x, y, width, height)` in source pixels. Scaling this region to
/// `target` is the same as cover-scaling the whole image and cropping.
pub fn cover_crop(source: (u32, u32), target: (u32, u32)) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (dst_w, dst_h) = (target.0 as u64, target.1 as u64);

    if src_w * dst_h > src_h * dst_w {
        // Wider than the canvas: keep full height, crop the sides
        let width = ((src_h * dst_w + dst_h / 2) / dst_h).clamp(1, src_w);
        let x = (src_w - width) / 2;
        (x as u32, 0, width as u32, source.1)
    } else {
        // Taller (or equal): keep full width, crop top and bottom
        let height = ((src_w * dst_h + dst_w / 2) / dst_w).clamp(1, src_h);
        let y = (src_h - height) / 2;
        (0, y as u32, source.0, height as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::VideoFormat;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut buffer, image::ImageOutputFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_cover_crop() {
        // Wider than 16:9
        assert_eq!(cover_crop((400, 100), (160, 90)), (111, 0, 178, 100));
        // Taller than 16:9
        assert_eq!(cover_crop((100, 100), (160, 90)), (0, 22, 100, 56));
        // Exact aspect
        assert_eq!(cover_crop((320, 180), (160, 90)), (0, 0, 320, 180));
        // Vertical canvas
        assert_eq!(cover_crop((160, 90), (90, 160)), (54, 0, 51, 90));
        // Never empty
        assert_eq!(cover_crop((1, 4000), (1080, 1920)), (0, 1999, 1, 2));
        assert_eq!(cover_crop((4000, 1), (1920, 1080)), (1999, 0, 2, 1));
    }

    #[test]
    fn test_extreme_aspect_ratios_fit_the_canvas() {
        let vertical = VideoFormat::Vertical.resolution(1080);
        let horizontal = VideoFormat::Horizontal.resolution(1080);

        for ((w, h), target) in [((1, 4000), vertical), ((4000, 1), horizontal), ((1, 4000), horizontal)] {
            let image = RgbImage::from_pixel(w, h, Rgb([10, 120, 230]));
            let asset = ImageAsset::from_bytes(png_bytes(image), 0, format!("{}x{}", w, h));

            let frame = ImageNormalizer::new(target).normalize(&asset).unwrap();
            assert_eq!(frame.dimensions(), target, "input {}x{}", w, h);
            assert_eq!(frame.get_pixel(target.0 / 2, target.1 / 2), [10, 120, 230]);
        }
    }

    #[test]
    fn test_output_matches_target_for_any_aspect() {
        let normalizer = ImageNormalizer::new((64, 36));
        for (w, h) in [(300, 40), (40, 300), (64, 36), (7, 5), (1000, 999)] {
            let asset = ImageAsset::from_bytes(png_bytes(RgbImage::new(w, h)), 0, format!("{}x{}", w, h));
            let frame = normalizer.normalize(&asset).unwrap();
            assert_eq!((frame.width(), frame.height()), (64, 36), "input {}x{}", w, h);
        }
    }

    #[test]
    fn test_wide_image_is_center_cropped_not_squashed() {
        // Red | green | blue thirds; only the green middle survives a 1:1 crop
        let image = RgbImage::from_fn(90, 30, |x, _| match x {
            0..=29 => Rgb([255, 0, 0]),
            30..=59 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let asset = ImageAsset::from_bytes(png_bytes(image), 0, "thirds");

        let frame = ImageNormalizer::new((30, 30)).normalize(&asset).unwrap();
        assert_eq!(frame.get_pixel(15, 15), [0, 255, 0]);
        assert_eq!(frame.get_pixel(2, 2)[1], 255);
        assert_eq!(frame.get_pixel(27, 27)[1], 255);
    }

    #[test]
    fn test_reads_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("still.png");
        RgbImage::from_pixel(32, 8, Rgb([1, 2, 3])).save(&path).unwrap();

        let frame = ImageNormalizer::new((16, 8))
            .normalize(&ImageAsset::from_file(&path, 0))
            .unwrap();
        assert_eq!(frame.get_pixel(8, 4), [1, 2, 3]);
    }

    #[test]
    fn test_corrupt_data_is_unsupported_format() {
        let asset = ImageAsset::from_bytes(b"definitely not an image".to_vec(), 3, "garbage.bin");
        let error = ImageNormalizer::new((64, 36)).normalize(&asset).unwrap_err();
        assert!(error.is_recoverable());
        assert!(error.to_string().contains("garbage.bin"));
    }
}
