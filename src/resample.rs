use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Shrinks a supersampled image to `width` x `height` with a Lanczos3
/// filter. An image that is already the target size is returned as is.
pub fn downsample(img: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img;
    }
    imageops::resize(&img, width, height, FilterType::Lanczos3)
}
