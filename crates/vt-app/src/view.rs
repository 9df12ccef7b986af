use std::fmt;
use std::sync::Arc;
use vt_core::Section;
use crate::error::AppError;

pub const FEEDBACK_APOLOGY: &str =
    "Sorry, we could not get fashion feedback for this result. The try-on image is still available.";

/// RGBA8 pixels ready to upload as a texture
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl DecodedImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, AppError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();

        Ok(Self {
            width,
            height,
            rgba: image.into_raw().into(),
        })
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodedImage({}x{})", self.width, self.height)
    }
}

/// Result image pane
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultView {
    #[default]
    Empty,
    Loading,
    Image {
        url: String,
        image: DecodedImage,
    },
    Error(String),
}

/// Feedback/analysis pane
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisView {
    #[default]
    Empty,
    Loading,
    Sections(Vec<Section>),
    Unavailable(String),
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let image = DecodedImage::decode(&png_bytes(3, 2)).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(DecodedImage::decode(b"<html>404</html>"), Err(AppError::Image(_))));
    }
}
