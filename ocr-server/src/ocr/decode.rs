use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageReader};
use tracing::debug;

use crate::error::{OcrError, Result};

/// Channel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::GrayAlpha => 2,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }

    fn extended_color_type(self) -> ExtendedColorType {
        match self {
            ColorMode::Gray => ExtendedColorType::L8,
            ColorMode::GrayAlpha => ExtendedColorType::La8,
            ColorMode::Rgb => ExtendedColorType::Rgb8,
            ColorMode::Rgba => ExtendedColorType::Rgba8,
        }
    }
}

/// Pixel grid laid out row-major as height x width x channels, 8 bits per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    mode: ColorMode,
    pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, self.channels())
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Losslessly re-encode the grid as PNG for engines that only read containers.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                self.mode.extended_color_type(),
            )
            .map_err(|e| OcrError::Engine(format!("Failed to encode image: {e}")))?;
        Ok(output)
    }
}

/// Decode an encoded image container (format sniffed from content) into a pixel grid.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OcrError::Decode(format!("Failed to read image: {e}")))?;

    let format = reader.format();
    let img = reader.decode().map_err(|e| OcrError::Decode(e.to_string()))?;

    let decoded = from_dynamic(img)?;
    debug!(
        ?format,
        width = decoded.width,
        height = decoded.height,
        channels = decoded.channels(),
        "Decoded image"
    );
    Ok(decoded)
}

fn from_dynamic(img: DynamicImage) -> Result<DecodedImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::Decode(format!(
            "Image has no pixels: {width}x{height}"
        )));
    }

    let color = img.color();
    let (mode, pixels) = match img {
        DynamicImage::ImageLuma8(buf) => (ColorMode::Gray, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (ColorMode::GrayAlpha, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (ColorMode::Rgb, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (ColorMode::Rgba, buf.into_raw()),
        // Wider samples keep their channel layout but drop to 8 bits.
        other => match (color.has_color(), color.has_alpha()) {
            (true, true) => (ColorMode::Rgba, other.to_rgba8().into_raw()),
            (true, false) => (ColorMode::Rgb, other.to_rgb8().into_raw()),
            (false, true) => (ColorMode::GrayAlpha, other.to_luma_alpha8().into_raw()),
            (false, false) => (ColorMode::Gray, other.to_luma8().into_raw()),
        },
    };

    Ok(DecodedImage {
        width,
        height,
        mode,
        pixels,
    })
}
