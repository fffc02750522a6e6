use std::path::Path;

use anyhow::Context;
use image::{ImageBuffer, Rgba};

use crate::foundation::{
    canvas::Canvas,
    color::Color,
    error::{WebpfexError, WebpfexResult},
};

/// 16-bit straight-alpha RGBA image, the `image` crate view of a [`Canvas`].
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Decode any image format enabled in `image` (WebP, PNG, ...) into a canvas.
pub fn decode_canvas(bytes: &[u8]) -> WebpfexResult<Canvas> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| WebpfexError::decode(format!("decode image from memory: {e}")))?;
    canvas_from_rgba16(&dyn_img.to_rgba16())
}

pub fn canvas_from_rgba16(img: &Rgba16Image) -> WebpfexResult<Canvas> {
    let (width, height) = img.dimensions();
    let pixels = img
        .pixels()
        .map(|&Rgba([r, g, b, a])| Color::from_rgba(r, g, b, a))
        .collect();
    Canvas::from_pixels(width, height, pixels)
}

pub fn canvas_to_rgba16(canvas: &Canvas) -> WebpfexResult<Rgba16Image> {
    let raw: Vec<u16> = canvas.pixels().iter().flat_map(|c| c.rgba()).collect();
    ImageBuffer::from_raw(canvas.width(), canvas.height(), raw)
        .ok_or_else(|| WebpfexError::encode("canvas buffer does not match its dimensions"))
}

/// Tightly packed RGBA8 bytes, keeping the high byte of each channel.
pub fn canvas_to_rgba8(canvas: &Canvas) -> Vec<u8> {
    let mut out = Vec::with_capacity(canvas.pixels().len() * 4);
    for c in canvas.pixels() {
        out.extend(c.rgba().map(|ch| (ch >> 8) as u8));
    }
    out
}

/// Write `canvas` as a 16-bit RGBA PNG.
pub fn save_png(canvas: &Canvas, path: &Path) -> WebpfexResult<()> {
    let img = canvas_to_rgba16(canvas)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_png_widens_to_16_bit() {
        let img = image::RgbaImage::from_raw(2, 1, vec![200, 150, 100, 50, 0, 0, 0, 255]).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let canvas = decode_canvas(&buf).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (2, 1));
        assert_eq!(
            canvas.at(0, 0),
            Color::from_rgba(200 * 257, 150 * 257, 100 * 257, 50 * 257)
        );
        assert_eq!(canvas.at(1, 0).a(), 0xFFFF);
    }

    #[test]
    fn decode_garbage_is_a_decode_error() {
        let err = decode_canvas(b"not an image").unwrap_err();
        assert!(matches!(err, WebpfexError::Decode(_)));
    }

    #[test]
    fn rgba16_channels_match_canvas() {
        let mut canvas = Canvas::new(2, 2);
        canvas.write_at(1, 1, Color::from_rgba(1, 2, 3, 4));
        let img = canvas_to_rgba16(&canvas).unwrap();
        assert_eq!(img.get_pixel(1, 1).0, [1, 2, 3, 4]);
        assert_eq!(canvas_from_rgba16(&img).unwrap(), canvas);
    }

    #[test]
    fn rgba8_keeps_high_byte() {
        let mut canvas = Canvas::new(1, 1);
        canvas.write_at(0, 0, Color::from_rgba(0xFFFF, 0x80FF, 0x00FF, 0x0100));
        assert_eq!(canvas_to_rgba8(&canvas), vec![0xFF, 0x80, 0x00, 0x01]);
    }

    #[test]
    fn save_png_writes_16_bit_file() {
        let dir = std::path::PathBuf::from("target").join("raster_save_png");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.png");

        let mut canvas = Canvas::new(3, 2);
        canvas.write_at(2, 1, Color::from_rgba(0x1234, 0x5678, 0x9abc, 0xFFFF));
        save_png(&canvas, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgba16();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(2, 1).0, [0x1234, 0x5678, 0x9abc, 0xFFFF]);
    }
}
