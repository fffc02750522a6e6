use crate::foundation::{
    color::Color,
    error::{WebpfexError, WebpfexResult},
};

/// Fixed-size, row-major grid of [`Color`] pixels.
///
/// Pixel `(x, y)` lives at index `y * width + x`. Reading or writing outside the grid is a contract
/// violation and panics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Canvas {
    /// Allocate a `width x height` canvas filled with [`Color::TRANSPARENT`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Build a canvas from a row-major pixel buffer.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> WebpfexResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(WebpfexError::validation(format!(
                "canvas buffer has {} pixels, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn at(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn write_at(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// Row-major pixel buffer.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Pixels of row `y`.
    pub fn row(&self, y: u32) -> &[Color] {
        self.check_y(u64::from(y));
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Panic unless the `width x height` rectangle at `(x, y)` lies inside the canvas.
    ///
    /// Empty rectangles always pass.
    pub(crate) fn assert_rect_inside(&self, x: u32, y: u32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.check_x(u64::from(x) + u64::from(width) - 1);
        self.check_y(u64::from(y) + u64::from(height) - 1);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        self.check_x(u64::from(x));
        self.check_y(u64::from(y));
        y as usize * self.width as usize + x as usize
    }

    fn check_x(&self, x: u64) {
        if x >= u64::from(self.width) {
            panic!("x = {x} is out of bounds, width is {}", self.width);
        }
    }

    fn check_y(&self, y: u64) {
        if y >= u64::from(self.height) {
            panic!("y = {y} is out of bounds, height is {}", self.height);
        }
    }
}
