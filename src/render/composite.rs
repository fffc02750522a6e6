use rayon::prelude::*;

use crate::foundation::{
    canvas::Canvas,
    color::{Color, MAX_CHANNEL_VALUE},
};

/// Fill every pixel of `dest` with `color`.
pub fn clear(dest: &mut Canvas, color: Color) {
    dest.pixels_mut().fill(color);
}

/// Copy `overlay` into `dest` at `(x_offset, y_offset)`, discarding what was there.
///
/// Panics if the overlay rectangle does not fit inside `dest`.
pub fn overlay_replace(dest: &mut Canvas, overlay: &Canvas, x_offset: u32, y_offset: u32) {
    overlay_rows(dest, overlay, x_offset, y_offset, |dst, src| {
        dst.copy_from_slice(src);
    });
}

/// Alpha-blend `overlay` onto `dest` at `(x_offset, y_offset)` using [`blend_over`] per pixel.
///
/// Panics if the overlay rectangle does not fit inside `dest`.
pub fn overlay_blend(dest: &mut Canvas, overlay: &Canvas, x_offset: u32, y_offset: u32) {
    overlay_rows(dest, overlay, x_offset, y_offset, |dst, src| {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = blend_over(*d, s);
        }
    });
}

/// Blend `src` over `dst` weighted only by `src`'s alpha.
///
/// `dst`'s alpha is ignored and the result is always fully opaque. Channels are truncated after the
/// multiply-accumulate, so `src` alpha `0` keeps `dst` RGB and `0xFFFF` yields `src` RGB exactly.
pub fn blend_over(dst: Color, src: Color) -> Color {
    let w = f64::from(src.a()) / f64::from(MAX_CHANNEL_VALUE);
    let mix = |s: u16, d: u16| (w * f64::from(s) + (1.0 - w) * f64::from(d)) as u16;

    Color::from_rgba(
        mix(src.r(), dst.r()),
        mix(src.g(), dst.g()),
        mix(src.b(), dst.b()),
        MAX_CHANNEL_VALUE,
    )
}

// Rows of the overlay rectangle are disjoint slices of `dest`, so they are processed in parallel.
fn overlay_rows<F>(dest: &mut Canvas, overlay: &Canvas, x_offset: u32, y_offset: u32, op: F)
where
    F: Fn(&mut [Color], &[Color]) + Sync,
{
    if overlay.is_empty() {
        return;
    }
    dest.assert_rect_inside(x_offset, y_offset, overlay.width(), overlay.height());

    let dest_width = dest.width() as usize;
    let src_width = overlay.width() as usize;
    let x0 = x_offset as usize;
    let x1 = x0 + src_width;

    dest.pixels_mut()
        .par_chunks_exact_mut(dest_width)
        .skip(y_offset as usize)
        .zip(overlay.pixels().par_chunks_exact(src_width))
        .for_each(|(dst_row, src_row)| op(&mut dst_row[x0..x1], src_row));
}
