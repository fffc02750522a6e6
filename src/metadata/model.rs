use std::time::Duration;

use serde::Serialize;

use crate::foundation::color::Color;

/// Placement and timing of one stored (delta) frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrameDescriptor {
    number: u32,
    width: u32,
    height: u32,
    alpha: bool,
    x_offset: u32,
    y_offset: u32,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
    blend: bool,
}

impl FrameDescriptor {
    /// Panics if `number` is zero; frame numbers are 1-based.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        number: u32,
        width: u32,
        height: u32,
        alpha: bool,
        x_offset: u32,
        y_offset: u32,
        duration: Duration,
        blend: bool,
    ) -> Self {
        assert!(number != 0, "frame number cannot be 0");
        Self {
            number,
            width,
            height,
            alpha,
            x_offset,
            y_offset,
            duration,
            blend,
        }
    }

    /// 1-based frame number, as understood by `webpmux -get frame`.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the stored frame carries an alpha channel.
    pub fn alpha(&self) -> bool {
        self.alpha
    }

    pub fn x_offset(&self) -> u32 {
        self.x_offset
    }

    pub fn y_offset(&self) -> u32 {
        self.y_offset
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// `true` to alpha-blend onto the accumulated canvas, `false` to replace.
    pub fn blend(&self) -> bool {
        self.blend
    }
}

/// Parsed animation metadata: canvas geometry, background and frames in file order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnimationInfo {
    width: u32,
    height: u32,
    background_color: Color,
    frame_count: u32,
    frames: Vec<FrameDescriptor>,
}

impl AnimationInfo {
    /// Panics if `frames.len()` differs from `frame_count`.
    pub fn new(
        width: u32,
        height: u32,
        background_color: Color,
        frame_count: u32,
        frames: Vec<FrameDescriptor>,
    ) -> Self {
        assert!(
            frames.len() == frame_count as usize,
            "frame count {frame_count} doesn't match frame descriptor count {}",
            frames.len()
        );
        Self {
            width,
            height,
            background_color,
            frame_count,
            frames,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
