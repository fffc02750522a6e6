use crate::{
    encode::sink::FrameSink,
    foundation::{
        canvas::Canvas,
        error::{WebpfexError, WebpfexResult},
    },
    metadata::{AnimationInfo, FrameDescriptor},
    render::composite::{clear, overlay_blend, overlay_replace},
};

/// Supplies the delta image of a stored frame.
///
/// The returned canvas must be `descriptor.width() x descriptor.height()`.
pub trait FrameSource {
    fn load_frame(&mut self, descriptor: &FrameDescriptor) -> WebpfexResult<Canvas>;
}

impl<F> FrameSource for F
where
    F: FnMut(&FrameDescriptor) -> WebpfexResult<Canvas>,
{
    fn load_frame(&mut self, descriptor: &FrameDescriptor) -> WebpfexResult<Canvas> {
        self(descriptor)
    }
}

/// Counters reported by [`reconstruct`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_total: u64,
    pub frames_blended: u64,
    pub frames_replaced: u64,
}

/// Accumulating canvas stepped through an animation's frames in stored order.
///
/// The canvas starts filled with the background color and is never reset: each frame is painted
/// over everything painted before it.
pub struct Reconstruction<'a> {
    info: &'a AnimationInfo,
    canvas: Canvas,
    next: usize,
}

impl<'a> Reconstruction<'a> {
    pub fn new(info: &'a AnimationInfo) -> Self {
        let mut canvas = Canvas::new(info.width(), info.height());
        clear(&mut canvas, info.background_color());
        Self {
            info,
            canvas,
            next: 0,
        }
    }

    /// Current full-frame state.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.info.frames().len()
    }

    /// Composite the next frame and return its descriptor, or `None` once every frame was painted.
    ///
    /// On error the canvas is left as it was and the same frame is attempted again by the next call.
    pub fn step(
        &mut self,
        source: &mut dyn FrameSource,
    ) -> WebpfexResult<Option<&'a FrameDescriptor>> {
        let info = self.info;
        let Some(desc) = info.frames().get(self.next) else {
            return Ok(None);
        };

        let delta = source.load_frame(desc)?;
        if delta.width() != desc.width() || delta.height() != desc.height() {
            return Err(WebpfexError::validation(format!(
                "frame {} decoded as {}x{}, expected {}x{}",
                desc.number(),
                delta.width(),
                delta.height(),
                desc.width(),
                desc.height()
            )));
        }

        if desc.blend() {
            overlay_blend(&mut self.canvas, &delta, desc.x_offset(), desc.y_offset());
        } else {
            overlay_replace(&mut self.canvas, &delta, desc.x_offset(), desc.y_offset());
        }
        tracing::debug!(
            frame = desc.number(),
            blend = desc.blend(),
            x = desc.x_offset(),
            y = desc.y_offset(),
            "composited frame"
        );

        self.next += 1;
        Ok(Some(desc))
    }
}

/// Rebuild every full frame of `info` and hand each one to `sink` in stored order.
///
/// The first failure aborts the run; frames already pushed to `sink` stay pushed and
/// [`FrameSink::end`] is not called.
#[tracing::instrument(skip_all, fields(width = info.width(), height = info.height(), frames = info.frame_count()))]
pub fn reconstruct(
    info: &AnimationInfo,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
) -> WebpfexResult<RunStats> {
    let mut run = Reconstruction::new(info);
    let mut stats = RunStats::default();

    sink.begin(info)?;
    while let Some(desc) = run.step(source)? {
        sink.push_frame(desc, run.canvas())?;
        stats.frames_total += 1;
        if desc.blend() {
            stats.frames_blended += 1;
        } else {
            stats.frames_replaced += 1;
        }
    }
    sink.end()?;

    Ok(stats)
}
