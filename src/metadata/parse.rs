//! Parser for the text report printed by `webpmux -info`.
//!
//! Recognized layout (blank lines are ignored, header lines may appear in any order before the
//! frame count):
//!
//! ```text
//! Canvas size: <W> x <H>
//! Background color : 0x<HEX>  <ignored>
//! Number of frames: <N>
//! <frame table header, ignored>
//! <N frame lines>
//! <trailing lines, ignored>
//! ```
//!
//! Frame lines are whitespace separated:
//! `<num>: <width> <height> <alpha yes|no> <x_offset> <y_offset> <duration_ms> <dispose> <blend
//! yes|no> ...`. The dispose column is not consumed.

use std::time::Duration;

use crate::{
    foundation::color::Color,
    metadata::model::{AnimationInfo, FrameDescriptor},
};

const NOT_ANIMATED_MARKER: &str = "No features present.";
const CANVAS_SIZE_LABEL: &str = "Canvas size";
const BACKGROUND_COLOR_LABEL: &str = "Background color";
const FRAME_COUNT_LABEL: &str = "Number of frames";

/// A malformed report.
///
/// Carries the reason, the exact fragment that failed and, for frame lines, the field-level error
/// that caused the line to be rejected.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{reason}: {input:?}")]
pub struct ParsingError {
    reason: String,
    input: String,
    #[source]
    source: Option<Box<ParsingError>>,
}

impl ParsingError {
    pub fn new(reason: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            input: input.into(),
            source: None,
        }
    }

    pub fn with_source(
        reason: impl Into<String>,
        input: impl Into<String>,
        source: ParsingError,
    ) -> Self {
        Self {
            reason: reason.into(),
            input: input.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The line or sub-string that could not be parsed.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn sub_error(&self) -> Option<&ParsingError> {
        self.source.as_deref()
    }

    /// Deepest error in the chain.
    pub fn innermost(&self) -> &ParsingError {
        let mut err = self;
        while let Some(next) = err.sub_error() {
            err = next;
        }
        err
    }
}

/// Parse a full `webpmux -info` report.
///
/// Panics if the background color literal does not fit in 64 bits or a frame line carries frame
/// number 0; both are outside what `webpmux` produces.
#[tracing::instrument(skip(report), fields(bytes = report.len()))]
pub fn parse_animation_info(report: &str) -> Result<AnimationInfo, ParsingError> {
    if report.contains(NOT_ANIMATED_MARKER) {
        return Err(ParsingError::new("not an animated WebP", report.trim()));
    }

    let lines: Vec<&str> = report
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let (width, height) = parse_canvas_size(report, &lines)?;
    let background_color = parse_background_color(report, &lines)?;
    let (count_line, frame_count) = parse_frame_count(report, &lines)?;
    let frames = parse_frame_table(&lines[count_line + 1..], frame_count)?;

    tracing::debug!(width, height, frame_count, "parsed animation info");
    Ok(AnimationInfo::new(
        width,
        height,
        background_color,
        frame_count,
        frames,
    ))
}

/// Locate the first line `<label> : <rest>` and return its index, the full line and `rest`.
fn find_labeled<'a>(lines: &[&'a str], label: &str) -> Option<(usize, &'a str, &'a str)> {
    lines.iter().enumerate().find_map(|(idx, &line)| {
        let rest = line.strip_prefix(label)?.trim_start().strip_prefix(':')?;
        Some((idx, line, rest.trim()))
    })
}

fn parse_canvas_size(report: &str, lines: &[&str]) -> Result<(u32, u32), ParsingError> {
    let (_, line, rest) = find_labeled(lines, CANVAS_SIZE_LABEL)
        .ok_or_else(|| ParsingError::new("missing canvas size line", report))?;
    let (w, h) = rest
        .split_once('x')
        .ok_or_else(|| ParsingError::new("malformed canvas size", line))?;

    let width = parse_u32(w.trim(), "failed parsing canvas width")?;
    let height = parse_u32(h.trim(), "failed parsing canvas height")?;
    Ok((width, height))
}

fn parse_background_color(report: &str, lines: &[&str]) -> Result<Color, ParsingError> {
    let (_, line, rest) = find_labeled(lines, BACKGROUND_COLOR_LABEL)
        .ok_or_else(|| ParsingError::new("missing background color line", report))?;
    let literal = rest.split_whitespace().next().unwrap_or_default();

    parse_hex_literal(literal)
        .ok_or_else(|| ParsingError::new("failed parsing background color", line))
}

/// Parse `0x<hex digits>`. `None` for anything that is not such a literal.
fn parse_hex_literal(literal: &str) -> Option<Color> {
    let digits = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    assert!(
        significant.len() <= 16,
        "color {literal} is too big to convert to u64"
    );
    if significant.is_empty() {
        return Some(Color::TRANSPARENT);
    }
    u64::from_str_radix(significant, 16).ok().map(Color::new)
}

fn parse_frame_count(report: &str, lines: &[&str]) -> Result<(usize, u32), ParsingError> {
    let (idx, line, rest) = find_labeled(lines, FRAME_COUNT_LABEL)
        .ok_or_else(|| ParsingError::new("missing frame count line", report))?;
    let token = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| ParsingError::new("failed parsing frame count", line))?;
    let count = parse_u32(token, "failed parsing frame count")?;
    Ok((idx, count))
}

/// `rows` starts at the table header line that follows the frame count.
fn parse_frame_table(rows: &[&str], frame_count: u32) -> Result<Vec<FrameDescriptor>, ParsingError> {
    let wanted = frame_count as usize;
    if wanted == 0 {
        return Ok(Vec::new());
    }

    let body = rows.get(1..).unwrap_or_default();
    if body.len() < wanted {
        return Err(ParsingError::new(
            format!("expected {wanted} frame lines, found {}", body.len()),
            body.last().copied().unwrap_or_default(),
        ));
    }

    body[..wanted]
        .iter()
        .map(|line| parse_frame_line(line))
        .collect()
}

fn parse_frame_line(line: &str) -> Result<FrameDescriptor, ParsingError> {
    parse_frame_fields(line)
        .map_err(|e| ParsingError::with_source("failed parsing frame info line", line, e))
}

fn parse_frame_fields(line: &str) -> Result<FrameDescriptor, ParsingError> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| {
        fields
            .next()
            .ok_or_else(|| ParsingError::new(format!("missing {name}"), line))
    };

    let number = parse_frame_number(next("frame number")?)?;
    let width = parse_u32(next("width")?, "failed parsing width")?;
    let height = parse_u32(next("height")?, "failed parsing height")?;
    let alpha = parse_yes_no(next("alpha")?, "failed parsing alpha")?;
    let x_offset = parse_u32(next("x offset")?, "failed parsing x offset")?;
    let y_offset = parse_u32(next("y offset")?, "failed parsing y offset")?;
    let duration = parse_duration_ms(next("duration")?)?;
    next("dispose")?;
    let blend = parse_yes_no(next("blend")?, "failed parsing blend")?;

    Ok(FrameDescriptor::new(
        number, width, height, alpha, x_offset, y_offset, duration, blend,
    ))
}

/// `"12:"` -> 12. Uses the first run of ASCII digits in the token.
fn parse_frame_number(token: &str) -> Result<u32, ParsingError> {
    let digits = token
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
        .unwrap_or_default();
    digits
        .parse::<u32>()
        .map_err(|_| ParsingError::new("failed parsing frame number", token))
}

fn parse_duration_ms(token: &str) -> Result<Duration, ParsingError> {
    let ms = token
        .parse::<i64>()
        .map_err(|_| ParsingError::new("failed parsing duration", token))?;
    let ms = u64::try_from(ms).map_err(|_| ParsingError::new("negative duration", token))?;
    Ok(Duration::from_millis(ms))
}

fn parse_u32(token: &str, reason: &str) -> Result<u32, ParsingError> {
    token
        .parse::<u32>()
        .map_err(|_| ParsingError::new(reason, token))
}

fn parse_yes_no(token: &str, reason: &str) -> Result<bool, ParsingError> {
    match token {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(ParsingError::new(reason, token)),
    }
}
