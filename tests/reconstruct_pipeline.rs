use std::time::Duration;

use webpfex::{
    AnimationInfo, Canvas, Color, FrameDescriptor, InMemorySink, PngSequenceSink, WebpfexError,
    WebpfexResult, blend_over, reconstruct,
};

const BLACK: Color = Color::from_rgba(0, 0, 0, 0xFFFF);
const WHITE: Color = Color::from_rgba(0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF);
const HALF_RED: Color = Color::from_rgba(0xFFFF, 0, 0, 0x8000);

fn two_frame_info() -> AnimationInfo {
    let ms = Duration::from_millis(40);
    AnimationInfo::new(
        3,
        3,
        BLACK,
        2,
        vec![
            FrameDescriptor::new(1, 2, 2, false, 0, 0, ms, false),
            FrameDescriptor::new(2, 1, 1, true, 0, 0, ms, true),
        ],
    )
}

fn filled(width: u32, height: u32, color: Color) -> Canvas {
    let mut c = Canvas::new(width, height);
    for y in 0..height {
        for x in 0..width {
            c.write_at(x, y, color);
        }
    }
    c
}

fn deltas(desc: &FrameDescriptor) -> WebpfexResult<Canvas> {
    Ok(match desc.number() {
        1 => filled(2, 2, WHITE),
        _ => filled(1, 1, HALF_RED),
    })
}

#[test]
fn frames_accumulate_over_the_background() {
    let info = two_frame_info();
    let mut sink = InMemorySink::new();
    let mut source = deltas;

    let stats = reconstruct(&info, &mut source, &mut sink).unwrap();
    assert_eq!(stats.frames_total, 2);
    assert_eq!(stats.frames_blended, 1);
    assert_eq!(stats.frames_replaced, 1);

    assert!(sink.is_finished());
    let frames = sink.into_frames();
    assert_eq!(frames.len(), 2);

    let (d1, f1) = &frames[0];
    assert_eq!(d1.number(), 1);
    assert_eq!((f1.width(), f1.height()), (3, 3));
    assert_eq!(f1.at(1, 1), WHITE);
    assert_eq!(f1.at(2, 2), BLACK);
    assert_eq!(f1.at(2, 0), BLACK);

    let (d2, f2) = &frames[1];
    assert_eq!(d2.number(), 2);
    let expected = blend_over(WHITE, HALF_RED);
    assert_eq!(f2.at(0, 0), expected);
    assert_eq!(expected.a(), 0xFFFF);
    assert_eq!(expected.r(), 0xFFFF);
    assert!(expected.g() < 0xFFFF);
    // everything frame 1 painted survives into frame 2
    assert_eq!(f2.at(1, 1), WHITE);
    assert_eq!(f2.at(2, 2), BLACK);

    // the first snapshot is not touched by later compositing
    assert_eq!(f1.at(0, 0), WHITE);
}

#[test]
fn failing_source_stops_the_run() {
    let info = two_frame_info();
    let mut sink = InMemorySink::new();
    let mut source = |desc: &FrameDescriptor| -> WebpfexResult<Canvas> {
        if desc.number() == 2 {
            return Err(WebpfexError::decode("corrupt frame"));
        }
        deltas(desc)
    };

    let err = reconstruct(&info, &mut source, &mut sink).unwrap_err();
    assert!(matches!(err, WebpfexError::Decode(_)));
    assert_eq!(sink.frames().len(), 1);
    assert!(!sink.is_finished());
}

#[test]
fn png_sequence_is_written_per_frame() {
    let out_dir = std::path::PathBuf::from("target").join("reconstruct_pipeline_png");
    let _ = std::fs::remove_dir_all(&out_dir);

    let info = two_frame_info();
    let mut sink = PngSequenceSink::new(&out_dir);
    let mut source = deltas;
    reconstruct(&info, &mut source, &mut sink).unwrap();

    assert_eq!(sink.written().len(), 2);
    let second = out_dir.join("000000002.png");
    assert!(second.exists());

    let decoded = webpfex::decode_canvas(&std::fs::read(&second).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 3));
    assert_eq!(decoded.at(0, 0), blend_over(WHITE, HALF_RED));
    assert_eq!(decoded.at(1, 1), WHITE);
}

#[test]
fn replace_covering_the_canvas_then_blend_in_one_corner() {
    let ms = Duration::from_millis(40);
    let info = AnimationInfo::new(
        2,
        2,
        BLACK,
        2,
        vec![
            FrameDescriptor::new(1, 2, 2, false, 0, 0, ms, false),
            FrameDescriptor::new(2, 1, 1, true, 0, 0, ms, true),
        ],
    );
    let mut sink = InMemorySink::new();
    let mut source = deltas;
    reconstruct(&info, &mut source, &mut sink).unwrap();

    let frames = sink.frames();
    assert!(frames[0].1.pixels().iter().all(|&c| c == WHITE));

    let second = &frames[1].1;
    assert_eq!(second.at(0, 0), blend_over(WHITE, HALF_RED));
    assert_eq!(second.at(0, 0).a(), 0xFFFF);
    assert_eq!(second.at(1, 0), WHITE);
    assert_eq!(second.at(1, 1), WHITE);
}
