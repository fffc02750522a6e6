use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_webpfex")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "webpfex.exe"
            } else {
                "webpfex"
            });
            p
        })
}

fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

fn write_solid_png(path: &Path, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    img.save(path).unwrap();
}

#[test]
fn cli_info_on_missing_input_fails() {
    let missing = PathBuf::from("target")
        .join("cli_smoke")
        .join("does-not-exist.webp");

    let output = Command::new(exe())
        .arg("info")
        .arg(&missing)
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn cli_extract_writes_png_sequence() {
    if !tool_available("webpmux") || !tool_available("img2webp") {
        eprintln!("skipping: webpmux/img2webp not available");
        return;
    }

    let dir = PathBuf::from("target").join("cli_smoke_extract");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let a = dir.join("a.png");
    let b = dir.join("b.png");
    write_solid_png(&a, [255, 0, 0, 255]);
    write_solid_png(&b, [0, 0, 255, 255]);

    let anim = dir.join("anim.webp");
    let status = Command::new("img2webp")
        .args(["-loop", "0", "-lossless", "-d", "40"])
        .arg(&a)
        .args(["-d", "40"])
        .arg(&b)
        .arg("-o")
        .arg(&anim)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());

    let out_dir = dir.join("frames");
    let status = Command::new(exe())
        .arg("extract")
        .arg(&anim)
        .arg(&out_dir)
        .status()
        .unwrap();
    assert!(status.success());

    let first = out_dir.join("000000001.png");
    let second = out_dir.join("000000002.png");
    assert!(first.exists());
    assert!(second.exists());

    let img = image::open(&second).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (4, 4));
    assert_eq!(img.get_pixel(3, 3).0, [0, 0, 255, 255]);
}
