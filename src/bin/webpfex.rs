use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "webpfex",
    version,
    about = "Extract the full frames of an animated WebP or convert them to MP4 (relies on webpmux and ffmpeg)"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// `webpmux` binary to run.
    #[arg(long, global = true, default_value = "webpmux")]
    webpmux: PathBuf,

    /// `ffmpeg` binary to run.
    #[arg(long, global = true, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Log every composited and written frame.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write every frame as a PNG into OUTDIR.
    Extract(ExtractArgs),
    /// Encode every frame into an MP4 (requires `ffmpeg`).
    Convert(ConvertArgs),
    /// Print the parsed animation metadata as JSON.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Animated WebP input.
    awebp: PathBuf,

    /// Output directory, created if missing.
    outdir: PathBuf,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Animated WebP input.
    awebp: PathBuf,

    /// Output MP4 path.
    out: PathBuf,

    /// Output frame rate. Defaults to 1000 / first frame duration (ms).
    #[arg(long)]
    fps: Option<u32>,

    /// Fail instead of overwriting an existing output file.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Animated WebP input.
    awebp: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let tools = webpfex::ToolPaths {
        webpmux: cli.webpmux,
        ffmpeg: cli.ffmpeg,
    };

    match cli.cmd {
        Command::Extract(args) => cmd_extract(&tools, args),
        Command::Convert(args) => cmd_convert(&tools, args),
        Command::Info(args) => cmd_info(&tools, args),
    }
}

fn cmd_extract(tools: &webpfex::ToolPaths, args: ExtractArgs) -> anyhow::Result<()> {
    let stats = webpfex::extract_frames_as_png(tools, &args.awebp, &args.outdir)
        .with_context(|| format!("extract frames of '{}'", args.awebp.display()))?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_total,
        args.outdir.display()
    );
    Ok(())
}

fn cmd_convert(tools: &webpfex::ToolPaths, args: ConvertArgs) -> anyhow::Result<()> {
    let opts = webpfex::ConvertOpts {
        fps: args.fps,
        overwrite: !args.no_overwrite,
        ..webpfex::ConvertOpts::default()
    };
    let stats = webpfex::convert_to_mp4(tools, &args.awebp, &args.out, &opts)
        .with_context(|| format!("convert '{}' to mp4", args.awebp.display()))?;

    eprintln!("wrote {} ({} frames)", args.out.display(), stats.frames_total);
    Ok(())
}

fn cmd_info(tools: &webpfex::ToolPaths, args: InfoArgs) -> anyhow::Result<()> {
    let info = webpfex::WebpmuxTool::new(&tools.webpmux)
        .info(&args.awebp)
        .with_context(|| format!("read animation info of '{}'", args.awebp.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &info).context("write animation info json")?;
    use std::io::Write as _;
    writeln!(out)?;
    Ok(())
}
