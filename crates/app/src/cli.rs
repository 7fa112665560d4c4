//! Command-line interface
//!
//! Scripted front end over the capture shell. Annotation flags do not
//! write into the model directly; they replay the same pointer and key
//! events an interactive host would deliver, so scripted runs exercise
//! the exact engine paths.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::RgbaImage;
use log::warn;
use snipmark_core::{Color, Key, MIN_SELECTION_SIZE, Modifiers, Point, Rect, SessionConfig, Tool};

use crate::capture;
use crate::export::{ExportSink, OutputFormat};
use crate::settings::{Settings, SettingsStore};
use crate::shell::{CaptureShell, ShellEvent};

#[derive(Debug, Parser)]
#[command(name = "snipmark")]
#[command(about = "Screen capture with annotations")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Capture a region of the screen, annotate it and export it.
    Capture(CaptureArgs),
    /// List monitors and their virtual-screen placement.
    Monitors,
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct CaptureArgs {
    /// Annotate this image file instead of capturing the screen.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Region to keep, as X,Y,WxH in capture pixels. Defaults to the
    /// whole capture.
    #[arg(long, value_parser = parse_region)]
    region: Option<Rect>,

    /// Rectangle annotation, X1,Y1,X2,Y2 in region-local pixels. Repeatable.
    ///
    /// A start point within 6 px of a region corner or edge midpoint acts
    /// on that selection handle and resizes the region instead of drawing.
    #[arg(long = "rect", value_parser = parse_segment)]
    rects: Vec<SegmentArg>,

    /// Line annotation, X1,Y1,X2,Y2 in region-local pixels. Repeatable.
    ///
    /// A start point within 6 px of a region corner or edge midpoint acts
    /// on that selection handle and resizes the region instead of drawing.
    #[arg(long = "line", value_parser = parse_segment)]
    lines: Vec<SegmentArg>,

    /// Arrow annotation, X1,Y1,X2,Y2; the head sits at the second point.
    ///
    /// A start point within 6 px of a region corner or edge midpoint acts
    /// on that selection handle and resizes the region instead of drawing.
    #[arg(long = "arrow", value_parser = parse_segment)]
    arrows: Vec<SegmentArg>,

    /// Freehand annotation, an even list of at least four coordinates.
    ///
    /// A start point within 6 px of a region corner or edge midpoint acts
    /// on that selection handle and resizes the region instead of drawing.
    #[arg(long = "freehand", value_parser = parse_path)]
    freehands: Vec<PathArg>,

    /// Highlighter annotation, an even list of at least four coordinates.
    ///
    /// A start point within 6 px of a region corner or edge midpoint acts
    /// on that selection handle and resizes the region instead of drawing.
    #[arg(long = "highlight", value_parser = parse_path)]
    highlights: Vec<PathArg>,

    /// Text annotation, X,Y,TEXT. Repeatable.
    ///
    /// A position within 6 px of a region corner or edge midpoint acts on
    /// that selection handle and resizes the region instead of placing
    /// text.
    #[arg(long = "text", value_parser = parse_text)]
    texts: Vec<TextArg>,

    /// Stroke color: red, green, blue, yellow, black, white or #RRGGBB[AA].
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// Stroke width in pixels; defaults to 3, or 20 for the highlighter.
    #[arg(long)]
    width: Option<f64>,

    /// Output file path.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Copy the result to the clipboard instead of writing a file.
    #[arg(long, conflicts_with = "output")]
    clipboard: bool,

    /// Output encoding; defaults to the output extension, else png.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

#[derive(Debug, Clone)]
struct SegmentArg {
    start: Point,
    end: Point,
}

#[derive(Debug, Clone)]
struct PathArg {
    points: Vec<Point>,
}

#[derive(Debug, Clone)]
struct TextArg {
    position: Point,
    content: String,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Capture(args) => run_capture(args),
        Commands::Monitors => run_monitors(),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_monitors() -> Result<()> {
    let monitors = capture::list_monitors().context("failed to enumerate monitors")?;
    if monitors.is_empty() {
        println!("No monitors found");
        return Ok(());
    }
    for (index, monitor) in monitors.iter().enumerate() {
        let primary = if monitor.is_primary { " [primary]" } else { "" };
        println!(
            "{}: {} at ({}, {}) {}x{}{}",
            index, monitor.name, monitor.x, monitor.y, monitor.width, monitor.height, primary
        );
    }
    Ok(())
}

fn run_capture(args: CaptureArgs) -> Result<()> {
    let raster = load_raster(&args)?;
    let (raster_width, raster_height) = raster.dimensions();

    // scripted runs on an input file stay reproducible; the live path
    // picks up the user's saved defaults
    let settings = if args.input.is_some() {
        Settings::default()
    } else {
        load_settings()
    };

    let quality = args.quality.unwrap_or(settings.jpeg_quality);
    let sink = resolve_sink(&args, &settings, quality);
    let config = SessionConfig {
        color: args.color.unwrap_or(settings.color),
        stroke_width: args.width.or(settings.stroke_width),
        font_size: settings.font_size,
        tool: Tool::None,
    };

    let region = args.region.unwrap_or_else(|| {
        Rect::new(0.0, 0.0, f64::from(raster_width), f64::from(raster_height))
    });

    let mut shell = CaptureShell::new(raster, config, sink);

    shell.pointer_down(Point::new(region.left(), region.top()));
    shell.pointer_move(Point::new(region.right(), region.bottom()));
    let confirmed = match shell.pointer_up(Point::new(region.right(), region.bottom())) {
        Some(ShellEvent::SelectionConfirmed(rect)) => rect,
        _ => anyhow::bail!(
            "region {}x{} was rejected (the minimum selection is {}x{} and must overlap the capture)",
            region.width,
            region.height,
            MIN_SELECTION_SIZE,
            MIN_SELECTION_SIZE
        ),
    };

    for segment in &args.rects {
        drag_annotation(&mut shell, Tool::Rectangle, &[segment.start, segment.end], &confirmed);
    }
    for segment in &args.lines {
        drag_annotation(&mut shell, Tool::Line, &[segment.start, segment.end], &confirmed);
    }
    for segment in &args.arrows {
        drag_annotation(&mut shell, Tool::Arrow, &[segment.start, segment.end], &confirmed);
    }
    for path in &args.freehands {
        drag_annotation(&mut shell, Tool::Freehand, &path.points, &confirmed);
    }
    for path in &args.highlights {
        drag_annotation(&mut shell, Tool::Highlighter, &path.points, &confirmed);
    }
    for text in &args.texts {
        type_annotation(&mut shell, text, &confirmed);
    }

    match shell.key_down(Key::Enter, Modifiers::NONE) {
        Some(ShellEvent::ExportCompleted(Some(path))) => {
            println!("Saved to: {}", path.display());
            Ok(())
        }
        Some(ShellEvent::ExportCompleted(None)) => {
            println!("Copied to clipboard");
            Ok(())
        }
        Some(ShellEvent::ExportFailed(message)) => anyhow::bail!("{message}"),
        other => anyhow::bail!("export did not complete: {other:?}"),
    }
}

fn load_raster(args: &CaptureArgs) -> Result<RgbaImage> {
    if let Some(input) = &args.input {
        let image = image::open(input)
            .with_context(|| format!("failed to open input image {}", input.display()))?;
        return Ok(image.to_rgba8());
    }
    let screen = capture::capture_virtual_screen().context("screen capture failed")?;
    Ok(screen.raster)
}

fn load_settings() -> Settings {
    let mut store = SettingsStore::new();
    if let Err(e) = store.load() {
        warn!("could not load settings: {}", e);
    }
    store.settings().clone()
}

fn resolve_sink(args: &CaptureArgs, settings: &Settings, quality: u8) -> ExportSink {
    if args.clipboard {
        return ExportSink::Clipboard;
    }
    if let Some(path) = &args.output {
        let format = resolve_format(args.format, path, quality);
        return ExportSink::File { path: path.clone(), format };
    }
    if settings.copy_to_clipboard && args.input.is_none() {
        return ExportSink::Clipboard;
    }
    let path = PathBuf::from("capture.png");
    let format = resolve_format(args.format, &path, quality);
    ExportSink::File { path, format }
}

fn resolve_format(format: Option<FormatArg>, path: &Path, quality: u8) -> OutputFormat {
    match format {
        Some(FormatArg::Png) => OutputFormat::Png,
        Some(FormatArg::Jpeg) => OutputFormat::Jpeg { quality },
        None => match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
                OutputFormat::Jpeg { quality }
            }
            _ => OutputFormat::Png,
        },
    }
}

/// Replay a drag through the shell with region-local points.
fn drag_annotation(shell: &mut CaptureShell, tool: Tool, points: &[Point], region: &Rect) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    shell.session_mut().set_tool(tool);
    let mut last = to_capture_space(*first, region);
    shell.pointer_down(last);
    for point in rest {
        last = to_capture_space(*point, region);
        shell.pointer_move(last);
    }
    shell.pointer_up(last);
}

/// Replay a text entry: click the position, type the content, commit.
fn type_annotation(shell: &mut CaptureShell, text: &TextArg, region: &Rect) {
    shell.session_mut().set_tool(Tool::Text);
    shell.pointer_down(to_capture_space(text.position, region));
    for ch in text.content.chars() {
        if ch == '\n' {
            shell.key_down(Key::Enter, Modifiers::SHIFT);
        } else {
            shell.key_down(Key::Char(ch), Modifiers::NONE);
        }
    }
    shell.key_down(Key::Enter, Modifiers::NONE);
}

fn to_capture_space(point: Point, region: &Rect) -> Point {
    point.translated(region.x, region.y)
}

fn parse_region(value: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        return Err(String::from("expected X,Y,WxH"));
    }
    let x = parse_coord(parts[0])?;
    let y = parse_coord(parts[1])?;
    let (w, h) = parts[2]
        .split_once('x')
        .ok_or_else(|| String::from("expected WxH after the origin"))?;
    let width = parse_coord(w)?;
    let height = parse_coord(h)?;
    if width <= 0.0 || height <= 0.0 {
        return Err(String::from("region dimensions must be positive"));
    }
    Ok(Rect::new(x, y, width, height))
}

fn parse_segment(value: &str) -> Result<SegmentArg, String> {
    let nums = parse_coords(value)?;
    if nums.len() != 4 {
        return Err(String::from("expected X1,Y1,X2,Y2"));
    }
    Ok(SegmentArg {
        start: Point::new(nums[0], nums[1]),
        end: Point::new(nums[2], nums[3]),
    })
}

fn parse_path(value: &str) -> Result<PathArg, String> {
    let nums = parse_coords(value)?;
    if nums.len() < 4 || nums.len() % 2 != 0 {
        return Err(String::from("expected an even list of at least four coordinates"));
    }
    let points = nums.chunks(2).map(|pair| Point::new(pair[0], pair[1])).collect();
    Ok(PathArg { points })
}

fn parse_text(value: &str) -> Result<TextArg, String> {
    let mut parts = value.splitn(3, ',');
    let x = parts.next().ok_or_else(|| String::from("expected X,Y,TEXT"))?;
    let y = parts.next().ok_or_else(|| String::from("expected X,Y,TEXT"))?;
    let content = parts.next().ok_or_else(|| String::from("expected X,Y,TEXT"))?;
    Ok(TextArg {
        position: Point::new(parse_coord(x)?, parse_coord(y)?),
        content: content.to_string(),
    })
}

fn parse_color(value: &str) -> Result<Color, String> {
    match value.to_ascii_lowercase().as_str() {
        "red" => return Ok(Color::RED),
        "green" => return Ok(Color::GREEN),
        "blue" => return Ok(Color::BLUE),
        "yellow" => return Ok(Color::YELLOW),
        "black" => return Ok(Color::BLACK),
        "white" => return Ok(Color::WHITE),
        _ => {}
    }
    let hex = value
        .strip_prefix('#')
        .ok_or_else(|| format!("unknown color '{}'", value))?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return Err(String::from("expected #RRGGBB or #RRGGBBAA"));
    }
    let channel = |range: std::ops::Range<usize>| -> Result<u8, String> {
        u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    let a = if hex.len() == 8 { channel(6..8)? } else { 255 };
    Ok(Color::new(r, g, b, a))
}

fn parse_coords(value: &str) -> Result<Vec<f64>, String> {
    value.split(',').map(parse_coord).collect()
}

fn parse_coord(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", trimmed))
}
