// What you SEE:
// • A white pad. Hold Left Mouse and drag to sign.
// • S toggles smoothing (applied when you let go), V toggles variable thickness.
// • C clears the pad. E exports signature.png + signature_filtered.png. ESC quits.
// With --filter <png>, no window opens: the export pipeline runs on that file.

use clap::Parser;
use minifb::Key;
use signing_pad::draw::Drawer;
use signing_pad::{export, logging, Canvas, PadConfig, Point, Rgb, StrokeCapture};
use std::path::{Path, PathBuf};
use tracing::{error, info};

const PAPER: Rgb = Rgb::new(255, 255, 255);

#[derive(Parser)]
#[command(name = "signing-pad")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Freehand signature pad with raster filters", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas width in pixels (overrides config)
    #[arg(long)]
    width: Option<usize>,

    /// Canvas height in pixels (overrides config)
    #[arg(long)]
    height: Option<usize>,

    /// Export directory (overrides config)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Start with smoothing on
    #[arg(long)]
    smooth: bool,

    /// Start with variable thickness on
    #[arg(long)]
    variable: bool,

    /// Run the export pipeline on an existing image and exit
    #[arg(long, value_name = "PNG")]
    filter: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> signing_pad::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => PadConfig::load(path)?,
        None => PadConfig::default(),
    };
    if let Some(w) = cli.width {
        config.canvas.width = w;
    }
    if let Some(h) = cli.height {
        config.canvas.height = h;
    }
    if let Some(out) = cli.out {
        config.export.directory = out;
    }
    config.stroke.smoothing |= cli.smooth;
    config.stroke.variable_thickness |= cli.variable;

    if let Some(input) = cli.filter {
        return filter_file(&config, &input);
    }
    run_pad(config)
}

/// Headless mode: load, filter, write `<stem>_filtered.png` next to the exports.
fn filter_file(config: &PadConfig, input: &Path) -> signing_pad::Result<()> {
    let image = export::load_png(input)?;
    let filtered = config.export.pipeline.apply(image)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    std::fs::create_dir_all(&config.export.directory)?;
    export::save_png(&filtered, config.export.directory.join(format!("{stem}_filtered.png")))
}

fn run_pad(config: PadConfig) -> signing_pad::Result<()> {
    /* --- Canvas + window setup ---
       Visual: window opens showing blank paper. */
    let (w, h) = (config.canvas.width, config.canvas.height);
    let canvas = Canvas::new(w, h)?;
    let mut pad = StrokeCapture::new(canvas, config.stroke.clone())
        .with_profile(config.thickness_profile());
    let mut drawer = Drawer::new("Signing Pad", w, h)?;

    let mut was_down = false;
    let mut last_pos: Option<Point> = None;

    info!("pad ready ({w}x{h}); S smooth, V variable, C clear, E export, ESC quit");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let pos = drawer.mouse_pos();
        let down = drawer.left_mouse_down();

        /* 1) Pointer: down edge starts, held moves, up edge stops.
           Visual: ink follows the cursor while the button is held. */
        match (was_down, down, pos) {
            (false, true, Some(p)) => pad.start(p),
            (true, true, Some(p)) if last_pos != Some(p) => {
                pad.move_to(p);
            }
            (true, false, _) => {
                let session = pad.stop();
                info!(points = session.len(), "stroke captured");
            }
            _ => {}
        }
        was_down = down;
        last_pos = pos;

        /* 2) Keys */
        if drawer.pressed_once(Key::S) {
            let on = pad.toggle_smoothing();
            info!(on, "smoothing");
        }
        if drawer.pressed_once(Key::V) {
            let on = pad.toggle_variable_thickness();
            info!(on, "variable thickness");
        }
        if drawer.pressed_once(Key::C) {
            pad.reset();
        }
        if drawer.pressed_once(Key::E) {
            // A failed export should not close the pad.
            if let Err(e) = export_both(&pad.current_image(), &config) {
                error!("export failed: {e}");
            }
        }

        /* 3) Present */
        drawer.present(pad.surface().image(), pos)?;
    }

    Ok(())
}

/// Raw canvas plus the pipeline-filtered version.
fn export_both(image: &signing_pad::RasterImage, config: &PadConfig) -> signing_pad::Result<()> {
    let dir = &config.export.directory;
    std::fs::create_dir_all(dir)?;
    export::save_png(image, dir.join("signature.png"))?;
    // Filters expect paper, not transparency
    let filtered = config.export.pipeline.apply(image.flatten_onto(PAPER))?;
    export::save_png(&filtered, dir.join("signature_filtered.png"))
}
