//! `fen-vision` command line: offline position reconstruction from detector
//! output, FEN validation and move overlay geometry.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fen_vision::io::{ConfigIoError, DetectionBatch, ScanConfig, ScanReport};
use fen_vision::overlay::MalformedMove;
use fen_vision::{BoardRegion, BoardScanner, PieceDetection, ScanParams, Size};

#[derive(Parser)]
#[command(name = "fen-vision", version, about = "Chess position reconstruction from detections")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON logs (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a FEN from a piece detection file on a board crop.
    Position {
        /// Detector payload: `{"predictions": [...], "image": {...}}`.
        detections: PathBuf,
        /// Scan config with parameter overrides.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Side of the square crop the detections refer to.
        #[arg(long, default_value_t = 800.0)]
        crop_size: f32,
        /// Write a JSON report here.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Check that a FEN has eight full ranks and both kings.
    Validate { fen: String },
    /// Project a UCI move through a saved board region into a view.
    Overlay {
        /// Move in UCI notation, e.g. `e2e4`.
        #[arg(long = "move")]
        uci: String,
        /// Board region JSON as written by `crop`.
        #[arg(long)]
        region: PathBuf,
        /// View size as WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_size)]
        view: Size,
    },
    /// Locate and crop the board in a photo using board detector output.
    #[cfg(feature = "image")]
    Crop {
        #[arg(long)]
        image: PathBuf,
        /// Board detector payload in the same format as piece detections.
        #[arg(long)]
        boards: PathBuf,
        #[arg(long, default_value = "board_crop.png")]
        out: PathBuf,
        /// Write the board region JSON here.
        #[arg(long)]
        region_out: Option<PathBuf>,
        /// Draw this move onto the crop.
        #[arg(long)]
        arrow: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigIoError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Move(#[from] MalformedMove),
    #[error("degenerate source frame: nothing to project")]
    NoProjection,
    #[error(transparent)]
    Locate(#[from] fen_vision::LocateError),
    #[cfg_attr(not(feature = "image"), allow(dead_code))]
    #[error("image: {0}")]
    Image(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok(Size::new(w, h))
}

fn init_logging(verbose: u8, json: bool) {
    let level = fen_vision::core::level_for_verbosity(verbose);
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        fen_vision::core::init_tracing(json, level);
    }
    #[cfg(not(feature = "tracing"))]
    {
        if json {
            eprintln!("--json-logs needs the `tracing` feature; using plain logs");
        }
        let _ = fen_vision::core::init_with_level(level);
    }
}

fn run_position(
    detections: PathBuf,
    config: Option<PathBuf>,
    crop_size: f32,
    report: Option<PathBuf>,
) -> Result<ExitCode, CliError> {
    let cfg = match &config {
        Some(path) => ScanConfig::load_json(path)?,
        None => ScanConfig::default(),
    };
    let crop = Size::square(crop_size);
    let batch = DetectionBatch::<PieceDetection>::load_json(&detections)?;
    let dets = batch.scaled_to(crop);

    let scanner = BoardScanner::new(cfg.build_params());
    let built = scanner.build_position(&dets, crop);
    println!("{}", built.fen);
    print_validation(&built.validation);

    if let Some(path) = report.or_else(|| cfg.output_path.as_ref().map(PathBuf::from)) {
        let mut out = ScanReport::new(&cfg, config.as_deref(), dets.len());
        out.detections_path = Some(detections.to_string_lossy().into_owned());
        out.set_position(&built);
        out.write_json(&path)?;
        log::info!("report written to {}", path.display());
    }
    Ok(exit_for(built.validation.ok))
}

fn print_validation(v: &fen_vision::ValidationResult) {
    match &v.reason {
        None => println!("valid"),
        Some(reason) => println!("invalid: {reason}"),
    }
}

fn exit_for(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn run_overlay(uci: &str, region: PathBuf, view: Size) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(region)?;
    let region: BoardRegion = serde_json::from_str(&raw)?;
    let scanner = BoardScanner::new(ScanParams::default());
    let geometry = scanner.move_geometry(uci, &region)?;
    let (from, to) = geometry.project(view).ok_or(CliError::NoProjection)?;
    let out = serde_json::json!({
        "move": geometry.mv.to_string(),
        "from": [from.x, from.y],
        "to": [to.x, to.y],
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[cfg(feature = "image")]
fn image_err(err: impl std::fmt::Display) -> CliError {
    CliError::Image(err.to_string())
}

#[cfg(feature = "image")]
fn run_crop(
    image: PathBuf,
    boards: PathBuf,
    out: PathBuf,
    region_out: Option<PathBuf>,
    arrow: Option<String>,
) -> Result<(), CliError> {
    use fen_vision::detect::{annotate_move, decode_oriented, rgb_view, to_rgb_image};
    use fen_vision::overlay::StrokeStyle;
    use fen_vision::BoardCandidate;

    let rgb = decode_oriented(&image).map_err(image_err)?;
    let frame = rgb_view(&rgb);
    let candidates = DetectionBatch::<BoardCandidate>::load_json(&boards)?.scaled_to(frame.size());

    let scanner = BoardScanner::new(ScanParams::default());
    let cropped = scanner.locate_and_crop(&frame, &candidates)?;
    let rendered = match arrow {
        Some(uci) => {
            let geometry = scanner.move_geometry(&uci, &cropped.region)?;
            annotate_move(&cropped.image, &geometry, &StrokeStyle::default())
                .map_err(image_err)?
        }
        None => to_rgb_image(&cropped.image).map_err(image_err)?,
    };
    rendered.save(&out).map_err(image_err)?;

    let json = serde_json::to_string_pretty(&cropped.region)?;
    match region_out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::Position {
            detections,
            config,
            crop_size,
            report,
        } => run_position(detections, config, crop_size, report),
        Commands::Validate { fen } => {
            let v = BoardScanner::new(ScanParams::default()).validate(&fen);
            print_validation(&v);
            Ok(exit_for(v.ok))
        }
        Commands::Overlay { uci, region, view } => {
            run_overlay(&uci, region, view)?;
            Ok(ExitCode::SUCCESS)
        }
        #[cfg(feature = "image")]
        Commands::Crop {
            image,
            boards,
            out,
            region_out,
            arrow,
        } => {
            run_crop(image, boards, out, region_out, arrow)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
