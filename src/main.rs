use clap::{ArgAction, Parser, Subcommand};
use simple_resize::config::{self, DEFAULT_CONFIG_FILE};
use simple_resize::imaging::{Filter, OutputFormat, Quality, RustBackend, supported_input_extensions};
use simple_resize::loader::SourceFile;
use simple_resize::output::{self, InfoReport};
use simple_resize::session::{Session, SessionDefaults, SessionEvent};
use simple_resize::sizing::{Edit, ImageMeta};
use simple_resize::units::{Dpi, Unit, px_per_cm};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Size controls shared by commands that load an image.
#[derive(clap::Args, Clone)]
struct SizeArgs {
    /// Target width, in the active unit
    #[arg(long)]
    width: Option<f64>,
    /// Target height, in the active unit
    #[arg(long)]
    height: Option<f64>,
    /// Unit for --width/--height
    #[arg(long, value_enum)]
    unit: Option<Unit>,
    /// Dots per inch for centimeter sizes
    #[arg(long)]
    dpi: Option<f64>,
    /// Don't derive the missing side from the source aspect ratio
    #[arg(long)]
    no_keep_ratio: bool,
}

/// Encoding options for the exported file.
#[derive(clap::Args, Clone)]
struct ExportArgs {
    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Lossy quality in (0, 1]; ignored for PNG
    #[arg(long)]
    quality: Option<f32>,
    /// Resampling filter
    #[arg(long, value_enum)]
    filter: Option<Filter>,
    /// Directory to write the resized image into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser)]
#[command(name = "simple-resize")]
#[command(about = "Resize an image to an exact size in pixels or centimeters")]
#[command(long_about = "\
Resize an image to an exact size in pixels or centimeters

Sizes are given in pixels, or in centimeters at a DPI. With the aspect
lock on (the default) giving only --width or only --height derives the
other side from the source image. Giving both sets the exact size.

Without --width/--height the image is capped at 1600px wide
(configurable), keeping its aspect ratio.

Output is written as {name}_{width}x{height}.{png|jpg|webp}.

Examples:

  simple-resize resize photo.jpg --width 800 --format jpeg --quality 0.8
  simple-resize resize scan.png --unit cm --dpi 300 --width 10
  simple-resize info photo.jpg --json
  simple-resize convert 21 --from cm --dpi 300

Run 'simple-resize gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log more (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize an image and write the result
    Resize {
        input: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show the original size and the default target
    Info {
        input: PathBuf,
        /// Dots per inch for the cm hint
        #[arg(long)]
        dpi: Option<f64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a length between pixels and centimeters
    Convert {
        value: f64,
        /// Unit of VALUE
        #[arg(long, value_enum)]
        from: Unit,
        #[arg(long)]
        dpi: Option<f64>,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Resize {
            input,
            size,
            export,
        } => {
            let config = config::load_config(&cli.config)?;
            let mut defaults = config.session_defaults();
            if let Some(unit) = size.unit {
                defaults.unit = unit;
            }
            if let Some(dpi) = size.dpi {
                defaults.dpi = Dpi::new(dpi);
            }
            if size.no_keep_ratio {
                defaults.keep_ratio = false;
            }

            let mut session = Session::new(RustBackend::new(), defaults);
            let meta = load_image(&mut session, &input)?;

            match (size.width, size.height) {
                (Some(w), Some(h)) => {
                    tracing::debug!("both sides given, using exact size");
                    session.edit(Edit::KeepRatio(false));
                    session.edit(Edit::Width(w));
                    session.edit(Edit::Height(h));
                }
                (Some(w), None) => session.edit(Edit::Width(w)),
                (None, Some(h)) => session.edit(Edit::Height(h)),
                (None, None) => {}
            }
            output::print_resize_plan(
                meta,
                session.file_name().unwrap_or_default(),
                session.dimensions(),
            );

            let requested = export.quality.unwrap_or(config.export.quality);
            let quality = Quality::new(requested);
            if quality.value() != requested {
                tracing::warn!(requested, used = quality.value(), "quality out of range");
            }
            let export_config = session.export_config(
                export.format.unwrap_or(config.export.format),
                quality,
                export.filter.unwrap_or(config.export.filter),
            );
            session.request_export(&export_config)?;

            match session.next_current_event() {
                Some(SessionEvent::Exported(out)) => {
                    let path = out.save(&export.out_dir)?;
                    output::print_lines(&output::format_export(&out, &path, quality.value()));
                }
                Some(SessionEvent::ExportFailed(e)) => return Err(e.into()),
                _ => return Err("export did not complete".into()),
            }
        }
        Command::Info { input, dpi, json } => {
            let config = config::load_config(&cli.config)?;
            let mut defaults = config.session_defaults();
            if let Some(dpi) = dpi {
                defaults.dpi = Dpi::new(dpi);
            }
            // Always report the default target in pixels.
            let defaults = SessionDefaults {
                unit: Unit::Px,
                ..defaults
            };

            let mut session = Session::new(RustBackend::new(), defaults);
            let meta = load_image(&mut session, &input)?;
            let report = InfoReport {
                file: session.file_name().unwrap_or_default().to_string(),
                original: meta,
                default_target: session.target_preview(),
                dpi: defaults.dpi.value(),
                px_per_cm: px_per_cm(defaults.dpi),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_lines(&output::format_info(&report));
            }
        }
        Command::Convert { value, from, dpi } => {
            let dpi = match dpi {
                Some(dpi) => Dpi::new(dpi),
                None => config::load_config(&cli.config)?.session_defaults().dpi,
            };
            println!("{}", output::format_conversion(value, from, dpi));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize logging on stderr so stdout stays clean for reports and JSON.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("simple_resize={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Select `input` and wait for its decode.
fn load_image(
    session: &mut Session<RustBackend>,
    input: &Path,
) -> Result<ImageMeta, Box<dyn std::error::Error>> {
    let file = SourceFile::read(input)?;
    session.select_file(Some(file));
    match session.next_current_event() {
        Some(SessionEvent::Loaded(meta)) => Ok(meta),
        Some(SessionEvent::LoadFailed(e)) => Err(format!(
            "{}: {} (readable formats: {})",
            input.display(),
            e,
            supported_input_extensions().join(", ")
        )
        .into()),
        _ => Err(format!("{}: decode did not complete", input.display()).into()),
    }
}
