//! CLI binary for imgconv-client.
//!
//! A thin shim over the library crate: maps flags to `ClientConfig`, then
//! plays the page's event sequence (pick file → pick format → convert →
//! download) through a `Controller`.

use anyhow::{Context, Result};
use clap::Parser;
use imgconv_client::{
    ClientConfig, Controller, FileCandidate, Outcome, ResultView, SessionEvents, TargetFormat,
    UiEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal rendition of the page's overlay and panels ──────────────────────

/// Shows the loading overlay as a spinner and echoes preview/results.
/// Errors are not printed here; they come back from `dispatch` and are
/// reported once by `main`.
struct CliEvents {
    spinner: Mutex<Option<ProgressBar>>,
    label: String,
}

impl CliEvents {
    fn new(label: String) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            label,
        })
    }
}

impl SessionEvents for CliEvents {
    fn on_overlay(&self, visible: bool) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        if visible {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
            );
            bar.set_prefix("Converting");
            bar.set_message(self.label.clone());
            bar.enable_steady_tick(Duration::from_millis(80));
            *slot = Some(bar);
        } else if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }

    fn on_preview(&self, name: &str, data_url_len: usize) {
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold(name),
            dim(&format!("preview ready ({data_url_len} chars)"))
        );
    }

    fn on_results(&self, view: &ResultView) {
        eprintln!("{} {}", green("✔"), bold("Conversion complete"));
        eprintln!("   Original:   {}", view.original);
        eprintln!("   Converted:  {}", view.converted);
        if let Some(notice) = view.notice {
            eprintln!("   {} {}", yellow(notice.headline()), notice.message());
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert to PNG (default) into the current directory
  imgconv photo.jpg

  # Convert to WebP, save under ./out
  imgconv -f webp -o out photo.jpg

  # Talk to an app mounted inside a host application
  imgconv --server http://host:8000 --page-path /apps/ -f ico logo.png

  # Only check that the file would be accepted
  imgconv --check scan.tiff

  # Describe the target formats
  imgconv --describe
  imgconv --describe -f gif

  # Machine-readable summary
  imgconv --json -f jpeg picture.bmp > summary.json

ACCEPTED INPUT TYPES:
  image/jpeg  image/png  image/gif  image/bmp  image/tiff  image/webp  image/x-icon
  (declared by --media-type, otherwise derived from the file extension)

ENVIRONMENT VARIABLES:
  IMGCONV_SERVER       Conversion server base URL
  IMGCONV_PAGE_PATH    Page path the app is served at (selects the route layout)
  IMGCONV_OUTPUT_DIR   Directory for converted_image.<ext>
  IMGCONV_FORMAT       Target format
  RUST_LOG             Override log filter (e.g. imgconv_client=debug)
"#;

/// Convert an image to another format using an image-conversion server.
#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    version,
    about = "Convert images between formats using an image-conversion server",
    long_about = "Upload an image to an image-conversion server, request a target format \
(PNG, JPEG, GIF, BMP, TIFF, WEBP or ICO) and save the result as converted_image.<ext>.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file to convert.
    #[arg(required_unless_present = "describe")]
    input: Option<PathBuf>,

    /// Target format.
    #[arg(short, long, env = "IMGCONV_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Conversion server base URL.
    #[arg(long, env = "IMGCONV_SERVER", default_value = "http://127.0.0.1:5002")]
    server: String,

    /// Page path the app is served at: `/` for standalone routes, anything
    /// else (other than `/image-conversion-app/`) for mounted routes.
    #[arg(long, env = "IMGCONV_PAGE_PATH", default_value = "/")]
    page_path: String,

    /// Directory to save the converted image in.
    #[arg(short, long, env = "IMGCONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Declared media type of the input (default: from the extension).
    #[arg(long)]
    media_type: Option<String>,

    /// Request timeout in seconds (default: wait indefinitely).
    #[arg(long, env = "IMGCONV_TIMEOUT")]
    timeout: Option<u64>,

    /// Validate and preview the input only; do not contact the server.
    #[arg(long)]
    check: bool,

    /// Print information about the target format(s) and exit.
    #[arg(long)]
    describe: bool,

    /// Print a JSON summary instead of text.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "IMGCONV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMGCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMGCONV_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Gif,
    Bmp,
    #[value(alias = "tif")]
    Tiff,
    Webp,
    Ico,
}

impl From<FormatArg> for TargetFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => TargetFormat::Png,
            FormatArg::Jpeg => TargetFormat::Jpeg,
            FormatArg::Gif => TargetFormat::Gif,
            FormatArg::Bmp => TargetFormat::Bmp,
            FormatArg::Tiff => TargetFormat::Tiff,
            FormatArg::Webp => TargetFormat::Webp,
            FormatArg::Ico => TargetFormat::Ico,
        }
    }
}

/// `--json` output.
#[derive(Serialize)]
struct Summary<'a> {
    input: &'a str,
    target_format: TargetFormat,
    original_format: &'a str,
    converted_format: &'a str,
    original_size: u64,
    converted_size: u64,
    view: &'a ResultView,
    saved_to: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and the results block are the user-facing output; library
    // INFO logs would interleave with them, so default to warnings only.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Describe mode ────────────────────────────────────────────────────
    if cli.describe {
        let formats: Vec<TargetFormat> = match cli.format {
            Some(f) => vec![f.into()],
            None => TargetFormat::ALL.to_vec(),
        };
        for (i, f) in formats.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", bold(&f.title()));
            println!("{}", f.description());
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input image is required")?;
    let format: TargetFormat = cli.format.map(Into::into).unwrap_or_default();

    let config = build_config(&cli, &input, format)?;
    let controller = Controller::new(&config).context("Failed to set up the client")?;

    // ── Intake ───────────────────────────────────────────────────────────
    let mut candidate = FileCandidate::new(&input);
    if let Some(ref mt) = cli.media_type {
        candidate = candidate.with_media_type(mt.clone());
    }
    let selected = match controller.dispatch(UiEvent::FileChosen(candidate)).await {
        Ok(Outcome::Accepted(file)) => file,
        Ok(other) => anyhow::bail!("unexpected outcome {other:?}"),
        Err(e) => return Err(e).context("Input rejected"),
    };

    if cli.check {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&selected).context("Failed to serialise file info")?
            );
        } else if !cli.quiet {
            println!("File:        {}", selected.path.display());
            println!("Media type:  {}", selected.media_type);
            println!(
                "Size:        {}",
                imgconv_client::format_file_size(selected.size)
            );
            println!("Accepted:    {}", green("yes"));
        }
        return Ok(());
    }

    // ── Convert ──────────────────────────────────────────────────────────
    controller
        .dispatch(UiEvent::FormatSelected(format))
        .await
        .context("Failed to select format")?;

    let view = match controller.dispatch(UiEvent::ConvertClicked).await {
        Ok(Outcome::Converted(view)) => view,
        Ok(other) => anyhow::bail!("unexpected outcome {other:?}"),
        Err(e) => return Err(e).context("Conversion failed"),
    };

    // ── Download ─────────────────────────────────────────────────────────
    let saved = match controller.dispatch(UiEvent::DownloadClicked).await {
        Ok(Outcome::Downloaded(path)) => path,
        Ok(other) => anyhow::bail!("unexpected outcome {other:?}"),
        Err(e) => return Err(e).context("Download failed"),
    };

    if cli.json {
        let session = controller.snapshot();
        let result = session
            .result
            .as_ref()
            .context("Conversion result missing from session")?;
        let input_str = input.display().to_string();
        let saved_str = saved.display().to_string();
        let summary = Summary {
            input: &input_str,
            target_format: format,
            original_format: &result.original_format,
            converted_format: &result.converted_format,
            original_size: result.original_size,
            converted_size: result.converted_size,
            view: &view,
            saved_to: &saved_str,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!("{}  →  {}", green("✔"), bold(&saved.display().to_string()));
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, input: &std::path::Path, format: TargetFormat) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .server_url(cli.server.clone())
        .page_path(cli.page_path.clone())
        .output_dir(cli.output_dir.clone())
        .default_format(format);

    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    if show_progress {
        let label = format!(
            "{} → {}",
            input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format
        );
        builder = builder.events(CliEvents::new(label) as Arc<dyn SessionEvents>);
    }

    builder.build().context("Invalid configuration")
}
