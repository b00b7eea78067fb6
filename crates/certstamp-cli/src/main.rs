use anyhow::{Context, Result};
use certstamp::{CustomFontMode, GenerationRequest};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "certstamp",
    about = "Write a centered name onto a certificate PDF",
    version
)]
struct Cli {
    /// JSON file holding a complete request; replaces the other flags
    #[arg(
        long,
        conflicts_with_all = [
            "input",
            "text",
            "font",
            "size",
            "center_x",
            "center_y",
            "font_file",
            "custom_font_mode",
            "page",
            "output_dir",
            "output",
        ]
    )]
    request: Option<PathBuf>,

    /// Certificate template PDF
    #[arg(short, long, required_unless_present = "request")]
    input: Option<PathBuf>,

    /// Text to write
    #[arg(short, long, required_unless_present = "request")]
    text: Option<String>,

    /// Standard font name (e.g. HELVETICA_BOLD, any case) or CUSTOM
    #[arg(short, long, required_unless_present = "request")]
    font: Option<String>,

    /// Font size in points
    #[arg(short, long, required_unless_present = "request")]
    size: Option<u32>,

    /// Horizontal center in points; omit (or pass a negative value) to center on the page
    #[arg(long, allow_hyphen_values = true)]
    center_x: Option<f64>,

    /// Vertical reference in points from the bottom of the page
    #[arg(long, required_unless_present = "request", allow_hyphen_values = true)]
    center_y: Option<f64>,

    /// TrueType font file, required with --font CUSTOM
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// What to do with a custom font
    #[arg(long, default_value = "measure-only", value_enum)]
    custom_font_mode: CustomFontModeArg,

    /// Page to write on
    #[arg(long, default_value = "1")]
    page: usize,

    /// Directory for the result
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,

    /// File name of the result
    #[arg(short, long, required_unless_present = "request")]
    output: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CustomFontModeArg {
    /// Measure with the custom font, draw with Helvetica
    MeasureOnly,
    /// Embed the custom font and draw with it
    Embed,
}

impl From<CustomFontModeArg> for CustomFontMode {
    fn from(arg: CustomFontModeArg) -> Self {
        match arg {
            CustomFontModeArg::MeasureOnly => CustomFontMode::MeasureOnly,
            CustomFontModeArg::Embed => CustomFontMode::Embed,
        }
    }
}

impl Cli {
    fn into_request(self) -> Result<GenerationRequest> {
        if let Some(path) = self.request {
            return GenerationRequest::from_json_file(&path)
                .with_context(|| format!("Failed to load request {}", path.display()));
        }

        // clap enforces these when --request is absent
        let missing = |flag: &str| anyhow::anyhow!("--{flag} is required");
        let mut request = GenerationRequest::new(
            self.input.ok_or_else(|| missing("input"))?,
            self.text.ok_or_else(|| missing("text"))?,
            self.font.ok_or_else(|| missing("font"))?,
            self.size.ok_or_else(|| missing("size"))?,
            self.center_y.ok_or_else(|| missing("center-y"))?,
            self.output.ok_or_else(|| missing("output"))?,
        )
        .with_output_dir(self.output_dir)
        .with_page(self.page)
        .with_custom_font_mode(self.custom_font_mode.into());

        if let Some(center_x) = self.center_x {
            request = request.with_center_x(center_x);
        }
        if let Some(font_file) = self.font_file {
            request = request.with_font_file(font_file);
        }

        Ok(request)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = Cli::parse().into_request()?;
    let saved_to = certstamp::generate(&request).context("Failed to write name")?;

    println!(
        "Name written successfully. Modified PDF saved to: {}",
        saved_to.display()
    );

    Ok(())
}
