use crate::config::load_config;
use crate::ir::ChartSpec;
use crate::layout_dump::write_layout_dump;
use crate::render::{write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "outlabels",
    version,
    about = "Render pie and doughnut charts with outside labels"
)]
pub struct Args {
    /// Chart document (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, render size, default outlabel options)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width, overriding the document
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height, overriding the document
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Measure text with built-in glyph widths instead of system fonts
    #[arg(long = "fast-text")]
    pub fast_text: bool,

    /// Write the computed label geometry as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Log layout decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if args.fast_text {
        config.render.fast_text_metrics = true;
    }

    let input = read_input(args.input.as_deref())?;
    let mut spec = ChartSpec::parse(&input)?;
    if let Some(width) = args.width {
        spec.width = Some(width);
    }
    if let Some(height) = args.height {
        spec.height = Some(height);
    }

    let rendered = crate::render_chart(&spec, &config)?;
    config.render.width = rendered.chart.width;
    config.render.height = rendered.chart.height;

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &rendered.chart, &rendered.engine)?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&rendered.svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&rendered.svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let mut buf = String::new();
    match path {
        Some(path) if path != Path::new("-") => {
            buf = std::fs::read_to_string(path)?;
        }
        _ => {
            io::stdin().read_to_string(&mut buf)?;
        }
    }
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
