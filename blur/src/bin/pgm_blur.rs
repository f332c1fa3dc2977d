//! Blur a grayscale PGM image.
//!
//! ```text
//! pgm_blur <input> [output] [--strategy S] [--sigma F] [--border P]
//!          [--region R] [--reference-row] [--config file.yaml]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use blur::{BlurConfig, BorderPolicy, OutputRegion, Strategy, blur, load_pgm, save_pgm};

const DEFAULT_OUTPUT: &str = "output.pgm";

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    strategy: Option<Strategy>,
    sigma: Option<f32>,
    border: Option<BorderPolicy>,
    region: Option<OutputRegion>,
    reference_row: bool,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <input.pgm> [output.pgm] [options]\n\
         \n\
         Options:\n\
         \x20 --strategy S      scalar-1d | scalar-2d | vector-1d | vector-2d (default vector-1d)\n\
         \x20 --sigma F         Gaussian sigma (default 3.0)\n\
         \x20 --border P        zero | replicate | mirror (default replicate)\n\
         \x20 --region R        interior | canvas (default interior)\n\
         \x20 --reference-row   use the fixed 7-tap reference row instead of sigma\n\
         \x20 --config FILE     YAML file with any of the above; flags override it\n\
         \n\
         Output defaults to {DEFAULT_OUTPUT}."
    )
}

fn parse_value<T: FromStr>(flag: &str, value: Option<String>) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let value = value.with_context(|| format!("{} requires a value", flag))?;
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value {:?} for {}: {}", value, flag, e))
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--strategy" => args.strategy = Some(parse_value(&arg, argv.next())?),
            "--sigma" => args.sigma = Some(parse_value(&arg, argv.next())?),
            "--border" => args.border = Some(parse_value(&arg, argv.next())?),
            "--region" => args.region = Some(parse_value(&arg, argv.next())?),
            "--config" => args.config_file = Some(parse_value(&arg, argv.next())?),
            "--reference-row" => args.reference_row = true,
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    args.input = positional.next().context("missing input file")?;
    args.output = positional.next();
    if let Some(extra) = positional.next() {
        bail!("unexpected argument {}", extra.display());
    }
    Ok(args)
}

fn build_config(args: &Args) -> Result<BlurConfig> {
    let mut config = match &args.config_file {
        Some(path) => BlurConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BlurConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(sigma) = args.sigma {
        config.sigma = sigma;
    }
    if let Some(border) = args.border {
        config.border = border;
    }
    if let Some(region) = args.region {
        config.region = region;
    }
    config.reference_row |= args.reference_row;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    tracing::info!(input = %args.input.display(), "opening image");
    let image = load_pgm(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    tracing::info!(
        width = image.pixels.width(),
        height = image.pixels.height(),
        max_value = image.max_value,
        ?config,
        "loaded image"
    );

    let blurred = blur(&image.pixels, image.max_value, &config).context("blur failed")?;

    save_pgm(&output, &blurred.pixels, image.max_value)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(output = %output.display(), "saved image");
    Ok(())
}

fn main() -> ExitCode {
    let mut argv = std::env::args();
    let program = argv.next().unwrap_or_else(|| "pgm_blur".to_string());

    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}\n\n{}", err, usage(&program));
            return ExitCode::FAILURE;
        }
    };

    common::log_setup::setup_logging("info", "pgm_blur");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
