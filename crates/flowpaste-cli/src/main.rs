use anyhow::{Context, Result, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use flowpaste_config::FlowpasteConfig;
use flowpaste_ir::{ConvertOptions, XscpDocument, convert_with_options, diagnostics, validate_document};
use tracing::{debug, info};

const USAGE: &str = "Usage: flowpaste <markup.html> [--css <sheet.css>] [--out <file.json>] \
                     [--config <flowpaste.toml>] [--pretty] [--validate]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    markup: PathBuf,
    css: Option<PathBuf>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    pretty: bool,
    validate: bool,
}

fn parse_args(mut args: Vec<String>) -> Result<Args> {
    if args.is_empty() {
        bail!("missing <markup.html>\n{USAGE}");
    }
    let mut parsed = Args {
        markup: PathBuf::from(args.remove(0)),
        ..Args::default()
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--css" | "--out" | "--config") => {
                let Some(value) = args.get(i + 1) else {
                    bail!("{flag} expects a path");
                };
                let value = Some(PathBuf::from(value));
                match flag {
                    "--css" => parsed.css = value,
                    "--out" => parsed.out = value,
                    _ => parsed.config = value,
                }
                i += 2;
            }
            "--pretty" => {
                parsed.pretty = true;
                i += 1;
            }
            "--validate" => {
                parsed.validate = true;
                i += 1;
            }
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn load_config(path: Option<&Path>) -> Result<FlowpasteConfig> {
    match path {
        Some(path) => FlowpasteConfig::load_path(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(FlowpasteConfig::load()),
    }
}

fn convert_options(config: &FlowpasteConfig) -> ConvertOptions {
    ConvertOptions {
        asset_placeholder: config.convert.asset_placeholder.clone(),
        wrap_sections: config.convert.wrap_sections,
        relocate_unused_classes: config.convert.relocate_unused_classes,
        relocate_unsupported_selectors: config.convert.relocate_unsupported_selectors,
    }
}

fn render(document: &XscpDocument, pretty: bool) -> Result<String> {
    let json = if pretty {
        document.to_json_pretty()
    } else {
        document.to_json_string()
    };
    json.context("failed to serialize document")
}

fn run(args: Args, config: &FlowpasteConfig) -> Result<String> {
    let markup = fs::read_to_string(&args.markup)
        .with_context(|| format!("failed to read {}", args.markup.display()))?;
    let css = match &args.css {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => String::new(),
    };

    let options = convert_options(config);
    let document = convert_with_options(&markup, &css, &options)
        .with_context(|| format!("failed to convert {}", args.markup.display()))?;

    if args.validate || config.output.validate {
        validate_document(&document).context("generated document is invalid")?;
        debug!("document passed validation");
    }
    info!(
        nodes = document.payload.nodes.len(),
        styles = document.payload.styles.len(),
        "converted {}",
        args.markup.display()
    );
    render(&document, args.pretty || config.output.pretty)
}

fn main() -> Result<()> {
    let args = parse_args(env::args().skip(1).collect())?;
    let config = load_config(args.config.as_deref())?;

    if let Some(categories) = &config.diagnostics {
        if env::var_os(diagnostics::DIAGNOSTICS_ENV).is_none() {
            // SAFETY: no other threads exist yet.
            unsafe { env::set_var(diagnostics::DIAGNOSTICS_ENV, categories) };
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let out = args.out.clone();
    let json = run(args, &config)?;
    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?
        }
        None => println!("{json}"),
    }
    Ok(())
}
