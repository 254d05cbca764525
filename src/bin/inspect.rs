//! Content Inspector CLI
//!
//! Parses response documents, builds thumb URLs and validates value maps
//! against field definitions, all from files on disk.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use headless_content::{
    parser, ClientConfig, Form, HasChildren, HasFields, ImageSource, Model, Parsed, StrOptions,
    TypeRegistry,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "content-inspect")]
#[command(about = "Inspect headless content responses and form definitions")]
struct Cli {
    /// Config file (defaults to headless.toml lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a response document and print the model tree
    Parse {
        /// JSON response file
        file: PathBuf,
    },

    /// Build a thumb URL for a file model or raw image metadata
    Thumb {
        /// JSON file holding a `file` node or `{ url, width, height, alt }`
        file: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Crop to the exact box
        #[arg(long)]
        crop: bool,
        /// Quality (overrides the configured default)
        #[arg(short, long)]
        quality: Option<u32>,
        /// Request a double-density file
        #[arg(long)]
        hires: bool,
    },

    /// Validate a value map against field definitions
    Validate {
        /// JSON object of field name → definition
        definitions: PathBuf,
        /// JSON object of field name → value
        values: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::load_from(cli.config.as_deref()).context("loading config")?;

    match cli.command {
        Commands::Parse { file } => {
            let document = read_json(&file)?;
            println!("📄 {}", file.display());
            print_parsed(&parser::parse(&document), 1);
        }

        Commands::Thumb {
            file,
            width,
            height,
            crop,
            quality,
            hires,
        } => {
            let document = read_json(&file)?;
            let image = image_source(&document)?;

            let mut options = config.thumbs.options().crop(crop);
            options.width = width;
            options.height = height;
            if let Some(q) = quality {
                options = options.quality(q);
            }
            if hires {
                options = options.hires(true);
            }

            let attrs = headless_content::thumb::build_url(&image, &options);
            match attrs.src {
                Some(src) => {
                    println!("🖼️  {}", src);
                    println!(
                        "  width={} height={}",
                        attrs.width.unwrap_or_default(),
                        attrs.height.unwrap_or_default()
                    );
                    let srcset = headless_content::thumb::srcset(
                        &image,
                        &config.thumbs.srcset_widths,
                        &options,
                    );
                    println!("  srcset: {}", srcset);
                }
                None => bail!("image metadata is incomplete (url, width and height are required)"),
            }
        }

        Commands::Validate {
            definitions,
            values,
        } => {
            let form = Form::from_value(&read_json(&definitions)?, TypeRegistry::new())
                .context("reading field definitions")?;
            let values = read_json(&values)?;
            let values = values
                .as_object()
                .context("values file must hold a JSON object")?;

            for (name, value) in values {
                if !form.set_value(name, value.clone()) && form.field(name).is_none() {
                    println!("⚠️  {}: no such field", name);
                }
            }

            let valid = form.validate();
            for name in form.names() {
                match form.msg(&name) {
                    Some("") | None => println!("✅ {}", name),
                    Some(rule) => println!("❌ {} ({})", name, rule),
                }
            }
            println!();
            println!("📦 {}", serde_json::to_string_pretty(&form.data())?);

            if !valid {
                bail!("validation failed");
            }
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn image_source(document: &Value) -> anyhow::Result<ImageSource> {
    if document.get("type").is_some() {
        let model = parser::create_model(document);
        let file = model
            .as_file()
            .with_context(|| format!("expected a file node, got `{}`", model.type_name()))?;
        return file.image().context("file is not an image");
    }
    Ok(serde_json::from_value(document.clone())?)
}

fn print_parsed(parsed: &Parsed, depth: usize) {
    let pad = "  ".repeat(depth);
    match parsed {
        Parsed::Model(model) => print_model(model, depth),
        Parsed::Map(map) => {
            for (key, child) in map {
                println!("{}{}:", pad, key);
                print_parsed(child, depth + 1);
            }
        }
        Parsed::List(items) => {
            for (i, child) in items.iter().enumerate() {
                println!("{}[{}]", pad, i);
                print_parsed(child, depth + 1);
            }
        }
        Parsed::Scalar(value) => println!("{}{}", pad, value),
    }
}

fn print_model(model: &Model, depth: usize) {
    let pad = "  ".repeat(depth);
    let text = model.str(&StrOptions::default());
    let text: String = text.chars().take(60).collect();
    println!("{}<{}> {}", pad, model.type_name(), text);

    if let Some(link) = model.link() {
        println!("{}  → {} ({})", pad, link.href(), link.kind().as_str());
    }
    if let Some(fields) = model.as_fields() {
        for (key, child) in fields.fields() {
            println!("{}  .{}", pad, key);
            print_model(child, depth + 2);
        }
    }
    if let Some(children) = model.as_children() {
        for child in children.entries() {
            print_model(child, depth + 1);
        }
    }
}
