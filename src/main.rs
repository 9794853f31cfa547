// this_file: src/main.rs
//! PhotoPoet CLI - Poem-on-photo compositing tool

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::info;
use photopoet::collection::{CollectionItem, CollectionStore};
use photopoet::compose::{Compositor, RenderTarget, Viewport};
use photopoet::encode;
use photopoet::fonts::FontCatalog;
use photopoet::logging;
use photopoet::style::{Anchor, Rgba, StyleSpec};
use std::io::Read;

/// PhotoPoet - overlay a poem onto a photo and export the composite
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,

    /// Enable quiet mode (only errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "log_level")]
    quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite a poem onto an image and write a PNG
    Render {
        /// Source image: file path or data URI
        #[arg(short, long)]
        image: String,

        /// Poem text given inline
        #[arg(short, long, conflicts_with = "poem_file")]
        poem: Option<String>,

        /// Read poem text from a file ("-" for stdin)
        #[arg(long)]
        poem_file: Option<String>,

        /// Style parameters as a JSON file; flags below override its fields
        #[arg(long)]
        style: Option<Utf8PathBuf>,

        /// Caption anchor position
        #[arg(long, value_enum)]
        position: Option<Anchor>,

        /// Caption text color (#RRGGBB, #RRGGBBAA, or rgba(...))
        #[arg(long)]
        text_color: Option<String>,

        /// Caption background color with opacity baked in
        #[arg(long)]
        background_color: Option<String>,

        /// Font family to resolve from the catalog
        #[arg(long)]
        font_family: Option<String>,

        /// Pin the style's family directly to a font file
        #[arg(long)]
        font: Option<Utf8PathBuf>,

        /// Extra font directory to scan (repeatable)
        #[arg(long)]
        font_dir: Vec<Utf8PathBuf>,

        /// Multiplier on the resolution-derived base font size
        #[arg(long)]
        size_multiplier: Option<f32>,

        /// Render a viewport-capped preview instead of a full-resolution export
        #[arg(long)]
        preview: bool,

        /// Preview viewport width in pixels
        #[arg(long, default_value_t = 800.0, requires = "preview")]
        viewport_width: f32,

        /// Preview viewport height in pixels
        #[arg(long, default_value_t = 600.0, requires = "preview")]
        viewport_height: f32,

        /// Output path (default: timestamped download name in the current directory)
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,

        /// Print the composite as a data URI instead of writing a file
        #[arg(long, conflicts_with = "output")]
        emit_data_uri: bool,
    },

    /// Manage the saved-creations collection
    Collection {
        /// Collection store file
        #[arg(short, long, default_value = "collection.json")]
        store: Utf8PathBuf,

        #[command(subcommand)]
        action: CollectionAction,
    },

    /// List font families resolvable from the catalog
    Fonts {
        /// Extra font directory to scan (repeatable)
        #[arg(long)]
        font_dir: Vec<Utf8PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List saved items, newest first
    List,
    /// Save a new item
    Add {
        /// Source image: file path or data URI
        #[arg(short, long)]
        image: String,
        /// Poem text
        #[arg(short, long)]
        poem: String,
        /// Optional title for the creation
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Remove an item by id
    Remove {
        /// Item id to remove
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        cli.log_level.clone()
    };
    logging::init_logging(&log_level, cli.quiet, true);

    match cli.command {
        Commands::Render {
            image,
            poem,
            poem_file,
            style,
            position,
            text_color,
            background_color,
            font_family,
            font,
            font_dir,
            size_multiplier,
            preview,
            viewport_width,
            viewport_height,
            output,
            emit_data_uri,
        } => {
            let poem_text = read_poem(poem, poem_file)?;
            let style = build_style(
                style,
                position,
                text_color,
                background_color,
                font_family,
                size_multiplier,
            )?;
            let catalog = build_catalog(font_dir, font, &style)?;

            let target = if preview {
                RenderTarget::Preview {
                    viewport: Viewport {
                        width: viewport_width,
                        height: viewport_height,
                    },
                }
            } else {
                RenderTarget::Export
            };

            let compositor = Compositor::new(catalog);
            let canvas = compositor
                .render_from_source(&image, &poem_text, &style, target)
                .context("render failed")?;
            info!("Composited {}x{} canvas", canvas.width(), canvas.height());

            let png = encode::encode_png(&canvas)?;
            if emit_data_uri {
                println!("{}", encode::to_data_uri(&png));
            } else {
                let path = match output {
                    Some(path) => path,
                    None => Utf8PathBuf::from(encode::export_filename_now()?),
                };
                std::fs::write(&path, &png)
                    .with_context(|| format!("failed to write {}", path))?;
                println!("{}", path);
            }
        }
        Commands::Collection { store, action } => {
            run_collection(&CollectionStore::new(store), action)?;
        }
        Commands::Fonts { font_dir } => {
            let mut catalog = FontCatalog::system();
            for dir in font_dir {
                catalog.add_dir(dir);
            }
            for family in catalog.list_families() {
                println!("{}", family);
            }
        }
        Commands::Version => {
            println!("photopoet version {}", photopoet::VERSION);
            println!("Poem-on-photo compositing tool");
        }
    }

    Ok(())
}

/// Resolve poem text from the inline flag, a file, or stdin.
fn read_poem(inline: Option<String>, file: Option<String>) -> Result<String> {
    if let Some(poem) = inline {
        return Ok(poem);
    }
    match file.as_deref() {
        Some("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
        }
        None => anyhow::bail!("a poem is required: pass --poem or --poem-file"),
    }
}

/// Start from `--style` JSON (or defaults) and apply flag overrides.
fn build_style(
    style_file: Option<Utf8PathBuf>,
    position: Option<Anchor>,
    text_color: Option<String>,
    background_color: Option<String>,
    font_family: Option<String>,
    size_multiplier: Option<f32>,
) -> Result<StyleSpec> {
    let mut style = match style_file {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path))?;
            serde_json::from_str(&json).with_context(|| format!("invalid style in {}", path))?
        }
        None => StyleSpec::default(),
    };

    if let Some(position) = position {
        style.position = position;
    }
    if let Some(color) = text_color {
        style.text_color = color.parse::<Rgba>().context("invalid --text-color")?;
    }
    if let Some(color) = background_color {
        style.background_color = color
            .parse::<Rgba>()
            .context("invalid --background-color")?;
    }
    if let Some(family) = font_family {
        style.font_family = family;
    }
    if let Some(multiplier) = size_multiplier {
        style.font_size_multiplier = multiplier;
    }
    Ok(style)
}

/// System catalog plus extra directories and an optional pinned font file.
fn build_catalog(
    font_dirs: Vec<Utf8PathBuf>,
    font_file: Option<Utf8PathBuf>,
    style: &StyleSpec,
) -> Result<FontCatalog> {
    let mut catalog = FontCatalog::system();
    for dir in font_dirs {
        catalog.add_dir(dir);
    }
    if let Some(path) = font_file {
        anyhow::ensure!(path.exists(), "font file not found: {}", path);
        catalog.pin_family(style.font_family.clone(), path);
    }
    Ok(catalog)
}

fn run_collection(store: &CollectionStore, action: CollectionAction) -> Result<()> {
    match action {
        CollectionAction::List => {
            let items = store.list()?;
            if items.is_empty() {
                println!("(empty collection)");
                return Ok(());
            }
            for item in items {
                let first_line = item.poem.lines().next().unwrap_or("");
                let title = item.title.as_deref().unwrap_or("-");
                println!("{}  {}  {}  {}", item.id, item.created_at, title, first_line);
            }
        }
        CollectionAction::Add { image, poem, title } => {
            let image_data_uri = if image.starts_with("data:") {
                image
            } else {
                photopoet::decode::file_to_data_uri(&image)?
            };
            let mut item = CollectionItem::new(image_data_uri, poem)?;
            item.title = title;
            let id = item.id.clone();
            store.save(item)?;
            println!("{}", id);
        }
        CollectionAction::Remove { id } => {
            store.remove(&id)?;
            info!("Removed {}", id);
        }
    }
    Ok(())
}
