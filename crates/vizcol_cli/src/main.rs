//! Command-line front end for the collection store.
//!
//! # Responsibility
//! - Gather user input, run presentation-side checks (folder and cover file
//!   existence), and call the store.
//! - Render collections and tag strings for the terminal.

use clap::{Parser, Subcommand};
use log::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vizcol_core::{
    core_version, default_log_level, init_logging, parse_tag_input, CollectionDraft,
    CollectionServiceError, CollectionStore, CollectionSummary, LogConfig, StoreConfig,
};

#[derive(Parser)]
#[command(name = "vizcol")]
#[command(about = "Catalogue folders of images as tagged visual collections")]
#[command(version)]
struct Cli {
    /// Store file (defaults to $VIZCOL_DB_PATH, then ./visual_collection.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store schema if it does not exist yet
    Init,
    /// Add a new collection
    Add {
        /// Collection name (defaults to the folder name)
        name: Option<String>,
        /// Folder holding the collection contents
        #[arg(short, long)]
        folder: PathBuf,
        /// Cover image file
        #[arg(short, long)]
        cover: Option<PathBuf>,
        /// Comma-separated tag names
        #[arg(short, long, default_value = "")]
        tags: String,
        /// Decline the collection when no cover image is given
        #[arg(long)]
        require_cover: bool,
    },
    /// List collections, newest first
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one collection
    Show {
        /// Collection id
        id: i64,
    },
    /// List all tags alphabetically
    Tags,
    /// Add a standalone tag
    AddTag {
        /// Tag name
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let started = LogConfig::parse(level, log_dir).and_then(|config| init_logging(&config));
        if let Err(err) = started {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = CollectionStore::new(StoreConfig::resolve(cli.db));
    match run(&store, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(store: &CollectionStore, command: Commands) -> Result<(), String> {
    match command {
        Commands::Init => {
            store
                .initialize()
                .map_err(|err| format!("cannot initialize store: {err}"))?;
            println!(
                "Store ready at {} (vizcol {})",
                store.db_path().display(),
                core_version()
            );
            Ok(())
        }
        Commands::Add {
            name,
            folder,
            cover,
            tags,
            require_cover,
        } => add_collection(store, name, &folder, cover.as_deref(), &tags, require_cover),
        Commands::List { json } => list_collections(store, json),
        Commands::Show { id } => show_collection(store, id),
        Commands::Tags => {
            let tags = store.list_tags().map_err(describe)?;
            if tags.is_empty() {
                println!("No tags yet.");
            }
            for tag in tags {
                println!("{tag}");
            }
            Ok(())
        }
        Commands::AddTag { name } => {
            if store.add_tag(&name).map_err(describe)? {
                println!("Tag '{}' added.", name.trim());
            } else {
                println!("Tag already exists.");
            }
            Ok(())
        }
    }
}

fn add_collection(
    store: &CollectionStore,
    name: Option<String>,
    folder: &Path,
    cover: Option<&Path>,
    tags: &str,
    require_cover: bool,
) -> Result<(), String> {
    if !folder.is_dir() {
        return Err(format!("Folder '{}' does not exist.", folder.display()));
    }
    if let Some(cover) = cover {
        if !cover.is_file() {
            return Err(format!("Cover image '{}' does not exist.", cover.display()));
        }
    }
    let folder = utf8_path(folder, "Folder")?;
    let cover = cover.map(|cover| utf8_path(cover, "Cover image")).transpose()?;

    let mut draft = CollectionDraft::new();
    if let Some(name) = name {
        draft.set_name(name);
    }
    draft.select_folder(folder);
    if let Some(cover) = cover {
        draft.select_cover_image(cover);
    }
    for tag in parse_tag_input(tags) {
        draft.select_tag(&tag);
    }

    let record = store
        .submit_draft(draft, require_cover)
        .map_err(describe)?;
    println!("Collection '{}' added with id {}.", record.name, record.id);
    Ok(())
}

/// Paths are stored verbatim, so ones that are not valid UTF-8 are refused.
fn utf8_path<'a>(path: &'a Path, label: &str) -> Result<&'a str, String> {
    path.to_str().ok_or_else(|| {
        format!(
            "{label} path '{}' is not valid UTF-8 and cannot be stored.",
            path.display()
        )
    })
}

fn list_collections(store: &CollectionStore, json: bool) -> Result<(), String> {
    let collections = store.list_collections().map_err(describe)?;
    if json {
        let rendered = serde_json::to_string_pretty(&collections)
            .map_err(|err| format!("cannot render collections: {err}"))?;
        println!("{rendered}");
        return Ok(());
    }

    if collections.is_empty() {
        println!("No collections yet. Use 'vizcol add' to create one.");
        return Ok(());
    }
    for summary in &collections {
        println!("{}", render_summary(summary));
    }
    Ok(())
}

fn show_collection(store: &CollectionStore, id: i64) -> Result<(), String> {
    let record = store
        .get_collection(id)
        .map_err(describe)?
        .ok_or_else(|| format!("No collection with id {id}."))?;
    println!("#{} {}", record.id, record.name);
    println!("  folder:  {}", record.folder_path);
    println!(
        "  cover:   {}",
        record.cover_image_path.as_deref().unwrap_or("-")
    );
    println!("  created: {} ms since epoch", record.created_at);
    println!("  tags:    {}", render_tags(&record.tag_names));
    Ok(())
}

fn render_summary(summary: &CollectionSummary) -> String {
    format!(
        "#{:<4} {:<30} {:<40} [{}]",
        summary.id,
        summary.name,
        summary.folder_path,
        render_tags(&summary.tag_names())
    )
}

fn render_tags<S: AsRef<str>>(tags: &[S]) -> String {
    if tags.is_empty() {
        "no tags".to_string()
    } else {
        tags.iter()
            .map(|tag| tag.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn describe(err: CollectionServiceError) -> String {
    if err.is_declined() {
        err.to_string()
    } else {
        format!("Storage error: {err}")
    }
}
