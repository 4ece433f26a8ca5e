//! chapterbook - inspect and render chapter sources as JSON

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

use chapterbook::{ChapterEntry, ChapterLibrary, ContentConfig};
use chapterbook_render::{outline, RenderEngine, RenderOptions};

#[derive(Parser)]
#[command(name = "chapterbook")]
#[command(version, about = "Render DocBook-style book chapters to JSON", long_about = None)]
#[command(after_help = "EXAMPLES:
    chapterbook list                      List chapters under ./pages
    chapterbook --root book render 01__intro
    chapterbook outline 01__intro --pretty")]
struct Cli {
    /// Content directory (defaults to $CHAPTERBOOK_PAGES_DIR, then ./pages)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List chapters in reading order
    List,
    /// Render a chapter to its render tree
    Render {
        /// Chapter id, e.g. 01__getting-started
        id: String,
    },
    /// Headings of a chapter with their anchors
    Outline {
        /// Chapter id
        id: String,
    },
    /// Previous and next chapters
    Nav {
        /// Chapter id
        id: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match cli.root {
        Some(root) => ContentConfig::new(root),
        None => ContentConfig::from_env(),
    };
    log::debug!("content root: {}", config.content_root().display());
    let library = ChapterLibrary::new(config);
    let engine = RenderEngine::new(RenderOptions::default());

    match cli.command {
        Command::List => {
            let chapters: Vec<Value> = library.list_chapters().iter().map(entry_json).collect();
            print_json(&chapters, cli.pretty)
        }
        Command::Render { id } => print_json(&engine.render_chapter(&library, &id), cli.pretty),
        Command::Outline { id } => {
            let chapter = engine.render_chapter(&library, &id);
            print_json(&outline(&chapter), cli.pretty)
        }
        Command::Nav { id } => {
            let neighbors = library.neighbors(&id);
            let nav = json!({
                "current": library.find_chapter(&id).as_ref().map(entry_json),
                "previous": neighbors.previous.as_ref().map(entry_json),
                "next": neighbors.next.as_ref().map(entry_json),
            });
            print_json(&nav, cli.pretty)
        }
    }
}

fn entry_json(entry: &ChapterEntry) -> Value {
    json!({
        "id": entry.id,
        "number": entry.number,
        "title": entry.title,
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| e.to_string())?;
    println!("{out}");
    Ok(())
}
