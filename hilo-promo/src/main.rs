//! hilo-promo - manage the promotional post library

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use libhilo::logging;
use libhilo::promo::{PromoEntry, PromoLibrary};
use libhilo::{Config, Result};

#[derive(Parser, Debug)]
#[command(name = "hilo-promo")]
#[command(about = "Manage the promotional post library", long_about = None)]
struct Cli {
    /// Promotions file (defaults to the configured path)
    #[arg(long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved promotional posts
    List,
    /// Add a promotional post
    Add {
        text: String,
        /// Image to attach when the promotion is posted
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a promotional post (matched on text and image)
    Delete {
        text: String,
        #[arg(long)]
        image: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_default();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = match cli.file {
        Some(path) => path,
        None => Config::load()?.promotions_path(),
    };
    let library = PromoLibrary::new(path);

    match cli.command {
        Command::List => {
            let entries = library.all();
            if entries.is_empty() {
                println!("No promotional posts saved.");
                return Ok(());
            }
            for (i, entry) in entries.iter().enumerate() {
                match &entry.image_path {
                    Some(image) => println!("{}. {} [image: {}]", i + 1, entry.text, image),
                    None => println!("{}. {}", i + 1, entry.text),
                }
            }
        }
        Command::Add { text, image } => {
            library.add(&text, image)?;
            println!("Promotion added.");
        }
        Command::Delete { text, image } => {
            let removed = library.delete(&PromoEntry {
                text,
                image_path: image,
            })?;
            if removed {
                println!("Promotion deleted.");
            } else {
                println!("No matching promotion found.");
            }
        }
    }
    Ok(())
}
