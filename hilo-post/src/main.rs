//! hilo-post - publish a post thread as a reply chain

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;

use libhilo::api::x::XApiClient;
use libhilo::error::StoreError;
use libhilo::logging::{self, LogFormat};
use libhilo::publisher::{publish_thread, ProgressSink};
use libhilo::store::ThreadDocument;
use libhilo::types::{PostId, PublishRun, ResumePoint, Thread};
use libhilo::{
    parse_plain_thread, split_into_chunks, ApiCredentials, Config, HiloError, PublishError,
    Result, MAX_POST_LEN,
};

#[derive(Parser, Debug)]
#[command(name = "hilo-post")]
#[command(about = "Publish a post thread as a reply chain", long_about = None)]
struct Cli {
    /// Thread file in Plain-Thread v1 format (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Input is a {"threads": [...]} JSON document
    #[arg(long)]
    json: bool,

    /// Thread to publish when the JSON document holds several (0-based)
    #[arg(long, default_value_t = 0)]
    thread: usize,

    /// Treat input as raw text and split it into post-sized chunks
    #[arg(long, conflicts_with = "json")]
    split: bool,

    /// Attach an image to a post, as INDEX=PATH (repeatable, 0-based index)
    #[arg(long = "image", value_name = "INDEX=PATH")]
    images: Vec<String>,

    /// Seconds to wait between posts (defaults to the configured value)
    #[arg(long)]
    delay: Option<f64>,

    /// File where resume state is kept between attempts
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Parse and print the thread without publishing
    #[arg(long)]
    dry_run: bool,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init(LogFormat::Text, "debug");
    } else {
        logging::init_default();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let raw = read_input(cli.file.as_deref())?;
    let thread = build_thread(&cli, &raw)?;

    if thread.is_empty() {
        return Err(HiloError::InvalidInput(
            "there is no post to publish".to_string(),
        ));
    }

    if cli.dry_run {
        print_thread(&thread, &cli.format);
        return Ok(());
    }

    let config = Config::load()?;
    let delay_seconds = cli.delay.unwrap_or(config.defaults.delay_seconds);
    let credentials = ApiCredentials::resolve(&config)?;
    let client = XApiClient::new(&credentials)?;

    let mut run = PublishRun {
        delay_seconds,
        ..Default::default()
    };
    if let Some(state_path) = &cli.state {
        if let Some(resume) = load_resume_state(state_path)? {
            if resume.next_index >= thread.len() {
                println!("All posts in this thread were already published.");
                return Ok(());
            }
            eprintln!(
                "Resuming from post #{} of {}",
                resume.next_index + 1,
                thread.len()
            );
            run = PublishRun::resuming(&resume, delay_seconds);
        }
    }

    let progress = StderrProgress;
    match publish_thread(&thread, &client, Some(&client), &run, Some(&progress)).await {
        Ok(posted_ids) => {
            if let Some(state_path) = &cli.state {
                // Stale state would make a future invocation skip posts.
                let _ = std::fs::remove_file(state_path);
            }
            report_success(&posted_ids, &cli.format);
            Ok(())
        }
        Err(err) => {
            if let (Some(state_path), Some(resume)) = (&cli.state, err.resume()) {
                save_resume_state(state_path, resume)?;
                eprintln!(
                    "Partial progress saved to {}; run the same command again to resume.",
                    state_path.display()
                );
            }
            if let PublishError::RateLimited {
                wait_seconds: Some(wait),
                ..
            } = &err
            {
                eprintln!("Suggested wait before resuming: {} seconds", wait);
            }
            Err(err.into())
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path).map_err(StoreError::Io)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(StoreError::Io)?;
            Ok(buffer)
        }
    }
}

fn build_thread(cli: &Cli, raw: &str) -> Result<Thread> {
    let bodies = if cli.json {
        let doc: ThreadDocument = serde_json::from_str(raw).map_err(StoreError::Json)?;
        let count = doc.threads.len();
        doc.threads
            .into_iter()
            .nth(cli.thread)
            .ok_or_else(|| {
                HiloError::InvalidInput(format!(
                    "document holds {} thread(s); index {} is out of range",
                    count, cli.thread
                ))
            })?
    } else if cli.split {
        split_into_chunks(raw, MAX_POST_LEN)
    } else {
        parse_plain_thread(raw)?
    };

    let mut thread = Thread::from_bodies(bodies)?;
    for spec in &cli.images {
        let (index, path) = parse_image_arg(spec)?;
        thread.attach_media(index, path)?;
    }
    Ok(thread)
}

fn parse_image_arg(spec: &str) -> Result<(usize, PathBuf)> {
    let (index, path) = spec.split_once('=').ok_or_else(|| {
        HiloError::InvalidInput(format!("invalid --image value '{}', expected INDEX=PATH", spec))
    })?;
    let index: usize = index.trim().parse().map_err(|_| {
        HiloError::InvalidInput(format!("invalid --image index '{}', expected a number", index))
    })?;
    Ok((index, PathBuf::from(path)))
}

fn load_resume_state(path: &Path) -> Result<Option<ResumePoint>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(StoreError::Io)?;
    let resume = serde_json::from_str(&content).map_err(StoreError::Json)?;
    Ok(Some(resume))
}

fn save_resume_state(path: &Path, resume: &ResumePoint) -> Result<()> {
    let json = serde_json::to_string_pretty(resume).map_err(StoreError::Json)?;
    std::fs::write(path, json).map_err(StoreError::Io)?;
    Ok(())
}

fn print_thread(thread: &Thread, format: &str) {
    if format == "json" {
        let bodies: Vec<&str> = thread.posts().iter().map(|p| p.body.as_str()).collect();
        println!(
            "{}",
            serde_json::json!({ "posts": bodies, "count": thread.len() })
        );
        return;
    }
    for (i, post) in thread.posts().iter().enumerate() {
        println!(
            "--- post {}/{} ({} chars)",
            i + 1,
            thread.len(),
            post.body.chars().count()
        );
        println!("{}", post.body);
        if let Some(media) = &post.media {
            println!("[image: {}]", media.display());
        }
    }
}

fn report_success(posted_ids: &[Option<PostId>], format: &str) {
    if format == "json" {
        println!("{}", serde_json::json!({ "posted_ids": posted_ids }));
        return;
    }
    let count = posted_ids.iter().flatten().count();
    println!("Thread published successfully ({} posts).", count);
    for (i, id) in posted_ids.iter().enumerate() {
        if let Some(id) = id {
            println!("  #{}: {}", i + 1, id);
        }
    }
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn post_published(&self, index: usize, post_id: &str) -> anyhow::Result<()> {
        eprintln!("Posted #{}: {}", index + 1, post_id);
        Ok(())
    }
}
