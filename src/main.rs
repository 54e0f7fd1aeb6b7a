use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use console::{style, Term};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, LevelFilter};

use kronosort::{BatchSummary, SortConfig, SortOptions};

#[derive(Parser)]
#[command(name = "kronosort", version, about = "Extract photos and videos from ZIP backups into a date-sorted folder tree")]
struct Cli {
    /// ZIP file, or folder containing ZIP files (prompted for if omitted)
    source: Option<PathBuf>,

    /// Destination directory (prompted for if omitted)
    destination: Option<PathBuf>,

    /// Show where every file would go without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Set each extracted file's modification time to its inferred date
    #[arg(long)]
    preserve_mtime: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("{}", style("--- KronoSort: Zip-to-Folder Edition ---").bold());

    let Some(source) = required_path(cli.source, "Enter ZIP file or folder containing ZIPs") else {
        return;
    };
    let Some(destination) = required_path(cli.destination, "Enter destination directory path") else {
        return;
    };

    let options = SortOptions {
        source,
        destination,
        dry_run: cli.dry_run,
        preserve_mtime: cli.preserve_mtime,
    };
    let config = SortConfig::default();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress = {
        let pb = pb.clone();
        move |stage: &str, current: u64, total: u64, message: &str| {
            if stage == "archive" {
                pb.println(format!("[{}/{}] {}", (current + 1).min(total), total, message));
                return;
            }
            pb.set_length(total);
            pb.set_position((current + 1).min(total));
            pb.set_message(message.to_string());
        }
    };

    let t_total = std::time::Instant::now();
    let result = kronosort::run(&options, &config, &progress);
    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Could not encode summary: {}", e),
                }
            } else {
                print_summary(&summary, t_total.elapsed().as_secs_f64());
            }
        }
        Err(e) => error!("{}", e),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Resolve one path argument, explaining on the console why the run stops
/// when it is missing.
fn required_path(given: Option<PathBuf>, prompt: &str) -> Option<PathBuf> {
    match path_or_prompt(given, prompt) {
        Ok(Some(path)) => Some(path),
        Ok(None) => {
            println!("Source and destination paths are required.");
            None
        }
        Err(e) => {
            error!("Could not read input: {:#}", e);
            None
        }
    }
}

/// Use the CLI value if given, otherwise ask. `None` means the answer was empty.
///
/// Without a terminal the answer is read as a plain line from stdin.
fn path_or_prompt(given: Option<PathBuf>, prompt: &str) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = given {
        return Ok(Some(path));
    }

    if io::stdin().is_terminal() && Term::stderr().is_term() {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        return Ok(parse_answer(&answer));
    }

    print!("{}: ", prompt);
    io::stdout().flush()?;
    Ok(read_answer(&mut io::stdin().lock())?)
}

/// Read one line as a path answer. End of input counts as an empty answer.
fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<Option<PathBuf>> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(parse_answer(&line))
}

fn parse_answer(answer: &str) -> Option<PathBuf> {
    let answer = answer.trim();
    (!answer.is_empty()).then(|| PathBuf::from(answer))
}

fn print_summary(summary: &BatchSummary, secs: f64) {
    if summary.archives_found == 0 {
        return;
    }

    for archive in &summary.archives {
        let name = archive
            .archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "  {}: {} extracted, {} skipped, {} failed",
            name,
            archive.extracted,
            archive.skipped,
            archive.failures.len()
        );
    }
    for failed in &summary.failed_archives {
        println!("  {} {}", style("skipped archive:").red(), failed.error);
    }

    let verb = if summary.dry_run { "would be extracted" } else { "extracted" };
    println!(
        "\n{} {} file(s) {} from {} archive(s), {} entry error(s) ({:.2}s)",
        style("Organization complete!").green().bold(),
        summary.files_extracted(),
        verb,
        summary.archives.len(),
        summary.entry_failures(),
        secs
    );
}
