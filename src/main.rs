use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use git2effort_core::{Git2EffortConfig, OutputFormat};
use git2effort_history::estimate::EffortReport;
use git2effort_history::mining::{self, MiningOptions};

#[derive(Parser)]
#[command(
    name = "git2effort",
    version,
    about = "Estimate development effort from a git repository",
    long_about = "git2effort estimates the person-months invested in a project from the\n\
                   timestamps of its commits.\n\n\
                   Duplicate author identities (same name or same email) are merged, each\n\
                   author's active days are bucketed into calendar periods, and every\n\
                   period is credited up to one full period of work per author.\n\n\
                   Examples:\n  \
                     git2effort estimate                          Estimate the repository in the current directory\n  \
                     git2effort estimate ../project --period-length 3\n  \
                     git2effort estimate https://github.com/owner/repo --format json\n  \
                     git2effort init                              Create a .git2effort.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .git2effort.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate person-month effort from commit history
    #[command(long_about = "Estimate person-month effort from commit history.\n\n\
        Mines every commit reachable from HEAD, any branch, remote-tracking branch or\n\
        tag (or only from --branch), merges duplicate authors,\n\
        and reports effort per period together with the project total and the\n\
        theoretical maximum if every active author had worked full time.\n\n\
        Remote URLs are cloned into a temporary directory first.\n\n\
        Examples:\n  git2effort estimate\n  git2effort estimate --threshold 30 --no-active-days\n  git2effort estimate file:///srv/git/project.git --show-authors")]
    Estimate {
        /// Repository path or URL (default: current directory)
        #[arg(default_value = ".")]
        repo: String,

        /// Months per period: 1, 2, 3, 4, 6 or 12 (default: 6)
        #[arg(long)]
        period_length: Option<u32>,

        /// Commits per period that count as full-time work (default: 50)
        #[arg(long)]
        threshold: Option<u32>,

        /// Count every commit instead of one per author per day
        #[arg(long)]
        no_active_days: bool,

        /// Only analyze this branch instead of all refs
        #[arg(long)]
        branch: Option<String>,

        /// List author identities that were merged
        #[arg(long)]
        show_authors: bool,
    },
    /// Create a default .git2effort.toml configuration file
    #[command(long_about = "Create a default .git2effort.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .git2effort.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

const CONFIG_FILE: &str = ".git2effort.toml";

const DEFAULT_CONFIG: &str = r#"# git2effort configuration
# See: https://github.com/gregoriorobles/git2effort

[effort]
# Months per period: 1, 2, 3, 4, 6 or 12
# period_length = 6
# Commits in a period that count as full-time work
# threshold = 50
# Count at most one commit per author per calendar day
# active_days = true

[history]
# branch = "main"
"#;

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mgit2effort\x1b[0m v{version} — person-month effort from git history\n");
        println!("Quick start:");
        println!("  \x1b[36mgit2effort init\x1b[0m               Create a .git2effort.toml config file");
        println!("  \x1b[36mgit2effort estimate\x1b[0m           Estimate the repository in the current directory");
        println!("  \x1b[36mgit2effort estimate <url>\x1b[0m     Clone and estimate a remote repository\n");
    } else {
        println!("git2effort v{version} — person-month effort from git history\n");
        println!("Quick start:");
        println!("  git2effort init               Create a .git2effort.toml config file");
        println!("  git2effort estimate           Estimate the repository in the current directory");
        println!("  git2effort estimate <url>     Clone and estimate a remote repository\n");
    }

    println!("Run 'git2effort <command> --help' for details.");
}

fn load_config(explicit: Option<&Path>) -> Result<Git2EffortConfig> {
    let config = match explicit {
        Some(path) => Git2EffortConfig::from_file(path)?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                Git2EffortConfig::from_file(default_path)?
            } else {
                Git2EffortConfig::default()
            }
        }
    };
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn mining_spinner(location: &str) -> Option<indicatif::ProgressBar> {
    if !std::io::stderr().is_terminal() {
        eprintln!("Mining git history at {location}...");
        return None;
    }
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Mining git history at {location}..."));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    Some(pb)
}

fn print_text(report: &EffortReport, show_authors: bool, use_color: bool) {
    let (bold, reset) = if use_color {
        ("\x1b[1m", "\x1b[0m")
    } else {
        ("", "")
    };

    if let Some(first) = report.first_commit {
        println!("First commit: {first}");
    }
    if let Some(last) = report.last_commit {
        println!("Last commit:  {last}");
    }
    println!(
        "Authors:      {} ({} after merging {} duplicate identities)",
        report.authors_before_merge,
        report.authors_after_merge,
        report.merged.len()
    );
    println!("Commits:      {}", report.commits);
    println!(
        "Model:        {}-month periods, full time at {} {}",
        report.config.period_length,
        report.config.threshold,
        if report.config.active_days {
            "active days"
        } else {
            "commits"
        }
    );
    println!();

    if show_authors && !report.merged.is_empty() {
        println!("Merged identities:");
        for pair in &report.merged {
            println!("  {} -> {}", pair.merged_away, pair.surviving);
        }
        println!();
    }

    println!(
        "{bold}{:<10} {:>10} {:>14} {:>10} {:>12}{reset}",
        "Period", "Full-time", "Non-full-time", "Effort", "Max effort"
    );
    println!("{:-<60}", "");
    for row in &report.periods {
        println!(
            "{:<10} {:>10} {:>14} {:>10.2} {:>12.2}",
            row.period.to_string(),
            row.full_time,
            row.non_full_time,
            row.effort,
            row.max_effort
        );
    }
    println!();
    println!("{bold}Total effort:{reset}   {:.2} person-months", report.total_effort);
    println!("{bold}Maximum effort:{reset} {:.2} person-months", report.max_effort);
}

fn print_markdown(report: &EffortReport, show_authors: bool) {
    println!("# Development Effort\n");
    if let Some(first) = report.first_commit {
        println!("- **First commit:** {first}");
    }
    if let Some(last) = report.last_commit {
        println!("- **Last commit:** {last}");
    }
    println!(
        "- **Authors:** {} ({} after merging)",
        report.authors_before_merge, report.authors_after_merge
    );
    println!("- **Commits:** {}", report.commits);
    println!("- **Total effort:** {:.2} person-months", report.total_effort);
    println!("- **Maximum effort:** {:.2} person-months\n", report.max_effort);

    if show_authors && !report.merged.is_empty() {
        println!("## Merged Identities\n");
        for pair in &report.merged {
            println!("- `{}` → `{}`", pair.merged_away, pair.surviving);
        }
        println!();
    }

    println!("## Effort per Period\n");
    if report.periods.is_empty() {
        println!("No commits found.\n");
        return;
    }
    println!("| Period | Full-time | Non-full-time | Effort | Max effort |");
    println!("|--------|-----------|---------------|--------|------------|");
    for row in &report.periods {
        println!(
            "| {} | {} | {} | {:.2} | {:.2} |",
            row.period, row.full_time, row.non_full_time, row.effort, row.max_effort
        );
    }
    println!();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    tracing::debug!(format = %cli.format, ?config, "resolved configuration");

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Estimate {
            ref repo,
            period_length,
            threshold,
            no_active_days,
            ref branch,
            show_authors,
        }) => {
            let mut effort = config.effort;
            if let Some(period_length) = period_length {
                effort.period_length = period_length;
            }
            if let Some(threshold) = threshold {
                effort.threshold = threshold;
            }
            if no_active_days {
                effort.active_days = false;
            }
            effort.validate()?;

            // Hint: not a git repository
            if !mining::is_remote(repo) && git2::Repository::discover(repo).is_err() {
                return Err(miette::miette!(
                    help = "Run git2effort from inside a git repository, or pass a path or URL to one",
                    "Not a git repository: {repo}"
                ));
            }

            let options = MiningOptions {
                branch: branch.clone().or_else(|| config.history.branch.clone()),
            };

            let spinner = mining_spinner(repo);
            let authors = mining::mine_history(repo, &options).inspect_err(|_| {
                if let Some(pb) = &spinner {
                    pb.finish_with_message("Failed");
                }
            })?;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            eprintln!(
                "Analyzed {} commits by {} authors.",
                authors.commit_count(),
                authors.len()
            );

            let report = git2effort_history::estimate::estimate(authors, &effort)?;

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&report).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => print_markdown(&report, show_authors),
                OutputFormat::Text => print_text(&report, show_authors, use_color),
            }
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "git2effort", &mut std::io::stdout());
        }
    }

    Ok(())
}
