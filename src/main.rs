use clap::{ArgAction, Parser, Subcommand};
use git_sort::areas::repository::Repository;
use git_sort::commands::porcelain::series::SeriesOptions;
use git_sort::config::SortConfig;
use git_sort::telemetry::{init_tracing, level_for_verbosity};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status of a check that found an unsorted series or stale tags
const CHECK_FAILED: u8 = 2;

#[derive(Parser)]
#[command(
    name = "git-sort",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Sort a backport patch series in upstream commit order",
    long_about = "Sort the lines of a kernel patch series according to the upstream order of \
    the commits that the patches backport, and keep each patch's Patch-mainline tag \
    pointing at the earliest upstream release containing its commit.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "GIT_DIR",
        value_name = "DIR",
        help = "The upstream git directory"
    )]
    git_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "LINUX_GIT",
        value_name = "DIR",
        help = "The upstream kernel repository, used when no git directory is given"
    )]
    linux_git: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "GIT_SORT_UPSTREAM",
        value_name = "REF",
        value_delimiter = ',',
        help = "Upstream reference whose history defines the order (repeatable, default HEAD)"
    )]
    upstream: Vec<String>,
    #[arg(
        long,
        global = true,
        env = "GIT_SORT_TAG_PATTERN",
        value_name = "REGEX",
        help = "Pattern selecting the tags that count as releases"
    )]
    tag_pattern: Option<String>,
    #[arg(
        long,
        global = true,
        env = "GIT_SORT_CACHE",
        value_name = "FILE",
        help = "Keep the upstream order index in this file between runs"
    )]
    cache_file: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Log more (repeatable)")]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "series",
        about = "Sort the sorted section of a series file",
        long_about = "This command sorts the lines between \"# sorted patches\" and \
        \"# end of sorted patches\" in upstream order and refreshes outdated Patch-mainline tags. \
        Without a series file, it reads standard input and writes standard output."
    )]
    Series {
        #[arg(short, long, help = "Report via exit status 2 if the series is not sorted")]
        check: bool,
        #[arg(
            short,
            long,
            value_name = "DIR",
            help = "Search for patches in this directory (default: the series file's directory)"
        )]
        prefix: Option<PathBuf>,
        #[arg(index = 1, value_name = "SERIES", help = "The series file to modify in place")]
        series: Option<PathBuf>,
    },
    #[command(
        name = "sort",
        about = "Sort lines by the commit each one starts with",
        long_about = "This command reads lines from standard input, takes the first word of each \
        line to be a commit revision and prints the lines in upstream order."
    )]
    Sort,
    #[command(
        name = "rank",
        about = "Print the position of a commit in the upstream order"
    )]
    Rank {
        #[arg(index = 1, help = "The commit revision")]
        revision: String,
    },
    #[command(
        name = "describe",
        about = "Print the earliest release containing a commit",
        long_about = "This command prints the earliest release tag containing the commit, or the \
        predicted next release for commits newer than every release."
    )]
    Describe {
        #[arg(index = 1, help = "The commit revision")]
        revision: String,
    },
    #[command(
        name = "dump-heads",
        about = "Print the upstream heads used for sorting (debugging)",
        long_about = "This command prints the heads the cached index was built from, the current \
        heads, and whether the next run will rebuild the index."
    )]
    DumpHeads,
}

impl Cli {
    fn config(&self) -> anyhow::Result<SortConfig> {
        let mut config = SortConfig::new()?
            .with_upstream(self.upstream.clone())
            .with_cache_path(self.cache_file.clone());
        if let Some(pattern) = &self.tag_pattern {
            config = config.with_tag_pattern(pattern)?;
        }
        config.git_dir = self.git_dir.clone();
        config.linux_git = self.linux_git.clone();

        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(level_for_verbosity(cli.verbose));

    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = cli.config()?;
    let repository = Repository::from_config(&config, Box::new(std::io::stdout()))?;

    let code = match &cli.command {
        Commands::Series {
            check,
            prefix,
            series,
        } => {
            let opts = SeriesOptions {
                check: *check,
                prefix: prefix.clone(),
                series: series.clone(),
            };
            let report = repository.series(&opts, &config, &mut std::io::stdin().lock())?;

            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(CHECK_FAILED)
            }
        }
        Commands::Sort => {
            repository.sort_lines(&config, &mut std::io::stdin().lock())?;
            ExitCode::SUCCESS
        }
        Commands::Rank { revision } => {
            repository.rank(revision, &config)?;
            ExitCode::SUCCESS
        }
        Commands::Describe { revision } => {
            repository.describe(revision, &config)?;
            ExitCode::SUCCESS
        }
        Commands::DumpHeads => {
            repository.dump_heads(&config)?;
            ExitCode::SUCCESS
        }
    };

    repository.writer().flush()?;

    Ok(code)
}
