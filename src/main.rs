use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use aur_updater::config::{self, DEFAULT_CONFIG_FILE, PackagesConfig};
use aur_updater::fetcher::HttpFetcher;
use aur_updater::parser::create_default_parsers;
use aur_updater::updater::{PackageReport, PackageUpdater, UpdateOptions};

#[derive(Parser)]
#[command(name = "aur-updater")]
#[command(version, about = "Keep AUR PKGBUILDs in sync with upstream releases")]
struct Cli {
    /// Package list
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory relative `pkgbuild` paths are resolved against
    /// (defaults to the config file's directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also append logs to a file (default: the data directory's aur-updater.log)
    #[arg(long, global = true, num_args = 0..=1, value_name = "FILE")]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Update the named packages, or all of them when none are given
    Update {
        packages: Vec<String>,

        /// Compute the new PKGBUILDs without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// List configured packages
    List,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .map(|path| path.unwrap_or_else(config::log_path));
    let _guard = aur_updater::logging::init(
        aur_updater::logging::level_for_verbosity(cli.verbose),
        log_file.as_deref(),
    );

    let config = PackagesConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let parsers = create_default_parsers();
    config.validate(&parsers)?;

    let (packages, dry_run) = match &cli.command {
        Some(Command::Update { packages, dry_run }) => (packages.clone(), *dry_run),
        _ => (Vec::new(), false),
    };
    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| cli.config.parent().map(PathBuf::from).unwrap_or_default());
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let updater = PackageUpdater::new(Arc::new(config), Arc::new(fetcher), parsers, root)
        .with_options(UpdateOptions { dry_run });

    if let Some(Command::List) = cli.command {
        print_packages(&updater);
        return Ok(ExitCode::SUCCESS);
    }

    let reports = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            if packages.is_empty() {
                updater.update_all().await
            } else {
                updater.update_many(&packages).await
            }
        });

    Ok(print_reports(&reports))
}

fn print_packages(updater: &PackageUpdater) {
    for package in updater.list_available() {
        println!(
            "{}\t{}\t{}",
            package.name,
            package.parser,
            updater.pkgbuild_path(package).display()
        );
    }
}

fn print_reports(reports: &[PackageReport]) -> ExitCode {
    for report in reports {
        println!("{report}");
    }
    if reports.iter().any(|r| r.outcome.is_failed()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
