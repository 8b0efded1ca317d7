// src/cli.rs
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::AppOptions;
use crate::error::Result;
use crate::file::normalize_user_path;
use crate::geocode::{GeocodeCache, NominatimClient, Resolver, ResolverOptions, Tier, WikipediaClient};
use crate::progress::Progress;
use crate::reconcile::CoverageStats;
use crate::runner::{self, GeocodeSummary, ScrapeSummary};
use crate::specs::HttpDocumentSource;

#[derive(Debug, Parser)]
#[command(name = "twin_scrape", version, about = "Scrape twin-city lists and geocode both ends")]
pub struct Cli {
    /// TOML file overriding built-in defaults.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Geocode cache file.
    #[arg(long, global = true, value_name = "FILE")]
    pub cache: Option<String>,

    /// Directory for the CSV outputs.
    #[arg(short = 'o', long = "out-dir", global = true, value_name = "DIR")]
    pub out_dir: Option<String>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crawl the index pages and write the raw pairs CSV.
    Scrape(ScrapeArgs),
    /// Geocode the raw pairs CSV; write the dataset and missing-city report.
    Geocode(GeocodeArgs),
    /// Scrape, then geocode.
    Run {
        #[command(flatten)]
        scrape: ScrapeArgs,
        #[command(flatten)]
        geocode: GeocodeArgs,
    },
    /// Rebuild the dataset and missing-city report from the cache alone.
    Missing,
}

#[derive(Debug, Default, Args)]
pub struct ScrapeArgs {
    /// Index page to crawl instead of the built-in continental list (repeatable).
    #[arg(long = "index", value_name = "URL")]
    pub index_urls: Vec<String>,

    /// Scrape these country pages directly, skipping the index crawl (repeatable).
    #[arg(long = "page", value_name = "URL")]
    pub pages: Vec<String>,
}

#[derive(Debug, Default, Args)]
pub struct GeocodeArgs {
    /// Comma-separated tiers to enable: titles, titles_with_country, search,
    /// geocode_with_country, geocode_bare.
    #[arg(long, value_delimiter = ',', value_parser = parse_tier)]
    pub tiers: Vec<Tier>,

    /// Use the cache only; make no lookups.
    #[arg(long)]
    pub offline: bool,
}

fn parse_tier(s: &str) -> std::result::Result<Tier, String> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "titles" => Ok(Tier::Titles),
        "titles_with_country" => Ok(Tier::TitlesWithCountry),
        "search" => Ok(Tier::Search),
        "geocode_with_country" => Ok(Tier::GeocodeWithCountry),
        "geocode_bare" => Ok(Tier::GeocodeBare),
        other => Err(format!("unknown tier: {other}")),
    }
}

/// Prints `[i/n] label` lines to stderr.
#[derive(Default)]
pub struct StderrProgress {
    total: usize,
    done: usize,
}

impl StderrProgress {
    fn line(&mut self, status: &str, label: &str) {
        self.done += 1;
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "[{}/{}] {status} {label}", self.done, self.total);
    }
}

impl Progress for StderrProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
    }
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
    fn item_done(&mut self, label: &str) {
        self.line("ok  ", label);
    }
    fn item_failed(&mut self, label: &str) {
        self.line("miss", label);
    }
}

/// Defaults, then the config file, then flags.
pub fn load_options(cli: &Cli) -> Result<AppOptions> {
    let mut opts = match &cli.config {
        Some(path) => AppOptions::from_file(path)?,
        None => AppOptions::default(),
    };
    if let Some(cache) = &cli.cache {
        opts.geocode.cache_path = normalize_user_path(cache);
    }
    if let Some(dir) = &cli.out_dir {
        opts.export.out_dir = normalize_user_path(dir);
    }
    Ok(opts)
}

fn apply_geocode_args(opts: &mut AppOptions, args: &GeocodeArgs) {
    if !args.tiers.is_empty() {
        opts.geocode.tiers = args.tiers.clone();
    }
    if args.offline {
        opts.geocode.offline = true;
    }
}

pub fn run() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    crate::log::init(cli.verbose);

    let mut opts = load_options(&cli)?;
    match &cli.command {
        Command::Scrape(args) => {
            let summary = do_scrape(&opts, args)?;
            print_scrape(&summary);
        }
        Command::Geocode(args) => {
            apply_geocode_args(&mut opts, args);
            let summary = do_geocode(&opts)?;
            print_geocode(&summary);
        }
        Command::Run { scrape, geocode } => {
            let summary = do_scrape(&opts, scrape)?;
            print_scrape(&summary);
            apply_geocode_args(&mut opts, geocode);
            let summary = do_geocode(&opts)?;
            print_geocode(&summary);
        }
        Command::Missing => {
            opts.geocode.offline = true;
            let summary = do_geocode(&opts)?;
            print_geocode(&summary);
        }
    }
    Ok(())
}

fn do_scrape(opts: &AppOptions, args: &ScrapeArgs) -> Result<ScrapeSummary> {
    let mut opts = opts.clone();
    if !args.index_urls.is_empty() {
        opts.scrape.index_urls = args.index_urls.clone();
    }
    let source = HttpDocumentSource::new(&opts.scrape)?;
    let mut progress = StderrProgress::default();

    if args.pages.is_empty() {
        return runner::scrape(&source, &opts, Some(&mut progress));
    }

    info!(pages = args.pages.len(), "scraping listed pages only");
    let summary = runner::scrape_pages(&source, &args.pages, Some(&mut progress));
    crate::csv::save_raw_pairs(&opts.export.raw_path(), &summary.pairs)?;
    Ok(summary)
}

fn do_geocode(opts: &AppOptions) -> Result<GeocodeSummary> {
    let cache_path = &opts.geocode.cache_path;
    let mut cache = GeocodeCache::open(cache_path, opts.geocode.flush_every)?;
    let titles = WikipediaClient::new(&opts.geocode)?;
    let geocoder = NominatimClient::new(&opts.geocode)?;

    if opts.geocode.offline {
        info!(cache = %cache_path.display(), "offline: cache only");
    }

    let mut resolver = Resolver::new(titles, geocoder, &mut cache, ResolverOptions::from(&opts.geocode))
        .with_aliases(opts.aliases());
    let mut progress = StderrProgress::default();
    let summary = runner::geocode(opts, &mut resolver, Some(&mut progress))?;
    drop(resolver);
    cache.flush()?;
    Ok(summary)
}

fn print_scrape(s: &ScrapeSummary) {
    println!("Pages scraped: {} ({} failed)", s.pages, s.failed.len());
    for url in &s.failed {
        println!("  failed: {url}");
    }
    println!("Rows extracted: {}", s.extracted);
    println!("Unique pairs: {} ({} invalid dropped)", s.pairs.len(), s.invalid);
    if !s.top_countries.is_empty() {
        println!("Top countries by pairs:");
        for (country, n) in &s.top_countries {
            println!("  {country}: {n}");
        }
    }
}

fn print_geocode(s: &GeocodeSummary) {
    print_coverage(&s.reconciliation.stats);
    let by = &s.resolver.resolved_by;
    println!(
        "Places resolved by tier: titles {}, titles+country {}, search {}, geocode+country {}, geocode {}",
        by[0], by[1], by[2], by[3], by[4]
    );
    if s.resolver.failed_calls > 0 {
        println!("Lookups failed twice: {}", s.resolver.failed_calls);
    }
    let top: Vec<String> = s
        .reconciliation
        .unresolved
        .iter()
        .take(10)
        .map(|(p, n)| format!("{p} ({n})"))
        .collect();
    if !top.is_empty() {
        println!("Most-referenced missing: {}", top.join("; "));
    }
    println!("Dataset: {}", s.dataset_path.display());
    println!("Missing report: {}", s.missing_path.display());
}

fn print_coverage(s: &CoverageStats) {
    println!("Raw pairs: {} ({} invalid)", s.raw, s.invalid);
    println!("Unique pairs: {}", s.unique);
    println!("Places: {} ({} resolved)", s.places, s.places_resolved);
    println!(
        "Resolved pairs: {} / skipped {} ({:.1}% coverage)",
        s.resolved,
        s.skipped,
        s.coverage() * 100.0
    );
}
