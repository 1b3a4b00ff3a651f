//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use buyerscope_core::pipeline::{CancelToken, DiscoveryPipeline, ProgressReporter};
use buyerscope_core::report::{DiscoveryReport, WrittenReport, write_report};
use buyerscope_directory::FileDirectory;
use buyerscope_enrichment::{HeuristicVerifier, PreviewCollector};
use buyerscope_shared::{
    AppConfig, BuyerGroup, BuyerRole, CompanyIntel, DiscoveryConfig, ProductCategory,
    SizingOverride, init_config, load_config,
};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// BuyerScope: find the buying committee inside a target company.
#[derive(Parser)]
#[command(
    name = "buyerscope",
    version,
    about = "Discover the buying committee for a deal from a people-directory export.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Discover the buyer group for one deal at one company.
    Discover(DiscoverArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for the `discover` subcommand.
#[derive(Args)]
pub(crate) struct DiscoverArgs {
    /// Target company name.
    pub company: String,

    /// Path to the employee-directory JSONL export.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Deal size in USD.
    #[arg(short, long)]
    pub deal_size: f64,

    /// Product category: sales, marketing, engineering, finance, hr,
    /// security, education, or generic (defaults from config).
    #[arg(short, long)]
    pub category: Option<String>,

    /// Company web domain, used for contact discovery.
    #[arg(long)]
    pub domain: Option<String>,

    /// Company headcount, when known.
    #[arg(long)]
    pub headcount: Option<u32>,

    /// Annual revenue in USD, when known.
    #[arg(long)]
    pub revenue: Option<f64>,

    /// Industry label.
    #[arg(long)]
    pub industry: Option<String>,

    /// Restrict the search to US-located candidates.
    #[arg(long)]
    pub usa_only: bool,

    /// Maximum candidates requested from the directory.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Override the minimum group size (requires --max and --ideal).
    #[arg(long)]
    pub min: Option<usize>,

    /// Override the maximum group size (requires --min and --ideal).
    #[arg(long)]
    pub max: Option<usize>,

    /// Override the ideal group size (requires --min and --max).
    #[arg(long)]
    pub ideal: Option<usize>,

    /// Output directory for the report (defaults from config).
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "buyerscope=info",
        1 => "buyerscope=debug",
        _ => "buyerscope=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Discover(args) => cmd_discover(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_discover(args: DiscoverArgs) -> Result<()> {
    let app_config = load_config()?;

    if !args.input.is_file() {
        return Err(eyre!("input file '{}' not found", args.input.display()));
    }

    let category: ProductCategory = match &args.category {
        Some(raw) => raw.parse()?,
        None => app_config.defaults.product_category.parse()?,
    };

    let mut company = CompanyIntel::named(&args.company);
    company.domain = args.domain.clone();
    company.industry = args.industry.clone();
    company.headcount = args.headcount;
    company.revenue_usd = args.revenue;

    let mut config =
        DiscoveryConfig::new(company, args.deal_size, category).with_app_config(&app_config);
    if args.usa_only {
        config.usa_only = true;
    }
    if let Some(limit) = args.limit {
        config.search_limit = limit;
    }
    config.sizing_override = sizing_override(args.min, args.max, args.ideal)?;

    let output_dir = match &args.out {
        Some(path) => path.clone(),
        None => expand_home(&app_config.defaults.output_dir),
    };

    info!(
        company = %config.company.name,
        deal_size = config.deal_size_usd,
        category = %config.product_category,
        input = %args.input.display(),
        "starting buyer group discovery"
    );

    let cancel = CancelToken::new();
    spawn_cancel_on_ctrl_c(cancel.clone());

    let pipeline = DiscoveryPipeline::new(
        config,
        Arc::new(FileDirectory::new(&args.input)),
        Arc::new(PreviewCollector),
        Arc::new(HeuristicVerifier::new(args.domain)),
    )
    .with_cancel_token(cancel);

    let reporter = CliProgress::new();
    let report = pipeline.run(&reporter).await?;

    let written = write_report(&output_dir, &report)?;

    print_summary(&report, &written);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Discover helpers
// ---------------------------------------------------------------------------

/// All three size bounds or none; a partial override is ambiguous.
fn sizing_override(
    min: Option<usize>,
    max: Option<usize>,
    ideal: Option<usize>,
) -> Result<Option<SizingOverride>> {
    match (min, max, ideal) {
        (None, None, None) => Ok(None),
        (Some(min), Some(max), Some(ideal)) => Ok(Some(SizingOverride { min, max, ideal })),
        _ => Err(eyre!("--min, --max, and --ideal must be given together")),
    }
}

/// Expand a leading `~/` against the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Flip the cancel token on the first ctrl-C; the run then stops at the next
/// stage boundary.
fn spawn_cancel_on_ctrl_c(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current stage");
            cancel.cancel();
        }
    });
}

fn print_summary(report: &DiscoveryReport, written: &WrittenReport) {
    println!();
    match report.group() {
        Some(group) => {
            println!("  Buyer group discovered!");
            println!("  Members:    {}", group.members.len());
            println!("  Roles:      {}", role_counts(group));
            println!("  Filter:     {}", group.selected_via);
            println!("  Cohesion:   {:.1}", group.cohesion.score);
            println!("  Confidence: {:.0}%", group.overall_confidence());
        }
        None => {
            println!("  No candidates found for '{}'.", report.company.name);
        }
    }
    println!("  Cost:       ${:.2}", report.stats.costs.total_usd);
    println!("  Report:     {}", written.markdown_path.display());
    println!("  Time:       {:.1}s", report.elapsed_ms as f64 / 1000.0);
    println!();
}

fn role_counts(group: &BuyerGroup) -> String {
    let mut parts = Vec::new();
    for role in BuyerRole::ALL {
        let count = group.members_with_role(role).count();
        if count > 0 {
            parts.push(format!("{count} {role}"));
        }
    }
    parts.join(", ")
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn candidate_scored(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Scoring [{current}/{total}] {name}"));
    }

    fn done(&self, _report: &DiscoveryReport) {
        self.spinner.finish_and_clear();
    }
}
