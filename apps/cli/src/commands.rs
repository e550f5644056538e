//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use pageforge_core::{
    ConversionOutcome, ConversionRequest, Converter, FileOutcome, ProgressReporter,
};
use pageforge_shared::{
    AppConfig, ConfigStore, DocumentType, config_file_path, init_config, load_config,
    load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pageforge: turn Word-exported reviews into publishable pages.
#[derive(Parser)]
#[command(
    name = "pageforge",
    version,
    about = "Convert Word-exported review documents into templated web pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.pageforge/pageforge.toml.
    #[arg(long, global = true, env = "PAGEFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the platform JSON files.
    #[arg(long, global = true, env = "PAGEFORGE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory holding page and component templates.
    #[arg(long, global = true, env = "PAGEFORGE_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

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
    /// Convert one HTML document into a page.
    Convert {
        /// Word-exported HTML file.
        input: PathBuf,

        /// Where to write the page (defaults to <output_dir>/<stem>-converted.html).
        output: Option<PathBuf>,

        /// Page type: casino-review, sportsbook-review or crypto-comparison.
        /// Detected from the document when omitted.
        #[arg(short = 't', long = "type")]
        doc_type: Option<DocumentType>,

        /// Platform key or name. Detected from the document when omitted.
        #[arg(short, long)]
        platform: Option<String>,

        /// Use the rule-based converter even if an API key is configured.
        #[arg(long)]
        no_ai: bool,
    },

    /// Serve the upload endpoint over HTTP.
    Serve {
        /// Bind address (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config).
        #[arg(long)]
        port: Option<u16>,

        /// Use the rule-based converter even if an API key is configured.
        #[arg(long)]
        no_ai: bool,
    },

    /// List configured platforms.
    Platforms,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "pageforge=info",
        1 => "pageforge=debug",
        _ => "pageforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Config resolution
// ---------------------------------------------------------------------------

/// Defaults, then the config file, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(dir) = &cli.config_dir {
        config.paths.config_dir = dir.clone();
    }
    if let Some(dir) = &cli.templates_dir {
        config.paths.templates_dir = dir.clone();
    }

    Ok(config)
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let mut config = resolve_config(&cli)?;

    match cli.command {
        Command::Convert {
            input,
            output,
            doc_type,
            platform,
            no_ai,
        } => {
            if no_ai {
                config.ai.enabled = false;
            }
            cmd_convert(&config, &input, output.as_deref(), doc_type, platform).await
        }
        Command::Serve { host, port, no_ai } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if no_ai {
                config.ai.enabled = false;
            }
            cmd_serve(&config).await
        }
        Command::Platforms => cmd_platforms(&config),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config, cli.config.as_deref()),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_convert(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    doc_type: Option<DocumentType>,
    platform: Option<String>,
) -> Result<()> {
    if !input.is_file() {
        return Err(eyre!("input '{}' is not a readable file", input.display()));
    }

    let converter = Converter::from_config(config)?;

    info!(
        input = %input.display(),
        doc_type = doc_type.map(|t| t.as_str()).unwrap_or("auto"),
        platform = platform.as_deref().unwrap_or("auto"),
        method = %converter.strategy().method(),
        "converting document"
    );

    let request = ConversionRequest {
        html: String::new(),
        template_type: doc_type,
        platform,
    };

    let reporter = CliProgress::new();
    let result = converter
        .convert_file(input, output, request, &reporter)
        .await
        .inspect_err(|_| reporter.clear())?;

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &FileOutcome) {
    let outcome = &result.outcome;
    let s = &outcome.summary;

    println!();
    println!("  Page converted!");
    println!(
        "  Type:     {} ({})",
        outcome.document_type, outcome.type_source
    );
    println!(
        "  Platform: {} ({})",
        outcome.platform.as_deref().unwrap_or("(none)"),
        outcome.platform_source
    );
    println!("  Method:   {}", outcome.method);
    println!(
        "  Found:    {} headings, {} paragraphs, {} tables, {} pros, {} cons, {} FAQs, {} sections",
        s.headings, s.paragraphs, s.tables, s.pros, s.cons, s.faqs, s.sections
    );
    println!(
        "  Rating:   {}",
        s.rating.as_deref().unwrap_or("(none)")
    );
    println!("  Output:   {}", result.output_path.display());
    println!("  Time:     {:.2}s", outcome.elapsed.as_secs_f64());

    if !outcome.warnings.is_empty() {
        println!("  Warnings:");
        for warning in &outcome.warnings {
            println!("    - {warning}");
        }
    }
    println!();
}

async fn cmd_serve(config: &AppConfig) -> Result<()> {
    let converter = Converter::from_config(config)?;

    println!(
        "Serving on http://{}:{}/api/convert (Ctrl-C to stop)",
        config.server.host, config.server.port
    );

    pageforge_server::serve(
        &config.server,
        converter,
        pageforge_server::shutdown_signal(),
    )
    .await?;

    Ok(())
}

fn cmd_platforms(config: &AppConfig) -> Result<()> {
    let store = ConfigStore::load(&config.paths.config_dir)?;

    if store.platforms.is_empty() {
        println!(
            "No platforms configured in {}",
            config.paths.config_dir.display()
        );
        return Ok(());
    }

    let width = store.platforms.keys().map(String::len).max().unwrap_or(0);
    for (key, meta) in &store.platforms {
        let link = if store.affiliate_link(key).is_some() {
            "affiliate link"
        } else {
            "no affiliate link"
        };
        println!("  {key:<width$}  {}  ({link})", meta.name);
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig, source: Option<&Path>) -> Result<()> {
    let source = match source {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    println!("# {}", source.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &ConversionOutcome) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_flags_parse() {
        let cli = Cli::try_parse_from([
            "pageforge",
            "-vv",
            "convert",
            "review.html",
            "out/page.html",
            "--type",
            "crypto-comparison",
            "--platform",
            "binance",
            "--no-ai",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Convert {
                input,
                output,
                doc_type,
                platform,
                no_ai,
            } => {
                assert_eq!(input, PathBuf::from("review.html"));
                assert_eq!(output, Some(PathBuf::from("out/page.html")));
                assert_eq!(doc_type, Some(DocumentType::CryptoComparison));
                assert_eq!(platform.as_deref(), Some("binance"));
                assert!(no_ai);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = Cli::try_parse_from(["pageforge", "convert", "a.html", "--type", "poker"]);
        assert!(result.is_err());
    }

    #[test]
    fn directory_overrides_apply_after_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("pageforge.toml");
        std::fs::write(
            &file,
            "[paths]\nconfig_dir = \"from-file\"\ntemplates_dir = \"tpl\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "pageforge",
            "--config",
            file.to_str().unwrap(),
            "--config-dir",
            "from-flag",
            "platforms",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.paths.config_dir, PathBuf::from("from-flag"));
        assert_eq!(config.paths.templates_dir, PathBuf::from("tpl"));
    }
}
