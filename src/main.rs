//! tcompare CLI - Compare two groups of spreadsheet data with a t-test.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tcompare::{AnalysisConfig, Analyzer, TestKind, render_json, render_text};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "tcompare")]
#[command(author = "Infernet <dev@infernet.org>")]
#[command(version)]
#[command(about = "Independent two-sample t-test on spreadsheet data, with workbook and plot output")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the analysis and write the results workbook and plot
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Summary format printed to stdout
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

/// Flags that take precedence over the configuration file.
#[derive(Args)]
struct Overrides {
    /// Spreadsheet holding the data
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sheet to read (first sheet by default)
    #[arg(long)]
    sheet: Option<String>,

    /// Column containing group labels
    #[arg(long)]
    group_column: Option<String>,

    /// Column containing the values to compare
    #[arg(long)]
    value_column: Option<String>,

    /// First group to compare
    #[arg(long)]
    group1: Option<String>,

    /// Second group to compare
    #[arg(long)]
    group2: Option<String>,

    /// Prefix for output files
    #[arg(short, long)]
    prefix: Option<String>,

    /// Directory for output files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Use Welch's t-test (unequal variances)
    #[arg(long)]
    welch: bool,
}

impl Overrides {
    fn apply(self, config: &mut AnalysisConfig) {
        if let Some(input) = self.input {
            config.excel_path = input;
        }
        if let Some(sheet) = self.sheet {
            config.sheet = Some(sheet);
        }
        if let Some(column) = self.group_column {
            config.group_column = column;
        }
        if let Some(column) = self.value_column {
            config.value_column = column;
        }
        if let Some(name) = self.group1 {
            config.group1_name = name;
        }
        if let Some(name) = self.group2 {
            config.group2_name = name;
        }
        if let Some(prefix) = self.prefix {
            config.output_prefix = prefix;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.welch {
            config.equal_var = false;
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {path:?}")),
        None => Ok(AnalysisConfig::default()),
    }
}

fn print_example_config() {
    let example = r#"# tcompare configuration file

excel_path = "data.xlsx"
# sheet = "Measurements"   # first sheet when unset
group_column = "Group"
value_column = "Value"
group1_name = "Control"
group2_name = "Treatment"
output_prefix = "ttest"
output_dir = "."
equal_var = true           # false runs Welch's t-test

[plot]
width_in = 10.0
height_in = 6.0
dpi = 300
# font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
"#;
    println!("{example}");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = load_config(cli.config.as_ref())?;
            config.validate().context("Invalid configuration")?;

            info!("Configuration is valid");
            info!("  Input: {}", config.excel_path.display());
            info!(
                "  Compare: {} vs {} ({} by {})",
                config.group1_name, config.group2_name, config.value_column, config.group_column
            );
            info!(
                "  Test: {}",
                TestKind::from_equal_var(config.equal_var).label()
            );
            info!("  Output: {}/{}_*", config.output_dir.display(), config.output_prefix);
        }

        Commands::Run { overrides, format } => {
            let mut config = load_config(cli.config.as_ref())?;
            overrides.apply(&mut config);

            let analyzer = Analyzer::new(config)
                .context("Invalid configuration")?
                .with_progress(matches!(format, Format::Text));
            let report = analyzer.run().context("Analysis failed")?;

            match format {
                Format::Text => {
                    println!();
                    print!("{}", render_text(&report.test, &report.descriptive));
                }
                Format::Json => println!("{}", render_json(&report)?),
            }
        }
    }

    Ok(())
}
