//! Country ETL CLI - merge World Bank countries with a reference CSV
//!
//! ```bash
//! country-etl                                   # defaults, working directory
//! country-etl --countries-csv data/all.csv      # other reference file
//! country-etl --rules rules.json                # custom reconciliation rules
//! country-etl --print-rules > rules.json        # start from the built-in rules
//! ```
//!
//! Every flag can also be set through the environment (or a `.env` file).

use clap::Parser;
use country_etl::{logs, run, PipelineConfig, ReconciliationRules};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "country-etl")]
#[command(about = "Merge World Bank country metadata with a reference CSV", long_about = None)]
struct Cli {
    /// Country API endpoint
    #[arg(long, env = "COUNTRY_ETL_API_URL", default_value = country_etl::config::DEFAULT_API_URL)]
    api_url: String,

    /// Reference CSV to join with
    #[arg(long, env = "COUNTRY_ETL_COUNTRIES_CSV", default_value = country_etl::config::DEFAULT_COUNTRIES_CSV)]
    countries_csv: PathBuf,

    /// Where to store the raw API response
    #[arg(long, env = "COUNTRY_ETL_JSON_OUT", default_value = country_etl::config::DEFAULT_JSON_SAVEPATH)]
    json_out: PathBuf,

    /// Merged CSV output
    #[arg(short, long, env = "COUNTRY_ETL_OUTPUT", default_value = country_etl::config::DEFAULT_SAVE_PATH)]
    output: PathBuf,

    /// Reconciliation rules JSON (built-in country rules if omitted)
    #[arg(long, env = "COUNTRY_ETL_RULES")]
    rules: Option<PathBuf>,

    /// HTTP timeout in seconds (0 disables it)
    #[arg(long, default_value_t = country_etl::config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Print the built-in rules as JSON and exit
    #[arg(long)]
    print_rules: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let config = PipelineConfig::default()
            .with_api_url(self.api_url)
            .with_countries_csv(self.countries_csv)
            .with_json_savepath(self.json_out)
            .with_save_path(self.output)
            .with_timeout(timeout);
        match self.rules {
            Some(path) => config.with_rules(path),
            None => config,
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    logs::init();

    let cli = Cli::parse();

    if cli.print_rules {
        match ReconciliationRules::countries().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = cli.into_config();
    match run(&config) {
        Ok(summary) => {
            tracing::debug!(
                api_records = summary.api_records,
                reference_rows = summary.reference_rows,
                output_rows = summary.output_rows,
                replaced = summary.replaced,
                "run complete"
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
