use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use kbsync_domain::{
    parse_endpoint, ConfigurationError, ThrottleSchedule, ThrottleTier, DEFAULT_GRAPHQL_ENDPOINT,
    DEFAULT_QDRANT_URL,
};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "kbsync", version, about = "Bulk transfer of instructions and SQL pairs")]
pub struct Cli {
    /// GraphQL endpoint of the application.
    #[arg(
        long,
        global = true,
        env = "KBSYNC_GRAPHQL_ENDPOINT",
        default_value = DEFAULT_GRAPHQL_ENDPOINT,
        value_parser = parse_endpoint
    )]
    pub endpoint: Url,

    /// Qdrant gRPC endpoint used by the read-only checks.
    #[arg(long, global = true, env = "KBSYNC_QDRANT_URL", default_value = DEFAULT_QDRANT_URL)]
    pub qdrant_url: String,

    /// Timeout of a single request, in seconds.
    #[arg(long, global = true, env = "KBSYNC_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Enables debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Creates one SQL pair per row of a CSV or JSON file.
    ImportSqlPairs {
        file: PathBuf,

        #[command(flatten)]
        throttle: ThrottleArgs,
    },

    /// Creates one instruction per row of a CSV or JSON file.
    ImportInstructions {
        file: PathBuf,

        /// Project the instructions are expected to land in.
        #[arg(long)]
        project_id: Option<String>,

        #[command(flatten)]
        throttle: ThrottleArgs,
    },

    /// Writes instructions and SQL pairs to import-compatible CSV files.
    Export {
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,

        /// Keep only objects of this project.
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Saves the semantic model of a deployment as JSON.
    ExportMdl {
        /// Deployment hash.
        #[arg(long)]
        hash: String,

        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
    },

    /// Counts what landed in the API and the vector store.
    Verify,

    /// Lists indexed instructions grouped by project.
    CheckInstructions {
        /// Instruction id that must be present; repeatable.
        #[arg(long = "expect", value_name = "ID")]
        expect: Vec<String>,
    },

    /// Checks that the application answers HTTP requests.
    Health,
}

#[derive(Args, Debug, Clone)]
pub struct ThrottleArgs {
    /// Pause between consecutive records, in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub pause_ms: u64,

    /// Longer pause after every N records, as N=MILLIS; repeatable.
    #[arg(long = "throttle-tier", value_name = "EVERY=MS")]
    pub tiers: Vec<ThrottleTier>,

    /// Sends records back to back.
    #[arg(long, conflicts_with_all = ["pause_ms", "tiers"])]
    pub no_throttle: bool,
}

impl ThrottleArgs {
    /// Without explicit tiers the default 10 and 100 record tiers apply.
    pub fn schedule(&self) -> Result<ThrottleSchedule, ConfigurationError> {
        if self.no_throttle {
            return Ok(ThrottleSchedule::disabled());
        }
        let tiers = if self.tiers.is_empty() {
            ThrottleSchedule::default().tiers().to_vec()
        } else {
            self.tiers.clone()
        };
        ThrottleSchedule::new(Duration::from_millis(self.pause_ms), tiers)
    }
}
