use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use memdatabase_bench::config::ScalarVerb;
use memdatabase_bench::harness::{Calibration, Growth, DEFAULT_MIN_DURATION};
use memdatabase_bench::params;
use memdatabase_bench::report::{self, Format};
use memdatabase_bench::runner::{self, RunOptions, RunSpec, TimingMode};
use memdatabase_bench::schema::{BenchReport, Measurement, RunMeta};
use memdatabase_bench::store::{grpc, GrpcStore, MemoryStore};
use memdatabase_bench::OperationKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TimingArg {
    /// Grow the batch until it runs for at least --min-duration-ms.
    Auto,
    /// Run exactly ENV_LOOP_CNT repetitions.
    Fixed,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreArg {
    /// The remote store at --addr.
    Grpc,
    /// An in-process store; no network involved.
    Memory,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one number to the key per repetition.
    Scalar {
        /// Overwrite with Set, or append with Push.
        #[arg(long, value_enum, default_value_t = ScalarVerb::Set)]
        verb: ScalarVerb,
    },

    /// Push a list of ENV_LIST_SIZE numbers per repetition.
    List {
        /// Push at the head of the queue instead of the tail.
        #[arg(long, default_value_t = false)]
        front: bool,
    },

    /// Set the key to an ENV_BYTE_SZ-byte string per repetition.
    Bytes,

    /// Write ENV_DKEY_CNT fields of a map-valued key per repetition.
    ///
    /// One repetition is ENV_DKEY_CNT DSet calls; the report carries that
    /// multiplier as calls_per_repeat.
    Nested,
}

impl Command {
    fn operation(&self) -> OperationKind {
        match self {
            Command::Scalar { .. } => OperationKind::Scalar,
            Command::List { .. } => OperationKind::ListAppend,
            Command::Bytes => OperationKind::ByteString,
            Command::Nested => OperationKind::NestedField,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "memdatabase-bench")]
#[command(about = "Times repeated mutations against a memdatabase store")]
struct Args {
    /// Store address; a bare host:port is taken as http.
    #[arg(long, env = "ENV_SERVER_ADDR", default_value = grpc::DEFAULT_ADDR, global = true)]
    addr: String,

    /// Key the run writes to. It is deleted before timing starts.
    #[arg(long, default_value = "rs-client-bench", global = true)]
    key: String,

    /// First value written; list elements count up from it.
    #[arg(long, default_value_t = 42.0, global = true)]
    seed: f64,

    #[arg(long, value_enum, default_value_t = TimingArg::Auto, global = true)]
    timing: TimingArg,

    /// Batch duration the self-calibrating timer must reach.
    #[arg(long, default_value_t = DEFAULT_MIN_DURATION.as_millis() as u64, global = true)]
    min_duration_ms: u64,

    /// Multiply the batch size by this factor instead of stepping 1, 2, 5, 10, ...
    #[arg(long, value_parser = clap::value_parser!(u64).range(2..), global = true)]
    growth_factor: Option<u64>,

    #[arg(long, value_enum, default_value_t = StoreArg::Grpc, global = true)]
    store: StoreArg,

    /// Read the key back after the reset and abort if it is still present.
    #[arg(long, default_value_t = false, global = true)]
    verify_reset: bool,

    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Where to write the report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

/// Seconds since the Unix epoch, as `unix:<secs>`.
fn now_unix_stamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (scalar_verb, front) = match args.cmd {
        Command::Scalar { verb } => (verb, false),
        Command::List { front } => (ScalarVerb::Set, front),
        Command::Bytes | Command::Nested => (ScalarVerb::Set, false),
    };
    let spec = RunSpec {
        key: args.key.into_bytes(),
        operation: args.cmd.operation(),
        seed: args.seed,
        scalar_verb,
        front,
        timing: match args.timing {
            TimingArg::Fixed => TimingMode::Fixed,
            TimingArg::Auto => TimingMode::Auto(Calibration {
                min_duration: Duration::from_millis(args.min_duration_ms),
                growth: args.growth_factor.map_or(Growth::OneTwoFive, Growth::Factor),
            }),
        },
    };
    let options = RunOptions {
        verify_reset: args.verify_reset,
    };

    let (plan, addr, result) = match args.store {
        StoreArg::Grpc => {
            let (plan, store, result) = runner::launch(params::env_value, &spec, options, || {
                GrpcStore::connect(&args.addr)
            })?;
            (plan, store.addr().to_string(), result)
        }
        StoreArg::Memory => {
            let (plan, _, result) =
                runner::launch(params::env_value, &spec, options, || Ok(MemoryStore::new()))?;
            (plan, "memory".to_string(), result)
        }
    };
    info!(%addr, "run complete");

    let bench_report = BenchReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            operation: plan.config.operation.as_str().to_string(),
            store_call: result.store_call.to_string(),
            target_key: plan.config.key_display(),
            addr,
            timing: plan.timing.as_str().to_string(),
            params: plan.params,
            value_seed: plan.config.value_seed,
            payload_bytes: result.payload_bytes,
            timestamp_utc: now_unix_stamp(),
            git_sha: git_sha_short(),
        },
        measurement: Measurement::from(result.outcome.measured),
        trials: result.outcome.trials,
    };

    report::report(&bench_report, args.format, args.out.as_deref())
        .context("writing the report")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_stamp_format() {
        let stamp = now_unix_stamp();
        let secs = stamp.strip_prefix("unix:").unwrap();
        assert!(secs.parse::<u64>().unwrap() > 1_600_000_000);
    }

    #[test]
    fn test_cli_parses_subcommand_options() {
        let args = Args::try_parse_from([
            "memdatabase-bench",
            "--timing",
            "fixed",
            "list",
            "--front",
        ])
        .unwrap();
        assert!(matches!(args.cmd, Command::List { front: true }));
        assert!(matches!(args.timing, TimingArg::Fixed));
        assert!(Args::try_parse_from(["memdatabase-bench", "scalar", "--front"]).is_err());
    }
}
