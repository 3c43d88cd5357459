use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use deveui::{DEFAULT_BATCH_SIZE, DEFAULT_NUM_WORKERS, EngineConfig, MAX_NUM_WORKERS};
use std::path::PathBuf;

/// Runtime configuration for the `deveui-batch` binary.
///
/// Without `--daemon` a single batch is registered and printed to stdout.
/// With `--daemon` an HTTP API accepts batch requests and runs them in the
/// background, one at a time. Every value can also be set through the
/// environment or a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "deveui-batch",
    version,
    about = "Registers batches of random DevEUIs against a registration API"
)]
pub struct CliArgs {
    /// Address of the DevEUI registration API.
    ///
    /// `http://` is assumed when no scheme is given, so
    /// `localhost:8000/register` is accepted.
    ///
    /// Environment variable: `REGISTRATION_API`
    #[arg(env = "REGISTRATION_API")]
    pub registration_api: String,

    /// Number of DevEUIs to register in one-shot mode.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long = "batch", env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Timeout of a single registration request, in seconds.
    ///
    /// The whole batch is bounded by `timeout * batch / workers`.
    ///
    /// Environment variable: `TIMEOUT`
    #[arg(long, env = "TIMEOUT", default_value_t = 10)]
    pub timeout: u64,

    /// Number of registration requests in flight at once (1-10).
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long = "workers", env = "NUM_WORKERS", default_value_t = DEFAULT_NUM_WORKERS)]
    pub num_workers: usize,

    /// Log every request at debug level instead of printing progress dots.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Serve the HTTP batch API instead of running a single batch.
    #[arg(long, default_value_t = false)]
    pub daemon: bool,

    /// Host the daemon listens on.
    ///
    /// Environment variable: `HOST`
    #[arg(long, env = "HOST", default_value_t = String::from("localhost"))]
    pub host: String,

    /// Port the daemon listens on.
    ///
    /// Environment variable: `PORT`
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Retry transient failures (timeouts, unexpected statuses) the same way
    /// conflicts are retried, instead of giving up on the slot.
    #[arg(long, default_value_t = false)]
    pub retry_transient: bool,

    /// Largest batch a single request may ask for.
    ///
    /// Environment variable: `MAX_BATCH_SIZE`
    #[arg(long, env = "MAX_BATCH_SIZE", default_value_t = 10_000)]
    pub max_batch_size: usize,

    /// Number of daemon batch requests that may wait behind the running one.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 16)]
    pub queue_capacity: usize,

    /// Also write JSON logs to this file.
    ///
    /// Environment variable: `LOG_FILE`
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub batch_size: usize,
    pub verbose: bool,
    pub daemon: bool,
    pub listen_addr: String,
    pub max_batch_size: usize,
    pub queue_capacity: usize,
    pub log_file: Option<PathBuf>,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 || args.num_workers > MAX_NUM_WORKERS {
            bail!(
                "NUM_WORKERS ({}) must be between 1 and {}",
                args.num_workers,
                MAX_NUM_WORKERS
            );
        }

        if args.timeout == 0 {
            bail!("TIMEOUT must be greater than 0");
        }

        if args.max_batch_size == 0 {
            bail!("MAX_BATCH_SIZE must be greater than 0");
        }

        if args.batch_size > args.max_batch_size {
            bail!(
                "BATCH_SIZE ({}) exceeds MAX_BATCH_SIZE ({})",
                args.batch_size,
                args.max_batch_size
            );
        }

        if args.queue_capacity == 0 {
            bail!("QUEUE_CAPACITY must be greater than 0");
        }

        let engine = EngineConfig::new(&args.registration_api)?
            .with_attempt_timeout(Duration::from_secs(args.timeout))
            .with_num_workers(args.num_workers)
            .with_retry_transient(args.retry_transient);
        engine.validate()?;

        Ok(Self {
            engine,
            batch_size: args.batch_size,
            verbose: args.verbose,
            daemon: args.daemon,
            listen_addr: format!("{}:{}", args.host, args.port),
            max_batch_size: args.max_batch_size,
            queue_capacity: args.queue_capacity,
            log_file: args.log_file,
        })
    }
}
