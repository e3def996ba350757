//! CLI entry point for `emltext`.

use std::path::PathBuf;

use clap::Parser;

use emltext::config::{BadCharsetPolicy, CollisionPolicy, Config, MissingCharsetPolicy};
use emltext::convert::{self, ConvertOptions};

#[derive(Parser)]
#[command(
    name = "emltext",
    version,
    disable_version_flag = true,
    about = "Convert .eml messages to plain-text reports",
    long_about = "Convert .eml messages to plain-text reports.\n\n\
        Each input becomes a report with the decoded headers, body text and \
        attachment filenames. Reports are written one file per input (named \
        from date and subject), or concatenated to stdout when a literal '-' \
        appears anywhere in the input list."
)]
struct Cli {
    /// Input .eml files; a literal '-' anywhere switches to stream mode
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Directory for generated .txt reports
    #[arg(short, long, value_name = "DIR", env = "EMLTEXT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// What to do when the output file already exists
    #[arg(long, value_enum, value_name = "POLICY")]
    on_collision: Option<CollisionPolicy>,

    /// How to handle unknown charsets or undecodable bytes
    #[arg(long, value_enum, value_name = "POLICY")]
    charset_errors: Option<BadCharsetPolicy>,

    /// How to handle body parts that declare no charset
    #[arg(long, value_enum, value_name = "POLICY")]
    missing_charset: Option<MissingCharsetPolicy>,

    /// Verbose logging (once for info, twice for debug, three times for trace)
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print version and exit
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = emltext::config::load_config();
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let mut opts = ConvertOptions {
        output_dir: config.output.dir.clone(),
        collision: config.output.on_collision,
        decode: config.decode.clone(),
    };
    if let Some(dir) = cli.output_dir {
        opts.output_dir = dir;
    }
    if let Some(policy) = cli.on_collision {
        opts.collision = policy;
    }
    if let Some(policy) = cli.charset_errors {
        opts.decode.charset_errors = policy;
    }
    if let Some(policy) = cli.missing_charset {
        opts.decode.missing_charset = policy;
    }

    // A literal '-' anywhere in the list selects stream mode
    let stream = cli.files.iter().any(|f| f.as_os_str() == "-");
    let inputs: Vec<PathBuf> = cli
        .files
        .into_iter()
        .filter(|f| f.as_os_str() != "-")
        .collect();

    let summary = if stream {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        convert::convert_to_stream(&inputs, &opts, &mut out)
    } else {
        convert::convert_to_files(&inputs, &opts)
    };

    if summary.failed > 0 {
        eprintln!(
            "{} of {} file(s) failed to convert",
            summary.failed,
            summary.failed + summary.converted
        );
        std::process::exit(1);
    }
    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Per-file failures also land in a log file when a log dir is configured
    if let Some(log_dir) = &config.general.log_dir {
        if std::fs::create_dir_all(log_dir).is_ok() {
            let file_appender = tracing_appender::rolling::never(log_dir, "emltext.log");
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            return;
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
