use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};

use intelmq_extras::collectors::{JsonLinesSink, MailMessage, MailPartCollector};
use intelmq_extras::config::{ContentTypesParam, MailPartParams};
use intelmq_extras::tools::{CHECKER_VERSION, CheckMode, Checker, JsonInventory};

#[derive(Parser, Debug)]
#[command(
    name = "intelmqtools",
    about = "Mail part collection and bot installation checks",
    version
)]
struct Args {
    /// Disable colored output (also honored: NO_COLOR)
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check installation of bots is still applicable
    #[command(version = CHECKER_VERSION)]
    Check(CheckArgs),

    /// Run the mail part collector over a raw email and print JSON reports
    Extract {
        /// Raw RFC 5322 message (.eml)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Collector parameters as JSON (defaults to MAIL_PART_* variables)
        #[arg(long, value_name = "FILE")]
        params: Option<PathBuf>,

        /// Comma-separated content types, overrides the parameters
        #[arg(long, value_name = "LIST")]
        content_types: Option<String>,

        /// Value for feed.name, overrides the parameters
        #[arg(long)]
        feed_name: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("mode").args(["bots", "runtime", "strange"]).multiple(false)))]
struct CheckArgs {
    /// Check if the running BOTS configuration matches the original configuration
    #[arg(short, long)]
    bots: bool,

    /// Check if parameters of BOTS configuration match the runtime one
    #[arg(short, long)]
    runtime: bool,

    /// Check if there are strange BOTS
    #[arg(short, long)]
    strange: bool,

    /// Print full bot details alongside the issues
    #[arg(short, long)]
    full: bool,

    /// Inventory snapshot produced by the configuration diff
    #[arg(
        long,
        value_name = "FILE",
        default_value = "/opt/intelmq/var/lib/bots/inventory.json"
    )]
    inventory: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let color = !args.no_color && std::env::var_os("NO_COLOR").is_none();

    match args.command {
        Commands::Check(check) => run_check(check, color),
        Commands::Extract {
            input,
            params,
            content_types,
            feed_name,
        } => run_extract(input, params, content_types, feed_name),
    }
}

fn run_check(args: CheckArgs, color: bool) -> anyhow::Result<()> {
    // Mode is validated before the inventory is touched.
    let mode = CheckMode::from_flags(args.bots, args.runtime, args.strange)?;
    let inventory = JsonInventory::load(&args.inventory)?;

    let stdout = std::io::stdout();
    let mut checker = Checker::new(&inventory, stdout.lock()).with_color(color);
    checker.run(mode, args.full)?;
    Ok(())
}

fn run_extract(
    input: PathBuf,
    params: Option<PathBuf>,
    content_types: Option<String>,
    feed_name: Option<String>,
) -> anyhow::Result<()> {
    let mut params = match params {
        Some(path) => MailPartParams::from_file(&path)
            .with_context(|| format!("reading parameters from {}", path.display()))?,
        None => MailPartParams::from_env(),
    };
    if let Some(list) = content_types {
        params.content_types = Some(ContentTypesParam::from_env_value(&list));
    }
    if feed_name.is_some() {
        params.feed_name = feed_name;
    }

    let raw = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let message = MailMessage::from_raw(raw)?;
    let collector = MailPartCollector::new(&params);
    tracing::debug!(accepted = ?collector.filter().as_slice(), "Collector configured");

    let stdout = std::io::stdout();
    let mut sink = JsonLinesSink::new(stdout.lock());
    let seen = collector.process_message(&message, &mut sink)?;
    sink.into_inner().flush()?;

    if !seen {
        tracing::info!(input = %input.display(), "Nothing extracted");
    }
    Ok(())
}
