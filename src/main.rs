use chlog::commands::{self, SyncRequest, SyncTarget};
use chlog::core::config::ChlogConfig;
use chlog::core::context::SyncContext;
use chlog::core::error::{ChlogError, print_error};
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Update the changelog JSON stored in S3 from open Trello lists named after versions,
/// e.g. 'v0.10.0'.
///
/// With a version, only that version's entry is updated. Without one, every version
/// matching an open version list on the board is updated.
#[derive(Parser)]
#[command(name = "chlog")]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Version tag to update (same as --version)
  #[arg(value_name = "VERSION", conflicts_with = "version")]
  tag: Option<String>,

  /// Version tag to update. Leave out to update all versions matching open version lists
  #[arg(short = 'v', long = "version", value_name = "VERSION")]
  version: Option<String>,

  /// Merge and print the resulting changelog without uploading it
  #[arg(long)]
  dry_run: bool,

  /// Print the run report as JSON
  #[arg(long)]
  json: bool,

  /// Increase log verbosity (--verbose, --verbose --verbose, ...)
  #[arg(long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr so stdout stays clean for the report (and `--json`)
fn init_logging(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "chlog=info",
    2 => "chlog=debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_env("CHLOG_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::registry()
    .with(filter)
    .with(
      fmt::layer()
        .with_target(verbose >= 2)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact(),
    )
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let config = match ChlogConfig::from_env() {
    Ok(config) => config,
    Err(e) => handle_error(e),
  };
  tracing::debug!(?config, "configuration loaded");

  let ctx = SyncContext::from_config(&config);

  let target = match cli.tag.or(cli.version) {
    Some(tag) => SyncTarget::Tag(tag),
    None => SyncTarget::OpenReleases,
  };
  let request = SyncRequest {
    target,
    today: chrono::Utc::now().date_naive(),
    dry_run: cli.dry_run,
  };

  if let Err(err) = commands::run_sync_command(&ctx, &request, cli.json) {
    handle_error(err);
  }
}

fn handle_error(err: ChlogError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
