use clap::Parser;
use dotenv_sync::generate::RandomSecret;
use dotenv_sync::sync::{EnvSync, EnvSyncConfig, OptionsSource, RunOptions};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
  name = "dotenv-sync",
  about = "Reconcile a local env file with its .example template and generate missing secrets",
  version,
  author
)]
struct Cli {
  /// Path to the local .env file
  #[arg(short, long, default_value = ".env")]
  env: PathBuf,

  /// Path to the template file [default: <ENV>.example]
  #[arg(short, long)]
  template: Option<PathBuf>,

  /// Only print the status of what would change. Does not write the file
  #[arg(short, long)]
  status: bool,

  /// Variable that gets a random secret when empty (repeatable)
  #[arg(short, long = "create", value_name = "NAME", default_value = "SECRET_KEY")]
  create: Vec<String>,

  /// Number of random bytes in generated secrets
  #[arg(long, default_value_t = 32)]
  secret_bytes: usize,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

impl OptionsSource for Cli {
  fn run_options(&self) -> RunOptions {
    RunOptions {
      status: self.status,
    }
  }
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    1 => "debug",
    2 => "trace",
    _ => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  let mut config = EnvSyncConfig::new(
    cli.env.clone(),
    cli.create.iter().cloned().collect(),
    Arc::new(RandomSecret::new(cli.secret_bytes)),
  )
  .with_options(&cli);

  if let Some(template) = &cli.template {
    config = config.with_template(template);
  }

  let report = EnvSync::run(config).await?;

  print!("{}", report);
  if report.written {
    println!("Successfully wrote {}", report.env_file.display());
  }

  Ok(())
}
