use clap::Parser;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labkey_pid::config::Config;
use labkey_pid::{FetchError, LabKeyClient, Query, Record};

/// Query LabKey for a participant's name, date of birth and NHS number.
///
/// Prints `NAME,DOB,NHSNUM` to stdout without a trailing newline.
#[derive(Parser)]
#[command(name = "labkey-pid", version, about, long_about = None)]
struct Cli {
    /// A Genomics England participant ID
    #[arg(short = 'i', long)]
    pid: String,

    /// A Genomics England LabKey username
    #[arg(short, long, env = "LABKEY_USERNAME")]
    username: Option<String>,

    /// A Genomics England LabKey password
    #[arg(short, long, env = "LABKEY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print the raw LabKey response instead of the formatted line
    #[arg(long)]
    raw: bool,
}

async fn lookup(cli: &Cli, config: &Config) -> Result<Record, FetchError> {
    let query = Query::new(cli.pid.clone(), cli.username.clone(), cli.password.clone())?;
    let client = LabKeyClient::from_config(config)?;
    client.fetch(&query).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for the result line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labkey_pid=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match lookup(&cli, &config).await {
        Ok(record) => {
            let output = if cli.raw {
                record.format_raw()
            } else {
                record.format_line()
            };
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
        Err(e) => {
            tracing::error!("Lookup failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
