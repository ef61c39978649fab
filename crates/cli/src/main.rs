use anyhow::Context;
use clap::{Parser, Subcommand};
use longbox_kernel::settings::{Settings, StorageBackend};

#[derive(Debug, Parser)]
#[command(name = "longbox", version, about = "Comic-book inventory service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Listen on this port instead of the configured one
        #[arg(long)]
        port: Option<u16>,
        /// Keep records in memory instead of MongoDB
        #[arg(long)]
        memory: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load longbox settings")?;

    match cli.command {
        Command::Serve { port, memory } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if memory {
                settings.database.backend = StorageBackend::Memory;
            }
            longbox_telemetry::init(&settings.telemetry)?;
            longbox_app::bootstrap::run(settings).await
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render configuration")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
