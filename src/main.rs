use clap::{Parser, Subcommand};
use std::path::PathBuf;

use brisk::config::AppConfig;
use brisk::db;
use brisk::serve::serve;

type DynError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log runs and track running statistics")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web app
    Serve {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create or upgrade the schema of a local SQLite database
    InitDb {
        /// Path to SQLite database file
        sqlite_file: PathBuf,
    },
}

fn main() -> Result<(), DynError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Serve { config, port } => {
            let mut config = AppConfig::load(&config)?;
            if let Some(port) = port {
                config.port = port;
            }
            serve(config)
        }
        Command::InitDb { sqlite_file } => init_db(sqlite_file),
    }
}

fn init_db(sqlite_file: PathBuf) -> Result<(), DynError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let pool = db::open_and_init(&sqlite_file).await?;
        pool.close().await;
        Ok::<(), DynError>(())
    })?;
    println!("Initialized database: {}", sqlite_file.display());
    Ok(())
}
