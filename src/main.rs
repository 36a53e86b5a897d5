//! furrdb — a small, in-memory key-value database
//!
//! This is the server entry point. It sets up the store, loads any existing
//! snapshot, starts the background reaper, and either binds a TCP listener or
//! drops into a local REPL, depending on the arguments given.

mod repl;

use furrdb::commands::build_registry;
use furrdb::protocol::{handle_connection, ConnectionStats};
use furrdb::store::{start_reaper, Store};
use furrdb::{snapshot, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SNAPSHOT_PATH};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration.
struct Config {
    host: String,
    port: u16,
    repl: bool,
    snapshot_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            repl: false,
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
        }
    }
}

impl Config {
    /// Parses configuration from command-line arguments.
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--repl" => {
                    config.repl = true;
                    i += 1;
                }
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--snapshot" => {
                    if i + 1 < args.len() {
                        config.snapshot_path = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --snapshot requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("furrdb version {}", furrdb::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
furrdb - a small, in-memory key-value database

USAGE:
    furrdb [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: localhost)
    -p, --port <PORT>        Port to listen on (default: 7070)
        --snapshot <PATH>    Snapshot file path (default: dump.rdb)
        --repl               Start a local REPL instead of the TCP server
    -v, --version            Print version information
        --help               Print this help message

EXAMPLES:
    furrdb                         # Start on localhost:7070
    furrdb --port 7071             # Start on port 7071
    furrdb --repl                  # Start a local REPL

CONNECTING:
    $ nc localhost 7070
    PING
    PONG
    SET name Ariz
    OK
    GET name
    Ariz
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
furrdb v{} - a small, in-memory key-value database
──────────────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        furrdb::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let store = Arc::new(Store::new());
    if let Err(e) = snapshot::load(&store, &config.snapshot_path) {
        error!(error = %e, path = %config.snapshot_path, "failed to load snapshot, aborting startup");
        anyhow::bail!("failed to load snapshot from {}: {}", config.snapshot_path, e);
    }
    info!("store initialized");

    if config.repl {
        let registry = build_registry();
        repl::run(&store, &registry).await;
        return Ok(());
    }

    let _reaper = start_reaper(Arc::clone(&store));
    info!("background expiry reaper started");

    let registry = Arc::new(build_registry());
    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("listening on {}", config.bind_address());
    print_banner(&config);

    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("shutdown signal received, stopping server...");
    };

    tokio::select! {
        _ = accept_loop(listener, store, registry, stats) => {}
        _ = shutdown => {}
    }

    info!("server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections.
async fn accept_loop(
    listener: TcpListener,
    store: Arc<Store>,
    registry: Arc<furrdb::Registry>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let store = Arc::clone(&store);
                let registry = Arc::clone(&registry);
                let stats = Arc::clone(&stats);
                tokio::spawn(async move {
                    handle_connection(stream, addr, store, registry, stats).await;
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
