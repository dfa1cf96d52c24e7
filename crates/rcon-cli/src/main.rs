use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use rpassword::read_password;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use valve_rcon::client_config::DEFAULT_PORT;
use valve_rcon::{Connector, RconClientConfig, RconSession};

mod configs;
use crate::configs::{ServerConfig, load_config_from_env};

const HISTORY_FILE: &str = "history.txt";

#[derive(Parser)]
#[command(version, about = "Run console commands on a Source engine server over RCON")]
struct Args {
    /// Server address (eg: 127.0.0.1:27015, or localhost)
    #[arg(short, long)]
    address: Option<String>,

    /// Server port, overrides a port given in the address
    #[arg(long)]
    port: Option<u16>,

    /// Server password
    #[arg(short, long)]
    password: Option<String>,

    /// The command to execute. Starts an interactive prompt when omitted
    #[arg(short, long)]
    command: Option<String>,

    /// Append responses to this file instead of printing them
    #[arg(long)]
    file: Option<PathBuf>,

    /// Deadline for each connect, auth or command, in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Largest request packet to send, 0 for no limit
    #[arg(long, default_value_t = 4096)]
    max_packet_size: usize,

    /// Print responses in the interactive prompt instead of only logging them
    #[arg(long, action = clap::ArgAction::SetTrue)]
    show_responses: bool,

    /// Config name to load from RCON_CONFIG_PATH
    #[arg(long)]
    config_name: Option<String>,
}

/// Splits `host[:port]`, falling back to `default_port`.
fn split_address(address: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    match address.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => {
            let port = port.parse().with_context(|| format!("invalid port in address '{}'", address))?;
            Ok((host.to_string(), port))
        },
        _ => Ok((address.to_string(), default_port)),
    }
}

fn emit(response: &str, file: Option<&Path>) -> anyhow::Result<()> {
    match file {
        Some(path) => {
            let mut out = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            writeln!(out, "{}", response)?;
        },
        None => println!("{}", response),
    }
    Ok(())
}

/// Prints or stores a prompt response when asked to, otherwise only logs it.
/// Returns whether the response was emitted.
fn deliver(response: &str, show_responses: bool, file: Option<&Path>) -> anyhow::Result<bool> {
    if show_responses || file.is_some() {
        emit(response, file)?;
        return Ok(true);
    }
    log::info!("Response: {:?}", response);
    Ok(false)
}

/// Runs a single command and always closes the session afterwards.
async fn run_once<C: Connector>(session: &mut RconSession<C>, command: &str, file: Option<&Path>) -> anyhow::Result<()> {
    let result = match session.execute(command).await {
        Ok(response) => emit(&response, file),
        Err(e) => Err(e.into()),
    };
    session.disconnect().await;
    result
}

async fn run_cli(session: &mut RconSession, show_responses: bool, file: Option<&Path>) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;

    if rl.load_history(HISTORY_FILE).is_err() {
        log::info!("No previous history.");
    }

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }
                let _ = rl.add_history_entry(line);

                match session.execute(line).await {
                    Ok(resp) => {
                        deliver(&resp, show_responses, file)?;
                    },
                    Err(e) => log::error!("Error: {}", e),
                }
            },
            Err(ReadlineError::Interrupted) => {
                log::info!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                log::info!("CTRL-D");
                break;
            },
            Err(err) => {
                log::error!("Error: {:?}", err);
                break;
            }
        }
    }

    rl.save_history(HISTORY_FILE).unwrap_or_else(|e| log::error!("Failed to save history: {}", e));
    Ok(())
}

fn prompt_address() -> anyhow::Result<String> {
    print!("Enter address: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Enter password: ");
    std::io::stdout().flush()?;
    Ok(read_password()?)
}

fn resolve_server(args: &Args) -> anyhow::Result<ServerConfig> {
    if let Some(name) = args.config_name.as_deref() {
        log::debug!("Config name provided: {}", name);
        let mut config = load_config_from_env(Some(name))?;
        if let Some(port) = args.port {
            config.port = port;
        }
        return Ok(config);
    }

    let address = match &args.address {
        Some(a) => a.clone(),
        None => prompt_address()?,
    };
    let (host, port) = split_address(&address, DEFAULT_PORT)?;
    let password = match &args.password {
        Some(p) => p.clone(),
        None => prompt_password()?,
    };

    Ok(ServerConfig { host, port: args.port.unwrap_or(port), password })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        Env::default().filter_or("RUST_LOG", "info")
    ).init();

    let server = resolve_server(&args)?;
    let client_config = RconClientConfig::new(server.host.clone())
        .port(server.port)
        .timeout(Duration::from_millis(args.timeout_ms))
        .max_packet_size(args.max_packet_size);

    let mut session = RconSession::new(client_config);
    if !session.authenticate(&server.password).await? {
        bail!("RCON password incorrect");
    }
    log::info!("Connected to {}:{}", server.host, server.port);

    match args.command.as_deref() {
        Some(cmd) => run_once(&mut session, cmd, args.file.as_deref()).await,
        None => {
            let result = run_cli(&mut session, args.show_responses, args.file.as_deref()).await;
            session.disconnect().await;
            result
        },
    }
}
