use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use vault_node::chat::{DEFAULT_WAIT_TIMEOUT, Role};
use vault_node::config::{default_identity_path, file};
use vault_node::vault::HeadlessEditor;
use vault_node::{
    ChatSession, ClientOptions, DeviceIdentity, Dispatcher, FsVault, GatewayClient, GatewayEvent,
    NodeBridge, Settings, SettingsProvider, SharedChat, SharedSettings,
};

/// How long `chat` waits for the handshake
const PAIRING_TIMEOUT: Duration = Duration::from_secs(15);

/// Vault Node - expose a markdown vault to a Gateway
#[derive(Parser)]
#[command(name = "vault-node", version, about)]
struct Cli {
    /// Gateway WebSocket URL
    #[arg(long, env = "VAULT_NODE_GATEWAY_URL")]
    gateway: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect as a node and serve vault commands until Ctrl-C
    Run {
        /// Vault root directory
        #[arg(long, env = "VAULT_NODE_VAULT")]
        vault: Option<PathBuf>,
        /// Allow write commands
        #[arg(long)]
        writes: bool,
    },
    /// Print the device identity, creating it if needed
    Identity,
    /// Run one command against the vault locally and print the result
    Invoke {
        /// Command name, e.g. obsidian.vault.list
        command: String,
        /// JSON parameter object
        #[arg(long)]
        params: Option<String>,
        /// Vault root directory
        #[arg(long, env = "VAULT_NODE_VAULT")]
        vault: Option<PathBuf>,
        /// Allow write commands
        #[arg(long)]
        writes: bool,
    },
    /// Send a chat message as an operator and print the reply
    Chat {
        /// Message text
        message: String,
        /// Session key
        #[arg(long)]
        session: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,vault_node=info",
        1 => "info,vault_node=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load();
    if let Some(url) = cli.gateway {
        settings.gateway_url = url;
    }

    match cli.command {
        Command::Run { vault, writes } => {
            settings.writes_enabled |= writes;
            cmd_run(&SharedSettings::new(settings), &resolve_vault(vault)?).await
        }
        Command::Identity => cmd_identity(),
        Command::Invoke {
            command,
            params,
            vault,
            writes,
        } => {
            settings.writes_enabled |= writes;
            cmd_invoke(settings, &resolve_vault(vault)?, &command, params.as_deref()).await
        }
        Command::Chat { message, session } => {
            if let Some(key) = session {
                settings.session_key = key;
            }
            cmd_chat(settings, &message).await
        }
    }
}

/// Vault from the flag, else from the config file
fn resolve_vault(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    flag.or_else(|| file::load_config_file().vault.path.map(PathBuf::from))
        .context("no vault given (use --vault or set vault.path in the config file)")
}

fn dispatcher(vault: &Path, settings: Arc<dyn SettingsProvider>) -> anyhow::Result<Dispatcher> {
    let store = FsVault::open(vault)
        .with_context(|| format!("failed to open vault {}", vault.display()))?;
    Ok(Dispatcher::new(
        Arc::new(store),
        Arc::new(HeadlessEditor),
        settings,
    ))
}

async fn cmd_run(settings: &SharedSettings, vault: &Path) -> anyhow::Result<()> {
    let identity = DeviceIdentity::load_or_create(&default_identity_path())?;
    let dispatcher = Arc::new(dispatcher(vault, Arc::new(settings.clone()))?);

    let snapshot = settings.snapshot();
    tracing::info!(
        vault = %vault.display(),
        gateway = %snapshot.gateway_url,
        device_id = %identity.short_id(),
        writes_enabled = snapshot.writes_enabled,
        "starting vault node"
    );

    let options = ClientOptions::node(dispatcher.command_names());
    let client = GatewayClient::websocket(options, Arc::new(settings.clone()), Arc::new(identity));
    let mut events = client.subscribe();
    let bridge = NodeBridge::spawn(client.clone(), dispatcher);
    client.connect();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
            event = events.recv() => match event {
                Ok(GatewayEvent::StateChanged(state)) => {
                    tracing::info!(%state, "connection state");
                }
                Ok(GatewayEvent::DeviceToken(issued)) => {
                    settings.set_device_token(Some(issued.token.clone()));
                    if let Some(path) = file::config_file_path()
                        && let Err(e) = file::store_device_token(&path, &issued.token)
                    {
                        tracing::warn!(error = %e, "failed to persist device token");
                    }
                }
                Ok(GatewayEvent::Error(error)) => {
                    tracing::warn!(code = ?error.code, message = %error.message, "gateway error");
                }
                Ok(GatewayEvent::Frame(frame)) => {
                    tracing::trace!(%frame, "inbound frame");
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    }

    client.disconnect();
    bridge.abort();
    Ok(())
}

fn cmd_identity() -> anyhow::Result<()> {
    let path = default_identity_path();
    let identity = DeviceIdentity::load_or_create(&path)?;
    println!("device id:  {}", identity.device_id);
    println!("public key: {}", identity.public_key);
    println!("stored at:  {}", path.display());
    Ok(())
}

async fn cmd_invoke(
    settings: Settings,
    vault: &Path,
    command: &str,
    params: Option<&str>,
) -> anyhow::Result<()> {
    let dispatcher = dispatcher(vault, Arc::new(settings))?;
    let result = dispatcher.dispatch(command, params).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_chat(settings: Settings, message: &str) -> anyhow::Result<()> {
    let identity = DeviceIdentity::load_or_create(&default_identity_path())?;
    let chat = SharedChat::new(ChatSession::new(settings.session_key.clone()));

    let client = GatewayClient::websocket(
        ClientOptions::operator(),
        Arc::new(settings),
        Arc::new(identity),
    );
    let mut events = client.subscribe();
    client.connect();
    client.wait_until_paired(PAIRING_TIMEOUT).await?;

    chat.send(&client, message).await?;
    while chat.with(|s| s.is_waiting()) {
        match tokio::time::timeout(DEFAULT_WAIT_TIMEOUT, events.recv()).await {
            Ok(Ok(GatewayEvent::Chat(event))) => {
                chat.handle_event(&event);
            }
            Ok(Ok(_) | Err(RecvError::Lagged(_))) => {}
            Ok(Err(RecvError::Closed)) | Err(_) => break,
        }
    }
    client.disconnect();

    let reply = chat
        .turns()
        .into_iter()
        .rev()
        .find(|t| t.role == Role::Agent)
        .map(|t| t.text)
        .context("no reply received")?;
    println!("{reply}");
    Ok(())
}
