//! clicker-runner: headless driver for the clicker game core.
//!
//! Usage:
//!   clicker-runner --clicks 500 --ticks 60 --autobuy
//!   clicker-runner --ipc-mode --config data/catalog.json --credentials creds.db

use anyhow::Result;
use clicker_core::{
    auth::{AuthSession, HttpAuthService},
    catalog::Catalog,
    config::ClickerConfig,
    engine::GameEngine,
    event::GameEvent,
    hooks::LogHooks,
    runtime::ClickerRuntime,
    session::SessionHandle,
    state::GameView,
    store::CredentialStore,
    sync::HttpProgressStore,
};
use std::env;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Click {
        #[serde(default = "one")]
        count: u64,
    },
    BuyUpgrade {
        id: String,
    },
    BuySkin {
        id: String,
    },
    SelectSkin {
        id: String,
    },
    Tick {
        #[serde(default = "one")]
        count: u64,
    },
    Login {
        token: String,
    },
    Logout,
    Save,
    Load,
    Quit,
}

fn one() -> u64 { 1 }

#[derive(serde::Serialize)]
struct IpcReply {
    view:   GameView,
    events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note:   Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let clicks = parse_arg(&args, "--clicks", 100u64);
    let ticks = parse_arg(&args, "--ticks", 60u64);
    let autobuy = args.iter().any(|a| a == "--autobuy");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let credentials = args
        .windows(2)
        .find(|w| w[0] == "--credentials")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => ClickerConfig::load(&w[1])?,
        None => ClickerConfig::builtin(),
    };

    if ipc_mode {
        run_ipc(&config, credentials).await
    } else {
        println!("clicker-runner");
        println!("  clicks:   {clicks}");
        println!("  ticks:    {ticks}");
        println!("  autobuy:  {autobuy}");
        println!();
        run_batch(config.catalog, clicks, ticks, autobuy);
        Ok(())
    }
}

/// Drive an engine directly: clicks first, then passive ticks.
fn run_batch(catalog: Catalog, clicks: u64, ticks: u64, autobuy: bool) {
    let mut engine = GameEngine::new(Arc::new(catalog));
    let mut events = Vec::new();

    for _ in 0..clicks {
        events.extend(engine.click());
        if autobuy {
            events.extend(buy_cheapest(&mut engine));
        }
    }
    for _ in 0..ticks {
        events.extend(engine.tick());
        if autobuy {
            events.extend(buy_cheapest(&mut engine));
        }
    }

    print_summary(&engine, &events);
}

fn buy_cheapest(engine: &mut GameEngine) -> Vec<GameEvent> {
    let state = engine.state();
    let cheapest = state
        .upgrades
        .iter()
        .filter(|u| u.cost <= state.points)
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .map(|u| u.id.clone());
    match cheapest {
        Some(id) => engine.buy_upgrade(&id),
        None => vec![],
    }
}

fn print_summary(engine: &GameEngine, events: &[GameEvent]) {
    let view = engine.view();
    println!("═══════════════════════════════════════");
    println!("  Points:        {:.0}", view.points);
    println!("  Total clicks:  {}", view.total_clicks);
    println!("  Level:         {} (x{:.1})", view.level, view.level_multiplier);
    println!("  Per click:     {:.1}", view.earned_per_click);
    println!("  Per second:    {:.1}", view.points_per_second);
    println!("  Achievements:  {}/{}", view.unlocked_achievements, view.total_achievements);
    println!("───────────────────────────────────────");
    for upgrade in &view.upgrades {
        println!("  {:<18} owned {:>3}  next cost {:>8.0}", upgrade.name, upgrade.owned, upgrade.cost);
    }
    println!("───────────────────────────────────────");
    let level_ups = events.iter().filter(|e| matches!(e, GameEvent::LevelUp { .. })).count();
    let purchases = events.iter().filter(|e| matches!(e, GameEvent::Purchased { .. })).count();
    println!("  Level-ups:     {level_ups}");
    println!("  Purchases:     {purchases}");
    println!("═══════════════════════════════════════");
}

/// Newline-delimited JSON on stdin, one JSON reply per line on stdout.
async fn run_ipc(config: &ClickerConfig, credentials: &str) -> Result<()> {
    let store = CredentialStore::open(credentials)?;
    store.migrate()?;

    let client = reqwest_client()?;
    let auth = Arc::new(AuthSession::new(
        Arc::new(HttpAuthService::new(client.clone(), config.auth_url.clone())),
        store,
    ));
    if let Err(e) = auth.restore().await {
        log::warn!("could not restore auth session: {e}");
    }
    let remote = Arc::new(HttpProgressStore::new(client, config.progress_url.clone()));
    let runtime = ClickerRuntime::start(config, auth, remote, Arc::new(LogHooks));

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                stdout.write_all(format!("{err_json}\n").as_bytes()).await?;
                stdout.flush().await?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = handle_command(&runtime, cmd).await?;
        stdout
            .write_all(format!("{}\n", serde_json::to_string(&reply)?).as_bytes())
            .await?;
        stdout.flush().await?;
    }

    let state = runtime.shutdown().await?;
    log::info!("session ended with {:.0} points", state.points);
    Ok(())
}

async fn handle_command(runtime: &ClickerRuntime, cmd: IpcCommand) -> Result<IpcReply> {
    let session: &SessionHandle = runtime.session();
    let mut events = Vec::new();
    let mut note = None;

    match cmd {
        IpcCommand::GetState | IpcCommand::Quit => {}
        IpcCommand::Click { count } => {
            for _ in 0..count {
                events.extend(session.click().await?);
            }
        }
        IpcCommand::BuyUpgrade { id } => events = session.buy_upgrade(&id).await?,
        IpcCommand::BuySkin { id } => events = session.buy_skin(&id).await?,
        IpcCommand::SelectSkin { id } => events = session.select_skin(&id).await?,
        IpcCommand::Tick { count } => {
            for _ in 0..count {
                events.extend(session.tick().await?);
            }
        }
        IpcCommand::Login { token } => {
            let identity = runtime.auth().complete_login(&token).await?;
            note = Some(match identity {
                Some(id) => format!("authenticated as {}", id.email.unwrap_or_default()),
                None => "token rejected".to_string(),
            });
        }
        IpcCommand::Logout => {
            runtime.auth().logout()?;
            note = Some("logged out".to_string());
        }
        IpcCommand::Save => note = Some(format!("{:?}", runtime.sync().save().await?)),
        IpcCommand::Load => note = Some(format!("{:?}", runtime.sync().load().await?)),
    }

    Ok(IpcReply { view: session.view().await?, events, note })
}

fn reqwest_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("clicker-runner/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
