//! A quantum poker table client.
//!
//! The client authenticates against the HTTP API, lists lobbies, then opens
//! one push-channel session per table view and reconciles the pushed events
//! into a consistent view of the game.

use anyhow::{Context, Result};
use pico_args::Arguments;
use std::io::{self, Write};
use tokio::io::AsyncBufReadExt;

use qp_client::{
    api_client::ApiClient,
    commands::{Command, parse_command},
    credentials::{CredentialStore, StoredSession},
    display,
    session::{SessionEvent, TableSession},
};
use quantum_poker::TableState;
use quantum_poker::net::messages::ClientIntent;

const HELP: &str = "\
Connect to a quantum poker server

USAGE:
  qp_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://localhost:8000]
  --username NAME       Username for login
  --password PASS       Password for login
  --email ADDR          Email used when registering a new account
  --lobby ID            Join this lobby directly instead of choosing

FLAGS:
  --fresh               Ignore any stored session and log in again
  -h, --help            Print help information

COMMANDS (at the table):
  start                 Start the game
  fold | check | call   Betting actions
  raise <amount>        Raise to <amount>
  gate <X|Z|CNOT> <i..> Apply a gate to your hole card(s)
  preview <gate> <i..>  Preview a gate without applying it
  history               Show your gate history
  logout                Clear the stored session and exit
  quit                  Leave the table and exit
";

struct Args {
    server_url: String,
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
    lobby: Option<String>,
    fresh: bool,
}

/// What the table-view loop asks the outer loop to do next.
enum ViewExit {
    /// Return to the lobby listing (fatal rejection or server close).
    BackToLobbies,
    /// Exit the client, keeping the stored session.
    Quit,
    /// Exit the client and clear the stored session.
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs
            .value_from_str("--server")
            .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        username: pargs.opt_value_from_str("--username").ok().flatten(),
        password: pargs.opt_value_from_str("--password").ok().flatten(),
        email: pargs.opt_value_from_str("--email").ok().flatten(),
        lobby: pargs.opt_value_from_str("--lobby").ok().flatten(),
        fresh: pargs.contains("--fresh"),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let store = CredentialStore::new(CredentialStore::default_path());
    let mut api = ApiClient::new(args.server_url.clone());

    let session_record = if args.fresh {
        store.clear();
        None
    } else {
        resume_session(&mut api, &store).await
    };

    let (player_id, name) = match session_record {
        Some(record) => (record.player_id, record.name),
        None => authenticate(&mut api, &store, &args).await?,
    };
    println!("Signed in as {} ({})", name, player_id);

    let mut first_pick = args.lobby.clone();
    loop {
        let lobby_id = match first_pick.take() {
            Some(lobby_id) => lobby_id,
            None => match choose_lobby(&api).await? {
                Some(lobby_id) => lobby_id,
                None => break,
            },
        };

        match table_view(&api, &lobby_id, &player_id, &name).await? {
            ViewExit::BackToLobbies => continue,
            ViewExit::Quit => break,
            ViewExit::Logout => {
                store.clear();
                println!("Logged out.");
                break;
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// Validate a stored session against the server; a stale token reads as no
/// session at all.
async fn resume_session(api: &mut ApiClient, store: &CredentialStore) -> Option<StoredSession> {
    let record = store.load()?;
    api.set_access_token(record.token.clone());
    match api.me().await {
        Ok(_) => Some(record),
        Err(error) => {
            log::warn!("stored session rejected: {error}");
            store.clear();
            None
        }
    }
}

async fn authenticate(
    api: &mut ApiClient,
    store: &CredentialStore,
    args: &Args,
) -> Result<(String, String)> {
    let username = match &args.username {
        Some(username) => username.clone(),
        None => prompt(&format!("Username [{}]: ", whoami::username()))?
            .filter(|input| !input.is_empty())
            .unwrap_or_else(whoami::username),
    };
    let password = match &args.password {
        Some(password) => password.clone(),
        None => prompt("Password: ")?.unwrap_or_default(),
    };

    println!("Logging in as {}...", username);
    if let Err(error) = api.login(username.clone(), password.clone()).await {
        println!("Login failed: {}. Trying to register...", error);
        let email = match &args.email {
            Some(email) => email.clone(),
            None => format!("{username}@example.com"),
        };
        api.register(username.clone(), email, password)
            .await
            .context("failed to register")?;
        println!("Registered successfully!");
    } else {
        println!("Login successful!");
    }

    let user = api.me().await.context("failed to fetch identity")?;
    if let Some(token) = api.access_token() {
        let record = StoredSession {
            player_id: user.id.clone(),
            name: user.username.clone(),
            token: token.to_string(),
        };
        if let Err(error) = store.save(&record) {
            log::warn!("could not persist session: {error}");
        }
    }
    Ok((user.id, user.username))
}

/// List lobbies and let the viewer pick one. `None` means quit.
async fn choose_lobby(api: &ApiClient) -> Result<Option<String>> {
    let lobbies = api.list_lobbies().await.context("failed to list lobbies")?;

    if lobbies.is_empty() {
        println!("\nNo lobbies available.");
    } else {
        println!("\nAvailable lobbies:");
        for (i, lobby) in lobbies.iter().enumerate() {
            println!(
                "  {}. {} - {}/{} players{}",
                i + 1,
                lobby.name,
                lobby.players.len(),
                lobby.max_players,
                if lobby.in_game { " (in game)" } else { "" }
            );
        }
    }

    loop {
        let Some(input) = prompt("\nLobby number, 'new <name>', or 'quit': ")? else {
            return Ok(None);
        };
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            return Ok(None);
        }
        if let Some(name) = input.strip_prefix("new ") {
            let lobby = api
                .create_lobby(name.trim().to_string(), 4)
                .await
                .context("failed to create lobby")?;
            println!("Created lobby '{}'", lobby.name);
            return Ok(Some(lobby.lobby_id));
        }
        match input.parse::<usize>() {
            Ok(index) if index >= 1 && index <= lobbies.len() => {
                return Ok(Some(lobbies[index - 1].lobby_id.clone()));
            }
            _ => println!("Invalid selection."),
        }
    }
}

/// One table view: open the session, reconcile its events, relay commands.
async fn table_view(
    api: &ApiClient,
    lobby_id: &str,
    player_id: &str,
    name: &str,
) -> Result<ViewExit> {
    let ws_url = api.websocket_url(lobby_id)?;
    let player_id = player_id.to_string();

    println!("\nJoining lobby '{lobby_id}'...");
    let (session, mut events) = TableSession::open(&ws_url, lobby_id, &player_id, name)
        .await
        .context("failed to open table session")?;
    let mut table = TableState::new(lobby_id, player_id.clone());

    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    // The session (and with it the retry timer and all subscriptions) is
    // torn down when this function returns, whichever arm exits first.
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SessionEvent::Game(update)) => {
                    table.apply_game(update);
                    if let Some(view) = table.game() {
                        print!("{}", display::render_game(view, &player_id));
                    }
                    if let Some(outcome) = table.outcome() {
                        print!("{}", display::render_outcome(outcome));
                    }
                }
                Some(SessionEvent::Lobby(lobby)) => {
                    table.apply_lobby(lobby);
                    if let Some(lobby) = table.lobby() {
                        print!("{}", display::render_lobby(lobby));
                    }
                }
                Some(SessionEvent::Preview(preview)) => {
                    table.apply_preview(preview);
                    if let Some(preview) = table.preview() {
                        print!("{}", display::render_preview(preview));
                    }
                }
                Some(SessionEvent::Notice(detail)) => {
                    println!("[{}] Server: {detail}", display::stamp());
                }
                Some(SessionEvent::Fatal(error)) => {
                    println!("Cannot join this table: {error}. Returning to the lobby list.");
                    return Ok(ViewExit::BackToLobbies);
                }
                Some(SessionEvent::Closed) | None => {
                    println!("Connection to the table closed.");
                    return Ok(ViewExit::BackToLobbies);
                }
            },
            line = stdin.next_line() => {
                let Ok(Some(line)) = line else {
                    return Ok(ViewExit::Quit);
                };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                match parse_command(input) {
                    Ok(command) => {
                        match relay_command(&session, &table, lobby_id, &player_id, command)? {
                            Some(exit) => return Ok(exit),
                            None => {}
                        }
                    }
                    Err(error) => println!("{error}"),
                }
            }
        }
    }
}

/// Translate a parsed command into an intent (or a local effect). Returns
/// `Some` when the view should exit.
fn relay_command(
    session: &TableSession,
    table: &TableState,
    lobby_id: &str,
    player_id: &str,
    command: Command,
) -> Result<Option<ViewExit>> {
    match command {
        Command::Start => {
            session.send(ClientIntent::StartGame {
                lobby_id: lobby_id.to_string(),
            })?;
        }
        Command::Action { action, amount } => {
            session.send(ClientIntent::Action {
                lobby_id: lobby_id.to_string(),
                player_id: player_id.to_string(),
                action,
                amount,
            })?;
        }
        Command::Gate {
            gate,
            card_indices,
            preview_only,
        } => {
            // The server is authoritative, but don't send a gate the
            // snapshot already says is unavailable.
            let eligible = table
                .game()
                .and_then(|view| view.player(&player_id.to_string()))
                .is_none_or(|player| player.can_apply_gate);
            if !eligible {
                println!("You cannot apply a gate right now.");
            } else {
                session.send(ClientIntent::ApplyGate {
                    lobby_id: lobby_id.to_string(),
                    player_id: player_id.to_string(),
                    gate,
                    card_indices,
                    preview_only,
                })?;
            }
        }
        Command::History => {
            print!("{}", display::render_history(table.viewer_history()));
        }
        Command::Help => {
            print!("{HELP}");
        }
        Command::Logout => return Ok(Some(ViewExit::Logout)),
        Command::Quit => return Ok(Some(ViewExit::Quit)),
    }
    Ok(None)
}

fn prompt(message: &str) -> Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
