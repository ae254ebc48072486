use std::sync::Arc;

use client::clock::SystemClock;
use client::display::{self, Command, HELP};
use client::jumble::{
    AdReward, Collaborators, JumbleSession, ResourceOutcome, StartOutcome, TimerExtension, TimerEvent, TimerUpdate,
};
use client::services::{
    AdService, Dictionary, HttpDictionary, HttpUserStore, HttpWordSource, SimulatedAdService, UserStore, WordSource,
};
use client::{logging, ClientConfig, ClientError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::constants::{NETWORK_ERROR, NOT_ENOUGH_GEMS_ERROR};
use shared::shared_jumble_game::{PurchaseOutcome, RoundOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    logging::setup();
    dotenvy::from_path(".env").ok();

    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ClientError> {
    let config = ClientConfig::from_env()?;
    let http = config.http_client()?;
    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let collaborators = Collaborators {
        words: HttpWordSource::new(&config.word_api_base_url, http.clone()),
        dictionary: HttpDictionary::new(&config.dictionary_api_base_url, http.clone()),
        users: Arc::new(HttpUserStore::new(&config.api_base_url, http)),
        ads: SimulatedAdService::new(config.ad_delay),
    };
    let (mut session, mut ticks) =
        JumbleSession::new(config.user_id, config.username.clone(), collaborators, Arc::new(SystemClock), rng);

    if let Err(e) = session.load_profile().await {
        warn!("Could not load profile, playing with local defaults: {}", e);
    }
    info!("🚀 Jumble-Jester ready for user {}", config.user_id);
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.map_err(|e| ClientError::Config(format!("stdin: {}", e)))? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match display::parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(&mut session, command).await,
                    Err(msg) => println!("{}", msg),
                }
            }
            Some(event) = ticks.recv() => on_tick(&mut session, event).await,
        }
    }

    session.quit_game();
    session.persister().flush().await;
    Ok(())
}

async fn on_tick<W, D, U, A>(session: &mut JumbleSession<W, D, U, A>, event: TimerEvent)
where
    W: WordSource,
    D: Dictionary,
    U: UserStore,
    A: AdService,
{
    match session.on_timer_event(event).await {
        Ok(Some(TimerUpdate::Remaining(remaining))) if remaining <= 5 => println!("⏳ {}s left", remaining),
        Ok(Some(TimerUpdate::Expired(report))) => {
            println!("⌛ Time is up!\n{}", display::render_report(&report));
            println!("Game over. Type `restart` to play again.");
        }
        Ok(_) => {}
        Err(e) => warn!("Timer event failed: {}", e),
    }
}

async fn handle<W, D, U, A>(session: &mut JumbleSession<W, D, U, A>, command: Command)
where
    W: WordSource,
    D: Dictionary,
    U: UserStore,
    A: AdService,
{
    if let Err(e) = dispatch(session, command).await {
        if e.is_player_error() {
            println!("{}", e);
        } else {
            warn!("{}", e);
            match e {
                ClientError::Http(_) | ClientError::Status { .. } => println!("{}", NETWORK_ERROR),
                other => println!("{}", other),
            }
        }
    }
}

async fn dispatch<W, D, U, A>(session: &mut JumbleSession<W, D, U, A>, command: Command) -> Result<(), ClientError>
where
    W: WordSource,
    D: Dictionary,
    U: UserStore,
    A: AdService,
{
    match command {
        Command::Start | Command::Restart => {
            let outcome = if command == Command::Start {
                session.initialize_game().await?
            } else {
                session.restart_game().await?
            };
            match outcome {
                StartOutcome::Started(start) => {
                    println!("Level {} ({}s)", start.level, start.duration_secs);
                    println!("{}", display::render_state(session.state()));
                }
                StartOutcome::NeedsTrial(prompt) => println!("{}", display::render_prompt(&prompt)),
            }
        }
        Command::SelectRack(i) => {
            session.select_letter_from_rack(i)?;
            println!("{}", display::render_state(session.state()));
        }
        Command::SelectGrid(i) => {
            session.select_grid_cell(i)?;
            println!("{}", display::render_state(session.state()));
        }
        Command::Place { rack, grid } => {
            session.place_letter(rack, grid)?;
            println!("{}", display::render_state(session.state()));
        }
        Command::Return(grid) => {
            session.return_letter_to_rack(grid)?;
            println!("{}", display::render_state(session.state()));
        }
        Command::Hint | Command::Shuffle => {
            let outcome = if command == Command::Hint {
                session.use_hint()?
            } else {
                session.use_shuffle()?
            };
            match outcome {
                ResourceOutcome::Refused(prompt) => println!("{}", display::render_prompt(&prompt)),
                ResourceOutcome::NothingToDo => println!("Nothing to do."),
                _ => println!("{}", display::render_state(session.state())),
            }
        }
        Command::Submit => {
            let report = session.submit().await?;
            println!("{}", display::render_report(&report));
            match report.outcome {
                RoundOutcome::LevelComplete => println!("Level complete! Type `next` to continue."),
                RoundOutcome::NoWordsCompleted => println!("No words completed. Type `restart` to try again."),
                RoundOutcome::PartialCredit => println!("Game over. Type `restart` to play again."),
            }
        }
        Command::Next => {
            let start = session.next_level().await?;
            println!("Level {} ({}s)", start.level, start.duration_secs);
            println!("{}", display::render_state(session.state()));
        }
        Command::Buy(kind) => match session.buy(kind) {
            PurchaseOutcome::Purchased { gems_left, purchased } => {
                println!("Bought a {}. You own {}, {} gems left.", kind, purchased, gems_left)
            }
            PurchaseOutcome::InsufficientGems { needed, available, ad_bonus } => println!(
                "{}: need {}, have {}. `ad` grants {} gems.",
                NOT_ENOUGH_GEMS_ERROR, needed, available, ad_bonus
            ),
        },
        Command::WatchAd => match session.watch_ad_for_gems().await? {
            AdReward::Granted { gems_added, gems } => println!("+{} gems ({} total)", gems_added, gems),
            AdReward::NotCompleted => println!("Ad skipped, no reward."),
        },
        Command::Extend => match session.extend_timer().await? {
            TimerExtension::Extended { remaining } => println!("Timer extended: {}s left", remaining),
            TimerExtension::NotCompleted => println!("Ad skipped, no extra time."),
        },
        Command::Status => {
            println!("{}", display::render_state(session.state()));
            println!("{}", display::render_status(&session.cooldown_status()));
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => session.quit_game(),
    }
    Ok(())
}
