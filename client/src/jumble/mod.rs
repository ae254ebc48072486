pub mod generator;
pub mod persistence;
pub mod timer;
pub mod validator;

use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use shared::constants::{AD_ERROR, AD_GEM_BONUS};
use shared::profanity::ProfanityFilter;
use shared::shared_jumble_game::{
    purchase, round_duration_secs, Board, BoardAction, Consumption, CooldownStatus, Countdown,
    HintPlacement, NewUser, PhaseError, PurchaseOutcome, Puzzle, ResourceCounter, ResourceKind,
    RoundReport, SessionPhase, TickOutcome, UserField, UserRecord, UserUpdate, Wallet, WordOrigin,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::ClientError;
use crate::services::{AdOutcome, AdService, Dictionary, UserStore, WordSource};

pub use generator::generate_puzzle;
pub use persistence::Persister;
pub use timer::{RoundTimer, TimerEvent};
pub use validator::validate_and_score;

/// External services a session depends on.
pub struct Collaborators<W, D, U, A> {
    pub words: W,
    pub dictionary: D,
    pub users: Arc<U>,
    pub ads: A,
}

/// Everything the player sees, owned by the session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub user_id: i64,
    pub username: Option<String>,
    pub phase: SessionPhase,
    pub level: u32,
    pub session_score: u64,
    pub wallet: Wallet,
    pub hints: ResourceCounter,
    pub shuffles: ResourceCounter,
    pub trials: ResourceCounter,
    pub puzzle: Option<Puzzle>,
    pub board: Option<Board>,
    pub countdown: Option<Countdown>,
    pub last_report: Option<RoundReport>,
}

impl SessionState {
    fn new(user_id: i64, username: Option<String>) -> Self {
        let record = UserRecord::new(user_id, username);
        let mut state = Self {
            session_id: Uuid::new_v4(),
            user_id,
            username: None,
            phase: SessionPhase::NotStarted,
            level: 1,
            session_score: 0,
            wallet: Wallet::default(),
            hints: ResourceCounter::new(ResourceKind::Hint),
            shuffles: ResourceCounter::new(ResourceKind::Shuffle),
            trials: ResourceCounter::new(ResourceKind::Trial),
            puzzle: None,
            board: None,
            countdown: None,
            last_report: None,
        };
        state.load_record(&record);
        state
    }

    fn load_record(&mut self, record: &UserRecord) {
        if record.username.is_some() {
            self.username = record.username.clone();
        }
        self.wallet = record.wallet();
        self.hints = record.counter(ResourceKind::Hint);
        self.shuffles = record.counter(ResourceKind::Shuffle);
        self.trials = record.counter(ResourceKind::Trial);
    }

    pub fn counter(&self, kind: ResourceKind) -> &ResourceCounter {
        match kind {
            ResourceKind::Hint => &self.hints,
            ResourceKind::Shuffle => &self.shuffles,
            ResourceKind::Trial => &self.trials,
        }
    }

    fn counter_mut(&mut self, kind: ResourceKind) -> &mut ResourceCounter {
        match kind {
            ResourceKind::Hint => &mut self.hints,
            ResourceKind::Shuffle => &mut self.shuffles,
            ResourceKind::Trial => &mut self.trials,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStart {
    pub level: u32,
    pub round: u64,
    pub duration_secs: u32,
    pub origin: WordOrigin,
    pub grid_sizes: [usize; 3],
}

/// Offered when a resource is exhausted: buy with gems, or watch an ad for
/// gems if the player cannot afford it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchasePrompt {
    pub kind: ResourceKind,
    pub cost_gems: u32,
    pub gems: u32,
    pub can_afford: bool,
    pub ad_bonus: u32,
    pub cooldown: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(RoundStart),
    NeedsTrial(PurchasePrompt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOutcome {
    Hinted {
        placement: HintPlacement,
        consumption: Consumption,
    },
    Shuffled {
        consumption: Consumption,
    },
    /// Nothing for the resource to act on; nothing was spent.
    NothingToDo,
    Refused(PurchasePrompt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdReward {
    Granted { gems_added: u32, gems: u32 },
    NotCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerExtension {
    Extended { remaining: u32 },
    NotCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerUpdate {
    Remaining(u32),
    Expired(RoundReport),
}

/// Drives one player's puzzle session: trial gating, round setup, board
/// moves, the economy and scoring. All state lives in [`SessionState`];
/// user-record writes go through the [`Persister`] queue.
pub struct JumbleSession<W, D, U, A> {
    words: W,
    dictionary: D,
    users: Arc<U>,
    ads: A,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    persister: Persister,
    timer: Option<RoundTimer>,
    timer_events: mpsc::UnboundedSender<TimerEvent>,
    round: u64,
    revision: u64,
    state: SessionState,
}

impl<W, D, U, A> JumbleSession<W, D, U, A>
where
    W: WordSource,
    D: Dictionary,
    U: UserStore,
    A: AdService,
{
    /// Creates a session and the channel its round timer ticks arrive on.
    /// Must be called inside a tokio runtime.
    pub fn new(
        user_id: i64,
        username: Option<String>,
        collaborators: Collaborators<W, D, U, A>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (timer_events, receiver) = mpsc::unbounded_channel();
        let persister = Persister::spawn(collaborators.users.clone(), user_id);
        let state = SessionState::new(user_id, username);

        let session = Self {
            words: collaborators.words,
            dictionary: collaborators.dictionary,
            users: collaborators.users,
            ads: collaborators.ads,
            clock,
            rng,
            persister,
            timer: None,
            timer_events,
            round: 0,
            revision: 0,
            state,
        };
        (session, receiver)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_round(&self) -> u64 {
        self.round
    }

    /// Local mutation counter; bumps on every queued user-record write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn persister(&self) -> &Persister {
        &self.persister
    }

    fn persist(&mut self, update: UserUpdate) {
        if update.is_empty() {
            return;
        }
        self.revision += 1;
        self.persister.write(update, self.revision);
    }

    /// Loads the user record, creating it first for a new player.
    pub async fn load_profile(&mut self) -> Result<(), ClientError> {
        let user_id = self.state.user_id;
        if !self.users.user_exists(user_id).await? {
            info!("👤 Creating user record for {}", user_id);
            let new_user = NewUser {
                user_id,
                username: self.state.username.as_deref().map(ProfanityFilter::get_censored_text),
            };
            self.users.create_user(&new_user).await?;
        }

        let record = self.users.get_user(user_id).await?;
        self.apply_record(&record);
        info!(
            "👤 Loaded user {} with {} gems and {} points",
            user_id, record.gems, record.tms_points
        );
        Ok(())
    }

    /// Refetches the user record once pending writes have drained.
    /// Returns false if the fetched record was discarded as stale.
    pub async fn refresh_profile(&mut self) -> Result<bool, ClientError> {
        let observed = self.revision;
        self.persister.flush().await;
        let record = self.users.get_user(self.state.user_id).await?;
        Ok(self.apply_profile(&record, observed))
    }

    /// Applies a record fetched while the local revision was `observed`.
    /// A record that raced with a local mutation is dropped.
    pub fn apply_profile(&mut self, record: &UserRecord, observed: u64) -> bool {
        if self.revision != observed {
            info!(
                "Discarding stale profile fetched at r{} (now r{})",
                observed, self.revision
            );
            return false;
        }
        self.apply_record(record);
        true
    }

    fn apply_record(&mut self, record: &UserRecord) {
        self.state.load_record(record);
        let now = self.clock.now();
        for kind in [ResourceKind::Hint, ResourceKind::Shuffle, ResourceKind::Trial] {
            let counter = self.state.counter_mut(kind);
            let before = *counter;
            counter.refresh(now);
            if *counter != before {
                let update = UserUpdate::for_counter(counter);
                info!("🔄 Daily {} allowance refreshed", kind);
                self.persist(update);
            }
        }
    }

    /// Spends one unit of `kind`, persisting the counter if it changed.
    fn consume(&mut self, kind: ResourceKind) -> Consumption {
        let now = self.clock.now();
        let counter = self.state.counter_mut(kind);
        let before = *counter;
        let consumption = counter.consume(now);
        if *counter != before {
            let update = UserUpdate::for_counter(counter);
            self.persist(update);
        }
        consumption
    }

    fn purchase_prompt(&self, kind: ResourceKind, cooldown: Duration) -> PurchasePrompt {
        PurchasePrompt {
            kind,
            cost_gems: kind.cost_gems(),
            gems: self.state.wallet.gems,
            can_afford: self.state.wallet.gems >= kind.cost_gems(),
            ad_bonus: AD_GEM_BONUS,
            cooldown,
        }
    }

    /// Starts a new game at level 1, spending a trial first.
    pub async fn initialize_game(&mut self) -> Result<StartOutcome, ClientError> {
        let next = self.state.phase.start()?;

        if let Consumption::Refused { cooldown } = self.consume(ResourceKind::Trial) {
            info!("🚫 No trials left for user {}", self.state.user_id);
            return Ok(StartOutcome::NeedsTrial(self.purchase_prompt(ResourceKind::Trial, cooldown)));
        }

        self.state.session_id = Uuid::new_v4();
        self.state.phase = next;
        self.state.level = 1;
        self.state.session_score = 0;
        info!("🎮 [{}] New game for user {}", self.state.session_id, self.state.user_id);

        Ok(StartOutcome::Started(self.start_round().await))
    }

    /// Abandons whatever is in progress and starts over. Costs a trial.
    pub async fn restart_game(&mut self) -> Result<StartOutcome, ClientError> {
        self.quit_game();
        self.initialize_game().await
    }

    pub fn quit_game(&mut self) {
        self.stop_timer();
        if let Some(countdown) = self.state.countdown.as_mut() {
            countdown.cancel();
        }
        if self.state.phase != SessionPhase::NotStarted {
            info!("👋 [{}] Session ended at level {}", self.state.session_id, self.state.level);
        }
        self.state.phase = self.state.phase.reset();
        self.state.puzzle = None;
        self.state.board = None;
        self.state.countdown = None;
        self.state.session_score = 0;
        self.state.level = 1;
    }

    pub async fn next_level(&mut self) -> Result<RoundStart, ClientError> {
        self.state.phase = self.state.phase.advance()?;
        self.state.level += 1;
        Ok(self.start_round().await)
    }

    async fn start_round(&mut self) -> RoundStart {
        self.stop_timer();
        let level = self.state.level;

        let puzzle = generate_puzzle(&self.words, level, &mut self.rng).await;
        let board = Board::setup(&puzzle, &mut self.rng);
        let duration_secs = round_duration_secs(board.empty_cell_count(), puzzle.total_cells, level);
        let mut countdown = Countdown::new(duration_secs);
        countdown.start();

        self.round += 1;
        self.timer = Some(RoundTimer::start(self.round, self.timer_events.clone()));

        let start = RoundStart {
            level,
            round: self.round,
            duration_secs,
            origin: puzzle.origin,
            grid_sizes: puzzle.grid_sizes,
        };
        info!(
            "⏱️ [{}] Level {} started: {} empty cells, {}s on the clock",
            self.state.session_id,
            level,
            board.empty_cell_count(),
            duration_secs
        );

        self.state.puzzle = Some(puzzle);
        self.state.board = Some(board);
        self.state.countdown = Some(countdown);
        self.state.last_report = None;
        start
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    fn board_mut(&mut self, action: &'static str) -> Result<&mut Board, ClientError> {
        let phase = self.state.phase;
        if !phase.accepts_moves() {
            return Err(PhaseError { from: phase, action }.into());
        }
        self.state
            .board
            .as_mut()
            .ok_or(ClientError::Phase(PhaseError { from: phase, action }))
    }

    pub fn select_letter_from_rack(&mut self, index: usize) -> Result<BoardAction, ClientError> {
        Ok(self.board_mut("select a rack letter")?.select_letter_from_rack(index)?)
    }

    pub fn select_grid_cell(&mut self, index: usize) -> Result<BoardAction, ClientError> {
        Ok(self.board_mut("select a grid cell")?.select_grid_cell(index)?)
    }

    pub fn place_letter(&mut self, letter_index: usize, grid_index: usize) -> Result<BoardAction, ClientError> {
        Ok(self.board_mut("place a letter")?.place_letter(letter_index, grid_index)?)
    }

    pub fn return_letter_to_rack(&mut self, grid_index: usize) -> Result<usize, ClientError> {
        Ok(self.board_mut("return a letter")?.return_letter_to_rack(grid_index)?)
    }

    pub fn use_hint(&mut self) -> Result<ResourceOutcome, ClientError> {
        if self.board_mut("use a hint")?.is_full() {
            return Ok(ResourceOutcome::NothingToDo);
        }

        let consumption = self.consume(ResourceKind::Hint);
        if let Consumption::Refused { cooldown } = consumption {
            return Ok(ResourceOutcome::Refused(self.purchase_prompt(ResourceKind::Hint, cooldown)));
        }

        let placement = match (self.state.puzzle.as_ref(), self.state.board.as_mut()) {
            (Some(puzzle), Some(board)) => board.apply_hint(puzzle),
            _ => None,
        };
        match placement {
            Some(placement) => {
                info!("💡 Hint placed {} at cell {}", placement.letter, placement.grid_index);
                Ok(ResourceOutcome::Hinted { placement, consumption })
            }
            None => Ok(ResourceOutcome::NothingToDo),
        }
    }

    pub fn use_shuffle(&mut self) -> Result<ResourceOutcome, ClientError> {
        if self.board_mut("shuffle the rack")?.rack_letters().len() < 2 {
            return Ok(ResourceOutcome::NothingToDo);
        }

        let consumption = self.consume(ResourceKind::Shuffle);
        if let Consumption::Refused { cooldown } = consumption {
            return Ok(ResourceOutcome::Refused(self.purchase_prompt(ResourceKind::Shuffle, cooldown)));
        }

        if let Some(board) = self.state.board.as_mut() {
            board.shuffle_rack(&mut self.rng);
        }
        Ok(ResourceOutcome::Shuffled { consumption })
    }

    /// Buys one unit of `kind` with gems.
    pub fn buy(&mut self, kind: ResourceKind) -> PurchaseOutcome {
        let state = &mut self.state;
        let counter = match kind {
            ResourceKind::Hint => &mut state.hints,
            ResourceKind::Shuffle => &mut state.shuffles,
            ResourceKind::Trial => &mut state.trials,
        };
        let outcome = purchase(counter, &mut state.wallet);

        if let PurchaseOutcome::Purchased { gems_left, purchased } = outcome {
            info!("💎 Bought a {} ({} owned, {} gems left)", kind, purchased, gems_left);
            let update = UserUpdate::new()
                .with(UserField::Gems(gems_left))
                .merge(UserUpdate::for_counter(counter));
            self.persist(update);
        }
        outcome
    }

    async fn show_ad(&self) -> Result<AdOutcome, ClientError> {
        self.ads.show().await.map_err(|e| {
            warn!("Ad failed: {}", e);
            ClientError::Ad(AD_ERROR.to_string())
        })
    }

    pub async fn watch_ad_for_gems(&mut self) -> Result<AdReward, ClientError> {
        if !self.show_ad().await?.done {
            return Ok(AdReward::NotCompleted);
        }

        self.state.wallet.gems += AD_GEM_BONUS;
        let gems = self.state.wallet.gems;
        self.persist(UserUpdate::new().with(UserField::Gems(gems)));
        info!("📺 Ad watched, {} gems granted", AD_GEM_BONUS);
        Ok(AdReward::Granted {
            gems_added: AD_GEM_BONUS,
            gems,
        })
    }

    /// Watches an ad to add time to the running round.
    pub async fn extend_timer(&mut self) -> Result<TimerExtension, ClientError> {
        self.board_mut("extend the timer")?;
        if !self.show_ad().await?.done {
            return Ok(TimerExtension::NotCompleted);
        }

        let phase = self.state.phase;
        let refused = PhaseError {
            from: phase,
            action: "extend the timer",
        };
        match self.state.countdown.as_mut() {
            Some(countdown) if phase.accepts_moves() => {
                if !countdown.extend() {
                    return Err(refused.into());
                }
                info!("⏱️ Timer extended to {}s", countdown.remaining);
                Ok(TimerExtension::Extended {
                    remaining: countdown.remaining,
                })
            }
            _ => Err(refused.into()),
        }
    }

    /// Validates the current grid and settles the round.
    pub async fn submit(&mut self) -> Result<RoundReport, ClientError> {
        self.state.phase = self.state.phase.submit()?;
        if let Some(countdown) = self.state.countdown.as_mut() {
            countdown.pause();
        }
        self.finish_round().await
    }

    async fn finish_round(&mut self) -> Result<RoundReport, ClientError> {
        let report = match (self.state.puzzle.as_ref(), self.state.board.as_ref()) {
            (Some(puzzle), Some(board)) => validate_and_score(&self.dictionary, &board.grid, &puzzle.words).await,
            _ => RoundReport::from_results(Vec::new()),
        };

        self.stop_timer();
        if let Some(countdown) = self.state.countdown.as_mut() {
            countdown.cancel();
        }
        self.record_points(report.points_earned);
        self.state.phase = self.state.phase.settle(report.outcome)?;
        self.state.last_report = Some(report.clone());

        info!(
            "🏁 [{}] Level {}: {}/{} words, +{} points ({:?})",
            self.state.session_id,
            self.state.level,
            report.correct_count,
            report.total_words,
            report.points_earned,
            report.outcome
        );
        Ok(report)
    }

    fn record_points(&mut self, points: u64) {
        self.state.session_score += points;
        let mut update = UserUpdate::new();

        if points > 0 {
            self.state.wallet.tms_points += points;
            update = update.with(UserField::TmsPoints(self.state.wallet.tms_points));
        }
        if self.state.session_score > self.state.wallet.highest_score {
            self.state.wallet.highest_score = self.state.session_score;
            update = update.with(UserField::HighestScore(self.state.session_score));
            info!("🏆 New highest score: {}", self.state.session_score);
        }
        self.persist(update);
    }

    /// Feeds one timer tick into the countdown. Ticks from an earlier round,
    /// or arriving while a submission is in flight, are ignored.
    pub async fn on_timer_event(&mut self, event: TimerEvent) -> Result<Option<TimerUpdate>, ClientError> {
        let TimerEvent::Tick { round } = event;
        if round != self.round || self.timer.is_none() || !self.state.phase.accepts_moves() {
            return Ok(None);
        }

        let tick = match self.state.countdown.as_mut() {
            Some(countdown) => countdown.tick(),
            None => TickOutcome::Ignored,
        };
        match tick {
            TickOutcome::Running(remaining) => Ok(Some(TimerUpdate::Remaining(remaining))),
            TickOutcome::Expired => {
                info!("⌛ [{}] Time is up on level {}", self.state.session_id, self.state.level);
                self.state.phase = self.state.phase.submit()?;
                Ok(Some(TimerUpdate::Expired(self.finish_round().await?)))
            }
            TickOutcome::Ignored => Ok(None),
        }
    }

    pub fn cooldown_status(&self) -> Vec<CooldownStatus> {
        let now = self.clock.now();
        [ResourceKind::Hint, ResourceKind::Shuffle, ResourceKind::Trial]
            .iter()
            .map(|&kind| self.state.counter(kind).status(now))
            .collect()
    }
}
