/// Entry point and game loop.

mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gridlock::config::GameConfig;
use gridlock::sim::event::GameEvent;
use gridlock::sim::give_up::GiveUpTimer;
use gridlock::sim::puzzle::{self, PuzzleDef};
use gridlock::sim::record::{self, SolveRecord, SolveStatus};
use gridlock::sim::session::{self, GameSession, Phase, CELL_SIZE};
use ui::input::{BoardLayout, InputAction, InputState};
use ui::renderer::{Renderer, View};
use ui::sound::SoundEngine;

/// Upper bound on how long the loop blocks waiting for input; also the
/// refresh rate for message expiry and the give-up prompt.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);
const MESSAGE_TIME: Duration = Duration::from_secs(3);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    info!(puzzles_dir = %config.puzzles_dir.display(), "gridlock starting");

    let catalog = puzzle::load_catalog(&config.puzzles_dir);
    let mut app = App::new(catalog, &config);
    app.load_current();

    let mut renderer = Renderer::new(config.display.cell_width, config.display.cell_height);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut app, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Gridlock!");
    println!("Puzzles solved: {}", app.solved);
}

/// File logger; the terminal is in raw mode while playing. `RUST_LOG`
/// overrides the configured filter.
fn init_logging(config: &GameConfig) {
    let file = match File::options().create(true).append(true).open(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open {}: {e}", config.log_file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn game_loop(
    app: &mut App,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let layout = renderer.layout();

    loop {
        let actions = kb.drain_events(POLL_TIMEOUT)?.to_vec();
        for action in actions {
            if app.handle(action, &layout, sound) {
                return Ok(());
            }
        }

        app.tick_message();
        renderer.render(&app.view())?;
    }
}

// ══════════════════════════════════════════════════════════════
// App: catalog + session + everything around it
// ══════════════════════════════════════════════════════════════

struct App {
    catalog: Vec<PuzzleDef>,
    current: usize,
    session: GameSession,
    timer: GiveUpTimer,
    solves_dir: PathBuf,
    message: String,
    message_until: Option<Instant>,
    solved: usize,
}

impl App {
    fn new(catalog: Vec<PuzzleDef>, config: &GameConfig) -> Self {
        App {
            catalog,
            current: 0,
            session: GameSession::new(CELL_SIZE),
            timer: GiveUpTimer::new(config.give_up.after, config.give_up.min_records),
            solves_dir: config.solves_dir.clone(),
            message: String::new(),
            message_until: None,
            solved: 0,
        }
    }

    fn puzzle_name(&self) -> &str {
        self.catalog.get(self.current).map(|p| p.name.as_str()).unwrap_or("")
    }

    fn give_up_available(&self) -> bool {
        self.session.phase() == Phase::InProgress
            && self.timer.is_available(self.session.audit().len())
    }

    fn view(&self) -> View<'_> {
        View {
            session: &self.session,
            puzzle_name: self.puzzle_name(),
            puzzle_index: self.current,
            puzzle_count: self.catalog.len(),
            message: &self.message,
            give_up_available: self.give_up_available(),
        }
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.message_until = Some(Instant::now() + MESSAGE_TIME);
    }

    fn tick_message(&mut self) {
        if self.message_until.is_some_and(|t| Instant::now() >= t) {
            self.message.clear();
            self.message_until = None;
        }
    }

    // ── Puzzle switching ──

    fn load_current(&mut self) {
        let Some(def) = self.catalog.get(self.current) else {
            self.set_message("No puzzles found.");
            return;
        };
        let name = def.name.clone();
        match self.session.load(&def.text) {
            Ok(_) => {
                self.timer.restart();
                info!(puzzle = %name, "puzzle started");
                self.set_message(format!("{name}: drag the red car out through the exit."));
            }
            Err(e) => {
                warn!(puzzle = %name, error = %e, "puzzle failed to load");
                self.set_message(format!("Cannot load {name}: {e}"));
            }
        }
    }

    fn switch(&mut self, step: isize) {
        let len = self.catalog.len();
        if len == 0 { return; }
        self.current = (self.current as isize + step).rem_euclid(len as isize) as usize;
        self.load_current();
    }

    // ── Input ──

    /// Apply one action. Returns true when the player quits.
    fn handle(&mut self, action: InputAction, layout: &BoardLayout, sound: Option<&SoundEngine>) -> bool {
        let events = match action {
            InputAction::Select { col, row } => self.session.select(layout.to_board(col, row)),
            InputAction::Drag { col, row } => self.session.drag_to(layout.to_board(col, row)),
            InputAction::Release => self.session.release(),
            InputAction::Undo => self.session.undo(),
            InputAction::Reset => self.session.reset(),
            InputAction::GiveUp => {
                if self.give_up_available() {
                    self.session.give_up()
                } else {
                    if self.session.phase() == Phase::InProgress {
                        self.set_message("Keep trying! Giving up is not available yet.");
                    }
                    vec![]
                }
            }
            InputAction::NextPuzzle => { self.switch(1); vec![] }
            InputAction::PrevPuzzle => { self.switch(-1); vec![] }
            InputAction::Redraw => vec![],
            InputAction::Quit => {
                self.session.release();
                return true;
            }
        };
        self.process_events(&events, sound);
        false
    }

    fn process_events(&mut self, events: &[GameEvent], sound: Option<&SoundEngine>) {
        for event in events {
            match event {
                GameEvent::Selected { .. } => {
                    if let Some(sfx) = sound { sfx.play_pick(); }
                }
                GameEvent::MoveRecorded(_) => {
                    if let Some(sfx) = sound { sfx.play_slide(); }
                }
                GameEvent::Undone(_) | GameEvent::Reset => {
                    if let Some(sfx) = sound { sfx.play_undo(); }
                }
                GameEvent::Solved { audit } => {
                    self.timer.cancel();
                    self.solved += 1;
                    if let Some(sfx) = sound { sfx.play_solved(); }
                    let moves = self.session.moves().len();
                    let saved = self.submit(SolveStatus::Completed, audit);
                    self.set_message(format!(
                        "Solved in {moves} moves!{}  N: next puzzle",
                        if saved { "" } else { " (record not saved)" },
                    ));
                }
                GameEvent::GaveUp { audit } => {
                    self.timer.cancel();
                    if let Some(sfx) = sound { sfx.play_gave_up(); }
                    let saved = self.submit(SolveStatus::GaveUp, audit);
                    self.set_message(format!(
                        "Gave up.{}  N: next puzzle",
                        if saved { "" } else { " (record not saved)" },
                    ));
                }
                _ => {}
            }
        }
    }

    /// Write the solve record. Failures are logged and never block play.
    fn submit(&self, status: SolveStatus, audit: &str) -> bool {
        let rec = SolveRecord::new(
            self.puzzle_name().to_string(),
            status,
            self.session.puzzle_text().to_string(),
            audit.to_string(),
            session::unix_millis(),
        );
        match record::write_record(&self.solves_dir, &rec) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "solve record not written");
                false
            }
        }
    }
}
