mod ui;

use aimdrill::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, DrillEvent, FixedTicker, Runner},
    sensitivity::{self, GameProfile},
    session::{GameSession, Phase},
    storage::FileScoreStore,
    target::{ArenaBounds, Difficulty, GameMode},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

const TICK_RATE_MS: u64 = 50;

/// terminal aim trainer with spawning targets and streak tracking
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An aim trainer for the terminal: click spawning targets before they expire across gridshot, tracking, and precision modes, with per-mode high scores and a cross-game sensitivity converter."
)]
pub struct Cli {
    /// game mode to train
    #[clap(short, long, value_enum)]
    mode: Option<GameMode>,

    /// target difficulty
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// simultaneous targets to keep in play (1-15)
    #[clap(short = 'n', long)]
    target_count: Option<u32>,

    /// session length in seconds (10-120)
    #[clap(short = 't', long)]
    game_time: Option<u32>,

    /// scale applied to target sizes (0.5-2.0)
    #[clap(short = 's', long)]
    size_multiplier: Option<f64>,

    /// play with three lives; misses and expired targets each cost one
    #[clap(short = 'l', long)]
    lives: bool,

    /// convert a sensitivity value to this game's scale and exit
    #[clap(long, value_enum)]
    convert_to: Option<GameProfile>,

    /// source game for sensitivity conversion
    #[clap(long, value_enum, default_value_t = GameProfile::Cs2)]
    convert_from: GameProfile,

    /// sensitivity value to convert
    #[clap(long, default_value_t = 1.0)]
    sens: f64,

    /// mouse DPI in the source game
    #[clap(long, default_value_t = 800)]
    dpi: u32,

    /// mouse DPI in the target game, when switching DPI along with games
    #[clap(long)]
    target_dpi: Option<u32>,
}

impl Cli {
    /// File config first, CLI flags override.
    fn to_config(&self, base: Config) -> Config {
        Config {
            mode: self.mode.unwrap_or(base.mode),
            difficulty: self.difficulty.unwrap_or(base.difficulty),
            target_count: self.target_count.unwrap_or(base.target_count),
            game_time_secs: self.game_time.unwrap_or(base.game_time_secs),
            target_size_multiplier: self.size_multiplier.unwrap_or(base.target_size_multiplier),
            lives_enabled: self.lives || base.lives_enabled,
        }
        .clamped()
    }
}

fn print_conversion(cli: &Cli, to: GameProfile) {
    let from = cli.convert_from;
    let target_dpi = cli.target_dpi.unwrap_or(cli.dpi);
    let converted = sensitivity::convert_with_dpi(cli.sens, from, to, cli.dpi, target_dpi);

    println!("{:.3} {from} -> {:.3} {to}", cli.sens, converted);
    println!(
        "cm/360: {:.2} cm ({from} @ {} dpi) -> {:.2} cm ({to} @ {} dpi)",
        sensitivity::cm_per_360(cli.sens, cli.dpi, from.multiplier()),
        cli.dpi,
        sensitivity::cm_per_360(converted, target_dpi, to.multiplier()),
        target_dpi,
    );
}

pub struct App {
    pub session: GameSession,
    pub config_store: FileConfigStore,
    origin: Instant,
    arena: Rect,
}

impl App {
    pub fn new(config: Config) -> Self {
        let bounds = ArenaBounds::new(640, 480);
        let session = GameSession::new(config, bounds, Box::new(FileScoreStore::new()));
        Self {
            session,
            config_store: FileConfigStore::new(),
            origin: Instant::now(),
            arena: Rect::default(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Keeps the engine's pixel bounds in sync with the drawn arena.
    fn update_layout(&mut self, frame_area: Rect) {
        let arena = ui::arena_rect(frame_area);
        if arena != self.arena {
            self.arena = arena;
            self.session.set_bounds(ArenaBounds::new(
                u32::from(arena.width) * ui::CELL_W_PX,
                u32::from(arena.height) * ui::CELL_H_PX,
            ));
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (col, row) = (mouse.column, mouse.row);
        let inside = col >= self.arena.x
            && col < self.arena.x + self.arena.width
            && row >= self.arena.y
            && row < self.arena.y + self.arena.height;
        if !inside {
            return;
        }
        // Cell center in arena pixel space.
        let px = f64::from(u32::from(col - self.arena.x) * ui::CELL_W_PX + ui::CELL_W_PX / 2);
        let py = f64::from(u32::from(row - self.arena.y) * ui::CELL_H_PX + ui::CELL_H_PX / 2);
        self.session.on_click(px, py, self.now_ms());
    }

    /// Returns false when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let now = self.now_ms();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return false,
            KeyCode::Char(' ') => match self.session.phase {
                Phase::Idle | Phase::GameOver => self.session.start(now),
                Phase::Running => self.session.pause(now),
                Phase::Paused => self.session.resume(now),
            },
            KeyCode::Char('r') => self.session.reset(),
            KeyCode::Char('1') => self.session.set_mode(GameMode::Gridshot),
            KeyCode::Char('2') => self.session.set_mode(GameMode::Tracking),
            KeyCode::Char('3') => self.session.set_mode(GameMode::Precision),
            KeyCode::Char('d') if !self.session.is_playing() => {
                let next = match self.session.config.difficulty {
                    Difficulty::Easy => Difficulty::Medium,
                    Difficulty::Medium => Difficulty::Hard,
                    Difficulty::Hard => Difficulty::Easy,
                };
                self.apply_setting(|cfg| cfg.difficulty = next);
            }
            KeyCode::Char('l') if !self.session.is_playing() => {
                self.apply_setting(|cfg| cfg.lives_enabled = !cfg.lives_enabled);
            }
            _ => {}
        }
        true
    }

    fn apply_setting(&mut self, change: impl FnOnce(&mut Config)) {
        let mut config = self.session.config;
        change(&mut config);
        self.session.apply_config(config);
        let _ = self.config_store.save(&self.session.config);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(to) = cli.convert_to {
        print_conversion(&cli, to);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.to_config(FileConfigStore::new().load());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let event_source = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(event_source, ticker);

    loop {
        terminal.draw(|f| {
            app.update_layout(f.area());
            f.render_widget(&*app, f.area());
        })?;

        match runner.step() {
            DrillEvent::Tick => app.session.tick(app.now_ms()),
            DrillEvent::Key(key) => {
                if !app.handle_key(key) {
                    return Ok(());
                }
            }
            DrillEvent::Mouse(mouse) => app.handle_mouse(mouse),
            DrillEvent::Resize => {}
        }
    }
}
