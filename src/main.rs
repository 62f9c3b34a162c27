use std::io::{self, stdout};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, terminal,
};

use flappy_arcade::audio::AudioOutput;
use flappy_arcade::config::GameConfig;
use flappy_arcade::history::HistoryStore;
use flappy_arcade::render::{self, PixelBuf};
use flappy_arcade::sim::{RoundEvent, RoundState, Simulation};
use flappy_arcade::theme::Theme;

const FRAME_DUR: Duration = Duration::from_millis(33); // ~30 fps

struct App {
    sim: Simulation,
    themes: Vec<Theme>,
    theme_idx: usize,
    history: HistoryStore,
    audio: AudioOutput,
    frame: u64,
}

impl App {
    fn theme(&self) -> &Theme {
        &self.themes[self.theme_idx]
    }

    fn handle_action(&mut self) {
        self.sim.on_user_action();
        if self.sim.state() == RoundState::Playing {
            self.audio.play_flap();
        }
    }

    fn step(&mut self) {
        if self.sim.state() == RoundState::Playing {
            self.sim.advance_frame();
        }
        match self.sim.take_last_event() {
            Some(RoundEvent::Scored) => self.audio.play_score(),
            Some(RoundEvent::RoundOver { score }) => {
                self.audio.play_death();
                // Non-critical sink; a failed write never ends the game.
                let theme = self.theme().name.clone();
                let _ = self.history.record(&theme, score);
            }
            None => {}
        }
        self.frame += 1;
    }
}

fn main() -> Result<()> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(Path::new(&path))?,
        None => GameConfig::default(),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1);

    let mut themes = Theme::presets();
    if let Ok(path) = std::env::var("FLAPPY_THEME") {
        themes.insert(0, Theme::load(Path::new(&path))?);
    }

    let mut app = App {
        sim: Simulation::new(cfg, seed),
        themes,
        theme_idx: 0,
        history: HistoryStore::open()?,
        audio: AudioOutput::open(),
        frame: 0,
    };
    // Themes and cues are built in; once setup is done the gate opens.
    app.sim.set_assets_ready(true);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let result = run(&mut out, &mut app);

    execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    result
}

fn run(out: &mut io::Stdout, app: &mut App) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);

    loop {
        let frame_start = Instant::now();

        // Edge-triggered input: everything delivered since the last frame
        // is consumed before the next advance.
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => app.handle_action(),
                    KeyCode::Char('t') => {
                        if app.sim.state() == RoundState::Ready {
                            app.theme_idx = (app.theme_idx + 1) % app.themes.len();
                        }
                    }
                    _ => {}
                },
                Event::Resize(c, r) => buf.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }

        app.step();

        let best = app.history.best_for(&app.theme().name).max(app.sim.score());
        render::draw_scene(&mut buf, &app.sim, app.theme(), best, app.frame);
        buf.flush(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DUR {
            std::thread::sleep(FRAME_DUR - elapsed);
        }
    }
}
