use std::fs;
use std::io;
use std::io::Stdout;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor;
use crossterm::event;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gameoflife::Coord;
use gameoflife::camera::Camera;
use gameoflife::codec::Token;
use gameoflife::config::Config;
use gameoflife::driver::DriverError;
use gameoflife::driver::Host;
use gameoflife::driver::Simulation;
use gameoflife::events::AppEvent;
use gameoflife::events::EngineEvent;
use gameoflife::events::Event;
use gameoflife::grid::Grid;
use gameoflife::io::convert_event;
use gameoflife::pattern;

/// Rows kept below the board for the status lines
const STATUS_ROWS: u16 = 3;

/// Log filter when `RUST_LOG` is unset. stderr shares the alternate screen unless it is
/// redirected, so routine messages stay quiet.
const DEFAULT_FILTER: &str = "warn";

const RUNNING_HINT: &str = "pause the simulation before editing the grid";

/// Writes every token to the state file and asks the UI to redraw after each tick.
struct TerminalHost {
    state_file: Option<PathBuf>,
    events: mpsc::Sender<Event>,
}

impl Host for TerminalHost {
    fn persist(&self, token: &Token) {
        let Some(path) = &self.state_file else {
            return;
        };

        if let Err(err) = fs::write(path, token.as_str()) {
            warn!(%err, path = %path.display(), "failed to write state file");
        }
    }

    fn refresh(&self, _grid: &Grid) {
        // A full queue already holds a redraw or a key press that will cause one.
        let _ = self.events.try_send(Event::AppEvent(AppEvent::Redraw));
    }
}

struct App {
    sim: Simulation,
    camera: Camera,
    cursor: (Coord, Coord),
    selected: usize,

    /// Message shown under the status line until the next engine command
    notice: Option<&'static str>,

    stdout: Stdout,
}

impl App {
    /// Size the camera to whatever part of the grid fits in the terminal.
    fn fit_camera(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        self.resize(cols, rows);

        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let (w, h) = self.sim.dimensions();
        let (cap_w, cap_h) = Camera::capacity(cols, rows, STATUS_ROWS);

        if let Some(camera) = Camera::new(w.min(cap_w), h.min(cap_h)) {
            self.camera = camera;
        }
        self.move_cursor(0, 0);
    }

    /// Move the cursor, keeping it on the visible part of the grid.
    fn move_cursor(&mut self, dx: Coord, dy: Coord) {
        let max_x = (self.camera.width() as Coord - 1).max(0);
        let max_y = (self.camera.height() as Coord - 1).max(0);

        self.cursor = (
            (self.cursor.0 + dx).clamp(0, max_x),
            (self.cursor.1 + dy).clamp(0, max_y),
        );
    }

    fn select(&mut self, forward: bool) {
        let n = pattern::patterns().len();

        self.selected = if forward {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        };
    }

    async fn handle_engine(&mut self, event: EngineEvent) -> anyhow::Result<()> {
        let (x, y) = self.cursor;

        let result = match event {
            EngineEvent::TogglePlay => {
                if self.sim.is_running() {
                    self.sim.stop().await;
                    Ok(())
                } else {
                    self.sim.start()
                }
            }
            EngineEvent::Step => {
                self.sim.step();
                Ok(())
            }
            EngineEvent::ToggleCell => self.sim.toggle(x, y),
            EngineEvent::Clear => self.sim.reset(),
            EngineEvent::Randomize => self.sim.randomize(),
            EngineEvent::Center => self.sim.center_align(),
            EngineEvent::Faster => {
                let ms = self.sim.tick_interval().as_millis() as u64;
                self.sim.set_tick_interval_millis(ms / 2).await
            }
            EngineEvent::Slower => {
                let ms = self.sim.tick_interval().as_millis() as u64;
                self.sim.set_tick_interval_millis(ms.saturating_mul(2)).await
            }
            EngineEvent::Stamp => match pattern::get(self.selected) {
                Some(p) => {
                    let (w, h) = p.bounds().map_or((0, 0), |b| (b.width(), b.height()));
                    self.sim.stamp(p, x - w / 2, y - h / 2)
                }
                None => Ok(()),
            },
        };

        self.notice = edit_notice(result)?;

        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let status = format!(
            "gen {} | pop {} | {}ms | {} | pattern: {} | cursor ({}, {})",
            self.sim.generation(),
            self.sim.with_grid(Grid::population),
            self.sim.tick_interval().as_millis(),
            if self.sim.is_running() { "running" } else { "paused" },
            pattern::get(self.selected).map_or("-", |p| p.name()),
            self.cursor.0,
            self.cursor.1,
        );

        let camera = &mut self.camera;
        camera.set_cursor(Some(self.cursor));
        camera.reset();
        self.sim.with_grid(|grid| camera.draw(grid));

        queue!(
            self.stdout,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0),
        )?;

        for line in camera.render().lines() {
            queue!(self.stdout, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        queue!(
            self.stdout,
            cursor::MoveToNextLine(1),
            style::Print(status),
            cursor::MoveToNextLine(1),
            style::Print(self.notice.unwrap_or_default()),
            cursor::MoveToNextLine(1),
            style::Print("space play | n step | enter toggle | c clear | r random | a center | +/- speed | tab/p pattern | q quit"),
        )?;

        self.stdout.flush()
    }
}

/// A refused edit becomes a hint for the screen. Any other driver error is passed on.
fn edit_notice(result: Result<(), DriverError>) -> Result<Option<&'static str>, DriverError> {
    match result {
        Ok(()) => Ok(None),
        Err(DriverError::Running) => Ok(Some(RUNNING_HINT)),
        Err(err) => Err(err),
    }
}

/// Read terminal events on a plain thread, since crossterm only offers a blocking reader.
fn spawn_input(events: mpsc::Sender<Event>) {
    thread::spawn(move || {
        loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(err) => {
                    warn!(%err, "failed to read terminal event");
                    let _ = events.blocking_send(Event::AppEvent(AppEvent::Exit));
                    break;
                }
            };

            if let Some(event) = convert_event(event)
                && events.blocking_send(event).is_err()
            {
                break;
            }
        }
    });
}

async fn run(app: &mut App, events: &mut mpsc::Receiver<Event>) -> anyhow::Result<()> {
    app.fit_camera()?;
    app.draw()?;

    while let Some(event) = events.recv().await {
        match event {
            Event::AppEvent(AppEvent::Exit) => break,
            Event::AppEvent(AppEvent::Redraw) => {}
            Event::AppEvent(AppEvent::CursorEvent(c)) => {
                let (dx, dy) = c.delta();
                app.move_cursor(dx, dy);
            }
            Event::AppEvent(AppEvent::NextPattern) => app.select(true),
            Event::AppEvent(AppEvent::PrevPattern) => app.select(false),
            Event::AppEvent(AppEvent::Resize { cols, rows }) => app.resize(cols, rows),
            Event::EngineEvent(e) => app.handle_engine(e).await?,
        }

        app.draw()?;
    }

    app.sim.stop().await;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with_writer(io::stderr)
        .init();

    let (tx, mut rx) = mpsc::channel(64);
    let host = Arc::new(TerminalHost {
        state_file: config.state_file.clone(),
        events: tx.clone(),
    });

    let mut sim = Simulation::new(config.width.into(), config.height.into(), host)
        .context("creating the grid")?;
    sim.set_rule(config.rule);
    sim.set_tick_interval_millis(config.interval_ms).await?;

    if let Some(token) = config.initial_token()?
        && let Err(err) = sim.decode_state(&token)
    {
        warn!(%err, "ignoring saved state");
    }

    let mut app = App {
        sim,
        camera: Camera::new(0, 0).context("allocating the camera")?,
        cursor: (0, 0),
        selected: 0,
        notice: None,
        stdout: io::stdout(),
    };

    terminal::enable_raw_mode().context("enabling raw mode")?;
    execute!(app.stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    spawn_input(tx);
    let result = run(&mut app, &mut rx).await;

    execute!(app.stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode().context("disabling raw mode")?;
    result?;

    println!("{}", app.sim.encode_state()?);

    Ok(())
}
