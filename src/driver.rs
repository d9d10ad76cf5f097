//! The simulation driver.
//!
//! A [`Simulation`] owns the grid behind a mutex and, while running, a single ticker task that
//! steps it on a fixed interval. The task waits on whichever comes first of the next tick and
//! the cancellation signal, so cancellation only ever lands between two steps.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Coord;
use crate::codec;
use crate::codec::CodecError;
use crate::codec::Token;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::pattern::Pattern;
use crate::rule_set::RuleSet;

pub const MIN_TICK_MILLIS: u64 = 10;
pub const MAX_TICK_MILLIS: u64 = 1000;
pub const DEFAULT_TICK_MILLIS: u64 = 50;

/// Clamp a tick interval to `[MIN_TICK_MILLIS, MAX_TICK_MILLIS]`
pub const fn clamp_tick_millis(ms: u64) -> u64 {
    if ms < MIN_TICK_MILLIS {
        MIN_TICK_MILLIS
    } else if ms > MAX_TICK_MILLIS {
        MAX_TICK_MILLIS
    } else {
        ms
    }
}

/// The environment a simulation runs in.
///
/// Both callbacks run while the grid lock is held, so they must not call back into the
/// [`Simulation`].
pub trait Host: Send + Sync + 'static {
    /// Store the latest state token.
    fn persist(&self, token: &Token);

    /// The grid has advanced by one tick.
    fn refresh(&self, _grid: &Grid) {}
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("the simulation is running, stop it before editing the grid")]
    Running,

    #[error("no tokio runtime to run the ticker on")]
    NoRuntime,

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

type SharedGrid = Arc<Mutex<Grid>>;

/// The running ticker task and the means to stop it
struct Ticker {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct Simulation {
    grid: SharedGrid,
    rule: RuleSet,
    interval: Duration,
    ticker: Option<Ticker>,
    host: Arc<dyn Host>,
}

impl Simulation {
    /// Create a simulation over an empty `width` by `height` grid and persist it.
    pub fn new(width: usize, height: usize, host: Arc<dyn Host>) -> Result<Self, DriverError> {
        let grid = Grid::new(width, height)?;

        let sim = Self {
            grid: Arc::new(Mutex::new(grid)),
            rule: RuleSet::default(),
            interval: Duration::from_millis(DEFAULT_TICK_MILLIS),
            ticker: None,
            host,
        };
        sim.persist();

        Ok(sim)
    }

    /// Swap in a fresh empty grid of the given size.
    pub fn new_grid(&mut self, width: usize, height: usize) -> Result<(), DriverError> {
        let grid = Grid::new(width, height)?;

        *self.lock() = grid;
        info!(width, height, "created new grid");
        self.persist();

        Ok(())
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation()
    }

    /// `(width, height)` of the grid
    pub fn dimensions(&self) -> (usize, usize) {
        let grid = self.lock();
        (grid.width(), grid.height())
    }

    pub fn is_alive(&self, x: Coord, y: Coord) -> bool {
        self.lock().is_alive(x, y)
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn tick_interval(&self) -> Duration {
        self.interval
    }

    pub fn rule(&self) -> RuleSet {
        self.rule
    }

    /// Change the life rule. Takes effect from the next step, or on restart if running.
    pub fn set_rule(&mut self, rule: RuleSet) {
        self.rule = rule;
    }

    /// Run `f` against the grid. No step can happen while `f` runs.
    pub fn with_grid<T>(&self, f: impl FnOnce(&Grid) -> T) -> T {
        f(&self.lock())
    }

    /// Advance one generation by hand
    pub fn step(&mut self) {
        let mut grid = self.lock();
        grid.step_with(&self.rule);
        persist_grid(&grid, self.host.as_ref());
    }

    pub fn toggle(&mut self, x: Coord, y: Coord) -> Result<(), DriverError> {
        self.edit(|grid| grid.toggle(x, y))
    }

    pub fn reset(&mut self) -> Result<(), DriverError> {
        self.edit(Grid::reset)
    }

    pub fn randomize(&mut self) -> Result<(), DriverError> {
        self.edit(Grid::randomize)
    }

    pub fn center_align(&mut self) -> Result<(), DriverError> {
        self.edit(Grid::center_align)
    }

    pub fn stamp(&mut self, pattern: &Pattern, x: Coord, y: Coord) -> Result<(), DriverError> {
        self.edit(|grid| pattern.stamp(grid, x, y))
    }

    /// Apply an edit that is only allowed while the ticker is stopped, then persist.
    fn edit(&mut self, f: impl FnOnce(&mut Grid)) -> Result<(), DriverError> {
        if self.is_running() {
            return Err(DriverError::Running);
        }

        let mut grid = self.lock();
        f(&mut grid);
        persist_grid(&grid, self.host.as_ref());

        Ok(())
    }

    pub fn encode_state(&self) -> Result<Token, DriverError> {
        Ok(codec::encode(&self.lock())?)
    }

    /// Replace the grid with the one stored in `token`. On failure the current grid is kept.
    ///
    /// A successful load is not persisted. The host keeps its previous token until the next
    /// edit, step or stop persists the restored grid.
    pub fn decode_state(&mut self, token: &str) -> Result<(), DriverError> {
        let grid = codec::decode(token)?;

        info!(
            width = grid.width(),
            height = grid.height(),
            "restored grid from token"
        );
        *self.lock() = grid;

        Ok(())
    }

    /// Set the tick interval, clamped to `[10, 1000]` milliseconds. A running ticker is
    /// replaced by one with the new interval.
    pub async fn set_tick_interval_millis(&mut self, ms: u64) -> Result<(), DriverError> {
        let ms = clamp_tick_millis(ms);
        self.interval = Duration::from_millis(ms);
        debug!(ms, "tick interval changed");

        if self.is_running() {
            self.stop().await;
            self.start()?;
        }

        Ok(())
    }

    /// Start stepping the grid once per tick interval. Does nothing if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.is_running() {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| DriverError::NoRuntime)?;
        let (cancel, cancelled) = oneshot::channel();

        let handle = runtime.spawn(tick(
            self.grid.clone(),
            self.host.clone(),
            self.rule,
            self.interval,
            cancelled,
        ));

        self.ticker = Some(Ticker { cancel, handle });
        info!(interval = ?self.interval, "simulation started");

        Ok(())
    }

    /// Stop the ticker and persist the final state. Does nothing if not running.
    pub async fn stop(&mut self) {
        let Some(Ticker { cancel, handle }) = self.ticker.take() else {
            return;
        };

        // The task may already be gone if it panicked.
        let _ = cancel.send(());
        if let Err(err) = handle.await {
            warn!(%err, "ticker task failed");
        }

        info!(generation = self.generation(), "simulation stopped");
        self.persist();
    }

    fn persist(&self) {
        persist_grid(&self.lock(), self.host.as_ref());
    }

    fn lock(&self) -> MutexGuard<'_, Grid> {
        lock(&self.grid)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.cancel.send(());
        }
    }
}

/// A poisoned lock still holds a whole grid, since every mutation swaps or flips cells.
fn lock(grid: &SharedGrid) -> MutexGuard<'_, Grid> {
    grid.lock().unwrap_or_else(PoisonError::into_inner)
}

fn persist_grid(grid: &Grid, host: &dyn Host) {
    match codec::encode(grid) {
        Ok(token) => host.persist(&token),
        Err(err) => warn!(%err, "failed to encode state"),
    }
}

async fn tick(
    grid: SharedGrid,
    host: Arc<dyn Host>,
    rule: RuleSet,
    period: Duration,
    mut cancelled: oneshot::Receiver<()>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            // Either an explicit stop or the simulation being dropped
            _ = &mut cancelled => break,

            _ = interval.tick() => {
                let mut current = lock(&grid);
                current.step_with(&rule);
                persist_grid(&current, host.as_ref());
                host.refresh(&current);
            }
        }
    }

    debug!("ticker exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_interval() {
        assert_eq!(clamp_tick_millis(5), 10);
        assert_eq!(clamp_tick_millis(5000), 1000);
        assert_eq!(clamp_tick_millis(0), MIN_TICK_MILLIS);
        assert_eq!(clamp_tick_millis(250), 250);
        assert_eq!(clamp_tick_millis(MAX_TICK_MILLIS), MAX_TICK_MILLIS);
    }

    struct Quiet;

    impl Host for Quiet {
        fn persist(&self, _token: &Token) {}
    }

    #[test]
    fn start_needs_a_runtime() {
        let mut sim = Simulation::new(4, 4, Arc::new(Quiet)).unwrap();

        assert!(matches!(sim.start(), Err(DriverError::NoRuntime)));
        assert!(!sim.is_running());
    }
}
