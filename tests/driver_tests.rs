use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use gameoflife::codec;
use gameoflife::codec::Token;
use gameoflife::driver::DriverError;
use gameoflife::driver::Host;
use gameoflife::driver::Simulation;
use gameoflife::grid::Grid;
use gameoflife::pattern;
use tokio::time::sleep;

#[derive(Default)]
struct Recorder {
    tokens: Mutex<Vec<Token>>,
    refreshes: AtomicUsize,
}

impl Recorder {
    fn persisted(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    fn last(&self) -> Token {
        self.tokens.lock().unwrap().last().cloned().unwrap()
    }
}

impl Host for Recorder {
    fn persist(&self, token: &Token) {
        self.tokens.lock().unwrap().push(token.clone());
    }

    fn refresh(&self, _grid: &Grid) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

fn blinker() -> (Simulation, Arc<Recorder>) {
    let host = Arc::new(Recorder::default());
    let mut sim = Simulation::new(5, 5, host.clone()).unwrap();

    for x in 1..4 {
        sim.toggle(x, 2).unwrap();
    }

    (sim, host)
}

#[test]
fn every_change_is_persisted() {
    let (mut sim, host) = blinker();

    // Creation plus three toggles
    assert_eq!(host.persisted(), 4);

    sim.step();
    assert_eq!(host.persisted(), 5);
    assert_eq!(host.refreshes.load(Ordering::SeqCst), 0);

    let grid = codec::decode(host.last().as_str()).unwrap();
    assert_eq!(grid.to_string(), ".....\n..O..\n..O..\n..O..\n.....");
}

#[tokio::test(start_paused = true)]
async fn ticker_steps_once_per_interval() {
    let (mut sim, host) = blinker();
    assert_eq!(sim.tick_interval(), Duration::from_millis(50));

    sim.start().unwrap();
    assert!(sim.is_running());

    sleep(Duration::from_millis(220)).await;
    assert_eq!(sim.generation(), 4);
    assert_eq!(host.refreshes.load(Ordering::SeqCst), 4);

    sim.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_halts_and_persists() {
    let (mut sim, host) = blinker();

    sim.start().unwrap();
    sleep(Duration::from_millis(120)).await;
    sim.stop().await;

    assert!(!sim.is_running());
    assert_eq!(sim.generation(), 2);

    let saved = codec::decode(host.last().as_str()).unwrap();
    sim.with_grid(|grid| assert_eq!(saved.to_rows(), grid.to_rows()));

    let persisted = host.persisted();
    sleep(Duration::from_millis(500)).await;
    assert_eq!(sim.generation(), 2);
    assert_eq!(host.persisted(), persisted);

    // Stopping twice is harmless.
    sim.stop().await;
    assert_eq!(host.persisted(), persisted);
}

#[tokio::test(start_paused = true)]
async fn edits_are_refused_while_running() {
    let (mut sim, _host) = blinker();
    let glider = pattern::find("Glider").unwrap();

    sim.start().unwrap();
    let before = sim.with_grid(Grid::to_rows);

    assert!(matches!(sim.toggle(0, 0), Err(DriverError::Running)));
    assert!(matches!(sim.reset(), Err(DriverError::Running)));
    assert!(matches!(sim.randomize(), Err(DriverError::Running)));
    assert!(matches!(sim.center_align(), Err(DriverError::Running)));
    assert!(matches!(sim.stamp(glider, 0, 0), Err(DriverError::Running)));
    assert_eq!(sim.with_grid(Grid::to_rows), before);

    sim.stop().await;

    sim.toggle(0, 0).unwrap();
    assert!(sim.is_alive(0, 0));
}

#[tokio::test(start_paused = true)]
async fn rate_change_restarts_the_ticker() {
    let (mut sim, _host) = blinker();

    sim.start().unwrap();
    sleep(Duration::from_millis(120)).await;
    assert_eq!(sim.generation(), 2);

    sim.set_tick_interval_millis(200).await.unwrap();
    assert!(sim.is_running());
    assert_eq!(sim.tick_interval(), Duration::from_millis(200));

    // The new ticker first fires one full period after the change.
    sleep(Duration::from_millis(190)).await;
    assert_eq!(sim.generation(), 2);

    sleep(Duration::from_millis(20)).await;
    assert_eq!(sim.generation(), 3);

    sim.stop().await;
}

#[tokio::test(start_paused = true)]
async fn interval_is_clamped() {
    let (mut sim, _host) = blinker();

    sim.set_tick_interval_millis(5).await.unwrap();
    assert_eq!(sim.tick_interval(), Duration::from_millis(10));

    sim.set_tick_interval_millis(5000).await.unwrap();
    assert_eq!(sim.tick_interval(), Duration::from_millis(1000));

    assert!(!sim.is_running());
}

#[test]
fn failed_decode_keeps_the_grid() {
    let (mut sim, host) = blinker();
    let before = sim.with_grid(Grid::clone);
    let persisted = host.persisted();

    assert!(matches!(
        sim.decode_state("definitely not a token"),
        Err(DriverError::Codec(_))
    ));

    sim.with_grid(|grid| assert_eq!(*grid, before));
    assert_eq!(host.persisted(), persisted);
}

#[test]
fn decode_replaces_grid_and_dimensions() {
    let (mut sim, _host) = blinker();
    let other: Grid = "O..\n.O.".parse().unwrap();
    let token = codec::encode(&other).unwrap();

    sim.step();
    sim.decode_state(token.as_str()).unwrap();

    assert_eq!(sim.dimensions(), (3, 2));
    assert_eq!(sim.generation(), 0);
    assert!(sim.is_alive(1, 1));
}

#[test]
fn invalid_dimensions_are_rejected() {
    let host = Arc::new(Recorder::default());

    assert!(matches!(
        Simulation::new(0, 3, host.clone()),
        Err(DriverError::Grid(_))
    ));

    let mut sim = Simulation::new(2, 2, host).unwrap();
    assert!(sim.new_grid(4, 0).is_err());
    assert_eq!(sim.dimensions(), (2, 2));
}

#[test]
fn unencodable_grid_is_not_persisted() {
    let host = Arc::new(Recorder::default());

    let sim = Simulation::new(4100, 4100, host.clone()).unwrap();

    assert!(matches!(sim.encode_state(), Err(DriverError::Codec(_))));
    assert_eq!(host.persisted(), 0);
}

#[test]
fn loaded_grid_is_persisted_on_the_next_change() {
    let (mut sim, host) = blinker();
    let other: Grid = "OO.\nOO.".parse().unwrap();
    let token = codec::encode(&other).unwrap();
    let persisted = host.persisted();

    sim.decode_state(token.as_str()).unwrap();
    assert_eq!(host.persisted(), persisted);

    sim.step();
    assert_eq!(host.persisted(), persisted + 1);

    // A block is still, so the persisted grid is the loaded one.
    assert_eq!(codec::decode(host.last().as_str()).unwrap(), other);
}
