// scheduler.rs - Paced tick loop on a dedicated thread with run/pause/stop control

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::cell::Cell;
use crate::engine::{SimulationEngine, TickStats};
use crate::error::SchedulerError;

/// Minimum time between the starts of two ticks.
pub const MIN_TICK: Duration = Duration::from_millis(200);
/// How often a paused loop wakes up on its own.
pub const PAUSE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Stopped,  // terminal
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub min_tick: Duration,
    pub pause_poll: Duration,
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_tick: MIN_TICK,
            pause_poll: PAUSE_POLL,
            thread_name: "life-tick".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn min_tick(mut self, min_tick: Duration) -> Self {
        self.min_tick = min_tick;
        self
    }

    pub fn pause_poll(mut self, pause_poll: Duration) -> Self {
        self.pause_poll = pause_poll;
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Immutable snapshot handed out after each tick.
#[derive(Debug, Clone)]
pub struct Frame {
    pub generation: u64,
    pub cells: Arc<[Cell]>,
    pub stats: TickStats,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            generation: 0,
            cells: Arc::from(Vec::new()),
            stats: TickStats::default(),
        }
    }
}

/// Anything the tick loop can drive.
pub trait Simulation: Send + 'static {
    fn tick(&mut self) -> TickStats;
    fn live_cells(&self) -> Vec<Cell>;
    fn generation(&self) -> u64;
}

impl Simulation for SimulationEngine {
    fn tick(&mut self) -> TickStats {
        SimulationEngine::tick(self)
    }

    fn live_cells(&self) -> Vec<Cell> {
        SimulationEngine::live_cells(self)
    }

    fn generation(&self) -> u64 {
        SimulationEngine::generation(self)
    }
}

/// Receives every frame right after it is produced, on the tick thread.
pub trait Presenter: Send + 'static {
    fn present(&mut self, frame: &Frame);
}

impl<F> Presenter for F
where
    F: FnMut(&Frame) + Send + 'static,
{
    fn present(&mut self, frame: &Frame) {
        self(frame)
    }
}

struct Launch {
    simulation: Box<dyn Simulation>,
    presenter: Option<Box<dyn Presenter>>,
    frames: watch::Sender<Frame>,
}

/// Runs ticks at most once per `min_tick` on its own thread.
///
/// Starts out `Running`. `Running` and `Paused` alternate freely; `Stopped`
/// is final. The simulation moves onto the tick thread at `start()` and is
/// never touched from anywhere else; readers go through `frames()`.
pub struct TickScheduler {
    config: SchedulerConfig,
    state: watch::Sender<RunState>,
    frames: watch::Receiver<Frame>,
    launch: Mutex<Option<Launch>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TickScheduler {
    pub fn new(simulation: impl Simulation, config: SchedulerConfig) -> Self {
        let initial = Frame {
            generation: simulation.generation(),
            cells: Arc::from(simulation.live_cells()),
            stats: TickStats::default(),
        };
        let (frames_tx, frames) = watch::channel(initial);
        let (state, _) = watch::channel(RunState::Running);
        Self {
            config,
            state,
            frames,
            launch: Mutex::new(Some(Launch {
                simulation: Box::new(simulation),
                presenter: None,
                frames: frames_tx,
            })),
            worker: Mutex::new(None),
        }
    }

    /// Must be set before `start()`; ignored afterwards.
    pub fn with_presenter(mut self, presenter: impl Presenter) -> Self {
        let launch = self.launch.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(launch) = launch.as_mut() {
            launch.presenter = Some(Box::new(presenter));
        }
        self
    }

    /// Spawns the tick loop. While the loop is alive this is a resume instead.
    pub fn start(&self) -> Result<(), SchedulerError> {
        let mut worker = lock(&self.worker);
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return self.resume();
        }
        let mut pending = lock(&self.launch);
        if pending.is_none() {
            return Err(SchedulerError::AlreadyStarted);
        }
        if self.state() == RunState::Stopped {
            return Err(SchedulerError::Stopped);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(SchedulerError::Runtime)?;
        let Some(launch) = pending.take() else {
            return Err(SchedulerError::AlreadyStarted);
        };

        let state = self.state.subscribe();
        let config = self.config.clone();
        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || runtime.block_on(run_loop(launch, state, config)))
            .map_err(SchedulerError::Spawn)?;
        *worker = Some(handle);

        info!(thread = %self.config.thread_name, min_tick = ?self.config.min_tick, "tick loop started");
        Ok(())
    }

    pub fn pause(&self) -> Result<(), SchedulerError> {
        self.transition(RunState::Paused)
    }

    pub fn resume(&self) -> Result<(), SchedulerError> {
        self.transition(RunState::Running)
    }

    /// Idempotent. A paused loop notices at once; a ticking one after the
    /// current tick.
    pub fn stop(&self) {
        let changed = self.state.send_if_modified(|current| {
            let was_stopped = *current == RunState::Stopped;
            *current = RunState::Stopped;
            !was_stopped
        });
        if changed {
            info!("run state changed to Stopped");
        }
    }

    /// Waits for the tick thread to exit. Call `stop()` first.
    pub fn join(&self) {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("tick thread panicked outside of a tick");
            }
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn is_alive(&self) -> bool {
        lock(&self.worker).as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Receiver that sees every published frame.
    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    pub fn latest_frame(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Live cells as of the end of the most recent tick.
    pub fn live_cells(&self) -> Arc<[Cell]> {
        Arc::clone(&self.frames.borrow().cells)
    }

    fn transition(&self, next: RunState) -> Result<(), SchedulerError> {
        let mut stopped = false;
        let changed = self.state.send_if_modified(|current| {
            if *current == RunState::Stopped {
                stopped = true;
                return false;
            }
            let changed = *current != next;
            *current = next;
            changed
        });
        if stopped {
            return Err(SchedulerError::Stopped);
        }
        if changed {
            info!(state = ?next, "run state changed");
        }
        Ok(())
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

async fn run_loop(launch: Launch, mut state: watch::Receiver<RunState>, config: SchedulerConfig) {
    let Launch { mut simulation, mut presenter, frames } = launch;
    let mut failures: u64 = 0;
    // Earliest start of the next tick. Survives pause/resume, so toggling
    // the state never shortens the period.
    let mut next_tick = Instant::now();

    debug!("starting game loop");
    loop {
        let current = *state.borrow_and_update();
        match current {
            RunState::Stopped => break,
            RunState::Paused => {
                debug!("sleeping while game is paused");
                // Ok(Err(_)) means the scheduler handle is gone.
                if let Ok(Err(_)) = time::timeout(config.pause_poll, state.changed()).await {
                    break;
                }
                continue;
            }
            RunState::Running => {}
        }

        if Instant::now() < next_tick {
            tokio::select! {
                _ = time::sleep_until(next_tick) => {}
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        let started = Instant::now();
        next_tick = started + config.min_tick;
        match panic::catch_unwind(AssertUnwindSafe(|| simulation.tick())) {
            Ok(stats) => {
                let frame = Frame {
                    generation: stats.generation,
                    cells: Arc::from(simulation.live_cells()),
                    stats,
                };
                frames.send_replace(frame.clone());
                debug!(
                    generation = stats.generation,
                    population = stats.population,
                    births = stats.births,
                    deaths = stats.deaths,
                    touched = stats.touched,
                    cache_hits = stats.cache_hits,
                    "tick"
                );

                if let Some(presenter) = presenter.as_mut() {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| presenter.present(&frame))) {
                        failures += 1;
                        error!(failures, reason = panic_message(payload.as_ref()), "presenter failed, continuing");
                    }
                }
            }
            Err(payload) => {
                failures += 1;
                error!(failures, reason = panic_message(payload.as_ref()), "tick failed, continuing");
            }
        }

        let elapsed = started.elapsed();
        if elapsed >= config.min_tick {
            warn!(?elapsed, budget = ?config.min_tick, "tick exceeded its budget");
        }
    }
    debug!(failures, "stopping game loop");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
