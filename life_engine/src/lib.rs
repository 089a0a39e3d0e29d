// lib.rs - Touch-driven Conway's Game of Life on an unbounded grid
//
// Input flows in through `PendingInputBuffer`, the `SimulationEngine` turns it
// into live cells once per tick, and the `TickScheduler` paces the ticks on
// its own thread and hands out immutable `Frame` snapshots.

pub mod cell;
pub mod engine;
pub mod error;
pub mod input;
pub mod patterns;
pub mod scheduler;
pub mod viewport;

pub use cell::{Cell, Touch};
pub use engine::{Generation, NeighborCache, SimulationEngine, TickStats, next_generation};
pub use error::SchedulerError;
pub use input::PendingInputBuffer;
pub use patterns::{PATTERNS, Pattern};
pub use scheduler::{Frame, MIN_TICK, PAUSE_POLL, Presenter, RunState, SchedulerConfig, Simulation, TickScheduler};
pub use viewport::{Bounds, Viewport};
