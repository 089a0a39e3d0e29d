// error.rs - Scheduler lifecycle errors

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The loop already ran and exited; a scheduler drives one loop in its life.
    #[error("tick loop already ran; a scheduler cannot be started twice")]
    AlreadyStarted,
    /// Stopped is terminal.
    #[error("scheduler is stopped")]
    Stopped,
    #[error("failed to build the tick runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to spawn the tick thread: {0}")]
    Spawn(#[source] io::Error),
}
