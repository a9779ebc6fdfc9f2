//! Periodic tick source for the engine.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::clock::Clock;
use super::engine::PomodoroEngine;
use crate::events::Event;

/// Drive `engine` with `on_tick()` every `interval` for as long as it runs.
///
/// `on_frame` sees the engine after each tick together with any event the
/// tick produced. It may stop the engine, which ends the loop, or return
/// `ControlFlow::Break` to leave the engine running and return. Returns the
/// number of frames delivered.
pub async fn run_ticks<C, F>(engine: &mut PomodoroEngine<C>, interval: Duration, mut on_frame: F) -> u64
where
    C: Clock,
    F: FnMut(&mut PomodoroEngine<C>, Option<Event>) -> ControlFlow<()>,
{
    let mut ticker = tokio::time::interval(interval);
    // Remaining time comes from the deadline, so catching up is pointless.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frames = 0;
    while engine.is_running() {
        ticker.tick().await;
        let event = engine.on_tick();
        frames += 1;
        if on_frame(engine, event).is_break() {
            break;
        }
    }
    frames
}
