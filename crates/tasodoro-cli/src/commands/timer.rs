use std::io::Write;
use std::ops::ControlFlow;

use clap::Subcommand;
use crossterm::style::{Color, Stylize};
use tasodoro_core::{
    bar_cells, run_ticks, Clock, Config, Database, Event, PomodoroEngine, RingStyle,
    SettingsStore, SystemClock,
};

use super::{load_engine, print_report, save_engine, Report};

const BAR_WIDTH: usize = 30;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a work period, or resume a paused one
    Start,
    /// Pause the running period
    Stop,
    /// Return to the idle state and clear the pomodoro count
    Reset,
    /// Finish the current period early and start the next
    Skip,
    /// Print current timer state as JSON
    Status,
    /// Follow the running timer until interrupted
    Watch {
        /// Exit after this many frames
        #[arg(long)]
        frames: Option<u64>,
    },
}

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let settings = SettingsStore::open(&db)?;
    let mut engine = load_engine(&db, &settings);

    match action {
        TimerAction::Watch { frames } => watch(&mut engine, config, frames)?,
        action => print_report(&execute(action, &mut engine))?,
    }

    save_engine(&db, &engine)?;
    Ok(())
}

/// Catch up with wall-clock time, then apply a one-shot command.
fn execute<C: Clock>(action: TimerAction, engine: &mut PomodoroEngine<C>) -> Report {
    let caught_up = engine.on_tick();
    let event = match action {
        TimerAction::Start => engine.start(),
        TimerAction::Stop => engine.stop(),
        TimerAction::Reset => engine.reset(),
        TimerAction::Skip => engine.transition_to_next_state(),
        TimerAction::Status | TimerAction::Watch { .. } => None,
    };
    Report::new(caught_up, event, engine)
}

fn watch(
    engine: &mut PomodoroEngine<SystemClock>,
    config: &Config,
    max_frames: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !engine.is_running() {
        println!("{}", status_line(engine, config));
        println!("timer is not running; use `tasodoro timer start`");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let interval = config.tick_interval();

    runtime.block_on(async {
        let mut shown = 0u64;
        let ticking = run_ticks(engine, interval, |engine, event| {
            let mut out = std::io::stdout().lock();
            if let Some(Event::PeriodCompleted { finished, next, completed_pomodoros, .. }) = &event {
                let _ = writeln!(
                    out,
                    "\r{:?} finished, starting {:?} (pomodoros: {completed_pomodoros})",
                    finished, next
                );
            }
            let _ = write!(out, "\r{}", status_line(engine, config));
            let _ = out.flush();

            shown += 1;
            match max_frames {
                Some(max) if shown >= max => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        });

        tokio::select! {
            _ = ticking => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("watch interrupted");
            }
        }
    });
    println!();
    Ok(())
}

fn status_line<C: Clock>(engine: &PomodoroEngine<C>, config: &Config) -> String {
    format!(
        "{:<20} {} {} #{}",
        engine.label(),
        engine.time_display(),
        colored_bar(engine.progress(), &config.ring_style(engine.color())),
        engine.completed_pomodoros()
    )
}

/// Text ring: remaining cells in the period's color over the track color.
fn colored_bar(progress: f64, style: &RingStyle) -> String {
    let filled = bar_cells(progress, BAR_WIDTH);
    let rgb = |c: Option<(u8, u8, u8)>| c.map(|(r, g, b)| Color::Rgb { r, g, b });
    let paint = |cells: String, color: Option<Color>| match color {
        Some(color) => cells.with(color).to_string(),
        None => cells,
    };
    format!(
        "[{}{}]",
        paint("#".repeat(filled), rgb(style.progress_rgb())),
        paint("-".repeat(BAR_WIDTH - filled), rgb(style.track_rgb())),
    )
}
