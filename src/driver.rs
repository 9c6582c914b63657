//! Frame driver
//!
//! Owns the simulation and its collaborators and runs the tick loop:
//! request a frame, tick with the current input, draw, forward events, and
//! request the next frame while the simulation keeps running.
//!
//! Everything is single threaded. The app lives in an `Rc<RefCell<..>>`;
//! scheduled frames and service callbacks hold a `Weak` to it and no borrow
//! is held while calling into the scheduler or a service. Each loop run gets
//! a generation number so a frame requested by an earlier run does nothing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::{HighScoreService, Presenter};
use crate::consts::LEADERBOARD_SIZE;
use crate::highscores::{HighScoreEntry, top_entries};
use crate::platform::{FrameClock, InputState, TickHandle, TickScheduler};
use crate::renderer::{DrawSurface, draw_frame};
use crate::sim::{Hud, Simulation, tick};

/// Shown to the player when a score submission fails
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit score";

/// Game instance holding all state
pub struct App<S, D> {
    pub sim: Simulation,
    /// Written by input handlers, read once per tick
    pub input: InputState,
    scheduler: Rc<S>,
    surface: D,
    presenter: Box<dyn Presenter>,
    scores: Rc<dyn HighScoreService>,
    clock: FrameClock,
    pending: Option<TickHandle>,
    generation: u64,
    background_grid: bool,
}

pub type SharedApp<S, D> = Rc<RefCell<App<S, D>>>;

impl<S, D> App<S, D>
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    pub fn new(
        sim: Simulation,
        scheduler: Rc<S>,
        surface: D,
        presenter: Box<dyn Presenter>,
        scores: Rc<dyn HighScoreService>,
    ) -> Self {
        let input = InputState::new(sim.tuning.swipe_threshold);
        let clock = FrameClock::new(sim.tuning.reference_frame_ms);
        Self {
            sim,
            input,
            scheduler,
            surface,
            presenter,
            scores,
            clock,
            pending: None,
            generation: 0,
            background_grid: true,
        }
    }

    pub fn with_background_grid(mut self, enabled: bool) -> Self {
        self.background_grid = enabled;
        self
    }

    pub fn into_shared(self) -> SharedApp<S, D> {
        Rc::new(RefCell::new(self))
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn hud(&self) -> Hud {
        self.sim.hud()
    }

    /// True while a frame is scheduled
    pub fn is_looping(&self) -> bool {
        self.pending.is_some()
    }

    /// Draw the current state without ticking
    pub fn draw(&mut self) {
        draw_frame(&self.sim, &mut self.surface, self.background_grid);
    }

    fn dispatch_events(&mut self) {
        for event in self.sim.drain_events() {
            self.presenter.notify(&event);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
    }

    /// Invalidate the running loop, including any frame already in flight
    fn halt(&mut self) {
        self.cancel_pending();
        self.generation += 1;
    }
}

/// Start a fresh run (idle only)
pub fn start<S, D>(app: &SharedApp<S, D>) -> bool
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let started = {
        let mut a = app.borrow_mut();
        let started = a.sim.start();
        a.dispatch_events();
        started
    };
    if started {
        begin_loop(app);
    }
    started
}

/// Resume at the next level (level cleared only)
pub fn continue_level<S, D>(app: &SharedApp<S, D>) -> bool
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let resumed = {
        let mut a = app.borrow_mut();
        let resumed = a.sim.continue_level();
        a.dispatch_events();
        resumed
    };
    if resumed {
        begin_loop(app);
    }
    resumed
}

/// Back to idle after a game over, then refresh the leaderboard
pub fn restart<S, D>(app: &SharedApp<S, D>) -> bool
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let restarted = {
        let mut a = app.borrow_mut();
        if a.sim.restart() {
            a.halt();
            a.dispatch_events();
            a.draw();
            true
        } else {
            false
        }
    };
    if restarted {
        log::info!("Game reset, waiting for start");
        fetch_leaderboard(app);
    }
    restarted
}

/// Abandon a level-cleared or finished run and go idle
pub fn reset<S, D>(app: &SharedApp<S, D>) -> bool
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let mut a = app.borrow_mut();
    if !a.sim.reset() {
        return false;
    }
    a.halt();
    a.dispatch_events();
    a.draw();
    true
}

/// Stop scheduling frames without touching the simulation
pub fn stop<S, D>(app: &SharedApp<S, D>)
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    app.borrow_mut().halt();
}

/// Restart the loop after [`stop`] if the run is still in progress
pub fn resume<S, D>(app: &SharedApp<S, D>) -> bool
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let can_resume = {
        let a = app.borrow();
        a.sim.is_running() && !a.is_looping()
    };
    if can_resume {
        begin_loop(app);
    }
    can_resume
}

fn begin_loop<S, D>(app: &SharedApp<S, D>)
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    {
        let mut a = app.borrow_mut();
        a.halt();
        let now = a.scheduler.now();
        a.clock.restart(now);
    }
    request_frame(app);
}

fn request_frame<S, D>(app: &SharedApp<S, D>)
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let (scheduler, generation) = {
        let a = app.borrow();
        (a.scheduler.clone(), a.generation)
    };
    let weak = Rc::downgrade(app);
    let handle = scheduler.request_tick(Box::new(move |now| {
        if let Some(app) = weak.upgrade() {
            frame(&app, generation, now);
        }
    }));
    if handle.is_none() {
        log::warn!("Frame request refused, loop stopped");
    }
    app.borrow_mut().pending = handle;
}

fn frame<S, D>(app: &SharedApp<S, D>, generation: u64, now: f64)
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let keep_going = {
        let mut a = app.borrow_mut();
        if a.generation != generation {
            // Requested by a loop that has since been stopped
            return;
        }
        a.pending = None;
        if !a.sim.is_running() {
            return;
        }

        let elapsed = a.clock.elapsed(now);
        let intent = a.input.intent();
        tick(&mut a.sim, intent, elapsed);
        a.draw();
        a.dispatch_events();
        a.sim.is_running()
    };
    if keep_going {
        request_frame(app);
    }
}

/// Submit the current score under `name` (blank names become "Player")
///
/// Completion is reported to the presenter; a failure never touches the
/// simulation and is not retried.
pub fn submit_score<S, D>(app: &SharedApp<S, D>, name: &str)
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let (service, entry) = {
        let a = app.borrow();
        (a.scores.clone(), HighScoreEntry::new(name, a.sim.score))
    };
    log::info!("Submitting score {} for {}", entry.score, entry.name);

    let weak = Rc::downgrade(app);
    service.submit_score(
        entry,
        Box::new(move |result| {
            let Some(app) = weak.upgrade() else {
                return;
            };
            match result {
                Ok(()) => {
                    app.borrow_mut().presenter.score_submitted();
                    fetch_leaderboard(&app);
                }
                Err(e) => {
                    log::warn!("Score submission failed: {}", e);
                    app.borrow_mut().presenter.show_error(SUBMIT_FAILED_MESSAGE);
                }
            }
        }),
    );
}

/// Fetch the leaderboard and hand the top entries to the presenter
///
/// Failures are only logged.
pub fn fetch_leaderboard<S, D>(app: &SharedApp<S, D>)
where
    S: TickScheduler + 'static,
    D: DrawSurface + 'static,
{
    let service = app.borrow().scores.clone();
    let weak = Rc::downgrade(app);
    service.fetch_leaderboard(Box::new(move |result| {
        let Some(app) = weak.upgrade() else {
            return;
        };
        match result {
            Ok(entries) => {
                let shown = top_entries(&entries, LEADERBOARD_SIZE);
                app.borrow_mut().presenter.leaderboard_loaded(shown);
            }
            Err(e) => log::error!("Failed to load leaderboard: {}", e),
        }
    }));
}
