//! Frame-stepped session with a simulated table view
//!
//! Handlers behave like the network-backed ones of a real app: they return
//! immediately and schedule their completion `load_time` seconds later on the
//! simulation clock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use brink_animation::AnimationScheduler;
use brink_core::{Edge, Rect, Size};
use brink_refresh::{EdgeState, RefreshConfig, RefreshExt, ScrollContainer, ScrollView};
use tracing::{debug, info};

use crate::config::{BrinkConfig, DemoConfig};

struct Job {
    due: f32,
    run: Box<dyn FnOnce()>,
}

type Jobs = Rc<RefCell<Vec<Job>>>;

fn schedule(jobs: &Jobs, due: f32, run: impl FnOnce() + 'static) {
    jobs.borrow_mut().push(Job {
        due,
        run: Box::new(run),
    });
}

/// Counters reported at the end of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub refreshes: u32,
    pub loads: u32,
    pub frames: u64,
}

pub struct Simulation {
    demo: DemoConfig,
    refresh: RefreshConfig,
    scheduler: AnimationScheduler,
    view: Rc<ScrollView>,
    rows: Rc<Cell<u32>>,
    clock: Rc<Cell<f32>>,
    jobs: Jobs,
    stats: Rc<Cell<Stats>>,
    last_states: [Option<EdgeState>; 2],
}

fn content_size(demo: &DemoConfig, rows: u32) -> Size {
    Size::new(demo.viewport_width, rows as f32 * demo.row_height)
}

impl Simulation {
    pub fn new(config: &BrinkConfig) -> Self {
        let demo = config.demo;
        let scheduler = AnimationScheduler::new();
        let view = ScrollView::with_config(
            Rect::new(0.0, 0.0, demo.viewport_width, demo.viewport_height),
            scheduler.handle(),
            config.refresh,
        );
        view.set_content_size(content_size(&demo, demo.initial_rows));

        Self {
            demo,
            refresh: config.refresh,
            scheduler,
            view,
            rows: Rc::new(Cell::new(demo.initial_rows)),
            clock: Rc::new(Cell::new(0.0)),
            jobs: Rc::new(RefCell::new(Vec::new())),
            stats: Rc::new(Cell::new(Stats::default())),
            last_states: [None; 2],
        }
    }

    pub fn view(&self) -> &Rc<ScrollView> {
        &self.view
    }

    pub fn rows(&self) -> u32 {
        self.rows.get()
    }

    pub fn stats(&self) -> Stats {
        self.stats.get()
    }

    /// Simulation clock in seconds
    pub fn now(&self) -> f32 {
        self.clock.get()
    }

    fn dt(&self) -> f32 {
        1.0 / self.demo.fps.max(1) as f32
    }

    /// Refresh resets the list to its initial rows
    pub fn enable_pull_to_refresh(&self) {
        let demo = self.demo;
        let jobs = Rc::clone(&self.jobs);
        let clock = Rc::clone(&self.clock);
        let rows = Rc::clone(&self.rows);
        let stats = Rc::clone(&self.stats);
        let weak = Rc::downgrade(&self.view);

        self.view.add_pull_to_refresh_handler(move || {
            let mut s = stats.get();
            s.refreshes += 1;
            stats.set(s);
            info!(at = clock.get(), "refresh started");

            let rows = Rc::clone(&rows);
            let weak = weak.clone();
            schedule(&jobs, clock.get() + demo.load_time, move || {
                rows.set(demo.initial_rows);
                if let Some(view) = weak.upgrade() {
                    view.set_content_size(content_size(&demo, demo.initial_rows));
                    view.stop_animating(Edge::Top);
                }
            });
        });
    }

    /// Each load appends a page of rows
    pub fn enable_infinite_scrolling(&self) {
        let demo = self.demo;
        let jobs = Rc::clone(&self.jobs);
        let clock = Rc::clone(&self.clock);
        let rows = Rc::clone(&self.rows);
        let stats = Rc::clone(&self.stats);
        let weak = Rc::downgrade(&self.view);

        self.view.add_infinite_scrolling_handler(move || {
            let mut s = stats.get();
            s.loads += 1;
            stats.set(s);
            info!(at = clock.get(), rows = rows.get(), "loading more");

            let rows = Rc::clone(&rows);
            let weak = weak.clone();
            schedule(&jobs, clock.get() + demo.load_time, move || {
                rows.set(rows.get() + demo.rows_per_page);
                if let Some(view) = weak.upgrade() {
                    view.set_content_size(content_size(&demo, rows.get()));
                    view.stop_animating(Edge::Bottom);
                }
            });
        });
    }

    /// Run `f` once `delay` seconds have passed on the simulation clock
    pub fn after(&self, delay: f32, f: impl FnOnce() + 'static) {
        schedule(&self.jobs, self.now() + delay, f);
    }

    /// Advance one frame
    pub fn step(&mut self) {
        let dt = self.dt();
        self.clock.set(self.clock.get() + dt);
        self.scheduler.tick(dt);

        let now = self.clock.get();
        let due: Vec<Job> = {
            let mut jobs = self.jobs.borrow_mut();
            let (due, pending) = jobs.drain(..).partition(|job| job.due <= now);
            *jobs = pending;
            due
        };
        for job in due {
            (job.run)();
        }

        self.view.layout_edges();
        self.report_transitions();

        let mut stats = self.stats.get();
        stats.frames += 1;
        self.stats.set(stats);
    }

    fn report_transitions(&mut self) {
        for (slot, edge) in Edge::ALL.into_iter().enumerate() {
            let state = self.view.edge_state(edge);
            if state != self.last_states[slot] {
                if let (Some(from), Some(to)) = (self.last_states[slot], state) {
                    info!(%edge, ?from, ?to, at = self.now(), "edge state changed");
                }
                self.last_states[slot] = state;
            }
        }
    }

    pub fn run_for(&mut self, seconds: f32) {
        let frames = (seconds / self.dt()).ceil().max(0.0) as u64;
        for _ in 0..frames {
            self.step();
        }
    }

    /// Step until `done` holds; false if `max_seconds` ran out first
    pub fn run_until(&mut self, max_seconds: f32, done: impl Fn(&Simulation) -> bool) -> bool {
        let deadline = self.now() + max_seconds;
        while !done(self) {
            if self.now() >= deadline {
                return false;
            }
            self.step();
        }
        true
    }

    /// Drag the content to `to_y` over `duration` seconds, then let go
    pub fn drag(&mut self, to_y: f32, duration: f32) {
        let from_y = self.view.content_offset().y;
        let frames = (duration / self.dt()).ceil().max(1.0) as u32;
        debug!(from_y, to_y, frames, "drag");

        self.view.begin_drag();
        for frame in 1..=frames {
            let t = frame as f32 / frames as f32;
            self.view.drag_to(from_y + (to_y - from_y) * t);
            self.step();
        }
        self.view.end_drag();
        self.step();
    }

    /// Wait for inset transitions, then bounce back into range
    pub fn settle(&mut self) {
        let wait = self
            .refresh
            .top
            .inset_duration
            .max(self.refresh.bottom.inset_duration)
            + 0.1;
        self.run_for(wait);
        self.view.settle(true);
        self.run_for(wait);
    }

    /// Offset a drag must reach to arm the bottom edge, plus some margin
    pub fn load_more_offset(&self) -> f32 {
        let slack = self.refresh.bottom.slack;
        let scrollable = self.view.content_size().height - self.view.bounds().height();
        scrollable.max(0.0) + slack + 20.0
    }

    pub fn load_time(&self) -> f32 {
        self.demo.load_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> BrinkConfig {
        let mut config = BrinkConfig::default();
        config.demo.load_time = 1.0;
        config
    }

    #[test]
    fn test_pull_session_refreshes_once() {
        let mut sim = Simulation::new(&quick_config());
        sim.enable_pull_to_refresh();

        sim.drag(-90.0, 0.3);
        assert_eq!(sim.view().edge_state(Edge::Top), Some(EdgeState::Loading));
        sim.settle();
        assert_eq!(sim.view().content_offset().y, -60.0);

        let load_time = sim.load_time();
        assert!(sim.run_until(load_time + 1.0, |s| {
            s.view().edge_state(Edge::Top) == Some(EdgeState::Idle)
        }));
        sim.settle();

        assert_eq!(sim.stats().refreshes, 1);
        assert_eq!(sim.view().content_inset().top, 0.0);
        assert_eq!(sim.view().content_offset().y, 0.0);
    }

    #[test]
    fn test_load_more_appends_pages() {
        let mut sim = Simulation::new(&quick_config());
        sim.enable_infinite_scrolling();

        for _ in 0..3 {
            let target = sim.load_more_offset();
            sim.drag(target, 0.4);
            assert_eq!(sim.view().edge_state(Edge::Bottom), Some(EdgeState::Loading));

            let load_time = sim.load_time();
            assert!(sim.run_until(load_time + 1.0, |s| {
                s.view().edge_state(Edge::Bottom) == Some(EdgeState::Idle)
            }));
            sim.settle();
        }

        assert_eq!(sim.stats().loads, 3);
        assert_eq!(sim.rows(), 10 + 3 * 4);
        assert_eq!(sim.view().content_inset().bottom, 0.0);
    }

    #[test]
    fn test_programmatic_refresh_scrolls_back() {
        let mut sim = Simulation::new(&quick_config());
        sim.enable_pull_to_refresh();

        let weak = Rc::downgrade(sim.view());
        sim.after(1.0, move || {
            if let Some(view) = weak.upgrade() {
                view.trigger(Edge::Top);
            }
        });

        assert!(sim.run_until(2.0, |s| {
            s.view().edge_state(Edge::Top) == Some(EdgeState::Loading)
        }));
        assert!(sim.run_until(2.0, |s| {
            s.view().edge_state(Edge::Top) == Some(EdgeState::Idle)
        }));
        sim.run_for(0.5);

        assert_eq!(sim.stats().refreshes, 1);
        assert_eq!(sim.view().content_offset().y, 0.0);
    }
}
