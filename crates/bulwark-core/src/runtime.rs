use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use web_time::{Duration, Instant};

use crate::config::{RuntimeConfig, set_config};
use crate::{Clock, View, clock, executor};

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
    static FRAME_REQUESTED: Cell<bool> = const { Cell::new(true) };
}

struct Slot {
    value: Box<dyn Any>,
    pass: u64,
}

/// Composition slots of the current thread, addressed by key path.
#[derive(Default)]
pub struct Composer {
    slots: HashMap<String, Slot>,
    path: Vec<String>,
    cursors: HashMap<String, usize>,
    pass: u64,
}

impl Composer {
    fn path_string(&self) -> String {
        self.path.join("/")
    }

    fn next_positional_key(&mut self) -> String {
        let path = self.path_string();
        let cursor = self.cursors.entry(path.clone()).or_insert(0);
        let key = format!("{path}/#{cursor}");
        *cursor += 1;
        key
    }

    /// Number of live slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) -> Vec<Box<dyn Any>> {
        self.cursors.clear();
        self.slots.drain().map(|(_, s)| s.value).collect()
    }
}

fn lookup_or_insert<T: 'static>(key: String, init: impl FnOnce() -> T) -> Rc<T> {
    let existing = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let pass = c.pass;
        c.slots.get_mut(&key).and_then(|slot| {
            slot.pass = pass;
            slot.value.downcast_ref::<Rc<T>>().cloned()
        })
    });
    if let Some(rc) = existing {
        return rc;
    }

    // `init` may compose or create resources, so it runs without the borrow.
    let rc: Rc<T> = Rc::new(init());
    let replaced = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let pass = c.pass;
        c.slots.insert(
            key.clone(),
            Slot {
                value: Box::new(rc.clone()),
                pass,
            },
        )
    });
    if replaced.is_some() {
        log::warn!(
            "remember: slot '{}' type changed; replacing. \
             If this is due to conditional composition, prefer remember_with_key.",
            key
        );
    }
    rc
}

/// Slot-based remember: the Nth call under the current key path always
/// refers to the Nth stored value.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let key = COMPOSER.with(|c| c.borrow_mut().next_positional_key());
    lookup_or_insert(key, init)
}

/// Key-based remember, stable across conditional branches.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = COMPOSER.with(|c| format!("{}/{}", c.borrow().path_string(), key.into()));
    lookup_or_insert(key, init)
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}

/// Composes `f` one level deeper in the key path. Slots created inside are
/// private to `key`; composing under a new key starts from fresh state.
pub fn keyed<R>(key: impl Into<String>, f: impl FnOnce() -> R) -> R {
    // Pops on unwind too, so a caught panic leaves the path intact.
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            let _ = COMPOSER.try_with(|c| {
                c.borrow_mut().path.pop();
            });
        }
    }
    COMPOSER.with(|c| c.borrow_mut().path.push(key.into()));
    let _guard = Guard;
    f()
}

/// Asks the scheduler for another render pass.
pub fn request_frame() {
    let _ = FRAME_REQUESTED.try_with(|r| r.set(true));
}

/// Output of one render pass.
pub struct Frame {
    pub view: View,
    pub pass: u64,
    pub elapsed: Duration,
}

/// Work done by one `Scheduler::tick`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub timers_fired: usize,
    pub tasks_polled: usize,
    pub callbacks_run: usize,
}

impl TickStats {
    pub fn is_idle(&self) -> bool {
        self.timers_fired == 0 && self.tasks_polled == 0 && self.callbacks_run == 0
    }
}

/// Drives render passes and everything scheduled between them.
pub struct Scheduler {
    config: RuntimeConfig,
    frames: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        crate::error::install_panic_hook();
        set_config(config.clone());
        Self { config, frames: 0 }
    }

    /// Installs `clock` for timers created on this thread.
    pub fn with_clock(self, clock: impl Clock) -> Self {
        clock::set_clock(clock);
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// True when a signal write, settled resource or applied reset asked for
    /// a new pass since the last one started.
    pub fn needs_frame(&self) -> bool {
        FRAME_REQUESTED.with(|r| r.get())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        executor::next_deadline()
    }

    /// Runs one render pass, then unmounts every slot the pass did not visit.
    pub fn frame<F>(&mut self, build_root: F) -> Frame
    where
        F: FnOnce() -> View,
    {
        let started = Instant::now();
        FRAME_REQUESTED.with(|r| r.set(false));
        let pass = COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            c.pass += 1;
            c.cursors.clear();
            c.path.clear();
            c.pass
        });

        let view = build_root();

        // Dropped outside the borrow: unmount cleanups may touch the composer.
        let unmounted: Vec<Box<dyn Any>> = COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            let stale: Vec<String> = c
                .slots
                .iter()
                .filter(|(_, s)| s.pass != pass)
                .map(|(k, _)| k.clone())
                .collect();
            stale
                .into_iter()
                .filter_map(|k| c.slots.remove(&k).map(|s| s.value))
                .collect()
        });
        if !unmounted.is_empty() {
            log::trace!("pass {pass}: unmounted {} slots", unmounted.len());
        }
        drop(unmounted);

        self.frames += 1;
        Frame {
            view,
            pass,
            elapsed: started.elapsed(),
        }
    }

    /// The next scheduling opportunity: fires due timers, polls woken tasks
    /// and runs posted callbacks until nothing is left to do.
    pub fn tick(&mut self) -> TickStats {
        let mut total = TickStats::default();
        for _ in 0..self.config.max_tick_iterations {
            let round = TickStats {
                timers_fired: executor::fire_due_timers(clock::now()),
                tasks_polled: executor::run_ready(),
                callbacks_run: executor::run_posted(),
            };
            if round.is_idle() {
                return total;
            }
            total.timers_fired += round.timers_fired;
            total.tasks_polled += round.tasks_polled;
            total.callbacks_run += round.callbacks_run;
        }
        log::warn!(
            "tick stopped after {} rounds with work still pending",
            self.config.max_tick_iterations
        );
        total
    }

    /// Ticks and renders until no frame is requested.
    pub fn settle<F>(&mut self, mut build_root: F) -> Frame
    where
        F: FnMut() -> View,
    {
        self.tick();
        let mut frame = self.frame(&mut build_root);
        for _ in 0..self.config.max_tick_iterations {
            self.tick();
            if !self.needs_frame() {
                break;
            }
            frame = self.frame(&mut build_root);
        }
        frame
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let slots = COMPOSER.try_with(|c| c.borrow_mut().clear()).unwrap_or_default();
        drop(slots);
    }
}
