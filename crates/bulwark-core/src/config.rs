use std::cell::RefCell;

/// Knobs for one render loop. Installed per thread by `Scheduler::with_config`.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Entries kept by an `ErrorLog` created with `ErrorLog::from_config`.
    pub error_log_capacity: usize,
    /// Upper bound on timer/task/callback rounds in a single `Scheduler::tick`.
    pub max_tick_iterations: usize,
    /// Whether built-in fallbacks print the failure message and origin.
    pub show_failure_details: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            error_log_capacity: 10,
            max_tick_iterations: 1024,
            show_failure_details: cfg!(debug_assertions),
        }
    }
}

thread_local! {
    static CONFIG: RefCell<RuntimeConfig> = RefCell::new(RuntimeConfig::default());
}

pub fn config() -> RuntimeConfig {
    CONFIG.with(|c| c.borrow().clone())
}

pub fn set_config(config: RuntimeConfig) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}
