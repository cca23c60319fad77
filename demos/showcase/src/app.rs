use std::fmt;
use std::thread;

use bulwark_core::prelude::*;
use bulwark_devtools::Inspector;
use bulwark_ui::*;

use crate::pages;
use crate::ui::TopBar;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Page {
    Basic,
    Fallback,
    Logging,
    Suspense,
    Lazy,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Basic,
        Page::Fallback,
        Page::Logging,
        Page::Suspense,
        Page::Lazy,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Basic => "Basic Error Boundary",
            Page::Fallback => "Fallback UI",
            Page::Logging => "Error Logging",
            Page::Suspense => "Suspense",
            Page::Lazy => "Lazy Loading",
        }
    }

    pub fn script(self) -> Vec<Step> {
        match self {
            Page::Basic => pages::basic::script(),
            Page::Fallback => pages::fallback::script(),
            Page::Logging => pages::logging::script(),
            Page::Suspense => pages::suspense::script(),
            Page::Lazy => pages::lazy::script(),
        }
    }
}

/// One scripted interaction.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Click(&'static str),
    Wait(Duration),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Click(label) => write!(f, "click {label:?}"),
            Step::Wait(d) => write!(f, "wait {d:?}"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub realtime: bool,
    pub inspector: bool,
    pub hide_details: bool,
}

/// What the page looked like after a step.
pub struct Transcript {
    pub step: String,
    pub view: View,
    pub overlay: Option<View>,
}

fn app(page: Page, log: &ErrorLog) -> View {
    keyed(page.title(), || {
        let content = match page {
            Page::Basic => pages::basic::screen(),
            Page::Fallback => pages::fallback::screen(),
            Page::Logging => pages::logging::screen(log),
            Page::Suspense => pages::suspense::screen(),
            Page::Lazy => pages::lazy::screen(),
        };
        Column().child((TopBar(&format!("Bulwark Showcase / {}", page.title())), content))
    })
}

/// Mounts one page and plays its script, settling after every step.
pub struct Driver {
    scheduler: Scheduler,
    clock: Option<ManualClock>,
    inspector: Inspector,
    log: ErrorLog,
}

impl Driver {
    pub fn new(options: &Options) -> Self {
        let config = RuntimeConfig {
            show_failure_details: !options.hide_details && RuntimeConfig::default().show_failure_details,
            ..RuntimeConfig::default()
        };
        let mut scheduler = Scheduler::with_config(config);
        let clock = (!options.realtime).then(ManualClock::new);
        if let Some(clock) = &clock {
            scheduler = scheduler.with_clock(clock.clone());
        }
        let log = ErrorLog::from_config();
        let mut inspector = Inspector::new().with_log(log.clone());
        if options.inspector {
            inspector.toggle();
        }
        Self {
            scheduler,
            clock,
            inspector,
            log,
        }
    }

    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    pub fn run(&mut self, page: Page) -> anyhow::Result<Vec<Transcript>> {
        self.run_script(page, &page.script())
    }

    pub fn run_script(&mut self, page: Page, script: &[Step]) -> anyhow::Result<Vec<Transcript>> {
        log::info!("showcase: {} ({} steps)", page.title(), script.len());
        let log = self.log.clone();
        let mut root = move || app(page, &log);

        let frame = self.scheduler.settle(&mut root);
        let mut out = vec![self.record("mount".to_string(), frame)];
        for step in script {
            match step {
                Step::Click(label) => {
                    let clicked = out.last().is_some_and(|t| t.view.click(label));
                    if !clicked {
                        anyhow::bail!("no button labelled {label:?} on the {} page", page.title());
                    }
                }
                Step::Wait(d) => self.wait(*d),
            }
            let frame = self.scheduler.settle(&mut root);
            out.push(self.record(step.to_string(), frame));
        }
        Ok(out)
    }

    fn wait(&self, d: Duration) {
        match &self.clock {
            Some(clock) => clock.advance(d),
            None => thread::sleep(d),
        }
    }

    fn record(&mut self, step: String, frame: Frame) -> Transcript {
        let overlay = self.inspector.frame(&frame);
        Transcript {
            step,
            view: frame.view,
            overlay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(page: Page) -> (Driver, Vec<Transcript>) {
        let mut driver = Driver::new(&Options::default());
        let transcripts = driver.run(page).expect("script runs");
        (driver, transcripts)
    }

    #[test]
    fn basic_page_breaks_and_recovers() {
        let (_, t) = play(Page::Basic);
        assert!(t[2].view.contains_text("Count: 2"));
        assert!(t[3].view.contains_text("Something went wrong"));
        assert!(t[3].view.find_button("Component Broken").is_some());
        let last = &t[4].view;
        assert!(last.contains_text("Count: 0"));
        assert!(!last.contains_text("Something went wrong"));
    }

    #[test]
    fn fallback_page_switches_styles() {
        let (_, t) = play(Page::Fallback);
        assert!(t[1].view.contains_text("Oops! Something went wrong."));
        assert!(t[2].view.contains_text("Component is working perfectly!"));
        assert!(t[4].view.contains_text("We encountered an unexpected error."));
        assert!(t[5].view.contains_text("Component is working perfectly!"));
        assert!(t[7].view.contains_text("Whoops!"));
        assert!(t[8].view.contains_text("Component is working perfectly!"));
    }

    #[test]
    fn logging_page_records_with_context() {
        let (driver, t) = play(Page::Logging);
        assert!(t[1].view.contains_text("Error Logs (1)"));
        assert!(t[1].view.contains_text("API_ERROR: Failed to fetch user data from /api/users/123"));
        assert!(t[4].view.contains_text("Error Logs (2)"));
        assert!(t[4].view.contains_text("User: user_456"));
        assert!(t[6].view.contains_text("No errors logged yet."));
        assert!(driver.log().is_empty());
    }

    #[test]
    fn suspense_page_loads_independently() {
        let (_, t) = play(Page::Suspense);
        assert!(t[1].view.contains_text("Loading user profile... (2s)"));
        assert!(t[1].view.contains_text("Loading posts... (1s)"));
        assert!(t[2].view.contains_text("2. Understanding Suspense"));
        assert!(t[2].view.contains_text("Loading user profile... (2s)"));
        assert!(t[3].view.contains_text("John Doe"));
        assert!(t[4].view.contains_text("Click \"Load Data\""));
        assert!(t[5].view.contains_text("Loading posts... (1s)"));
        assert!(t[6].view.contains_text("john@example.com"));
        assert!(t[6].view.contains_text("3. Advanced Patterns"));
        assert!(!t[6].view.contains_text("Loading user profile... (2s)"));
        assert!(!t[6].view.contains_text("Loading posts... (1s)"));
    }

    #[test]
    fn lazy_page_loads_settings_on_demand() {
        let (_, t) = play(Page::Lazy);
        assert!(t[0].view.contains_text("Settings stay unloaded"));
        assert!(t[1].view.contains_text("Loading settings module..."));
        assert!(t[2].view.contains_text("Notification Preferences"));
    }

    #[test]
    fn missing_button_is_an_error() {
        let mut driver = Driver::new(&Options::default());
        let err = driver
            .run_script(Page::Basic, &[Step::Click("Launch")])
            .err()
            .expect("no such button");
        assert!(err.to_string().contains("Launch"));
    }

    #[test]
    fn inspector_overlay_follows_the_log() {
        let mut driver = Driver::new(&Options {
            inspector: true,
            ..Options::default()
        });
        let t = driver
            .run_script(Page::Logging, &[Step::Click("Permission Error")])
            .expect("script runs");
        let overlay = t[1].overlay.as_ref().expect("inspector enabled");
        assert!(overlay.contains_text("errors: 1/10"));
        assert!(overlay.contains_text("PERMISSION_ERROR"));
    }
}
