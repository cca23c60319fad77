use web_time::{Duration, Instant};

use bulwark_core::{ErrorLog, Frame, View};
use bulwark_ui::{Column, Text, ViewExt};

pub struct Hud {
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
    pub metrics: Option<Metrics>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
            metrics: None,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn record_frame(&mut self, frame: &Frame) {
        self.frame_count += 1;
        let now = Instant::now();
        if let Some(prev) = self.last_frame.replace(now) {
            let dt = (now - prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // simple EMA
                let a = 0.2;
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    fps
                } else {
                    (1.0 - a) * self.fps_smooth + a * fps
                };
            }
        }
        let mut nodes = 0;
        frame.view.walk(&mut |_| nodes += 1);
        self.metrics = Some(Metrics {
            pass: frame.pass,
            last_pass: frame.elapsed,
            view_nodes: nodes,
        });
    }

    pub fn line(&self) -> String {
        let mut parts = vec![
            format!("frame: {}", self.frame_count),
            format!("fps: {:.1}", self.fps_smooth),
        ];
        if let Some(m) = &self.metrics {
            parts.push(format!("pass: {:.2} ms", m.last_pass.as_secs_f64() * 1000.0));
            parts.push(format!("nodes: {}", m.view_nodes));
        }
        parts.join("  |  ")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub pass: u64,
    pub last_pass: Duration,
    pub view_nodes: usize,
}

/// Overlay listing what the attached `ErrorLog` has captured, plus the HUD line.
pub struct Inspector {
    pub hud: Hud,
    enabled: bool,
    log: Option<ErrorLog>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            hud: Hud::new(),
            enabled: false,
            log: None,
        }
    }

    pub fn with_log(mut self, log: ErrorLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
        log::debug!("inspector {}", if self.enabled { "shown" } else { "hidden" });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records `frame` and, when enabled, returns the overlay to draw over it.
    pub fn frame(&mut self, frame: &Frame) -> Option<View> {
        self.hud.record_frame(frame);
        self.enabled.then(|| self.overlay())
    }

    pub fn overlay(&self) -> View {
        let mut rows = vec![Text(self.hud.line())];
        if let Some(log) = &self.log {
            let entries = log.entries();
            rows.push(Text(format!("errors: {}/{}", entries.len(), log.capacity())));
            rows.extend(entries.iter().map(|e| {
                let user = e.context_tags.get("userId").map(String::as_str).unwrap_or("-");
                Text(format!(
                    "[{}] {} @ {} (user: {user})",
                    e.id, e.message, e.component_path
                ))
            }));
        }
        Column().child(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bulwark_core::*;
    use bulwark_ui::*;

    use super::Inspector;

    #[test]
    fn hidden_until_toggled() {
        let mut scheduler = Scheduler::new();
        let mut inspector = Inspector::new();
        let frame = scheduler.frame(|| Text("hello"));
        assert!(inspector.frame(&frame).is_none());

        inspector.toggle();
        let frame = scheduler.frame(|| Column().child((Text("a"), Text("b"))));
        let overlay = inspector.frame(&frame).expect("enabled");
        assert!(overlay.contains_text("frame: 2"));
        assert!(overlay.contains_text("nodes: 3"));
        assert_eq!(inspector.hud.frame_count(), 2);
    }

    #[test]
    fn lists_logged_failures_newest_first() {
        let log = ErrorLog::new(10);
        let mut tags = BTreeMap::new();
        tags.insert("userId".to_string(), "user_123".to_string());
        let first = RenderError::new("API_ERROR: first");
        let second = RenderError::new("NETWORK_ERROR: second");
        log.record(&FailureRecord::capture(&first, "ErrorLoggingExample", tags.clone()));
        log.record(&FailureRecord::capture(&second, "ErrorLoggingExample", tags));

        let inspector = Inspector::new().with_log(log.clone());
        let overlay = inspector.overlay();
        let texts = overlay.texts();
        assert_eq!(texts[1], "errors: 2/10");
        assert!(texts[2].contains("NETWORK_ERROR: second"));
        assert!(texts[2].contains("(user: user_123)"));
        assert!(texts[3].contains("API_ERROR: first"));

        log.clear();
        assert_eq!(inspector.overlay().texts()[1], "errors: 0/10");
    }
}
