use bulwark_core::prelude::*;
use bulwark_ui::*;

use crate::app::Step;
use crate::ui::Section;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorKind {
    None,
    Api,
    Validation,
    Permission,
    Network,
}

impl ErrorKind {
    fn tag(self) -> &'static str {
        match self {
            ErrorKind::None => "none",
            ErrorKind::Api => "api",
            ErrorKind::Validation => "validation",
            ErrorKind::Permission => "permission",
            ErrorKind::Network => "network",
        }
    }

    fn message(self) -> Option<&'static str> {
        match self {
            ErrorKind::None => None,
            ErrorKind::Api => Some("API_ERROR: Failed to fetch user data from /api/users/123"),
            ErrorKind::Validation => Some("VALIDATION_ERROR: Invalid email format provided"),
            ErrorKind::Permission => {
                Some("PERMISSION_ERROR: User does not have access to this resource")
            }
            ErrorKind::Network => Some("NETWORK_ERROR: Request timeout after 30 seconds"),
        }
    }
}

#[allow(non_snake_case)]
fn UnstableComponent(kind: ErrorKind, user_id: &str) -> View {
    component("UnstableComponent", || {
        if let Some(message) = kind.message() {
            raise(message);
        }
        let who = if user_id.is_empty() { "Anonymous" } else { user_id };
        Text(format!("Component loaded successfully for user: {who}"))
    })
}

#[allow(non_snake_case)]
fn LogList(log: &ErrorLog) -> View {
    let entries = log.entries();
    if entries.is_empty() {
        return Text("No errors logged yet. Trigger an error to see it here.");
    }
    Column().child((
        Text(format!("Error Logs ({})", entries.len())),
        Column().child(
            entries
                .iter()
                .map(|e| {
                    let user = e.context_tags.get("userId").map(String::as_str).unwrap_or("-");
                    Column().child((
                        Text(e.message.clone()),
                        Text(format!(
                            "{} | Component: {} | User: {user} | {}",
                            e.id,
                            e.component_path,
                            e.timestamp.format("%H:%M:%S")
                        )),
                    ))
                })
                .collect::<Vec<_>>(),
        ),
    ))
}

const USERS: [&str; 2] = ["user_123", "user_456"];

pub fn screen(log: &ErrorLog) -> View {
    let kind = remember(|| signal(ErrorKind::None));
    let user = remember(|| signal(USERS[0].to_string()));
    let reset_key = remember(|| signal(0i64));

    let trigger = |label: &'static str, value: ErrorKind| {
        let kind = kind.clone();
        Button(label, move || kind.set(value))
    };

    let controls = Row().child((
        trigger("API Error", ErrorKind::Api),
        trigger("Validation Error", ErrorKind::Validation),
        trigger("Permission Error", ErrorKind::Permission),
        trigger("Network Error", ErrorKind::Network),
        Button("Switch User", {
            let user = user.clone();
            move || {
                user.update(|u| {
                    let next = if u == USERS[0] { USERS[1] } else { USERS[0] };
                    *u = next.to_string();
                })
            }
        }),
        Button("Reset", {
            let kind = kind.clone();
            let reset_key = reset_key.clone();
            move || {
                kind.set(ErrorKind::None);
                reset_key.update(|k| *k += 1);
            }
        }),
        Button("Clear Logs", {
            let log = log.clone();
            move || {
                log.clear();
                request_frame();
            }
        }),
    ));

    let k = kind.get();
    let user_id = user.get();
    let guarded = {
        let id = user_id.clone();
        ErrorBoundary::new("logging", move || UnstableComponent(k, &id))
            .name("ErrorLoggingExample")
            .reset_keys([reset_key.get()])
            .context("userId", user_id.clone())
            .context("feature", "error-logging-demo")
            .context("userAction", "triggered-error")
            .context("errorType", k.tag())
            .on_failure(log.sink())
            .render()
    };

    // Composed after the boundary so a failure captured this pass is listed.
    let logs = LogList(log);

    Section(
        "Error Logging & Reporting Example",
        Column().child((
            Text(format!("User ID (for context): {user_id}")),
            controls,
            guarded,
            logs,
        )),
    )
}

pub fn script() -> Vec<Step> {
    vec![
        Step::Click("API Error"),
        Step::Click("Reset"),
        Step::Click("Switch User"),
        Step::Click("Network Error"),
        Step::Click("Reset"),
        Step::Click("Clear Logs"),
    ]
}
