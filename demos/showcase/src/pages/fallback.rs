use bulwark_core::prelude::*;
use bulwark_ui::*;

use crate::app::Step;
use crate::ui::{Bullets, Section};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Minimal,
    Detailed,
    Interactive,
}

impl Style {
    fn label(self) -> &'static str {
        match self {
            Style::Minimal => "minimal",
            Style::Detailed => "detailed",
            Style::Interactive => "interactive",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    None,
    Render,
    Network,
    Validation,
}

#[allow(non_snake_case)]
fn ProblematicComponent(trigger: Trigger) -> Result<View, RenderError> {
    component("ProblematicComponent", || match trigger {
        Trigger::Render => Err(RenderError::new(
            "Render error: Component failed to render properly",
        )),
        Trigger::Network => Err(RenderError::new(
            "Network error: Failed to fetch data from server",
        )),
        Trigger::Validation => Err(RenderError::new(
            "Validation error: Invalid data format received",
        )),
        Trigger::None => Ok(Text("Component is working perfectly!")),
    })
}

fn fallback_for(style: Style, on_reset: impl Fn() + Clone + 'static) -> Fallback {
    match style {
        Style::Minimal => Fallback::Static(Text("Oops! Something went wrong.")),
        Style::Detailed => Fallback::render(move |_, reset| {
            Column().child((
                Text("Something went wrong"),
                Text(
                    "We encountered an unexpected error. Please try refreshing the page \
                     or contact support if the problem persists.",
                ),
                Row().child((
                    Button("Try Again", on_reset.clone()),
                    Button("Refresh Page", move || reset.reset()),
                )),
            ))
        }),
        Style::Interactive => Fallback::render(move |_, _| {
            Column().child((
                Text("Whoops!"),
                Text("Looks like we hit a snag. Don't worry, these things happen!"),
                Button("Give it another shot", on_reset.clone()),
                Text("If this keeps happening, maybe it's time for a coffee break?"),
            ))
        }),
    }
}

pub fn screen() -> View {
    let style = remember(|| signal(Style::Minimal));
    let trigger = remember(|| signal(Trigger::None));
    let reset_key = remember(|| signal(0i64));

    let handle_reset = {
        let trigger = (*trigger).clone();
        let reset_key = (*reset_key).clone();
        move || {
            trigger.set(Trigger::None);
            reset_key.update(|k| *k += 1);
        }
    };

    let style_button = |label: &'static str, value: Style| {
        let style = style.clone();
        Button(label, move || style.set(value))
    };
    let trigger_button = |label: &'static str, value: Trigger| {
        let trigger = trigger.clone();
        Button(label, move || trigger.set(value))
    };

    let current = style.get();
    let t = trigger.get();
    let demo = ErrorBoundary::new("fallback-demo", move || ProblematicComponent(t))
        .name("FallbackUIExample")
        .fallback(fallback_for(current, handle_reset.clone()))
        .reset_keys([
            ResetKey::from(reset_key.get()),
            ResetKey::from(current.label()),
        ])
        .render();

    Section(
        "Custom Fallback UI Example",
        Column().child((
            Row().child((
                style_button("Minimal", Style::Minimal),
                style_button("Detailed", Style::Detailed),
                style_button("Interactive", Style::Interactive),
            )),
            Row().child((
                trigger_button("No Error", Trigger::None),
                trigger_button("Render Error", Trigger::Render),
                trigger_button("Network Error", Trigger::Network),
                trigger_button("Validation Error", Trigger::Validation),
                Button("Reset Demo", handle_reset),
            )),
            Text(format!("Component with {} fallback UI:", current.label())),
            demo,
            Bullets(&[
                "Minimal: simple error message, takes minimal space",
                "Detailed: more context, recovery options",
                "Interactive: friendly tone, brand personality",
            ]),
        )),
    )
}

pub fn script() -> Vec<Step> {
    vec![
        Step::Click("Render Error"),
        Step::Click("Reset Demo"),
        Step::Click("Detailed"),
        Step::Click("Network Error"),
        Step::Click("Try Again"),
        Step::Click("Interactive"),
        Step::Click("Validation Error"),
        Step::Click("Give it another shot"),
    ]
}
