use bulwark_core::prelude::*;
use bulwark_ui::*;

use crate::app::Step;
use crate::ui::Section;

#[allow(non_snake_case)]
fn BuggyCounter(should_throw: bool) -> Result<View, RenderError> {
    component("BuggyCounter", || {
        let count = remember(|| signal(0));
        if should_throw {
            return Err(RenderError::new(
                "I crashed! This is a simulated error for demonstration purposes.",
            ));
        }
        Ok(Column().child((
            Text("Everything is working fine!"),
            Text(format!("Count: {}", count.get())),
            Button("Increment", {
                let count = count.clone();
                move || count.update(|c| *c += 1)
            }),
        )))
    })
}

pub fn screen() -> View {
    let should_throw = remember(|| signal(false));
    let reset_key = remember(|| signal(0i64));

    let controls = Row().child((
        Button(
            if should_throw.get() {
                "Component Broken"
            } else {
                "Break Component"
            },
            {
                let should_throw = should_throw.clone();
                move || should_throw.set(true)
            },
        ),
        Button("Reset Demo", {
            let should_throw = should_throw.clone();
            let reset_key = reset_key.clone();
            move || {
                should_throw.set(false);
                reset_key.update(|k| *k += 1);
            }
        }),
    ));

    let throw = should_throw.get();
    let guarded = ErrorBoundary::new("basic", move || BuggyCounter(throw))
        .name("BasicErrorBoundaryExample")
        .reset_keys([reset_key.get()])
        .render();

    Section(
        "Basic Error Boundary",
        Column().child((controls, guarded)),
    )
}

pub fn script() -> Vec<Step> {
    vec![
        Step::Click("Increment"),
        Step::Click("Increment"),
        Step::Click("Break Component"),
        Step::Click("Reset Demo"),
    ]
}
