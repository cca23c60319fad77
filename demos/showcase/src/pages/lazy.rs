use std::rc::Rc;

use bulwark_core::prelude::*;
use bulwark_ui::lazy::ComponentFn;
use bulwark_ui::*;

use crate::app::Step;
use crate::ui::{Bullets, Section};

#[allow(non_snake_case)]
fn LazyUserSettings() -> View {
    Column().child((
        Text("Notification Preferences"),
        Text(
            "This component was loaded lazily. Try toggling different sections of your UI \
             to keep the initial bundle small.",
        ),
        Bullets(&[
            "Weekly summary emails",
            "Product updates",
            "Live webinar invites",
        ]),
    ))
}

async fn load_settings_module() -> Result<ComponentFn, ResourceError> {
    sleep(Duration::from_millis(800)).await;
    log::info!("settings module loaded");
    let component: ComponentFn = Rc::new(LazyUserSettings);
    Ok(component)
}

pub fn screen() -> View {
    let show = remember(|| signal(false));
    let settings = remember(|| Lazy::new(load_settings_module));

    let body = if show.get() {
        let settings = (*settings).clone();
        ErrorBoundary::new("settings", move || {
            Suspense(|| Text("Loading settings module..."), || settings.render())
        })
        .name("LazyLoadingExample")
        .render()
    } else {
        Text("Settings stay unloaded until you request them.")
    };

    Section(
        "Feature-Level Lazy Loading",
        Column().child((
            Button("Load settings panel", {
                let show = show.clone();
                move || show.set(true)
            }),
            body,
        )),
    )
}

pub fn script() -> Vec<Step> {
    vec![
        Step::Click("Load settings panel"),
        Step::Wait(Duration::from_millis(800)),
    ]
}
