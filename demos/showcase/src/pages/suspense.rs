use bulwark_core::prelude::*;
use bulwark_ui::*;

use crate::app::Step;
use crate::ui::{Bullets, Section};

#[derive(Clone, Debug, PartialEq)]
pub struct UserData {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostData {
    pub id: u32,
    pub title: String,
}

#[derive(Clone)]
struct Resources {
    user: DeferredResource<UserData>,
    posts: DeferredResource<Vec<PostData>>,
}

async fn fetch_user() -> Result<UserData, ResourceError> {
    sleep(Duration::from_secs(2)).await;
    Ok(UserData {
        name: "John Doe".into(),
        email: "john@example.com".into(),
    })
}

async fn fetch_posts() -> Result<Vec<PostData>, ResourceError> {
    sleep(Duration::from_secs(1)).await;
    Ok([
        "Getting Started with React",
        "Understanding Suspense",
        "Advanced Patterns",
    ]
    .into_iter()
    .zip(1..)
    .map(|(title, id)| PostData {
        id,
        title: title.into(),
    })
    .collect())
}

fn load() -> Resources {
    log::info!("suspense demo: starting user and posts requests");
    Resources {
        user: DeferredResource::create(fetch_user),
        posts: DeferredResource::create(fetch_posts),
    }
}

#[allow(non_snake_case)]
fn UserProfile(user: &DeferredResource<UserData>) -> Result<View, RenderError> {
    component("UserProfile", || {
        Ok(match read_resource(user)? {
            Some(u) => Column().child((Text(u.name), Text(u.email))),
            None => Box(),
        })
    })
}

#[allow(non_snake_case)]
fn PostList(posts: &DeferredResource<Vec<PostData>>) -> Result<View, RenderError> {
    component("PostList", || {
        let Some(posts) = read_resource(posts)? else {
            return Ok(Box());
        };
        Ok(Column().child(
            posts
                .into_iter()
                .map(|p| Text(format!("{}. {}", p.id, p.title)))
                .collect::<Vec<_>>(),
        ))
    })
}

pub fn screen() -> View {
    let resources = remember(|| signal(None::<Resources>));

    let controls = Row().child((
        Button("Load Data", {
            let resources = resources.clone();
            move || resources.set(Some(load()))
        }),
        Button("Reset & Replay", {
            let resources = (*resources).clone();
            move || {
                resources.set(None);
                let resources = resources.clone();
                spawn(async move {
                    sleep(Duration::from_millis(100)).await;
                    resources.set(Some(load()));
                });
            }
        }),
    ));

    let body = match resources.get() {
        None => Text("Click \"Load Data\" to start two async operations with different timing."),
        Some(Resources { user, posts }) => Column().child((
            ErrorBoundary::new("user", move || {
                Suspense(|| Text("Loading user profile... (2s)"), || UserProfile(&user))
            })
            .name("SuspenseDemo")
            .render(),
            ErrorBoundary::new("posts", move || {
                Suspense(|| Text("Loading posts... (1s)"), || PostList(&posts))
            })
            .name("SuspenseDemo")
            .render(),
        )),
    };

    Section(
        "Suspense: Independent Loading",
        Column().child((
            controls,
            body,
            Bullets(&[
                "Each Suspense boundary shows its own fallback",
                "Posts resolve first while the profile is still loading",
            ]),
        )),
    )
}

pub fn script() -> Vec<Step> {
    vec![
        Step::Click("Load Data"),
        Step::Wait(Duration::from_secs(1)),
        Step::Wait(Duration::from_secs(1)),
        Step::Click("Reset & Replay"),
        Step::Wait(Duration::from_millis(100)),
        Step::Wait(Duration::from_secs(2)),
    ]
}
