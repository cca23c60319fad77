#![allow(non_snake_case)]

use bulwark_core::prelude::*;
use bulwark_ui::*;

/// A titled section.
pub fn Section(title: &str, body: View) -> View {
    Column().child((Text(title), body))
}

pub fn TopBar(title: &str) -> View {
    Row().child(Text(title))
}

pub fn Bullets(items: &[&str]) -> View {
    Column().child(
        items
            .iter()
            .map(|item| Text(format!("• {item}")))
            .collect::<Vec<_>>(),
    )
}
