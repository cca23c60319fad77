use clap::Parser;

use bulwark_ui::render_text;

mod app;
mod ui;
mod pages {
    pub mod basic;
    pub mod fallback;
    pub mod lazy;
    pub mod logging;
    pub mod suspense;
}

use app::{Driver, Options, Page};

/// Plays scripted interactions against the demo pages and prints every frame.
#[derive(Parser, Debug)]
#[command(name = "showcase", version)]
struct Args {
    /// Page to run; all pages when omitted.
    #[arg(long, value_enum)]
    page: Option<Page>,
    /// Wait on the system clock instead of advancing a manual one.
    #[arg(long)]
    realtime: bool,
    /// Print the inspector overlay after each frame.
    #[arg(long)]
    inspector: bool,
    /// Leave failure messages out of the built-in fallback.
    #[arg(long)]
    hide_details: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = Options {
        realtime: args.realtime,
        inspector: args.inspector,
        hide_details: args.hide_details,
    };

    let pages = match args.page {
        Some(page) => vec![page],
        None => Page::ALL.to_vec(),
    };
    for page in pages {
        println!("==== {} ====", page.title());
        let mut driver = Driver::new(&options);
        for transcript in driver.run(page)? {
            println!("--- {} ---", transcript.step);
            println!("{}", render_text(&transcript.view));
            if let Some(overlay) = &transcript.overlay {
                println!("{}", render_text(overlay));
            }
        }
        println!();
    }
    Ok(())
}
