use std::path::PathBuf;

use anyhow::Result;

mod demo;
mod engine;
mod simulation;

/// Long enough for every scripted image to appear, get lost and be removed.
const FRAME_COUNT: u32 = 80;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let prototype_path = std::env::args().nth(1).map(PathBuf::from);
    let mut state = demo::DemoState::new(prototype_path.as_deref())?;

    for _ in 0..FRAME_COUNT {
        engine::update(&mut state)?;
    }

    log::info!(
        "Session finished after {} frames with {} instances",
        state.session.frame(),
        state.synchronizer.len()
    );

    state.shutdown();

    Ok(())
}
