//! Demo host: an orbiting scene with the Game of Life overlay on top.
//!
//! Controls:
//! - R: Re-initialize the simulation
//! - V: Toggle split view
//! - 1/2/3: Brush blend mode (alpha / additive / multiply)
//! - Escape: Quit

mod app;
mod demo;

use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Game of Life Overlay");
    log::info!("====================");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new();
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
