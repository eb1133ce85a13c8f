// Starfield-3D: a scroll-driven 3D scene in Rust

// Module declarations
mod animation;
mod app;
mod assets;
mod camera;
mod config;
mod error;
mod geometry;
mod material;
mod math;
mod renderer;
mod scene;
mod scroll;
mod showcase;

use clap::Parser;
use winit::event_loop::EventLoop;

#[tokio::main]
async fn main() -> Result<(), error::Error> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::Config::parse();

    // Create event loop
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    // Build the scene and window
    let app = app::App::new(&event_loop, config).await?;

    // Run until the window closes
    app.run(event_loop)
}
