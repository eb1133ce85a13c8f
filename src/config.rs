// Configuration module for Starfield-3D

use clap::Parser;
use std::path::PathBuf;

/// Command line options. The defaults give the stock scene.
#[derive(Debug, Clone, Parser)]
#[command(name = "starfield-3d", about = "Scroll-driven 3D starfield demo")]
pub struct Config {
    /// Directory holding space.jpg, Avatar.png, moon.jpg and normal.jpg
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Number of stars scattered around the scene
    #[arg(long, default_value_t = 200)]
    pub stars: usize,

    /// Edge length of the cube the stars are scattered in, centred on the origin
    #[arg(long, default_value_t = 100.0, value_parser = non_negative_length)]
    pub star_spread: f32,

    /// Seed for star placement (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Height of the virtual page being scrolled, in logical pixels
    #[arg(long, default_value_t = 5000.0, value_parser = non_negative_length)]
    pub page_height: f32,

    /// Logical pixels scrolled per mouse wheel line
    #[arg(long, default_value_t = 40.0, value_parser = non_negative_length)]
    pub line_height: f32,

    /// Update the camera aspect ratio when the window is resized
    #[arg(long)]
    pub follow_resize: bool,
}

// Lengths must be finite and not negative
fn non_negative_length(value: &str) -> Result<f32, String> {
    let length: f32 = value
        .parse()
        .map_err(|e| format!("`{value}` is not a number: {e}"))?;
    if !length.is_finite() || length < 0.0 {
        return Err(format!("`{value}` must be a finite length of zero or more"));
    }
    Ok(length)
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["starfield-3d"])
    }
}
