#![allow(clippy::new_without_default)]
//! Mandelbrot renderer with histogram-equalized coloring.
//!
//! [`render`] turns a [`RenderConfig`] into an RGBA pixel buffer:
//! the viewport is resolved (including the focus command sequence), every
//! pixel of the supersampled grid gets a smoothed escape value, the values
//! are mapped to palette colors through quantile break-points and the
//! result is downsampled to the requested resolution.
//!
//! The library itself never touches files or sockets; see the `server`
//! module and the `mandelpng` binary for that.

use image::RgbaImage;

use crate::coord::Viewport;
use crate::field::render_field;
use crate::painter::{Painter, QuantilePainter};
use crate::resample::downsample;

pub mod bench;
mod complex;
pub mod config;
pub mod coord;
pub mod error;
pub mod escape;
pub mod field;
pub mod painter;
pub mod palette;
pub mod resample;
#[cfg(feature = "server")]
pub mod server;
pub mod threads;

pub use complex::{c, C};
pub use config::RenderConfig;
pub use error::{ParamError, RenderError, RenderResult};

/// Renders `config` using one worker per physical core.
pub fn render(config: RenderConfig) -> RenderResult<RgbaImage> {
    render_with_threads(config, num_cpus::get_physical())
}

pub fn render_with_threads(config: RenderConfig, threads: usize) -> RenderResult<RgbaImage> {
    config.validate()?;
    let palette = palette::lookup(&config.palette_name)?;
    let viewport = Viewport::build(&config)?;

    let field = render_field(
        &viewport,
        config.max_iterations,
        config.invert_colors,
        threads,
    );
    let img = QuantilePainter::new(palette).paint(&field);

    Ok(downsample(img, config.x_resolution, config.y_resolution))
}
