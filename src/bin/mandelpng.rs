use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mandelpng::palette::PALETTE_NAMES;
use mandelpng::{render_with_threads, RenderConfig};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "mandelpng",
    about = "Render the Mandelbrot set to PNG, or serve it over HTTP"
)]
struct Opt {
    /// Maximum number of iterations
    #[structopt(long = "IT", default_value = "512")]
    iterations: u32,

    /// X resolution
    #[structopt(long, default_value = "500")]
    xres: u32,

    /// Y resolution
    #[structopt(long, default_value = "500")]
    yres: u32,

    /// Anti alias, e.g. set --aa 4 for 4xAA
    #[structopt(long, default_value = "1")]
    aa: u32,

    /// Real coordinate of the center
    #[structopt(short = "x", default_value = "-0.75", allow_hyphen_values = true)]
    x: f64,

    /// Imaginary coordinate of the center
    #[structopt(short = "y", default_value = "0.0", allow_hyphen_values = true)]
    y: f64,

    /// Width of the viewed region on the real axis
    #[structopt(short = "r", default_value = "3.0")]
    radius: f64,

    /// Output file
    #[structopt(long, default_value = "out.png", parse(from_os_str))]
    out: PathBuf,

    /// One of: plan9|websafe|gameboy|retro|gray|cont|alternate|blackwhite
    #[structopt(long, default_value = "plan9")]
    palette: String,

    /// Sequence of focus commands: 1-4 pick a quadrant, wasd pan, r resets
    /// the step, z zooms in. e.g. 1423
    #[structopt(long)]
    focus: Option<String>,

    /// Inverts colouring
    #[structopt(long)]
    invert: bool,

    /// Use a random center and radius
    #[structopt(long)]
    random: bool,

    /// Serve images over HTTP instead of writing a file
    #[structopt(long)]
    server: bool,

    /// Listening port in server mode
    #[structopt(long, default_value = "8080")]
    port: String,

    /// Worker threads per render, 0 for one per physical core (shared
    /// between request workers in server mode)
    #[structopt(long, default_value = "0")]
    threads: usize,
}

impl Opt {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            center_real: self.x,
            center_imag: self.y,
            radius: self.radius,
            x_resolution: self.xres,
            y_resolution: self.yres,
            antialias_factor: self.aa,
            max_iterations: self.iterations,
            invert_colors: self.invert,
            palette_name: self.palette.clone(),
            focus_commands: self.focus.clone().unwrap_or_default(),
        }
    }

    fn threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get_physical()
        } else {
            self.threads
        }
    }
}

#[cfg(feature = "server")]
fn run_server(opt: &Opt, base: RenderConfig) -> anyhow::Result<()> {
    let mut options = mandelpng::server::ServeOptions::new(&opt.port, base);
    if opt.threads > 0 {
        options.render_threads = opt.threads;
    }
    mandelpng::server::serve(options)?;
    Ok(())
}

#[cfg(not(feature = "server"))]
fn run_server(_opt: &Opt, _base: RenderConfig) -> anyhow::Result<()> {
    bail!("server mode needs the `server` feature")
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opt = Opt::from_args();
    if !PALETTE_NAMES.contains(&opt.palette.as_str()) {
        bail!(
            "unknown palette {:?}, expected one of {}",
            opt.palette,
            PALETTE_NAMES.join("|")
        );
    }

    let mut config = opt.render_config();
    if opt.random {
        config.randomize_viewport(&mut rand::thread_rng());
        info!(
            x = config.center_real,
            y = config.center_imag,
            r = config.radius,
            "randomized viewport"
        );
    }

    if opt.server {
        return run_server(&opt, config);
    }

    let start = Instant::now();
    info!(
        width = config.x_resolution,
        height = config.y_resolution,
        aa = config.antialias_factor,
        "rendering"
    );
    let img = render_with_threads(config, opt.threads()).context("render failed")?;
    info!(elapsed = ?start.elapsed(), "done");

    img.save(&opt.out)
        .with_context(|| format!("failed to write {}", opt.out.display()))?;
    info!(out = %opt.out.display(), "finished writing");
    Ok(())
}
