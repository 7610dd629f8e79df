use std::panic::{self, AssertUnwindSafe};

use anyhow::{bail, Result};
use bevy::app::AppExit;
use clap::Parser;

use galsim::{load_parameters, panic_message, run_app, Args, GalaxySim, Parameters};

fn main() -> Result<()> {
    let args = Args::parse();
    let display = args.display_config();

    let mut params = match &args.params {
        Some(path) => load_parameters(path)?,
        None => Parameters::default(),
    };
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    // Particles drifting past 1.5 view widths from the center are culled
    params.cull_radius = display.width as f32 * 1.5;

    let sim = GalaxySim::new(&args.sim_config(), params);

    // Outermost fault boundary: a fault escaping the frame loop is
    // logged and becomes a clean nonzero exit, not a process abort
    match panic::catch_unwind(AssertUnwindSafe(|| run_app(display, sim))) {
        Ok(AppExit::Success) => Ok(()),
        Ok(AppExit::Error(code)) => bail!("viewer exited with error code {code}"),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            eprintln!("fatal error: {message}");
            bail!("unhandled fault in frame loop: {message}")
        }
    }
}
