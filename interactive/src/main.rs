use clap::Parser;

use gl_wrapper::debug;

mod app;
mod args;
mod config;
mod demo;
mod demos;

use app::App;
use args::Args;
use config::Config;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    if let Some(guard) = args.guard {
        debug::init(guard.into()).ok();
    }
    log::debug!("OpenGL call guard: {:?}", debug::mode());

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Initialization failed: {e}");
            std::process::exit(1);
        }
    };

    app.run();
}
