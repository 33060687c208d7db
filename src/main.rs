use ppmi_model::Pipeline;
use std::process;

// usage: ppmi_model <config.json>
// json keys and their defaults are read in config::Config::from_json

fn main() {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = Pipeline::run() {
        log::error!("{}", e);
        process::exit(1);
    }
}
