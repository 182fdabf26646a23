use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

use docsift::{Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: docsift <config.yaml> <input.json> <output.json>";

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [config, input, output] = args.as_slice() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(Path::new(config), Path::new(input), Path::new(output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "docsift failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Path, input: &Path, output: &Path) -> Result<(), Box<dyn Error>> {
    let cfg = PipelineConfig::from_file(config)?;
    tracing::info!(
        config = %config.display(),
        name = cfg.name.as_deref().unwrap_or("-"),
        "configuration loaded"
    );
    let pipeline = Pipeline::from_config(cfg)?;
    let written = pipeline.run_file(input, output)?;
    tracing::info!(records = written, output = %output.display(), "done");
    Ok(())
}
