use std::process::ExitCode;

use hawdict::builder::{BuildManifest, DictBuilder};
use hawdict::snafu::ErrorCompat;
use hawdict::DictError;
use log::*;

const DEFAULT_MANIFEST: &str = "hawdict.json";

fn report(error: &DictError) {
    let failures = error.unit_failures();
    if failures.is_empty() {
        eprintln!("Error: {}", error);
        if let Some(backtrace) = ErrorCompat::backtrace(error) {
            eprintln!("{:?}", backtrace);
        }
        return;
    }
    for failure in failures {
        eprintln!("{} failed: {}", failure.unit, failure.error);
        if let Some(backtrace) = ErrorCompat::backtrace(&failure.error) {
            eprintln!("{:?}", backtrace);
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let manifest_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_MANIFEST.to_string());
    info!("Loading manifest: {}", manifest_path);

    let result = BuildManifest::from_json_file(&manifest_path)
        .and_then(|manifest| DictBuilder::build_with_manifest(&manifest));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}
