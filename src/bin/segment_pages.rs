use page_columns::config::load_config;
use page_columns::segment_pages;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;
    let report = segment_pages(&config).map_err(|e| e.to_string())?;

    print!("{}", report.summary());
    if let Some(path) = &config.report_json {
        println!("Saved batch report to {}", path.display());
    }
    if report.failed() > 0 {
        return Err(format!("{} page(s) failed", report.failed()));
    }
    Ok(())
}

fn usage() -> String {
    "Usage: segment_pages <config.json>".to_string()
}
