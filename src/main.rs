use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cobot_telemetry::{pipeline, PipelineConfig};

const USAGE: &str = "usage: cobot-telemetry <log.csv|log.json> [config.json] [--json]";

fn main() -> Result<()> {
    env_logger::init();

    let mut json = false;
    let mut positional: Vec<PathBuf> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let (log_path, config_path) = match positional.as_slice() {
        [log] => (log, None),
        [log, config] => (log, Some(config)),
        _ => bail!("{USAGE}"),
    };

    let config = match config_path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let out = pipeline::run(log_path, &config)
        .with_context(|| format!("processing {}", log_path.display()))?;

    if json {
        println!("{}", out.analysis.to_json()?);
    } else {
        println!("Cobot time-series snippet (preview only):\n{}\n", out.analysis.preview);
        println!("Schema & stats:\n{}", out.analysis.schema);
        if out.timestamps.failed > 0 {
            println!(
                "\n{} of {} timestamps unparsed",
                out.timestamps.failed,
                out.timestamps.failed + out.timestamps.parsed
            );
        }
    }
    Ok(())
}
