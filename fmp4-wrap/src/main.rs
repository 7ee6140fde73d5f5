use anyhow::Context;
use fmp4::{FragmentWriter, FragmentWriterConfig};
use tracing::*;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use std::{env, fs, path::PathBuf};

fn resolve_env(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.into())
}

fn resolve_env_dimension(var: &str, default: &str) -> anyhow::Result<u16> {
    let value = resolve_env(var, default);

    value
        .parse()
        .with_context(|| format!("{} is not a valid dimension: {:?}", var, value))
}

fn load_config() -> anyhow::Result<FragmentWriterConfig> {
    let path = match env::var("FMP4_CONFIG") {
        Ok(path) => path,
        Err(_) => return Ok(FragmentWriterConfig::default()),
    };

    let json = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?;
    let config = serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path))?;

    debug!("Loaded writer configuration from {}", path);

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let width = resolve_env_dimension("FMP4_WIDTH", "1920")?;
    let height = resolve_env_dimension("FMP4_HEIGHT", "1080")?;
    let output = PathBuf::from(resolve_env("FMP4_OUTPUT", "out.mp4"));

    let frames: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if frames.is_empty() {
        anyhow::bail!("usage: fmp4-wrap <frame>...");
    }

    let mut writer = FragmentWriter::new(load_config()?);

    info!(
        "Wrapping {} frames ({}x{}) into {}",
        frames.len(),
        width,
        height,
        output.display()
    );

    for path in &frames {
        let frame = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

        writer
            .wrap_to_file(&frame, width, height, &output)
            .with_context(|| format!("failed to wrap {}", path.display()))?;
    }

    let dropped = (frames.len() as u64).saturating_sub(writer.fragments_written());
    if dropped > 0 {
        warn!(
            "{} frame(s) only produced the movie header, set emit_initial_fragment to keep them",
            dropped
        );
    }

    info!(
        "Wrote {} fragments from {} frames into {}",
        writer.fragments_written(),
        frames.len(),
        output.display()
    );

    Ok(())
}
