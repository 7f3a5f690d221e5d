// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `easyhash`: print 128-bit easyhash digests of files, stdin, or text.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use easyhash::constants::DEFAULT_MAX_WORKERS_CAP;
use easyhash::{hash_reader, hash_with, Digest, HasherConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Non-cryptographic 128-bit digests of files, stdin, or text")]
struct Args {
    /// Files to hash; `-` or no files reads stdin
    files: Vec<PathBuf>,
    /// Hash this string (as UTF-8) instead of reading input
    #[arg(long, conflicts_with = "files")]
    text: Option<String>,
    /// JSON hasher configuration, applied before the flags below
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Disable the chunked parallel path
    #[arg(long)]
    sequential: bool,
    /// Target chunk size in bytes for the parallel path
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,
    /// Input size in bytes at which the parallel path engages
    #[arg(long, value_name = "BYTES")]
    min_parallel: Option<usize>,
    /// Maximum chunks per parallel batch [default: 8, whatever the CPU count,
    /// so digests match across machines]
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn hasher_config(&self) -> Result<HasherConfig> {
        let base = HasherConfig::default().with_max_workers(DEFAULT_MAX_WORKERS_CAP);
        let mut config = match &self.config {
            Some(path) => load_config(path, base)?,
            None => base,
        };
        if self.sequential {
            config.parallel = false;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(min) = self.min_parallel {
            config.min_size_for_parallel = min;
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        config.validate().context("invalid hasher configuration")?;
        Ok(config)
    }
}

/// Overlay the fields named in the JSON object at `path` onto `base`.
fn load_config(path: &Path, base: HasherConfig) -> Result<HasherConfig> {
    let file = File::open(path).with_context(|| format!("open config {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse config {}", path.display()))?;
    let serde_json::Value::Object(fields) = doc else {
        bail!("parse config {}: expected a JSON object", path.display());
    };
    let mut merged = serde_json::to_value(base)?;
    if let Some(obj) = merged.as_object_mut() {
        obj.extend(fields);
    }
    serde_json::from_value(merged).with_context(|| format!("parse config {}", path.display()))
}

fn hash_path(path: &Path, config: HasherConfig) -> Result<Digest> {
    if path == Path::new("-") {
        return hash_reader(io::stdin().lock(), config).context("hash stdin");
    }
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    hash_reader(file, config).with_context(|| format!("hash {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = args.hasher_config()?;
    debug!(?config, "resolved hasher configuration");

    let mut out = io::stdout().lock();
    if let Some(text) = &args.text {
        let digest = hash_with(text.as_bytes(), config).context("hash text")?;
        writeln!(out, "{digest}  {text:?}")?;
    } else if args.files.is_empty() {
        let digest = hash_path(Path::new("-"), config)?;
        writeln!(out, "{digest}  -")?;
    } else {
        for path in &args.files {
            let digest = hash_path(path, config)?;
            writeln!(out, "{digest}  {}", path.display())?;
        }
    }
    out.flush()?;

    if easyhash::pool::release() {
        debug!("worker pool released");
    }
    Ok(())
}
