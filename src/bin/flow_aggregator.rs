//! Flow Aggregator Binary - extract-stage runtime
//!
//! Reads JSON-lines flow records from stdin, aggregates them in batches and
//! writes one JSON line per touched group.
//!
//! ## Usage
//!
//! ```bash
//! FLOWAGG_DEFINITIONS_PATH=aggregates.json cargo run --release --bin flow_aggregator < flows.jsonl
//! ```
//!
//! ## Environment Variables
//!
//! - FLOWAGG_DEFINITIONS_PATH - JSON array of aggregate definitions (required)
//! - FLOWAGG_BATCH_SIZE - Records per batch (default: 1000)
//! - FLOWAGG_FLUSH_INTERVAL_MS - Partial batch flush period (default: 5000)
//! - FLOWAGG_OUTPUT_PATH - JSONL output file (default: stdout)
//! - RUST_LOG - Logging level (optional, default: info)

use flowagg::config::{load_definitions, StageConfig};
use flowagg::extract::BatchAggregator;
use flowagg::record::GenericMap;
use flowagg::writer::{AggregateWriterBackend, JsonlWriter, WriterError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration};

async fn flush_batch(
    aggregator: &mut BatchAggregator,
    batch: &mut Vec<GenericMap>,
    writer: &mut dyn AggregateWriterBackend,
) -> Result<(), WriterError> {
    let outputs = aggregator.extract(batch.as_slice());
    for record in &outputs {
        writer.write_record(record).await?;
    }
    writer.flush().await?;

    log::info!(
        "✅ Batch of {} records emitted {} aggregates",
        batch.len(),
        outputs.len()
    );
    batch.clear();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = StageConfig::from_env()?;
    let definitions = load_definitions(&config.definitions_path)?;

    log::info!("🚀 Starting flow aggregator");
    log::info!(
        "   Definitions: {} ({} aggregates)",
        config.definitions_path.display(),
        definitions.len()
    );
    log::info!("   Batch size: {}", config.batch_size);
    log::info!("   Flush interval: {}ms", config.flush_interval_ms);

    let mut aggregator = BatchAggregator::new(definitions)?;
    let mut writer: Box<dyn AggregateWriterBackend> = match &config.output_path {
        Some(path) => Box::new(JsonlWriter::to_file(path)?),
        None => Box::new(JsonlWriter::to_stdout()),
    };
    log::info!("📊 Backend: {}", writer.backend_type());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut batch: Vec<GenericMap> = Vec::with_capacity(config.batch_size);

    let mut flush_ticker = interval(Duration::from_millis(config.flush_interval_ms));
    flush_ticker.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            line_result = lines.next_line() => {
                match line_result {
                    Ok(Some(line)) => {
                        if !line.trim().is_empty() {
                            match serde_json::from_str::<GenericMap>(&line) {
                                Ok(record) => batch.push(record),
                                Err(e) => log::warn!("Failed to parse flow record: {} ({})", line, e),
                            }
                        }
                        if batch.len() >= config.batch_size {
                            flush_batch(&mut aggregator, &mut batch, writer.as_mut()).await?;
                        }
                    }
                    Ok(None) => {
                        if !batch.is_empty() {
                            flush_batch(&mut aggregator, &mut batch, writer.as_mut()).await?;
                        }
                        log::info!("Input closed, {} groups cached", aggregator.cache().len());
                        break;
                    }
                    Err(e) => {
                        log::error!("stdin error: {}", e);
                        return Err(e.into());
                    }
                }
            }

            _ = flush_ticker.tick() => {
                if !batch.is_empty() {
                    flush_batch(&mut aggregator, &mut batch, writer.as_mut()).await?;
                }
            }
        }
    }

    writer.flush().await?;
    Ok(())
}
