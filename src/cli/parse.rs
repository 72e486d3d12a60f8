use crate::ingest::{accumulate, Batch, IngestError};
use std::path::Path;
use tokio::io::BufReader;

/// Build a batch from a file (or stdin when `input` is None) and print it as JSON.
/// Nothing is persisted.
pub async fn parse(input: Option<&Path>, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let batch = read_batch(input).await?;

    let json = if compact {
        serde_json::to_string(&batch)?
    } else {
        serde_json::to_string_pretty(&batch)?
    };
    println!("{}", json);

    Ok(())
}

pub async fn read_batch(input: Option<&Path>) -> Result<Batch, IngestError> {
    match input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            accumulate(BufReader::new(file)).await
        }
        None => accumulate(BufReader::new(tokio::io::stdin())).await,
    }
}
