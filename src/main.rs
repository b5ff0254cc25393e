use std::io::Read;
use std::path::PathBuf;

use clinotate::{Pipeline, Request};
use tracing_subscriber::EnvFilter;

/// clinotate <config_dir> <resource_dir> <dictionary_dir> [text_file]
///
/// Reads the document text from `text_file` (or stdin), runs one request
/// and prints the JSON response.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(config_dir), Some(resource_dir), Some(dictionary_dir)) =
        (args.next(), args.next(), args.next())
    else {
        eprintln!("usage: clinotate <config_dir> <resource_dir> <dictionary_dir> [text_file]");
        std::process::exit(2);
    };

    let text = match args.next() {
        Some(path) => std::fs::read_to_string(PathBuf::from(path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let pipeline = Pipeline::load(
        PathBuf::from(config_dir).as_path(),
        PathBuf::from(resource_dir).as_path(),
        PathBuf::from(dictionary_dir).as_path(),
    )?;

    let request = Request {
        tid: "cli".to_string(),
        text,
    };
    let response = pipeline.process(&request).await?;
    println!("{response}");
    Ok(())
}
