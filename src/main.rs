//! Fixtape CLI

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use fixtape::exchange::{ExchangeRecord, RequestRecord};
use fixtape::naming::{FixtureFileNamer, FixturePart};
use fixtape::storage::{ExchangeCodec, FixtureReader};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "name" => name(&args[2..]),
        "inspect" => inspect(&args[2..]),
        command => {
            eprintln!("Unknown command: {command}");
            eprintln!("Run 'fixtape' for usage information.");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Fixtape v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: fixtape <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  name <METHOD> <URL> [BODY_FILE]   Print fingerprint and fixture file name");
    eprintln!("  inspect <METADATA_FILE> [ROOT]    Summarize a recorded fixture");
}

fn name(args: &[String]) -> anyhow::Result<()> {
    let (method, url, body_file) = match args {
        [method, url] => (method, url, None),
        [method, url, body_file] => (method, url, Some(body_file)),
        _ => bail!("Usage: fixtape name <METHOD> <URL> [BODY_FILE]"),
    };

    let mut request = RequestRecord::parse(method.as_str(), url)?;
    if let Some(body_file) = body_file {
        let body = std::fs::read(body_file)
            .with_context(|| format!("Failed to read body file {body_file}"))?;
        request = request.with_body(body);
    }

    let mut exchange = ExchangeRecord::new(request);
    let namer = FixtureFileNamer::default();

    println!("fingerprint: {}", exchange.fingerprint()?);
    match exchange.file_name(&namer, FixturePart::Metadata)? {
        Some(file_name) => println!("metadata:    {file_name}"),
        None => println!("metadata:    <unidentifiable>"),
    }

    Ok(())
}

fn inspect(args: &[String]) -> anyhow::Result<()> {
    let (path, root) = match args {
        [path] => (Path::new(path), None),
        [path, root] => (Path::new(path), Some(PathBuf::from(root))),
        _ => bail!("Usage: fixtape inspect <METADATA_FILE> [FIXTURE_ROOT]"),
    };

    if !path.exists() {
        bail!("Fixture not found: {}", path.display());
    }

    // Body assets are named relative to the fixture root
    let root = root.unwrap_or_else(|| {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });
    let reader = FixtureReader::new(root.clone(), ExchangeCodec::default());
    let mut exchange = reader
        .read_path(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    let request = exchange.request();
    println!("Fixture root: {}", root.display());
    println!(
        "Request:      {} {}",
        request.method,
        request.url.as_ref().map_or("<no url>", url::Url::as_str)
    );
    println!(
        "Request body: {} bytes",
        request.buffered_body().map_or(0, |b| b.len())
    );
    println!("Fingerprint:  {}", exchange.fingerprint()?);

    match exchange.response() {
        Some(response) => {
            println!("Status:       {}", response.status);
            println!(
                "Content-Type: {}",
                response.content_type().unwrap_or("<none>")
            );
            println!(
                "Body:         {} bytes",
                response.body.as_ref().map_or(0, |b| b.len())
            );
        }
        None => println!("Response:     <not recorded>"),
    }

    Ok(())
}
