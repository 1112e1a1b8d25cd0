use std::io::Read as _;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use transit_db::document::{self, InputDocument};
use transit_db::legacy;

/// Runs a transit query document end to end and prints the JSON response.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input document. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Parse the input as the legacy count-prefixed plain-text format
    /// instead of JSON.
    #[arg(long)]
    legacy: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let text = match read_input(args.input.as_deref()) {
        Ok(text) => text,
        Err(err) => fail(&format!("cannot read input document: {err}")),
    };

    let input = if args.legacy {
        legacy::parse_document(&text)
    } else {
        serde_json::from_str::<InputDocument>(&text).map_err(Into::into)
    };

    let input = match input {
        Ok(input) => input,
        Err(err) => fail(&format!("malformed input document: {err}")),
    };

    info!(
        "processing document: {} modify requests, {} stat requests",
        input.base_requests.len(),
        input.stat_requests.len()
    );

    let output = document::process_document(input);
    match serde_json::to_string(&output) {
        Ok(json) => println!("{json}"),
        Err(err) => fail(&format!("cannot serialize response: {err}")),
    }
}

fn read_input(path: Option<&std::path::Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn fail(message: &str) -> ! {
    error!("{message}");
    std::process::exit(1);
}
