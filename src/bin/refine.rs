//! Run the refine endpoint once.
//!
//! Reads an invocation event `{"httpMethod": "POST", "body": "{\"content\": ...}"}`
//! from the file named on the command line, or from stdin, and prints the
//! `{"statusCode": .., "body": ..}` reply on stdout.

use std::io::Read;

use anyhow::{Context, Result};
use rusty_xrd::endpoint::{self, RefineEvent};

fn main() -> Result<()> {
    env_logger::init();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading event file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading event from stdin")?;
            buf
        }
    };

    let event: RefineEvent = serde_json::from_str(&raw).context("parsing invocation event")?;
    let response = endpoint::handle(&event);
    log::info!("{} {}", event.http_method, response.status_code);

    println!(
        "{}",
        serde_json::to_string(&response).context("serialising response")?
    );
    Ok(())
}
