pub mod capture;
pub mod doctor;
pub mod index;
pub mod init;
pub mod lifecycle;
pub mod recall;

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
