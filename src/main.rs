//! Prints a rowfile store, header first, one tab separated line per row.
//!
//! Usage: `rowfile <path> [settings.toml]`

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rowfile::{ConcurrencyMode, CursorBuilder, ScrollSensitivity, Settings};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn dump(path: &Path, settings: Option<&Path>) -> rowfile::Result<usize> {
    let settings = Settings::load(settings)?;
    let mut cursor = CursorBuilder::with_settings(&settings)
        .scroll(ScrollSensitivity::ForwardOnly)
        .concurrency(ConcurrencyMode::ReadOnly)
        .load(path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let column_count = cursor.metadata().column_count();
    let header: Vec<&str> = cursor.metadata().names().collect();
    writeln!(out, "{}", header.join("\t"))?;
    while cursor.next()? {
        let mut fields = Vec::with_capacity(column_count);
        for ordinal in 1..=column_count {
            fields.push(cursor.get_string(ordinal)?);
        }
        writeln!(out, "{}", fields.join("\t"))?;
    }
    let rows = cursor.row_count();
    cursor.close()?;
    Ok(rows)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        error!("usage: rowfile <path> [settings.toml]");
        return ExitCode::from(2);
    };
    let settings = args.next().map(PathBuf::from);
    match dump(&path, settings.as_deref()) {
        Ok(rows) => {
            info!(path=%path.display(), rows, "dumped row store");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(path=%path.display(), error=%e, category=?e.category(), "could not dump row store");
            ExitCode::FAILURE
        }
    }
}
