//! Scripted input for headless runs.
//!
//! An event script is a JSON array of `{"frame": n, "event": {...}}`
//! objects. Each event is dispatched just before tick `n`; events sharing a
//! frame keep their file order.

use gallery_core::frame::InputEvent;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    /// Zero-based tick before which the event is dispatched.
    pub frame: u64,
    pub event: InputEvent,
}

/// Parses a script and orders it by frame.
pub fn parse(json: &str) -> Result<Vec<ScriptedEvent>, CliError> {
    let mut events: Vec<ScriptedEvent> = serde_json::from_str(json)
        .map_err(|e| CliError::Input(format!("invalid event script: {e}")))?;
    events.sort_by_key(|e| e.frame);
    Ok(events)
}

pub fn load(path: &Path) -> Result<Vec<ScriptedEvent>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let events = parse(&text)?;
    log::debug!("script: loaded {} events from {}", events.len(), path.display());
    Ok(events)
}
