//! Messages exchanged between the display layer and one session.
//!
//! Both directions are JSON objects tagged by `"type"`, one per line on the wire.

use serde::{Deserialize, Serialize};
use simcore::{SimResult, SimulationParameters, Snapshot};

/// Display layer -> session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    /// Reset all dynamic state, adopt `params`, arm both cadences
    Start { params: SimulationParameters, running: bool },
    /// Adopt `params` / `running` in place, keeping loop memory and history
    Update { params: SimulationParameters, running: bool },
    /// Resample the hidden plant constants
    Randomize,
    /// Zero dynamic state and history, keep parameters
    Reset,
}

/// Session -> display layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Sent once when the session comes up
    Ready,
    /// Current history contents
    Data(Snapshot),
}

impl Event {
    pub fn to_json_line(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parse one inbound line and check any parameters it carries.
pub fn parse_command(line: &str) -> SimResult<Command> {
    let command: Command = serde_json::from_str(line)?;
    if let Command::Start { params, .. } | Command::Update { params, .. } = &command {
        params.validate()?;
    }
    Ok(command)
}
