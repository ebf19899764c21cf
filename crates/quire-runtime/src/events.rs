#![forbid(unsafe_code)]

//! Menu events delivered by the host shell.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A File-menu command. Each maps to one document workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuEvent {
    New,
    Open,
    Save,
    SaveAs,
}

impl MenuEvent {
    pub const ALL: [Self; 4] = [Self::New, Self::Open, Self::Save, Self::SaveAs];

    /// Wire name (`new`, `open`, `save`, `save_as`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::Save => "save",
            Self::SaveAs => "save_as",
        }
    }
}

impl fmt::Display for MenuEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string named no menu event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown menu event: {0:?}")]
pub struct UnknownMenuEvent(pub String);

impl FromStr for MenuEvent {
    type Err = UnknownMenuEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| UnknownMenuEvent(s.to_string()))
    }
}
