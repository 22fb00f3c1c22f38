use std::fmt;

use serde::{Deserialize, Serialize};

use crate::airport::Airport;
use crate::ledger::TravelHistoryItem;

/// Where the session sits in the spin → reveal → commit cycle.
///
/// Target and pending airports live inside the variants, so a session can
/// never hold both at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SpinPhase {
    #[default]
    Idle,
    /// Destination drawn, reveal still running on the caller's side.
    Spinning { target: Airport },
    /// Destination revealed in retry mode, awaiting confirm or retry.
    Pending { pending: Airport },
}

impl SpinPhase {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Spinning { .. } => "spinning",
            Self::Pending { .. } => "pending confirmation",
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        matches!(self, Self::Spinning { .. })
    }

    #[must_use]
    pub const fn target(&self) -> Option<&Airport> {
        match self {
            Self::Spinning { target } => Some(target),
            _ => None,
        }
    }

    #[must_use]
    pub const fn pending(&self) -> Option<&Airport> {
        match self {
            Self::Pending { pending } => Some(pending),
            _ => None,
        }
    }
}

impl fmt::Display for SpinPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Commands accepted by a spin session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinCommand {
    StartSpin,
    CompleteSpin,
    Confirm,
    Retry,
    UpdateSettings,
}

impl fmt::Display for SpinCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StartSpin => "start spin",
            Self::CompleteSpin => "complete spin",
            Self::Confirm => "confirm",
            Self::Retry => "retry",
            Self::UpdateSettings => "update settings",
        };
        f.write_str(label)
    }
}

/// Result of `start_spin`; only `Started` means a new draw happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinStart {
    Started(Airport),
    AlreadySpinning(Airport),
    AwaitingDecision(Airport),
}

impl SpinStart {
    #[must_use]
    pub const fn airport(&self) -> &Airport {
        match self {
            Self::Started(airport)
            | Self::AlreadySpinning(airport)
            | Self::AwaitingDecision(airport) => airport,
        }
    }

    #[must_use]
    pub const fn is_new_draw(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Result of `complete_spin`.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinResolution {
    Committed(TravelHistoryItem),
    Pending(Airport),
}
