use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use skymate_game::FlightQuote;

/// Short hops below this many miles are sent back by [`TravelerStrategy::RetryShortHops`].
pub const SHORT_HOP_MILES: u32 = 300;
/// Retry budget before a choosy traveler takes whatever comes up.
pub const MAX_CONSECUTIVE_RETRIES: u32 = 3;

/// Decision returned by a [`TravelerPolicy`] for a pending destination.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub accept: bool,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn accept(rationale: impl Into<String>) -> Self {
        Self {
            accept: true,
            rationale: Some(rationale.into()),
        }
    }

    #[must_use]
    pub fn retry(rationale: impl Into<String>) -> Self {
        Self {
            accept: false,
            rationale: Some(rationale.into()),
        }
    }
}

/// Policy interface for automated travelers in retry mode.
pub trait TravelerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Confirm or retry the pending destination described by `quote`.
    fn decide(&mut self, quote: &FlightQuote) -> PolicyDecision;
}

/// Built-in traveler strategies for automated journeys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TravelerStrategy {
    AlwaysConfirm,
    RetryShortHops,
    CoinFlip,
}

impl TravelerStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AlwaysConfirm => "Always Confirm",
            Self::RetryShortHops => "Retry Short Hops",
            Self::CoinFlip => "Coin Flip",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn TravelerPolicy + Send> {
        match self {
            Self::AlwaysConfirm => Box::new(AlwaysConfirmPolicy),
            Self::RetryShortHops => Box::new(RetryShortHopsPolicy::default()),
            Self::CoinFlip => Box::new(CoinFlipPolicy::new(seed)),
        }
    }
}

impl fmt::Display for TravelerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct AlwaysConfirmPolicy;

#[derive(Default)]
struct RetryShortHopsPolicy {
    consecutive_retries: u32,
}

struct CoinFlipPolicy {
    rng: ChaCha20Rng,
}

impl CoinFlipPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl TravelerPolicy for AlwaysConfirmPolicy {
    fn name(&self) -> &'static str {
        "Always Confirm"
    }

    fn decide(&mut self, quote: &FlightQuote) -> PolicyDecision {
        PolicyDecision::accept(format!("{} mi", quote.distance_miles))
    }
}

impl TravelerPolicy for RetryShortHopsPolicy {
    fn name(&self) -> &'static str {
        "Retry Short Hops"
    }

    fn decide(&mut self, quote: &FlightQuote) -> PolicyDecision {
        if quote.distance_miles >= SHORT_HOP_MILES {
            self.consecutive_retries = 0;
            return PolicyDecision::accept(format!("{} mi is worth it", quote.distance_miles));
        }
        if self.consecutive_retries >= MAX_CONSECUTIVE_RETRIES {
            self.consecutive_retries = 0;
            return PolicyDecision::accept("retry budget spent");
        }
        self.consecutive_retries += 1;
        PolicyDecision::retry(format!(
            "{} mi hop (retry {}/{MAX_CONSECUTIVE_RETRIES})",
            quote.distance_miles, self.consecutive_retries
        ))
    }
}

impl TravelerPolicy for CoinFlipPolicy {
    fn name(&self) -> &'static str {
        "Coin Flip"
    }

    fn decide(&mut self, _quote: &FlightQuote) -> PolicyDecision {
        if self.rng.gen_bool(0.5) {
            PolicyDecision::accept("heads")
        } else {
            PolicyDecision::retry("tails")
        }
    }
}
