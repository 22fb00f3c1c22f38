use anyhow::{Context, Result, bail};
use regex::Regex;
use skymate_game::constants::DEFAULT_SEED;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Largest range a single `a..b` token may expand to.
const MAX_RANGE_LEN: u64 = 10_000;

/// Seed metadata carried through scenario runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    /// CLI token the seed came from.
    pub source: String,
}

impl SeedInfo {
    #[must_use]
    pub fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            source: seed.to_string(),
        }
    }

    fn from_token(seed: u64, token: &str) -> Self {
        Self {
            seed,
            source: token.to_string(),
        }
    }
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\.\.(=?)(\d+)$").expect("seed range pattern is valid")
    })
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports decimal integers (negative values use their magnitude), `0x`
/// hexadecimal literals, and `a..b` / `a..=b` ranges. Duplicates collapse to
/// their first occurrence; an empty list falls back to the default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some(caps) = range_pattern().captures(token) {
            let start: u64 = caps[1]
                .parse()
                .with_context(|| format!("range start out of bounds: {token}"))?;
            let end: u64 = caps[3]
                .parse()
                .with_context(|| format!("range end out of bounds: {token}"))?;
            let end = if caps[2].is_empty() {
                end.checked_sub(1)
            } else {
                Some(end)
            };
            let Some(end) = end.filter(|end| *end >= start) else {
                bail!("Empty seed range: {token}");
            };
            if end - start >= MAX_RANGE_LEN {
                bail!("Seed range {token} expands past {MAX_RANGE_LEN} seeds");
            }
            pending.extend((start..=end).map(|seed| SeedInfo::from_token(seed, token)));
            continue;
        }

        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            let value = u64::from_str_radix(&hex.replace('_', ""), 16)
                .with_context(|| format!("Invalid hex seed: {token}"))?;
            pending.push(SeedInfo::from_token(value, token));
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_token(value.unsigned_abs(), token));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_token(value, token));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    let mut deduped: Vec<SeedInfo> = pending
        .into_iter()
        .filter(|info| seen.insert(info.seed))
        .collect();

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(deduped)
}
