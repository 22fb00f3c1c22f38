//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the u32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<u32, f64>(u32::MIN).unwrap_or(0.0);
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.round().clamp(min, max);
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Convert u32 to f64 in a single audited location.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Sum u32 values into a u64 without overflow.
#[must_use]
pub fn sum_u32<I>(values: I) -> u64
where
    I: IntoIterator<Item = u32>,
{
    values
        .into_iter()
        .fold(0_u64, |acc, value| acc.saturating_add(u64::from(value)))
}
