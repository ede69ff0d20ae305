use std::time::Duration;

// 2^6 = 64x the base delay at most.
const MAX_EXPONENT: u32 = 6;

/// Delay before the `retry`-th retry: `base * 2^(retry - 1)`.
///
/// Retry 0 (the first attempt) has no delay. The curve is deterministic so
/// that successive delays always grow until the cap is reached.
pub fn retry_delay(retry: u32, base: Duration) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }
    let exponent = (retry - 1).min(MAX_EXPONENT);
    base.saturating_mul(1 << exponent)
}
