use chrono::Utc;
use rand::Rng;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;
const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Builds an id of the form `{epoch_ms}_{7 base36 chars}`.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}", now_millis(), suffix)
}

/// Whole days left before `expires_at`, rounded up. Negative once expired.
pub fn days_until_expiration(expires_at: i64, now: i64) -> i64 {
    let diff = expires_at - now;
    // ceil for signed integer division
    let days = diff / MILLIS_PER_DAY;
    if diff % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// Timestamp `days` whole days after `now`, or `None` if it does not fit in an `i64`.
pub fn expires_after_days(now: i64, days: i64) -> Option<i64> {
    days.checked_mul(MILLIS_PER_DAY).and_then(|offset| now.checked_add(offset))
}

pub fn is_expiring_soon(expires_at: Option<i64>, threshold_days: i64, now: i64) -> bool {
    match expires_at {
        Some(ts) => {
            let days = days_until_expiration(ts, now);
            (0..=threshold_days).contains(&days)
        }
        None => false,
    }
}

pub fn is_expired(expires_at: Option<i64>, now: i64) -> bool {
    expires_at.is_some_and(|ts| ts < now)
}

/// Energy in kcal from macro grams (4/4/9 rule).
pub fn calculate_total_macros(protein_g: i32, carbs_g: i32, fat_g: i32) -> i32 {
    protein_g * 4 + carbs_g * 4 + fat_g * 9
}

pub fn format_quantity(qty: Option<&str>) -> &str {
    match qty {
        Some(q) if !q.is_empty() => q,
        _ => "to taste",
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
