use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed amount in minor units (cents).
///
/// Transaction amounts, budget limits and every report figure use it, so sums
/// over a year of transactions stay exact. Positive is income, negative is an
/// expense; report fields such as `spent` or `over` hold magnitudes.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let spent: MoneyCents = "-12,5".parse().unwrap();
/// assert_eq!(spent.cents(), -1250);
/// assert_eq!(spent.abs().to_string(), "12.50");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Income side of the ledger.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Expense side of the ledger.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Magnitude, used for expense totals shown as spend.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Clamps at zero (budget `remaining` / `over`).
    #[must_use]
    pub fn non_negative(self) -> Self {
        self.max(Self::ZERO)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Cents encoded by the fractional part of a decimal: `""` → 0, `"5"` → 50,
/// `"05"` → 5. `None` for anything longer or non-numeric.
fn fraction_cents(fraction: &str) -> Option<i64> {
    if !is_digits(fraction) {
        return None;
    }
    match fraction.as_bytes() {
        [] => Some(0),
        [tens] => Some(i64::from(tens - b'0') * 10),
        [tens, units] => Some(i64::from(tens - b'0') * 10 + i64::from(units - b'0')),
        _ => None,
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses amounts as typed in the admin tool or a CSV export: optional
    /// sign, `.` or `,` as decimal separator, at most two decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {raw:?}"));

        let (negative, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (true, raw[1..].trim_start()),
            Some(b'+') => (false, raw[1..].trim_start()),
            _ => (false, raw),
        };
        let (whole, fraction) = unsigned
            .split_once(['.', ','])
            .unwrap_or((unsigned, ""));

        if whole.is_empty() || !is_digits(whole) {
            return Err(invalid());
        }
        let cents = fraction_cents(fraction).ok_or_else(|| {
            EngineError::InvalidAmount(format!("at most two decimals allowed: {raw:?}"))
        })?;
        let magnitude = whole
            .parse::<i64>()
            .ok()
            .and_then(|units| units.checked_mul(100))
            .and_then(|units| units.checked_add(cents))
            .ok_or_else(|| EngineError::InvalidAmount(format!("amount too large: {raw:?}")))?;

        Ok(MoneyCents(if negative { -magnitude } else { magnitude }))
    }
}
