//! Signed durations with millisecond precision.

use std::fmt;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// A signed span of time with millisecond precision, as written by SDL
/// time-span literals (`12:30:00`, `-5d:01:00:00.250`).
///
/// The components returned by [`days`](TimeSpan::days),
/// [`hours`](TimeSpan::hours) and the rest all carry the sign of the whole
/// span.
///
/// # Examples
///
/// ```rust
/// use sdlang::TimeSpan;
///
/// let span = TimeSpan::new(1, 2, 3, 4, 5);
/// assert_eq!(span.days(), 1);
/// assert_eq!(span.hours(), 2);
/// assert_eq!(span.milliseconds(), 5);
/// assert_eq!(span.to_string(), "1d:02:03:04.005");
///
/// let negative = -TimeSpan::new(0, 12, 30, 0, 0);
/// assert_eq!(negative.minutes(), -30);
/// assert_eq!(negative.to_string(), "-12:30:00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan(i64);

impl TimeSpan {
    /// Builds a span from its components. Overflow saturates.
    #[must_use]
    pub fn new(days: i64, hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Self {
        let total = days
            .saturating_mul(MS_PER_DAY)
            .saturating_add(hours.saturating_mul(MS_PER_HOUR))
            .saturating_add(minutes.saturating_mul(MS_PER_MINUTE))
            .saturating_add(seconds.saturating_mul(MS_PER_SECOND))
            .saturating_add(milliseconds);
        TimeSpan(total)
    }

    /// Builds a span from its components, or `None` on overflow.
    #[must_use]
    pub fn checked_new(
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
    ) -> Option<Self> {
        let total = days
            .checked_mul(MS_PER_DAY)?
            .checked_add(hours.checked_mul(MS_PER_HOUR)?)?
            .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(MS_PER_SECOND)?)?
            .checked_add(milliseconds)?;
        Some(TimeSpan(total))
    }

    #[inline]
    #[must_use]
    pub const fn from_milliseconds(milliseconds: i64) -> Self {
        TimeSpan(milliseconds)
    }

    #[inline]
    #[must_use]
    pub const fn total_milliseconds(&self) -> i64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    #[must_use]
    pub const fn days(&self) -> i64 {
        self.0 / MS_PER_DAY
    }

    #[inline]
    #[must_use]
    pub const fn hours(&self) -> i64 {
        (self.0 / MS_PER_HOUR) % 24
    }

    #[inline]
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        (self.0 / MS_PER_MINUTE) % 60
    }

    #[inline]
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        (self.0 / MS_PER_SECOND) % 60
    }

    #[inline]
    #[must_use]
    pub const fn milliseconds(&self) -> i64 {
        self.0 % MS_PER_SECOND
    }

    /// Formats the span as an SDL literal.
    ///
    /// With `force_days` the day component is written even when it is zero
    /// (`0d:01:00:00`), which keeps a span that follows a date from being read
    /// back as that date's time of day.
    #[must_use]
    pub fn to_literal(&self, force_days: bool) -> String {
        let magnitude = self.0.unsigned_abs();
        let days = magnitude / MS_PER_DAY as u64;
        let hours = magnitude / MS_PER_HOUR as u64 % 24;
        let minutes = magnitude / MS_PER_MINUTE as u64 % 60;
        let seconds = magnitude / MS_PER_SECOND as u64 % 60;
        let milliseconds = magnitude % MS_PER_SECOND as u64;

        let mut out = String::new();
        if self.0 < 0 {
            out.push('-');
        }
        if days > 0 || force_days {
            out.push_str(&format!("{}d:", days));
        }
        out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
        if milliseconds > 0 {
            out.push_str(&format!(".{:03}", milliseconds));
        }
        out
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal(false))
    }
}

impl std::ops::Neg for TimeSpan {
    type Output = TimeSpan;

    fn neg(self) -> TimeSpan {
        TimeSpan(self.0.saturating_neg())
    }
}

impl From<chrono::Duration> for TimeSpan {
    fn from(duration: chrono::Duration) -> Self {
        TimeSpan(duration.num_milliseconds())
    }
}

impl From<TimeSpan> for chrono::Duration {
    fn from(span: TimeSpan) -> Self {
        chrono::Duration::milliseconds(span.0.max(-i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_share_the_sign() {
        let span = TimeSpan::new(-1, -2, -3, -4, -5);
        assert!(span.is_negative());
        assert_eq!(span.days(), -1);
        assert_eq!(span.hours(), -2);
        assert_eq!(span.minutes(), -3);
        assert_eq!(span.seconds(), -4);
        assert_eq!(span.milliseconds(), -5);
        assert_eq!(span, -TimeSpan::new(1, 2, 3, 4, 5));
    }

    #[test]
    fn test_components_normalize() {
        let span = TimeSpan::new(0, 25, 61, 0, 0);
        assert_eq!(span.days(), 1);
        assert_eq!(span.hours(), 2);
        assert_eq!(span.minutes(), 1);
    }

    #[test]
    fn test_literal() {
        assert_eq!(TimeSpan::new(0, 12, 30, 0, 0).to_literal(false), "12:30:00");
        assert_eq!(TimeSpan::new(0, 1, 2, 3, 0).to_literal(true), "0d:01:02:03");
        assert_eq!(TimeSpan::new(5, 0, 0, 0, 120).to_string(), "5d:00:00:00.120");
        assert_eq!(TimeSpan::new(-2, -3, 0, 0, 0).to_string(), "-2d:03:00:00");
    }

    #[test]
    fn test_checked_new_overflow() {
        assert!(TimeSpan::checked_new(i64::MAX, 0, 0, 0, 0).is_none());
        assert_eq!(
            TimeSpan::checked_new(0, 0, 0, 1, 500),
            Some(TimeSpan::from_milliseconds(1_500))
        );
    }

    #[test]
    fn test_chrono_conversion() {
        let span = TimeSpan::from(chrono::Duration::minutes(90));
        assert_eq!(span.hours(), 1);
        assert_eq!(span.minutes(), 30);
        let back: chrono::Duration = span.into();
        assert_eq!(back.num_minutes(), 90);
    }
}
