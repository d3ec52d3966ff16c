//! Time zone resolution for date-time literals.
//!
//! A date-time literal may end with a zone marker: `-GMT`, `-JST`,
//! `-UTC+02:30`, `-PST-1`. The reader hands the part after the leading `-` to
//! a [`ZoneResolver`]. The default [`FixedZoneResolver`] knows the UTC
//! aliases, a table of common fixed-offset abbreviations, and any relative
//! form built on one of those (`JST+1` is nine hours plus one).
//!
//! ```rust
//! use sdlang::zone::{FixedZoneResolver, ZoneResolver};
//!
//! let resolver = FixedZoneResolver::new();
//! assert_eq!(resolver.resolve("GMT+02:30").unwrap().local_minus_utc(), 9_000);
//! assert_eq!(resolver.resolve("PST").unwrap().local_minus_utc(), -8 * 3_600);
//! assert!(resolver.resolve("Mars/Olympus").is_none());
//! ```

use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Maps a zone code to a fixed UTC offset.
pub trait ZoneResolver: Send + Sync {
    /// Returns the offset for `zone`, or `None` if the zone is unknown.
    fn resolve(&self, zone: &str) -> Option<FixedOffset>;
}

impl<F> ZoneResolver for F
where
    F: Fn(&str) -> Option<FixedOffset> + Send + Sync,
{
    fn resolve(&self, zone: &str) -> Option<FixedOffset> {
        self(zone)
    }
}

/// Offsets in minutes east of UTC.
const ABBREVIATIONS: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UTC", 0),
    ("UT", 0),
    ("Z", 0),
    ("WET", 0),
    ("WEST", 60),
    ("BST", 60),
    ("CET", 60),
    ("MET", 60),
    ("CEST", 120),
    ("MEST", 120),
    ("EET", 120),
    ("EEST", 180),
    ("MSK", 180),
    ("IST", 330),
    ("HKT", 480),
    ("SGT", 480),
    ("AWST", 480),
    ("JST", 540),
    ("KST", 540),
    ("ACST", 570),
    ("AEST", 600),
    ("AEDT", 660),
    ("NZST", 720),
    ("NZDT", 780),
    ("HST", -600),
    ("AKST", -540),
    ("AKDT", -480),
    ("PST", -480),
    ("PDT", -420),
    ("MST", -420),
    ("MDT", -360),
    ("CST", -360),
    ("CDT", -300),
    ("EST", -300),
    ("EDT", -240),
    ("AST", -240),
    ("ADT", -180),
    ("NST", -210),
    ("NDT", -150),
];

static ZONE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9/_]+?)(?:([+-])([0-9]+)(?::([0-9]+))?)?$").expect("zone pattern must compile")
});

/// Resolves UTC aliases, well-known abbreviations and relative offsets.
///
/// Extra abbreviations can be registered with [`FixedZoneResolver::with_zone`].
#[derive(Clone, Default)]
pub struct FixedZoneResolver {
    custom: HashMap<String, i32>,
}

impl FixedZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` (case-insensitive) at `offset_minutes` east of UTC.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdlang::zone::{FixedZoneResolver, ZoneResolver};
    ///
    /// let resolver = FixedZoneResolver::new().with_zone("CHAST", 12 * 60 + 45);
    /// assert_eq!(resolver.resolve("chast").unwrap().local_minus_utc(), 45_900);
    /// ```
    #[must_use]
    pub fn with_zone(mut self, name: &str, offset_minutes: i32) -> Self {
        self.custom.insert(name.to_ascii_uppercase(), offset_minutes);
        self
    }

    fn base_offset(&self, name: &str) -> Option<i32> {
        let name = name.to_ascii_uppercase();
        self.custom.get(&name).copied().or_else(|| {
            ABBREVIATIONS
                .iter()
                .find(|(abbreviation, _)| *abbreviation == name)
                .map(|(_, minutes)| *minutes)
        })
    }
}

impl ZoneResolver for FixedZoneResolver {
    fn resolve(&self, zone: &str) -> Option<FixedOffset> {
        let caps = ZONE_CODE.captures(zone)?;
        let mut minutes = self.base_offset(&caps[1])?;

        if let Some(sign) = caps.get(2) {
            let hours: i32 = caps[3].parse().ok()?;
            let extra: i32 = match caps.get(4) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            let relative = hours.checked_mul(60)?.checked_add(extra)?;
            minutes = if sign.as_str() == "-" {
                minutes.checked_sub(relative)?
            } else {
                minutes.checked_add(relative)?
            };
        }

        FixedOffset::east_opt(minutes.checked_mul(60)?)
    }
}

impl fmt::Debug for FixedZoneResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedZoneResolver")
            .field("custom", &self.custom)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(zone: &str) -> Option<i32> {
        FixedZoneResolver::new()
            .resolve(zone)
            .map(|o| o.local_minus_utc())
    }

    #[test]
    fn test_utc_aliases() {
        for zone in ["GMT", "UTC", "UT", "Z", "utc"] {
            assert_eq!(offset(zone), Some(0), "{}", zone);
        }
    }

    #[test]
    fn test_relative_offsets() {
        assert_eq!(offset("GMT+08:30"), Some(8 * 3600 + 30 * 60));
        assert_eq!(offset("GMT-05:00"), Some(-5 * 3600));
        assert_eq!(offset("UTC-04"), Some(-4 * 3600));
        assert_eq!(offset("JST+1"), Some(10 * 3600));
        assert_eq!(offset("PST-1"), Some(-9 * 3600));
    }

    #[test]
    fn test_unknown_and_out_of_range() {
        assert_eq!(offset("XYZ"), None);
        assert_eq!(offset("GMT+99"), None);
        assert_eq!(offset(""), None);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |zone: &str| {
            if zone == "HOME" {
                FixedOffset::east_opt(3600)
            } else {
                None
            }
        };
        assert_eq!(resolver.resolve("HOME").map(|o| o.local_minus_utc()), Some(3600));
        assert!(resolver.resolve("GMT").is_none());
    }
}
