//! ISO-8601 style durations
//!
//! Components are kept separately (a month is not a fixed number of days) and
//! each one is `-1` while unset.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::wire::format_number;

const UNSET: i32 = -1;

/// Signed composite duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duration {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: f64,
    pub is_negative: bool,
}

impl Default for Duration {
    fn default() -> Self {
        Self::unset()
    }
}

impl Duration {
    /// Duration with every component unset
    pub const fn unset() -> Self {
        Self {
            years: UNSET,
            months: UNSET,
            days: UNSET,
            hours: UNSET,
            minutes: UNSET,
            seconds: -1.0,
            is_negative: false,
        }
    }

    pub fn from_days(days: i32) -> Self {
        Self {
            days: days.abs(),
            is_negative: days < 0,
            ..Self::unset()
        }
    }

    pub fn from_hours(hours: i32) -> Self {
        Self {
            hours: hours.abs(),
            is_negative: hours < 0,
            ..Self::unset()
        }
    }

    pub fn from_minutes(minutes: i32) -> Self {
        Self {
            minutes: minutes.abs(),
            is_negative: minutes < 0,
            ..Self::unset()
        }
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            seconds: seconds.abs(),
            is_negative: seconds < 0.0,
            ..Self::unset()
        }
    }

    /// Hours and minutes, as used for times of day and timezone offsets
    pub fn from_hm(hours: i32, minutes: i32) -> Self {
        Self {
            hours,
            minutes,
            ..Self::unset()
        }
    }

    /// Every component is unset
    pub fn is_unset(&self) -> bool {
        self.years < 0
            && self.months < 0
            && self.days < 0
            && self.hours < 0
            && self.minutes < 0
            && self.seconds < 0.0
    }

    /// Every component is either unset or non-negative
    pub fn is_valid(&self) -> bool {
        [self.years, self.months, self.days, self.hours, self.minutes]
            .iter()
            .all(|v| *v >= UNSET)
            && self.seconds.is_finite()
            && (self.seconds == -1.0 || self.seconds >= 0.0)
    }

    fn parts(&self) -> (f64, f64) {
        let z = |v: i32| if v < 0 { 0.0 } else { f64::from(v) };
        let days = z(self.years) * 365.25 + z(self.months) * 30.0 + z(self.days);
        let secs = z(self.hours) * 3600.0
            + z(self.minutes) * 60.0
            + if self.seconds < 0.0 { 0.0 } else { self.seconds };
        if self.is_negative {
            (-days, -secs)
        } else {
            (days, secs)
        }
    }

    /// Approximate total length in seconds (years as 365.25 days, months as 30)
    pub fn to_seconds_approx(&self) -> f64 {
        let (days, secs) = self.parts();
        days * 86_400.0 + secs
    }

    /// Approximate ordering: day part first, then time-of-day seconds
    pub fn compare(&self, other: &Duration) -> Ordering {
        let (ad, asec) = self.parts();
        let (bd, bsec) = other.parts();
        ad.partial_cmp(&bd)
            .unwrap_or(Ordering::Equal)
            .then(asec.partial_cmp(&bsec).unwrap_or(Ordering::Equal))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut date = String::new();
        for (value, designator) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value > 0 {
                date.push_str(&format!("{}{}", value, designator));
            }
        }

        let mut time = String::new();
        for (value, designator) in [(self.hours, 'H'), (self.minutes, 'M')] {
            if value > 0 {
                time.push_str(&format!("{}{}", value, designator));
            }
        }
        if self.seconds > 0.0 {
            time.push_str(&format!("{}S", format_number(self.seconds)));
        }

        if date.is_empty() && time.is_empty() {
            return write!(f, "PT0S");
        }
        if self.is_negative {
            write!(f, "-")?;
        }
        write!(f, "P{}", date)?;
        if !time.is_empty() {
            write!(f, "T{}", time)?;
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (is_negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let body = rest
            .strip_prefix('P')
            .or_else(|| rest.strip_prefix('p'))
            .ok_or_else(|| ModelError::duration(s, "missing 'P'"))?;

        let mut duration = Duration {
            is_negative,
            ..Duration::unset()
        };
        let mut in_time = false;
        let mut number = String::new();
        let mut components = 0;

        for c in body.chars() {
            match c {
                '0'..='9' | '.' => number.push(c),
                'T' | 't' => {
                    if in_time || !number.is_empty() {
                        return Err(ModelError::duration(s, "misplaced 'T'"));
                    }
                    in_time = true;
                },
                designator => {
                    if number.is_empty() {
                        return Err(ModelError::duration(
                            s,
                            format!("'{}' has no number", designator),
                        ));
                    }
                    let int = || {
                        number
                            .parse::<i32>()
                            .map_err(|_| {
                                ModelError::duration(s, format!("bad number '{}'", number))
                            })
                    };
                    match (in_time, designator.to_ascii_uppercase()) {
                        (false, 'Y') => duration.years = int()?,
                        (false, 'M') => duration.months = int()?,
                        (false, 'D') => duration.days = int()?,
                        (true, 'H') => duration.hours = int()?,
                        (true, 'M') => duration.minutes = int()?,
                        (true, 'S') => {
                            duration.seconds = number.parse::<f64>().map_err(|_| {
                                ModelError::duration(s, format!("bad number '{}'", number))
                            })?
                        },
                        _ => {
                            return Err(ModelError::duration(
                                s,
                                format!("unknown designator '{}'", designator),
                            ))
                        },
                    }
                    number.clear();
                    components += 1;
                },
            }
        }

        if !number.is_empty() {
            return Err(ModelError::duration(s, "number without designator"));
        }
        if components == 0 {
            return Err(ModelError::duration(s, "empty duration"));
        }
        Ok(duration)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_unset_formats_as_zero() {
        assert_eq!(Duration::unset().to_string(), "PT0S");
        let zero: Duration = "PT0S".parse().unwrap();
        assert_eq!(zero.seconds, 0.0);
        assert_eq!(zero.to_string(), "PT0S");
    }

    #[test]
    fn test_format() {
        let d = Duration {
            years: 1,
            days: 2,
            hours: 3,
            seconds: 1.5,
            ..Duration::unset()
        };
        assert_eq!(d.to_string(), "P1Y2DT3H1.5S");
        assert_eq!(Duration::from_minutes(2).to_string(), "PT2M");
        assert_eq!(Duration::from_hours(-6).to_string(), "-PT6H");
        assert_eq!(Duration::from_days(3).to_string(), "P3D");
    }

    #[test]
    fn test_parse_lowercase_and_sign() {
        let d: Duration = "-p1dt2h30m".parse().unwrap();
        assert!(d.is_negative);
        assert_eq!((d.days, d.hours, d.minutes), (1, 2, 30));
        assert_eq!(d.years, -1);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "1D", "P", "PT", "P1", "P1X", "PT1D", "P1H", "PTT1H", "P1.5D", "PD"] {
            assert!(bad.parse::<Duration>().is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_ordering() {
        let month: Duration = "P1M".parse().unwrap();
        let days29: Duration = "P29DT23H".parse().unwrap();
        assert_eq!(month.compare(&days29), Ordering::Greater);

        let hour = Duration::from_hours(1);
        let minutes = Duration::from_minutes(60);
        assert_eq!(hour.compare(&minutes), Ordering::Equal);
        assert_eq!(Duration::from_hours(-1).compare(&Duration::unset()), Ordering::Less);
    }

    #[test]
    fn test_validity() {
        assert!(Duration::unset().is_valid());
        assert!(Duration::from_hours(2).is_valid());
        let bad = Duration {
            hours: -3,
            ..Duration::unset()
        };
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_seconds_approx() {
        let d: Duration = "P1DT1M".parse().unwrap();
        assert_eq!(d.to_seconds_approx(), 86_460.0);
    }
}
