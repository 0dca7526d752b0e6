//! Temporal model and normalization.
//!
//! Every external date/time representation is converted into a
//! [`TemporalValue`] at the boundary by a [`TemporalNormalizer`]. Comparison
//! logic only ever sees `TemporalValue`s, and the normalizer's policy decides
//! what happens to zone information:
//!
//! - **Legacy**: instants are projected into the configured platform zone and
//!   the zone is dropped, leaving a naive local date-time.
//! - **Strict**: instants keep their offset. A zoned value and a naive value
//!   are then neither equal nor ordered; every comparison between them is
//!   `false`.

use std::cmp::Ordering;
use std::fmt;

use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::EvalError;

const SECONDS_PER_DAY: i64 = 86_400;
const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;

// ──────────────────────────────────────────────
// TemporalValue
// ──────────────────────────────────────────────

/// Canonical point in time with explicit offset presence.
///
/// - date-only: `epoch_seconds` is UTC midnight of the date, no offset
/// - naive date-time: `epoch_seconds` encodes the wall clock as if it were UTC
/// - zoned date-time: `epoch_seconds` is the absolute instant, `offset` holds
///   the offset in minutes the wall clock is read in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemporalValue {
    epoch_seconds: i64,
    nanos: u32,
    offset: Option<i32>,
    has_time_component: bool,
}

impl TemporalValue {
    pub fn from_date(date: Date) -> Self {
        TemporalValue {
            epoch_seconds: date.midnight().assume_utc().unix_timestamp(),
            nanos: 0,
            offset: None,
            has_time_component: false,
        }
    }

    pub fn from_local(date_time: PrimitiveDateTime) -> Self {
        TemporalValue {
            epoch_seconds: date_time.assume_utc().unix_timestamp(),
            nanos: date_time.nanosecond(),
            offset: None,
            has_time_component: true,
        }
    }

    pub fn from_zoned(date_time: OffsetDateTime) -> Self {
        TemporalValue {
            epoch_seconds: date_time.unix_timestamp(),
            nanos: date_time.nanosecond(),
            offset: Some(i32::from(date_time.offset().whole_minutes())),
            has_time_component: true,
        }
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Offset in minutes east of UTC, `None` for naive and date-only values.
    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset
    }

    pub fn has_time_component(&self) -> bool {
        self.has_time_component
    }

    pub fn is_zoned(&self) -> bool {
        self.offset.is_some()
    }

    /// Seconds of the wall clock, encoded as if it were UTC.
    fn wall_seconds(&self) -> i64 {
        self.epoch_seconds + i64::from(self.offset.unwrap_or(0)) * 60
    }

    /// The local wall-clock reading of this value.
    pub fn wall_clock(&self) -> Option<PrimitiveDateTime> {
        let nanos = i128::from(self.wall_seconds()) * 1_000_000_000 + i128::from(self.nanos);
        let utc = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
        Some(PrimitiveDateTime::new(utc.date(), utc.time()))
    }

    /// The calendar date of the wall clock, `None` when it lies outside the
    /// representable calendar.
    pub fn date_part(&self) -> Option<Date> {
        let days = self.wall_seconds().div_euclid(SECONDS_PER_DAY);
        let julian_day = i32::try_from(days).ok()?.checked_add(UNIX_EPOCH_JULIAN_DAY)?;
        Date::from_julian_day(julian_day).ok()
    }

    /// Milliseconds since the epoch. Values without an offset are read in
    /// `zone`; date-only values are taken at midnight. `None` on overflow.
    pub fn epoch_millis_in(&self, zone: UtcOffset) -> Option<i64> {
        let seconds = if self.offset.is_some() {
            self.epoch_seconds
        } else {
            self.epoch_seconds
                .checked_sub(i64::from(zone.whole_seconds()))?
        };
        seconds
            .checked_mul(1000)?
            .checked_add(i64::from(self.nanos / 1_000_000))
    }

    /// Drop the offset, keeping the wall clock the value has in `zone`.
    /// Naive and date-only values are returned unchanged.
    pub fn to_naive_in(&self, zone: UtcOffset) -> TemporalValue {
        match self.offset {
            None => *self,
            Some(_) => TemporalValue {
                epoch_seconds: self.epoch_seconds + i64::from(zone.whole_seconds()),
                nanos: self.nanos,
                offset: None,
                has_time_component: true,
            },
        }
    }

    /// Ordering key for values of the same shape.
    fn key(&self) -> (i64, u32) {
        (self.epoch_seconds, self.nanos)
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_time_component {
            let text = self
                .date_part()
                .ok_or(fmt::Error)?
                .format(format_description!("[year]-[month]-[day]"))
                .map_err(|_| fmt::Error)?;
            return f.write_str(&text);
        }
        let wall = self.wall_clock().ok_or(fmt::Error)?;
        let text = wall
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second]"
            ))
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)?;
        if self.nanos != 0 {
            let fraction = format!("{:09}", self.nanos);
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        match self.offset {
            None => Ok(()),
            Some(0) => f.write_str("Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let abs = minutes.abs();
                write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
            }
        }
    }
}

// ──────────────────────────────────────────────
// External representations
// ──────────────────────────────────────────────

/// Date/time values as callers hand them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalTemporal {
    /// An instant counted in milliseconds since the epoch, carrying no zone
    /// of its own. Its wall clock is read in the platform zone.
    EpochMillis(i64),
    /// An instant with an explicit offset.
    Zoned(OffsetDateTime),
    /// A local date-time without zone.
    Local(PrimitiveDateTime),
    /// A calendar date without time of day.
    LocalDate(Date),
    /// An ISO-8601 text explicitly marked as temporal by the caller.
    Iso(String),
}

impl From<Date> for ExternalTemporal {
    fn from(d: Date) -> Self {
        ExternalTemporal::LocalDate(d)
    }
}

impl From<PrimitiveDateTime> for ExternalTemporal {
    fn from(dt: PrimitiveDateTime) -> Self {
        ExternalTemporal::Local(dt)
    }
}

impl From<OffsetDateTime> for ExternalTemporal {
    fn from(dt: OffsetDateTime) -> Self {
        ExternalTemporal::Zoned(dt)
    }
}

// ──────────────────────────────────────────────
// Normalizer
// ──────────────────────────────────────────────

/// How zone information on instants is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalPolicy {
    Legacy,
    Strict,
}

/// Converts external representations into [`TemporalValue`]s and compares
/// them, under one policy and one platform zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalNormalizer {
    policy: TemporalPolicy,
    zone: UtcOffset,
}

impl TemporalNormalizer {
    pub fn new(policy: TemporalPolicy, zone: UtcOffset) -> Self {
        TemporalNormalizer { policy, zone }
    }

    pub fn legacy(zone: UtcOffset) -> Self {
        TemporalNormalizer::new(TemporalPolicy::Legacy, zone)
    }

    pub fn strict(zone: UtcOffset) -> Self {
        TemporalNormalizer::new(TemporalPolicy::Strict, zone)
    }

    pub fn policy(&self) -> TemporalPolicy {
        self.policy
    }

    pub fn zone(&self) -> UtcOffset {
        self.zone
    }

    pub fn normalize(&self, external: &ExternalTemporal) -> Result<TemporalValue, EvalError> {
        let value = match external {
            ExternalTemporal::LocalDate(date) => TemporalValue::from_date(*date),
            ExternalTemporal::Local(date_time) => TemporalValue::from_local(*date_time),
            ExternalTemporal::EpochMillis(millis) => {
                let instant = TemporalValue {
                    epoch_seconds: millis.div_euclid(1000),
                    nanos: (millis.rem_euclid(1000) as u32) * 1_000_000,
                    offset: Some(self.zone.whole_minutes().into()),
                    has_time_component: true,
                };
                self.apply_policy(instant)
            }
            ExternalTemporal::Zoned(date_time) => {
                self.apply_policy(TemporalValue::from_zoned(*date_time))
            }
            ExternalTemporal::Iso(text) => self.apply_policy(parse_literal(text)?),
        };
        if value.wall_clock().is_none() {
            return Err(EvalError::temporal_parse(external_text(external)));
        }
        tracing::trace!(
            external = ?external,
            normalized = %value,
            policy = ?self.policy,
            "normalized temporal input"
        );
        Ok(value)
    }

    /// Parse a `date and time(...)` / `date(...)` literal. The literal keeps
    /// whatever offset it was written with.
    pub fn from_literal(&self, text: &str) -> Result<TemporalValue, EvalError> {
        parse_literal(text)
    }

    fn apply_policy(&self, value: TemporalValue) -> TemporalValue {
        match self.policy {
            TemporalPolicy::Legacy => value.to_naive_in(self.zone),
            TemporalPolicy::Strict => value,
        }
    }

    /// Order two temporal values. `None` means the pair is not comparable,
    /// which every comparison operator reports as `false`.
    pub fn compare(&self, a: &TemporalValue, b: &TemporalValue) -> Option<Ordering> {
        if a.has_time_component != b.has_time_component {
            return Some(a.date_part()?.cmp(&b.date_part()?));
        }
        if !a.has_time_component {
            return Some(a.key().cmp(&b.key()));
        }
        match (a.offset, b.offset) {
            (Some(_), Some(_)) | (None, None) => Some(a.key().cmp(&b.key())),
            _ => match self.policy {
                TemporalPolicy::Strict => None,
                TemporalPolicy::Legacy => {
                    let a = a.to_naive_in(self.zone);
                    let b = b.to_naive_in(self.zone);
                    Some(a.key().cmp(&b.key()))
                }
            },
        }
    }
}

/// How an external value is quoted back in a parse error.
fn external_text(external: &ExternalTemporal) -> String {
    match external {
        ExternalTemporal::EpochMillis(millis) => millis.to_string(),
        ExternalTemporal::Zoned(date_time) => date_time.to_string(),
        ExternalTemporal::Local(date_time) => date_time.to_string(),
        ExternalTemporal::LocalDate(date) => date.to_string(),
        ExternalTemporal::Iso(text) => text.clone(),
    }
}

// ──────────────────────────────────────────────
// Literal parsing
// ──────────────────────────────────────────────

/// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.fff][Z|±HH:MM]`.
pub fn parse_literal(text: &str) -> Result<TemporalValue, EvalError> {
    let Some(t_index) = text.find('T') else {
        return parse_date_literal(text);
    };

    let zone_index = text[t_index..]
        .find(['Z', '+', '-'])
        .map(|i| t_index + i);
    let (local_text, zone_text) = match zone_index {
        Some(i) => (&text[..i], Some(&text[i..])),
        None => (text, None),
    };

    let local = PrimitiveDateTime::parse(
        local_text,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        ),
    )
    .map_err(|_| EvalError::temporal_parse(text))?;

    match zone_text {
        None => Ok(TemporalValue::from_local(local)),
        Some("Z") => Ok(TemporalValue::from_zoned(local.assume_utc())),
        Some(zone) => {
            let offset = parse_offset(zone).ok_or_else(|| EvalError::temporal_parse(text))?;
            Ok(TemporalValue::from_zoned(local.assume_offset(offset)))
        }
    }
}

/// Parse a date-only `YYYY-MM-DD` literal.
pub fn parse_date_literal(text: &str) -> Result<TemporalValue, EvalError> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(TemporalValue::from_date)
        .map_err(|_| EvalError::temporal_parse(text))
}

/// Parse `Z` or a `±HH:MM` offset.
pub fn parse_offset(text: &str) -> Option<UtcOffset> {
    if text == "Z" {
        return Some(UtcOffset::UTC);
    }
    UtcOffset::parse(
        text,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .ok()
}
