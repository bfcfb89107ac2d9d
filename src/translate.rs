use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Europe::Vilnius, Tz};
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{Calendar, CalendarEvent, LessonRecord},
};

pub const LESSON_TIMEZONE: Tz = Vilnius;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lessons carry no end time; every event lasts one hour.
pub fn lesson_duration() -> Duration {
    Duration::hours(1)
}

/// Turns the concatenated per-day lesson lists into a calendar, keeping input order.
///
/// Records without a uuid or timestamp are skipped. A timestamp in an unexpected format
/// aborts the whole conversion.
pub fn convert<'a, I>(days: I) -> Result<Calendar>
where
    I: IntoIterator<Item = &'a Vec<LessonRecord>>,
{
    let mut calendar = Calendar::default();

    for record in days.into_iter().flatten() {
        if let Some(event) = to_event(record)? {
            calendar.events.push(event);
        }
    }

    Ok(calendar)
}

pub fn to_event(record: &LessonRecord) -> Result<Option<CalendarEvent>> {
    let title = record.title();

    let (Some(published_at), Some(uid)) = (
        record.published_at.as_deref().filter(|s| !s.is_empty()),
        record.uuid.as_deref().filter(|s| !s.is_empty()),
    ) else {
        debug!(title = %title, "skipping lesson without uuid or timestamp");
        return Ok(None);
    };

    let start = parse_local_timestamp(published_at)?;

    Ok(Some(CalendarEvent {
        uid: uid.to_string(),
        summary: title,
        start,
        end: start + lesson_duration(),
    }))
}

/// Parses a naive Vilnius wall-clock time and resolves it to UTC with full DST rules.
///
/// An ambiguous time (autumn fold) resolves to the earlier instant. A time inside the
/// spring gap uses the offset in effect just before the gap.
pub fn parse_local_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| {
        Error::Format {
            value: raw.to_string(),
        }
    })?;

    let local = match LESSON_TIMEZONE.from_local_datetime(&naive).earliest() {
        Some(local) => local,
        None => LESSON_TIMEZONE
            .from_local_datetime(&(naive - Duration::hours(1)))
            .earliest()
            .map(|before| before + Duration::hours(1))
            .ok_or_else(|| Error::Format {
                value: raw.to_string(),
            })?,
    };

    Ok(local.with_timezone(&Utc))
}
