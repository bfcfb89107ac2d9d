use chrono::{DateTime, Utc};
use ical::property::Property;

use crate::model::{Calendar, CalendarEvent};

/// Longest physical line allowed by RFC 5545, excluding the CRLF.
const MAX_LINE_OCTETS: usize = 75;

impl Calendar {
    /// Serializes the calendar as an iCalendar document. No DTSTAMP is written, so the
    /// same events always give the same bytes.
    pub fn to_ics(&self) -> String {
        let mut out = String::new();
        write_line(&mut out, &property("BEGIN", "VCALENDAR"));
        for line in [
            property("PRODID", Self::PRODID),
            property("VERSION", Self::VERSION),
            property("CALSCALE", Self::CALSCALE),
            property("METHOD", Self::METHOD),
            property("X-WR-CALNAME", &escape_text(Self::NAME)),
        ] {
            write_line(&mut out, &line);
        }
        for event in &self.events {
            write_event(&mut out, event);
        }
        write_line(&mut out, &property("END", "VCALENDAR"));
        out
    }
}

fn write_event(out: &mut String, event: &CalendarEvent) {
    for line in [
        property("BEGIN", "VEVENT"),
        property("UID", &escape_text(&event.uid)),
        property("SUMMARY", &escape_text(&event.summary)),
        property("DTSTART", &format_utc(event.start)),
        property("DTEND", &format_utc(event.end)),
        property("END", "VEVENT"),
    ] {
        write_line(out, &line);
    }
}

fn property(name: &str, value: &str) -> Property {
    Property {
        name: name.to_string(),
        params: None,
        value: Some(value.to_string()),
    }
}

/// Writes `NAME:value` followed by CRLF, folding so no physical line exceeds 75 octets.
/// Folds only fall between characters, never inside a UTF-8 sequence.
fn write_line(out: &mut String, property: &Property) {
    let mut width = 0;
    let value = property.value.as_deref().unwrap_or("");
    for c in property.name.chars().chain([':']).chain(value.chars()) {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str("\r\n");
}

/// `20240310T120000Z`
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// RFC 5545 TEXT escaping.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
