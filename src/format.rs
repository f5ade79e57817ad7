//! Date formatting and CSS class composition helpers shared by the views.

use crate::types::Locale;
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

const NAIVE_FORMATS: [&[FormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];
const DATE_ONLY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

const EN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year] [hour]:[minute]");
const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

/// Parsed timestamp. Naive inputs carry no offset and are shown as written.
enum Stamp {
    Zoned(OffsetDateTime),
    Naive(PrimitiveDateTime),
}

impl Stamp {
    fn resolve(self, local: Option<UtcOffset>) -> PrimitiveDateTime {
        match self {
            Stamp::Zoned(dt) => {
                let dt = match local {
                    Some(offset) => dt.to_offset(offset),
                    None => dt,
                };
                PrimitiveDateTime::new(dt.date(), dt.time())
            }
            Stamp::Naive(dt) => dt,
        }
    }
}

fn parse_stamp(input: &str) -> Option<Stamp> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(Stamp::Zoned(dt));
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .copied()
        .find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
    {
        return Some(Stamp::Naive(dt));
    }
    if let Ok(date) = Date::parse(raw, DATE_ONLY_FORMAT) {
        return Some(Stamp::Naive(date.midnight()));
    }
    // Unix seconds, as some backends serialize `created_at`.
    let secs = raw.parse::<i64>().ok()?;
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .map(Stamp::Zoned)
}

fn local_offset() -> Option<UtcOffset> {
    UtcOffset::current_local_offset().ok()
}

/// Formats a backend timestamp for display in the user's locale and local
/// time zone. Returns an empty string when the input cannot be parsed.
pub fn format_date(input: &str, locale: Locale) -> String {
    format_date_at(input, locale, local_offset())
}

/// Same as [`format_date`] with an explicit target offset for zoned inputs.
pub fn format_date_at(input: &str, locale: Locale, offset: Option<UtcOffset>) -> String {
    let Some(stamp) = parse_stamp(input) else {
        return String::new();
    };
    let dt = stamp.resolve(offset);
    match locale {
        Locale::En => dt.format(EN_DATE_FORMAT).unwrap_or_default(),
        Locale::Zh => format!(
            "{}年{}月{}日 {:02}:{:02}",
            dt.year(),
            u8::from(dt.month()),
            dt.day(),
            dt.hour(),
            dt.minute()
        ),
    }
}

/// Short clock time for chat bubbles, e.g. `02:05 PM`.
pub fn format_message_time(input: &str) -> Option<String> {
    let dt = parse_stamp(input)?.resolve(local_offset());
    dt.format(MESSAGE_TIME_FORMAT).ok()
}

/// Joins CSS class names, skipping blanks and repeats.
pub fn class_names<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<&str> = Vec::new();
    for part in parts {
        for name in part.split_whitespace() {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out.join(" ")
}

/// `name` when `enabled`, otherwise the empty string.
pub fn class_if(enabled: bool, name: &str) -> &str {
    if enabled { name } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[test]
    fn invalid_dates_format_as_empty() {
        assert_eq!(format_date_at("", Locale::En, None), "");
        assert_eq!(format_date_at("not a date", Locale::En, None), "");
        assert_eq!(format_date_at("2026-13-40", Locale::Zh, None), "");
    }

    #[test]
    fn formats_naive_iso_with_fraction() {
        let out = format_date_at("2026-10-19T14:05:09.123456", Locale::En, None);
        assert_eq!(out, "Oct 19, 2026 14:05");
        let out = format_date_at("2026-10-19 08:30:00", Locale::Zh, None);
        assert_eq!(out, "2026年10月19日 08:30");
    }

    #[test]
    fn zoned_inputs_shift_to_target_offset() {
        let out = format_date_at("2026-10-19T23:30:00Z", Locale::En, Some(offset!(+8)));
        assert_eq!(out, "Oct 20, 2026 07:30");
        let out = format_date_at("2026-10-19T23:30:00Z", Locale::En, None);
        assert_eq!(out, "Oct 19, 2026 23:30");
    }

    #[test]
    fn accepts_date_only_and_unix_seconds() {
        assert_eq!(format_date_at("2026-01-02", Locale::En, None), "Jan 2, 2026 00:00");
        assert_eq!(format_date_at("0", Locale::En, None), "Jan 1, 1970 00:00");
    }

    #[test]
    fn class_names_skip_blanks_and_repeats() {
        let active = true;
        let out = class_names([
            "btn",
            class_if(active, "active"),
            class_if(false, "hidden"),
            "  btn ghost ",
        ]);
        assert_eq!(out, "btn active ghost");
        assert_eq!(class_names(Vec::<&str>::new()), "");
    }
}
