// ABOUTME: Flexible parsing of RSS pubDate / lastBuildDate values.
// ABOUTME: Tries RFC 3339, RFC 2822, named zone abbreviations, and looser layouts, all to UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Layouts carrying a numeric offset.
const OFFSET_LAYOUTS: &[&str] = &[
    "%a, %e %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%e %b %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Layouts without zone information; interpreted as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%a, %e %b %Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%e %b %Y %H:%M:%S",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%a, %d %b %Y"];

/// Zone abbreviations seen in podcast feeds beyond the RFC 2822 set.
/// IST is read as Irish Standard Time.
const ZONE_OFFSETS: &[(&str, i32)] = &[
    ("AKST", -9 * 3600),
    ("AKDT", -8 * 3600),
    ("HST", -10 * 3600),
    ("AST", -4 * 3600),
    ("ADT", -3 * 3600),
    ("NST", -(3 * 3600 + 30 * 60)),
    ("NDT", -(2 * 3600 + 30 * 60)),
    ("WET", 0),
    ("WEST", 3600),
    ("BST", 3600),
    ("IST", 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("EET", 2 * 3600),
    ("EEST", 3 * 3600),
    ("JST", 9 * 3600),
    ("KST", 9 * 3600),
    ("AWST", 8 * 3600),
    ("AEST", 10 * 3600),
    ("AEDT", 11 * 3600),
    ("NZST", 12 * 3600),
    ("NZDT", 13 * 3600),
];

/// Parses a feed date string into UTC. None when no layout matches.
pub fn parse_feed_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Before RFC 2822, which reads unknown zone names as UTC.
    if let Some(dt) = parse_with_zone_abbreviation(s) {
        return Some(dt);
    }

    // Covers GMT/UT/Z and the US zones (EST..PDT) too.
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(s, layout) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    parse_naive(s)
}

/// Parses the first candidate that yields a date, else `fallback`.
pub fn parse_feed_date_or<'a, I>(candidates: I, fallback: DateTime<Utc>) -> DateTime<Utc>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .find_map(parse_feed_date)
        .unwrap_or(fallback)
}

fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

fn parse_with_zone_abbreviation(s: &str) -> Option<DateTime<Utc>> {
    let (base, zone) = s.rsplit_once(' ')?;
    let offset_secs = ZONE_OFFSETS
        .iter()
        .find(|(name, _)| zone.eq_ignore_ascii_case(name))
        .map(|(_, secs)| *secs)?;
    let offset = FixedOffset::east_opt(offset_secs)?;

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(base.trim_end(), layout).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc2822_with_offset() {
        assert_eq!(
            parse_feed_date("Mon, 02 Jan 2006 15:04:05 -0700"),
            Some(Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_rfc2822_with_gmt_and_us_zones() {
        assert_eq!(
            parse_feed_date("Tue, 16 Jan 2024 11:00:00 GMT"),
            Some(Utc.with_ymd_and_hms(2024, 1, 16, 11, 0, 0).unwrap())
        );
        assert_eq!(
            parse_feed_date("Mon, 02 Jan 2006 15:04:05 MST"),
            Some(Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_feed_date("2023-06-15T14:30:00Z"),
            Some(Utc.with_ymd_and_hms(2023, 6, 15, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_zone_abbreviation() {
        assert_eq!(
            parse_feed_date("Wed, 05 Jun 2024 09:00:00 CEST"),
            Some(Utc.with_ymd_and_hms(2024, 6, 5, 7, 0, 0).unwrap())
        );
        assert_eq!(
            parse_feed_date("5 Jun 2024 18:00:00 JST"),
            Some(Utc.with_ymd_and_hms(2024, 6, 5, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_naive_forms_assume_utc() {
        assert_eq!(
            parse_feed_date("2006-01-02 15:04:05"),
            Some(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap())
        );
        assert_eq!(
            parse_feed_date("2023-12-25"),
            Some(Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_returns_none() {
        assert!(parse_feed_date("").is_none());
        assert!(parse_feed_date("   ").is_none());
        assert!(parse_feed_date("not a date").is_none());
    }

    #[test]
    fn test_fallback_chain() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            parse_feed_date_or(["garbage", "2023-12-25"], now),
            Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap()
        );
        assert_eq!(parse_feed_date_or(["", "nope"], now), now);
    }
}
