use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Dates at or before year 1 are the "zero" value (`0001-01-01T00:00:00`) some
/// generators emit in place of a real date, whatever offset is attached.
const ZERO_SENTINEL_YEAR: i32 = 1;

/// Offset-aware layouts tried after RFC 3339 and RFC 2822.
const OFFSET_LAYOUTS: &[&str] = &[
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
];

/// Layouts without an offset; the value is taken as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

/// Non-English month abbreviations seen in real feeds, mapped to the English
/// abbreviation the RFC 2822 grammar expects. Keys are lowercase.
const MONTH_ALIASES: &[(&str, &str)] = &[
    // German
    ("mär", "Mar"),
    ("mrz", "Mar"),
    ("mai", "May"),
    ("okt", "Oct"),
    ("dez", "Dec"),
    // French
    ("janv", "Jan"),
    ("févr", "Feb"),
    ("fevr", "Feb"),
    ("mars", "Mar"),
    ("avr", "Apr"),
    ("juin", "Jun"),
    ("juil", "Jul"),
    ("août", "Aug"),
    ("aout", "Aug"),
    ("sept", "Sep"),
    ("déc", "Dec"),
    // Spanish
    ("ene", "Jan"),
    ("abr", "Apr"),
    ("ago", "Aug"),
    ("dic", "Dec"),
    // Italian
    ("gen", "Jan"),
    ("mag", "May"),
    ("giu", "Jun"),
    ("lug", "Jul"),
    ("set", "Sep"),
    ("ott", "Oct"),
    // Dutch
    ("mrt", "Mar"),
    ("mei", "May"),
];

/// Non-English weekday abbreviations. A leading weekday is dropped before
/// parsing, so only recognition matters. Keys are lowercase.
const WEEKDAY_ALIASES: &[&str] = &[
    // German
    "mo", "di", "mi", "do", "fr", "sa", "so",
    // French
    "lun", "mar", "mer", "jeu", "ven", "sam", "dim",
    // Spanish
    "mié", "mie", "jue", "vie", "sáb", "sab", "dom",
    // Italian
    "gio",
    // Dutch
    "ma", "wo", "vr", "za", "zo",
];

/// Parses a free-text feed date into UTC, degrading to `None` instead of failing.
///
/// Tries, in order: RFC 3339, RFC 2822, a handful of common layouts, and the same
/// again with localized month names translated and a localized leading weekday
/// dropped. If all of that fails and the text
/// contains a comma, everything up to and including the first comma is dropped
/// (typically a weekday the strict grammar rejects) and the whole sequence is
/// retried.
///
/// Empty input, unparseable input, and the `0001-01-01T00:00:00` sentinel (in any
/// offset) all yield `None`.
///
/// # Examples
///
/// ```
/// use feedkit::util::parse_date_time;
///
/// let date = parse_date_time("Do, 22 Dez 2016 17:36:00 +0000").unwrap();
/// assert_eq!(date.to_rfc3339(), "2016-12-22T17:36:00+00:00");
///
/// assert!(parse_date_time("   ").is_none());
/// assert!(parse_date_time("yesterday-ish").is_none());
/// ```
pub fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = parse_any_layout(trimmed).or_else(|| {
        let (_, rest) = trimmed.split_once(',')?;
        parse_any_layout(rest.trim())
    });

    match parsed {
        Some(date) if date.year() <= ZERO_SENTINEL_YEAR => None,
        Some(date) => Some(date),
        None => {
            tracing::trace!(value = %trimmed, "Unparseable date, leaving absent");
            None
        }
    }
}

fn parse_any_layout(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    parse_layouts(text).or_else(|| match translate_localized_names(text) {
        Cow::Owned(english) => parse_layouts(&english),
        Cow::Borrowed(_) => None,
    })
}

fn parse_layouts(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    for layout in OFFSET_LAYOUTS {
        if let Ok(date) = DateTime::parse_from_str(text, layout) {
            return Some(date.with_timezone(&Utc));
        }
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Replaces localized month abbreviations with English ones and drops a
/// localized leading weekday (`Do 22 Dez 2016` ⇒ `22 Dec 2016`).
///
/// Returns `Cow::Borrowed` when nothing was changed.
fn translate_localized_names(text: &str) -> Cow<'_, str> {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    let mut changed = false;

    let leads_with_weekday = words.len() > 1
        && is_weekday_alias(words[0])
        && words[1].starts_with(|c: char| c.is_ascii_digit());
    if leads_with_weekday {
        words.remove(0);
        changed = true;
    }

    let translated: Vec<&str> = words
        .into_iter()
        .map(|word| {
            let key = word.trim_end_matches('.').to_lowercase();
            match MONTH_ALIASES.iter().find(|(alias, _)| *alias == key) {
                Some((_, english)) => {
                    changed = true;
                    *english
                }
                None => word,
            }
        })
        .collect();

    if changed {
        Cow::Owned(translated.join(" "))
    } else {
        Cow::Borrowed(text)
    }
}

fn is_weekday_alias(word: &str) -> bool {
    let key = word.trim_end_matches([',', '.']).to_lowercase();
    WEEKDAY_ALIASES.contains(&key.as_str())
}

/// Parses a trimmed integer, returning `None` for anything non-numeric or out of
/// range for `T`.
///
/// ```
/// use feedkit::util::parse_int;
///
/// assert_eq!(parse_int::<u32>(" 60 "), Some(60));
/// assert_eq!(parse_int::<u8>("300"), None);
/// assert_eq!(parse_int::<i64>("sixty"), None);
/// ```
pub fn parse_int<T: FromStr>(text: &str) -> Option<T> {
    text.trim().parse().ok()
}

/// Decodes HTML entities (`&amp;`, `&#x2F;`, `&eacute;`, ...) into plain text.
pub fn decode_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc2822_date() {
        assert_eq!(
            parse_date_time("Thu, 22 Dec 2016 17:36:00 +0000"),
            Some(utc(2016, 12, 22, 17, 36, 0))
        );
    }

    #[test]
    fn test_rfc2822_converted_to_utc() {
        assert_eq!(
            parse_date_time("Thu, 22 Dec 2016 17:36:00 +0200"),
            Some(utc(2016, 12, 22, 15, 36, 0))
        );
    }

    #[test]
    fn test_rfc3339_date() {
        assert_eq!(
            parse_date_time("2024-01-01T10:00:00-05:00"),
            Some(utc(2024, 1, 1, 15, 0, 0))
        );
    }

    #[test]
    fn test_german_weekday_and_month() {
        assert_eq!(
            parse_date_time("Do, 22 Dez 2016 17:36:00 +0000"),
            Some(utc(2016, 12, 22, 17, 36, 0))
        );
    }

    #[test]
    fn test_wrong_weekday_recovered_by_comma_strip() {
        // 22 Dec 2016 was a Thursday
        assert_eq!(
            parse_date_time("Mon, 22 Dec 2016 17:36:00 +0000"),
            Some(utc(2016, 12, 22, 17, 36, 0))
        );
    }

    #[test]
    fn test_named_zone() {
        assert_eq!(
            parse_date_time("Sat, 07 Sep 2002 00:00:01 GMT"),
            Some(utc(2002, 9, 7, 0, 0, 1))
        );
    }

    #[test]
    fn test_naive_layouts_assume_utc() {
        assert_eq!(
            parse_date_time("2023-05-06 07:08:09"),
            Some(utc(2023, 5, 6, 7, 8, 9))
        );
        assert_eq!(parse_date_time("2023-05-06"), Some(utc(2023, 5, 6, 0, 0, 0)));
    }

    #[test]
    fn test_empty_and_whitespace_are_absent() {
        assert_eq!(parse_date_time(""), None);
        assert_eq!(parse_date_time("   \t\n"), None);
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(parse_date_time("not a date"), None);
        assert_eq!(parse_date_time("Monday, the day after Sunday"), None);
    }

    #[test]
    fn test_zero_sentinel_is_absent() {
        assert_eq!(parse_date_time("0001-01-01T00:00:00Z"), None);
        assert_eq!(parse_date_time("0001-01-01T00:00:00"), None);
    }

    #[test]
    fn test_zero_sentinel_with_offset_is_absent() {
        assert_eq!(parse_date_time("0001-01-01T00:00:00+01:00"), None);
        assert_eq!(parse_date_time("0001-01-01T00:00:00-05:00"), None);
        assert_eq!(parse_date_time("0001-01-01 00:00:00"), None);
    }

    #[test]
    fn test_localized_weekday_without_comma() {
        assert_eq!(
            parse_date_time("Do 22 Dez 2016 17:36:00 +0000"),
            Some(utc(2016, 12, 22, 17, 36, 0))
        );
        assert_eq!(
            parse_date_time("mer. 21 déc. 2016 10:00:00 +0100"),
            Some(utc(2016, 12, 21, 9, 0, 0))
        );
        assert_eq!(
            parse_date_time("vr 3 mei 2019 08:00:00 +0000"),
            Some(utc(2019, 5, 3, 8, 0, 0))
        );
    }

    #[test]
    fn test_translate_localized_names_borrows_when_unchanged() {
        assert!(matches!(
            translate_localized_names("22 Dec 2016"),
            Cow::Borrowed(_)
        ));
        assert_eq!(translate_localized_names("22 Dez. 2016"), "22 Dec 2016");
        assert_eq!(translate_localized_names("Di, 3 Mai 2016"), "3 May 2016");
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int::<u32>("42"), Some(42));
        assert_eq!(parse_int::<u32>(" 42\n"), Some(42));
        assert_eq!(parse_int::<u32>("-1"), None);
        assert_eq!(parse_int::<u32>(""), None);
        assert_eq!(parse_int::<u32>("4 2"), None);
        assert_eq!(parse_int::<u16>("70000"), None);
    }

    #[test]
    fn test_decode_html() {
        assert_eq!(decode_html("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_html("caf&eacute; &#x2F; &#47;"), "café / /");
        assert_eq!(decode_html("plain"), "plain");
    }

    mod prop {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_date_time_never_panics(s in "\\PC*") {
                let _ = parse_date_time(&s);
            }

            #[test]
            fn whitespace_only_is_absent(s in "[ \\t\\r\\n]*") {
                prop_assert!(parse_date_time(&s).is_none());
            }

            #[test]
            fn parse_int_never_panics(s in "\\PC*") {
                let _ = parse_int::<i64>(&s);
            }
        }
    }
}
