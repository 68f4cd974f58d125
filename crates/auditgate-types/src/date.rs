//! Calendar dates as they appear in config files and reports (`YYYY-MM-DD`).

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_iso_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s.trim(), ISO_DATE)
}

pub fn format_iso_date(date: Date) -> String {
    // The description only has numeric components, so formatting cannot fail
    // for any representable `Date`.
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// `serde(with = ...)` adapter for `YYYY-MM-DD` dates.
pub mod iso {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_iso_date(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_and_formats_iso_dates() {
        let d = parse_iso_date("2023-03-01").expect("parse");
        assert_eq!(d, date!(2023 - 03 - 01));
        assert_eq!(format_iso_date(d), "2023-03-01");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            parse_iso_date(" 2021-12-01\n").expect("parse"),
            date!(2021 - 12 - 01)
        );
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(parse_iso_date("01/12/2021").is_err());
        assert!(parse_iso_date("2021-13-01").is_err());
        assert!(parse_iso_date("").is_err());
    }
}
