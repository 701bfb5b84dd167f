//! Raw field strings to typed values.
//!
//! Every parser treats an empty string and the listing placeholder `-` as
//! absent, and folds full-width digits before looking at the text.

pub mod address;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::japanese::fold_fullwidth;

pub use address::{decompose_address, DEFAULT_REGION};

const TEN_THOUSAND: f64 = 10_000.0;

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)(万)?").expect("invalid price regex"));
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("invalid decimal regex"));
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("invalid integer regex"));
static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})年(\d{1,2})月").expect("invalid year-month regex"));
static FULL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").expect("invalid date regex")
});

/// `None` for blank input and the `-` placeholder, folded text otherwise.
fn prepare(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    Some(fold_fullwidth(trimmed))
}

/// Yen amount. `万` directly after the number scales by 10,000.
pub fn parse_price(raw: &str) -> Option<i64> {
    let text: String = prepare(raw)?
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let caps = PRICE_RE.captures(&text)?;
    let number: f64 = caps[1].parse().ok()?;
    if caps.get(2).is_some() {
        whole_number((number * TEN_THOUSAND).round())
    } else {
        whole_number(number.trunc())
    }
}

/// `value` as an `i64`, or `None` when it is not finite or out of range.
pub(crate) fn whole_number(value: f64) -> Option<i64> {
    // i64::MAX rounds up to 2^63 as f64, so the bound is exclusive
    (value.is_finite() && value.abs() < i64::MAX as f64).then(|| value as i64)
}

/// Square metres from the first decimal run.
pub fn parse_area(raw: &str) -> Option<f64> {
    let text = prepare(raw)?.replace(',', "");
    let area: f64 = DECIMAL_RE.find(&text)?.as_str().parse().ok()?;
    area.is_finite().then_some(area)
}

/// `YYYY年MM月` as the first day of that month.
pub fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    let text = prepare(raw)?;
    let caps = YEAR_MONTH_RE.captures(&text)?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 1)
}

/// `YYYY年MM月DD日`.
pub fn parse_full_date(raw: &str) -> Option<NaiveDate> {
    let text = prepare(raw)?;
    let caps = FULL_DATE_RE.captures(&text)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

pub fn parse_count(raw: &str) -> Option<i64> {
    let text = prepare(raw)?;
    INTEGER_RE.find(&text)?.as_str().parse().ok()
}

/// Trimmed text; missing values become an empty string, not `None`.
pub fn parse_free_text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn price_in_ten_thousands() {
        assert_eq!(parse_price("1,980万円"), Some(19_800_000));
        assert_eq!(parse_price("１，９８０万円"), Some(19_800_000));
        assert_eq!(parse_price("2480.5万"), Some(24_805_000));
    }

    #[test]
    fn price_in_yen() {
        assert_eq!(parse_price("12,000円"), Some(12_000));
        assert_eq!(parse_price("8000"), Some(8_000));
    }

    #[test]
    fn price_unit_must_follow_the_number() {
        // 万 elsewhere in the string does not scale
        assert_eq!(parse_price("3,000円 (万一の修繕)"), Some(3_000));
    }

    #[test]
    fn price_placeholders() {
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("未定"), None);
    }

    #[test]
    fn oversized_numbers_are_absent() {
        let digits = "9".repeat(25);
        assert_eq!(parse_price(&format!("{digits}万円")), None);
        assert_eq!(parse_price(&digits), None);
        assert_eq!(parse_price(&"9".repeat(400)), None);
        assert_eq!(parse_count(&digits), None);

        let area = format!("1{}㎡", "0".repeat(400));
        assert_eq!(parse_area(&area), None);
    }

    #[test]
    fn whole_number_bounds() {
        assert_eq!(whole_number(19_800_000.0), Some(19_800_000));
        assert_eq!(whole_number(-5.0), Some(-5));
        assert_eq!(whole_number(f64::INFINITY), None);
        assert_eq!(whole_number(f64::NAN), None);
        assert_eq!(whole_number(i64::MAX as f64), None);
    }

    #[test]
    fn area_values() {
        assert_eq!(parse_area("45.30㎡"), Some(45.3));
        assert_eq!(parse_area("４５．３０㎡"), Some(45.3));
        assert_eq!(parse_area("8.5"), Some(8.5));
        assert_eq!(parse_area("なし"), None);
        assert_eq!(parse_area("-"), None);
    }

    #[test]
    fn year_month_dates() {
        assert_eq!(parse_year_month("1994年04月"), date(1994, 4, 1));
        assert_eq!(parse_year_month("1994年4月築"), date(1994, 4, 1));
        assert_eq!(parse_year_month("1994年"), None);
        assert_eq!(parse_year_month("1994年13月"), None);
        assert_eq!(parse_year_month("2025-07"), None);
    }

    #[test]
    fn full_dates() {
        assert_eq!(parse_full_date("2025年07月21日"), date(2025, 7, 21));
        assert_eq!(
            parse_full_date("2025年07月21日").map(|d| d.to_string()).as_deref(),
            Some("2025-07-21")
        );
        assert_eq!(parse_full_date("2025年02月30日"), None);
        assert_eq!(parse_full_date("2025-07"), None);
    }

    #[test]
    fn counts_and_text() {
        assert_eq!(parse_count("120戸"), Some(120));
        assert_eq!(parse_count("不明"), None);
        assert_eq!(parse_free_text(Some("  南  ")), "南");
        assert_eq!(parse_free_text(None), "");
    }
}
