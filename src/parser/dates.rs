use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn date_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").ok())
        .as_ref()
}

/// Every valid `dd/mm/yyyy` date in `text`, in order of appearance.
///
/// Matches that are not real calendar dates (`31/02/2024`) are skipped.
#[must_use]
pub fn find_dates(text: &str) -> Vec<NaiveDate> {
    let Some(re) = date_regex() else {
        return Vec::new();
    };

    re.captures_iter(text)
        .filter_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .collect()
}

#[must_use]
pub fn first_date(text: &str) -> Option<NaiveDate> {
    find_dates(text).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_dates() {
        let dates = find_dates("Filed 15/01/2023, next listing 20/08/2025 before Court 4");
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            ]
        );
    }

    #[test]
    fn test_skips_impossible_dates() {
        assert_eq!(
            find_dates("31/02/2024 then 01/03/2024"),
            vec![NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()]
        );
        assert!(find_dates("1/3/2024").is_empty());
        assert_eq!(first_date("no dates here"), None);
    }
}
