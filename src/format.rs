use chrono::{Datelike, NaiveDate};

use crate::error::FormatError;
use crate::models::BillStatus;

const DATE_FORMAT: &str = "%Y-%m-%d";

// First three letters of the French month abbreviations, capitalized
const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Short French display form of a stored date: `2004-04-04` becomes `4 Avr. 04`.
pub fn format_date(raw: &str) -> Result<String, FormatError> {
    let date = parse_date(raw).ok_or_else(|| FormatError::InvalidDate(raw.to_string()))?;
    let month = MONTHS[date.month0() as usize];
    let year = date.year().rem_euclid(100);

    Ok(format!("{} {}. {:02}", date.day(), month, year))
}

pub fn format_status(raw: &str) -> Result<&'static str, FormatError> {
    raw.parse::<BillStatus>()
        .map(|status| status.label())
        .map_err(FormatError::UnknownStatus)
}

pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{} €", amount)
    } else {
        format!("{:.2} €", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dates_in_short_french_form() {
        assert_eq!(format_date("2004-04-04").unwrap(), "4 Avr. 04");
        assert_eq!(format_date("2021-12-25").unwrap(), "25 Déc. 21");
        assert_eq!(format_date("2003-02-01").unwrap(), "1 Fév. 03");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(
            format_date("not a date"),
            Err(FormatError::InvalidDate("not a date".to_string()))
        );
        assert!(format_date("2004-13-01").is_err());
    }

    #[test]
    fn labels_statuses() {
        assert_eq!(format_status("pending").unwrap(), "En attente");
        assert_eq!(format_status("accepted").unwrap(), "Accepté");
        assert_eq!(format_status("refused").unwrap(), "Refusé");
        assert!(format_status("lost").is_err());
    }

    #[test]
    fn amounts_keep_cents_only_when_present() {
        assert_eq!(format_amount(348.0), "348 €");
        assert_eq!(format_amount(12.5), "12.50 €");
    }
}
