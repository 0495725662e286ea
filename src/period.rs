//! Temporal filters applied to readings.
//!
//! A period is parsed from the `month` / `year` query parameters the
//! dashboard sends. Months may be given as a number, as a Spanish month name
//! (the names the dashboard has always shown) or as an English name.

use chrono::{Datelike, Local, Month, NaiveDate};
use serde::Deserialize;
use std::fmt;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// Spanish month names, January first.
pub const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Year(i32),
    Month { year: i32, month: u32 },
}

/// Query parameters selecting a period
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Month: 1-12, a Spanish or English month name, or "todos"/"all"
    pub month: Option<String>,
    /// Calendar year. Defaults to the current year when only a month is given.
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Resolve the query into a period, using the local calendar for the
    /// default year.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown month or a year outside
    /// the range chrono can represent.
    pub fn period(&self) -> AppResult<Period> {
        self.period_with_default_year(Local::now().year())
    }

    pub(crate) fn period_with_default_year(&self, current_year: i32) -> AppResult<Period> {
        if let Some(year) = self.year
            && !(1..=9999).contains(&year)
        {
            return Err(AppError::BadRequest(format!("Invalid year: {year}")));
        }

        let month = match self.month.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_month(raw)?),
        };

        // "todos" switches the filter off entirely; the year only narrows a
        // chosen month, or stands alone when no month is given.
        Ok(match (month, self.year) {
            (Some(None), _) => Period::All,
            (Some(Some(month)), year) => Period::Month {
                year: year.unwrap_or(current_year),
                month,
            },
            (None, Some(year)) => Period::Year(year),
            (None, None) => Period::All,
        })
    }
}

/// Parse a month given as number or name. `Ok(None)` means "all months".
fn parse_month(raw: &str) -> AppResult<Option<u32>> {
    let lower = raw.to_lowercase();
    if lower == "todos" || lower == "all" {
        return Ok(None);
    }

    if let Ok(n) = lower.parse::<u32>() {
        return if (1..=12).contains(&n) {
            Ok(Some(n))
        } else {
            Err(AppError::BadRequest(format!("Invalid month: {raw}")))
        };
    }

    if let Some(idx) = MESES.iter().position(|m| *m == lower) {
        return Ok(Some(idx as u32 + 1));
    }

    lower
        .parse::<Month>()
        .map(|m| Some(m.number_from_month()))
        .map_err(|_| AppError::BadRequest(format!("Invalid month: {raw}")))
}

impl Period {
    /// Half-open `[start, end)` date range, or `None` for all time.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Self::All => None,
            Self::Year(year) => Some((
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
            )),
            Self::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1)?;
                let end = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)?
                };
                Some((start, end))
            }
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_range()
            .is_none_or(|(start, end)| date >= start && date < end)
    }

    /// Stable identifier for cache keys and file names.
    #[must_use]
    pub fn slug(&self) -> String {
        match *self {
            Self::All => "all".to_string(),
            Self::Year(year) => format!("{year}"),
            Self::Month { year, month } => format!("{year}-{month:02}"),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::All => write!(f, "All records"),
            Self::Year(year) => write!(f, "{year}"),
            Self::Month { year, month } => {
                let name = Month::try_from(month as u8)
                    .map(|m| m.name())
                    .unwrap_or("?");
                write!(f, "{name} {year}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(month: Option<&str>, year: Option<i32>) -> PeriodQuery {
        PeriodQuery {
            month: month.map(str::to_string),
            year,
        }
    }

    #[test]
    fn month_names_and_numbers() {
        let p = query(Some("Marzo"), Some(2024)).period_with_default_year(2000).unwrap();
        assert_eq!(p, Period::Month { year: 2024, month: 3 });

        let p = query(Some("october"), Some(2023)).period_with_default_year(2000).unwrap();
        assert_eq!(p, Period::Month { year: 2023, month: 10 });

        let p = query(Some("12"), Some(2023)).period_with_default_year(2000).unwrap();
        assert_eq!(p, Period::Month { year: 2023, month: 12 });
    }

    #[test]
    fn month_without_year_uses_current_year() {
        let p = query(Some("enero"), None).period_with_default_year(2026).unwrap();
        assert_eq!(p, Period::Month { year: 2026, month: 1 });
    }

    #[test]
    fn todos_ignores_the_year() {
        assert_eq!(
            query(Some("Todos"), Some(2024)).period_with_default_year(2026).unwrap(),
            Period::All
        );
        assert_eq!(
            query(Some("all"), None).period_with_default_year(2026).unwrap(),
            Period::All
        );
        assert_eq!(query(None, None).period_with_default_year(2026).unwrap(), Period::All);
    }

    #[test]
    fn bare_year_selects_whole_year() {
        assert_eq!(
            query(None, Some(2024)).period_with_default_year(2026).unwrap(),
            Period::Year(2024)
        );
        assert_eq!(
            query(Some(""), Some(2024)).period_with_default_year(2026).unwrap(),
            Period::Year(2024)
        );
    }

    #[test]
    fn rejects_unknown_month() {
        assert!(query(Some("13"), None).period_with_default_year(2026).is_err());
        assert!(query(Some("brumaire"), None).period_with_default_year(2026).is_err());
    }

    #[test]
    fn december_range_rolls_over() {
        let (start, end) = Period::Month { year: 2024, month: 12 }.date_range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn contains_is_half_open() {
        let feb = Period::Month { year: 2024, month: 2 };
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(Period::All.contains(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
    }

    #[test]
    fn display_and_slug() {
        let p = Period::Month { year: 2024, month: 3 };
        assert_eq!(p.to_string(), "March 2024");
        assert_eq!(p.slug(), "2024-03");
        assert_eq!(Period::Year(2024).slug(), "2024");
    }
}
