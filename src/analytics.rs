//! Daily aggregation of readings.
//!
//! Nothing here is persisted: aggregates are rebuilt from the readings of the
//! selected period on every request (and cached at the HTTP layer).

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::entity::readings;

/// Aggregates for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Number of readings recorded that day
    pub readings: usize,
    /// Mean of the per-reading temperature midpoints (°C)
    pub avg_temp: f64,
    /// Mean of the per-reading humidity midpoints (%)
    pub avg_humidity: f64,
    /// Mean CO2 (ppm), ignoring readings without CO2
    pub avg_co2: Option<f64>,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity_max: f64,
    pub humidity_min: f64,
    pub co2_max: Option<f64>,
    pub co2_min: Option<f64>,
}

/// Headline figures for a period: the means of the daily means
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodSummary {
    pub days: usize,
    pub avg_temp: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub avg_co2: Option<f64>,
}

#[derive(Default)]
struct DayAccumulator {
    count: usize,
    temp_sum: f64,
    humidity_sum: f64,
    co2_sum: f64,
    co2_count: usize,
    temp_max: f64,
    temp_min: f64,
    humidity_max: f64,
    humidity_min: f64,
    co2_max: Option<f64>,
    co2_min: Option<f64>,
}

impl DayAccumulator {
    fn push(&mut self, r: &readings::Model) {
        if self.count == 0 {
            self.temp_max = r.temp_max;
            self.temp_min = r.temp_min;
            self.humidity_max = r.humidity_max;
            self.humidity_min = r.humidity_min;
        } else {
            self.temp_max = self.temp_max.max(r.temp_max);
            self.temp_min = self.temp_min.min(r.temp_min);
            self.humidity_max = self.humidity_max.max(r.humidity_max);
            self.humidity_min = self.humidity_min.min(r.humidity_min);
        }
        self.count += 1;
        self.temp_sum += r.avg_temp();
        self.humidity_sum += r.avg_humidity();

        if let Some(co2) = r.co2 {
            self.co2_sum += co2;
            self.co2_count += 1;
            self.co2_max = Some(self.co2_max.map_or(co2, |m| m.max(co2)));
            self.co2_min = Some(self.co2_min.map_or(co2, |m| m.min(co2)));
        }
    }

    fn finish(self, date: NaiveDate) -> DailySummary {
        let n = self.count as f64;
        DailySummary {
            date,
            readings: self.count,
            avg_temp: self.temp_sum / n,
            avg_humidity: self.humidity_sum / n,
            avg_co2: (self.co2_count > 0).then(|| self.co2_sum / self.co2_count as f64),
            temp_max: self.temp_max,
            temp_min: self.temp_min,
            humidity_max: self.humidity_max,
            humidity_min: self.humidity_min,
            co2_max: self.co2_max,
            co2_min: self.co2_min,
        }
    }
}

/// Group readings by calendar day, oldest day first.
#[must_use]
pub fn daily_summaries(readings: &[readings::Model]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for r in readings {
        days.entry(r.date).or_default().push(r);
    }

    days.into_iter()
        .map(|(date, acc)| acc.finish(date))
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[must_use]
pub fn period_summary(days: &[DailySummary]) -> PeriodSummary {
    PeriodSummary {
        days: days.len(),
        avg_temp: mean(days.iter().map(|d| d.avg_temp)),
        avg_humidity: mean(days.iter().map(|d| d.avg_humidity)),
        avg_co2: mean(days.iter().filter_map(|d| d.avg_co2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: i32, day: u32, t: (f64, f64), h: (f64, f64), co2: Option<f64>) -> readings::Model {
        readings::Model {
            id,
            greenhouse_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            time: None,
            temp_max: t.0,
            temp_min: t.1,
            humidity_max: h.0,
            humidity_min: h.1,
            co2,
        }
    }

    #[test]
    fn same_day_readings_collapse_to_one_row() {
        let rows = vec![
            reading(1, 1, (20.0, 10.0), (80.0, 60.0), Some(500.0)),
            reading(2, 1, (30.0, 20.0), (90.0, 70.0), Some(700.0)),
        ];

        let days = daily_summaries(&rows);
        assert_eq!(days.len(), 1);

        let day = &days[0];
        assert_eq!(day.readings, 2);
        // (15 + 25) / 2
        assert!((day.avg_temp - 20.0).abs() < 1e-9);
        // (70 + 80) / 2
        assert!((day.avg_humidity - 75.0).abs() < 1e-9);
        assert_eq!(day.avg_co2, Some(600.0));
        assert_eq!(day.temp_max, 30.0);
        assert_eq!(day.temp_min, 10.0);
        assert_eq!(day.humidity_max, 90.0);
        assert_eq!(day.humidity_min, 60.0);
        assert_eq!(day.co2_max, Some(700.0));
        assert_eq!(day.co2_min, Some(500.0));
    }

    #[test]
    fn days_are_sorted_regardless_of_input_order() {
        let rows = vec![
            reading(1, 5, (20.0, 10.0), (80.0, 60.0), None),
            reading(2, 2, (22.0, 12.0), (80.0, 60.0), None),
            reading(3, 9, (24.0, 14.0), (80.0, 60.0), None),
        ];
        let dates: Vec<u32> = daily_summaries(&rows)
            .iter()
            .map(|d| chrono::Datelike::day(&d.date))
            .collect();
        assert_eq!(dates, vec![2, 5, 9]);
    }

    #[test]
    fn missing_co2_is_ignored_not_zeroed() {
        let rows = vec![
            reading(1, 1, (20.0, 10.0), (80.0, 60.0), None),
            reading(2, 1, (20.0, 10.0), (80.0, 60.0), Some(800.0)),
            reading(3, 2, (20.0, 10.0), (80.0, 60.0), None),
        ];
        let days = daily_summaries(&rows);
        assert_eq!(days[0].avg_co2, Some(800.0));
        assert_eq!(days[1].avg_co2, None);
        assert_eq!(days[1].co2_max, None);

        let summary = period_summary(&days);
        assert_eq!(summary.avg_co2, Some(800.0));
    }

    #[test]
    fn period_summary_is_mean_of_daily_means() {
        let rows = vec![
            // day 1: three readings averaging 10
            reading(1, 1, (10.0, 10.0), (50.0, 50.0), None),
            reading(2, 1, (10.0, 10.0), (50.0, 50.0), None),
            reading(3, 1, (10.0, 10.0), (50.0, 50.0), None),
            // day 2: one reading at 30
            reading(4, 2, (30.0, 30.0), (70.0, 70.0), None),
        ];
        let summary = period_summary(&daily_summaries(&rows));
        assert_eq!(summary.days, 2);
        assert_eq!(summary.avg_temp, Some(20.0));
        assert_eq!(summary.avg_humidity, Some(60.0));
    }

    #[test]
    fn empty_input() {
        let days = daily_summaries(&[]);
        assert!(days.is_empty());
        let summary = period_summary(&days);
        assert_eq!(summary.days, 0);
        assert_eq!(summary.avg_temp, None);
    }
}
