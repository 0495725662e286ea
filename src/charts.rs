//! Chart construction.
//!
//! Each chart is drawn once against the plotters drawing API, so the same
//! code renders the SVG served to the dashboard and the vector chart embedded
//! in the PDF report (see `report::pdf::PdfBackend`).

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analytics::DailySummary;

/// Default chart size in pixels (points, in the PDF backend)
pub const CHART_SIZE: (u32, u32) = (800, 400);

/// Fixed temperature axis (°C)
const TEMP_AXIS: std::ops::Range<f64> = 0.0..50.0;
/// Fixed humidity axis (%)
const HUMIDITY_AXIS: std::ops::Range<f64> = 0.0..100.0;

const HUMIDITY_BAR: RGBAColor = RGBAColor(30, 144, 255, 0.3);
const SEA_GREEN: RGBColor = RGBColor(46, 139, 87);

/// Half width of a daily bar, in day units
const BAR_HALF_WIDTH: f64 = 0.35;

#[derive(Debug, thiserror::Error)]
#[error("chart rendering failed: {0}")]
pub struct ChartError(pub String);

fn x_range(days: &[DailySummary]) -> std::ops::Range<f64> {
    -0.5..(days.len().max(1) as f64 - 0.5)
}

/// Label for a position on the day axis; empty between days.
fn day_label(days: &[DailySummary], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    days.get(idx as usize)
        .map(|d| d.date.format("%d/%m").to_string())
        .unwrap_or_default()
}

/// Temperature line over humidity bars, on fixed axes.
pub fn draw_climogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    greenhouse: &str,
    days: &[DailySummary],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let x = x_range(days);
    let mut chart = ChartBuilder::on(root)
        .caption(format!("Climogram - {greenhouse}"), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .right_y_label_area_size(50)
        .build_cartesian_2d(x.clone(), TEMP_AXIS)?
        .set_secondary_coord(x, HUMIDITY_AXIS);

    let label = |v: &f64| day_label(days, *v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(days.len().clamp(1, 12))
        .x_label_formatter(&label)
        .y_labels(11)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .y_desc("Temperature (°C)")
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_labels(11)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .y_desc("Humidity (%)")
        .draw()?;

    chart
        .draw_secondary_series(days.iter().enumerate().map(|(i, d)| {
            let x = i as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, d.avg_humidity)],
                HUMIDITY_BAR.filled(),
            )
        }))?
        .label("Humidity %")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], HUMIDITY_BAR.filled()));

    chart
        .draw_series(LineSeries::new(
            days.iter().enumerate().map(|(i, d)| (i as f64, d.avg_temp)),
            RED.stroke_width(3),
        ))?
        .label("Temp °C")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED.stroke_width(3)));

    chart.draw_series(
        days.iter()
            .enumerate()
            .map(|(i, d)| Circle::new((i as f64, d.avg_temp), 4, RED.filled())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Daily mean CO2 as bars. Days without CO2 are left blank.
pub fn draw_co2<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    days: &[DailySummary],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let peak = days
        .iter()
        .filter_map(|d| d.avg_co2)
        .fold(0.0_f64, f64::max);
    let y_max = if peak > 0.0 { peak * 1.2 } else { 1000.0 };

    let mut chart = ChartBuilder::on(root)
        .caption("CO2 concentration (ppm)", ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(days), 0.0..y_max)?;

    let label = |v: &f64| day_label(days, *v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(days.len().clamp(1, 12))
        .x_label_formatter(&label)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .x_desc("Date")
        .y_desc("ppm")
        .draw()?;

    chart.draw_series(days.iter().enumerate().filter_map(|(i, d)| {
        let x = i as f64;
        d.avg_co2.map(|co2| {
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, co2)],
                SEA_GREEN.filled(),
            )
        })
    }))?;

    Ok(())
}

pub fn climogram_svg(greenhouse: &str, days: &[DailySummary]) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_climogram(&root, greenhouse, days).map_err(|e| ChartError(e.to_string()))?;
        root.present().map_err(|e| ChartError(e.to_string()))?;
    }
    Ok(svg)
}

pub fn co2_svg(days: &[DailySummary]) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_co2(&root, days).map_err(|e| ChartError(e.to_string()))?;
        root.present().map_err(|e| ChartError(e.to_string()))?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32, temp: f64, humidity: f64, co2: Option<f64>) -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            readings: 1,
            avg_temp: temp,
            avg_humidity: humidity,
            avg_co2: co2,
            temp_max: temp,
            temp_min: temp,
            humidity_max: humidity,
            humidity_min: humidity,
            co2_max: co2,
            co2_min: co2,
        }
    }

    #[test]
    fn day_labels_only_on_whole_days() {
        let days = vec![day(1, 20.0, 70.0, None), day(2, 21.0, 71.0, None)];
        assert_eq!(day_label(&days, 0.0), "01/03");
        assert_eq!(day_label(&days, 1.0), "02/03");
        assert_eq!(day_label(&days, 0.5), "");
        assert_eq!(day_label(&days, 7.0), "");
        assert_eq!(day_label(&days, -1.0), "");
    }

    #[test]
    fn climogram_svg_contains_title_and_series() {
        let days = vec![day(1, 20.0, 70.0, Some(500.0)), day(2, 22.0, 65.0, Some(650.0))];
        let svg = climogram_svg("Norte", &days).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Climogram - Norte"));
        assert!(svg.contains("Humidity %"));
    }

    #[test]
    fn co2_svg_renders_without_data() {
        let svg = co2_svg(&[]).unwrap();
        assert!(svg.contains("CO2 concentration (ppm)"));
    }
}
