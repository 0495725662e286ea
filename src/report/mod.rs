//! PDF export of a greenhouse's readings.
//!
//! The first page carries the period summary and both charts; the readings
//! table follows on as many pages as it needs, with the header repeated.

mod pdf;
pub mod table;

use chrono::NaiveDate;
use plotters::prelude::IntoDrawingArea;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Rgb,
};

use crate::analytics::{self, DailySummary, PeriodSummary};
use crate::charts::{self, ChartError};
use crate::entity::{greenhouses, readings};
use crate::period::Period;

pub use pdf::PdfBackend;

// A4 portrait, millimetres
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;

/// Chart size on the page, in points (180 x 88 mm)
const CHART_SIZE: (u32, u32) = (510, 250);
const CLIMOGRAM_TOP: f32 = 238.0;
const CO2_TOP: f32 = 143.0;

const TABLE_FONT_SIZE: f32 = 8.0;
/// Courier advance width at `TABLE_FONT_SIZE` (0.6 em), in millimetres
const TABLE_CHAR_WIDTH: f32 = TABLE_FONT_SIZE * 0.6 * 25.4 / 72.0;
const TABLE_TOP: f32 = 268.0;
const ROW_HEIGHT: f32 = 5.5;
pub const ROWS_PER_PAGE: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("PDF error: {0}")]
    Pdf(String),
}

/// One line of the readings table
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub time: Option<String>,
    pub greenhouse: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity_max: f64,
    pub humidity_min: f64,
    pub co2: Option<f64>,
}

/// Everything the report shows, computed up front so rendering is pure
#[derive(Debug, Clone)]
pub struct ReportData {
    pub greenhouse: String,
    pub period: Period,
    pub generated_at: String,
    pub days: Vec<DailySummary>,
    pub summary: PeriodSummary,
    pub rows: Vec<ReportRow>,
}

impl ReportData {
    /// Assemble report contents. Table rows come out oldest first.
    #[must_use]
    pub fn build(
        greenhouse: &greenhouses::Model,
        period: Period,
        mut readings: Vec<readings::Model>,
        generated_at: String,
    ) -> Self {
        readings.sort_by(|a, b| {
            (a.date, a.time.as_deref(), a.id).cmp(&(b.date, b.time.as_deref(), b.id))
        });

        let days = analytics::daily_summaries(&readings);
        let summary = analytics::period_summary(&days);
        let rows = readings
            .into_iter()
            .map(|r| ReportRow {
                date: r.date,
                time: r.time,
                greenhouse: greenhouse.name.clone(),
                temp_max: r.temp_max,
                temp_min: r.temp_min,
                humidity_max: r.humidity_max,
                humidity_min: r.humidity_min,
                co2: r.co2,
            })
            .collect();

        Self {
            greenhouse: greenhouse.name.clone(),
            period,
            generated_at,
            days,
            summary,
            rows,
        }
    }

    /// Suggested download name, e.g. `report-norte-2024-03.pdf`
    #[must_use]
    pub fn file_name(&self) -> String {
        let slug: String = pdf::ascii_fallback(&self.greenhouse)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        format!("report-{slug}-{}.pdf", self.period.slug())
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$} {unit}"))
}

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, size: f32, x: f32, y: f32, s: &str) {
    layer.use_text(pdf::ascii_fallback(s), size, Mm(x), Mm(y), font);
}

fn rule(layer: &PdfLayerReference, from: (f32, f32), to: (f32, f32)) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    });
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y_top: f32, width: f32, height: f32) {
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(x), Mm(y_top)), false),
            (Point::new(Mm(x + width), Mm(y_top)), false),
            (Point::new(Mm(x + width), Mm(y_top - height)), false),
            (Point::new(Mm(x), Mm(y_top - height)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

fn grey(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn draw_summary_page(
    layer: &PdfLayerReference,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
    data: &ReportData,
) -> Result<(), ReportError> {
    text(layer, bold, 18.0, MARGIN, 280.0, "Greenhouse report");
    text(layer, regular, 11.0, MARGIN, 271.0, &format!("Greenhouse: {}", data.greenhouse));
    text(layer, regular, 11.0, MARGIN, 265.0, &format!("Period: {}", data.period));
    text(layer, regular, 9.0, MARGIN, 259.0, &format!("Generated: {}", data.generated_at));

    let s = &data.summary;
    text(
        layer,
        regular,
        10.0,
        MARGIN,
        251.0,
        &format!("Days: {}    Readings: {}", s.days, data.rows.len()),
    );
    text(
        layer,
        regular,
        10.0,
        MARGIN,
        245.0,
        &format!(
            "Mean temperature: {}    Mean humidity: {}    Mean CO2: {}",
            fmt_opt(s.avg_temp, 1, "C"),
            fmt_opt(s.avg_humidity, 1, "%"),
            fmt_opt(s.avg_co2, 0, "ppm"),
        ),
    );

    let root = PdfBackend::new(layer, regular, (Mm(MARGIN), Mm(CLIMOGRAM_TOP)), CHART_SIZE)
        .into_drawing_area();
    charts::draw_climogram(&root, &data.greenhouse, &data.days)
        .map_err(|e| ChartError(e.to_string()))?;
    root.present().map_err(|e| ChartError(e.to_string()))?;

    let root = PdfBackend::new(layer, regular, (Mm(MARGIN), Mm(CO2_TOP)), CHART_SIZE)
        .into_drawing_area();
    charts::draw_co2(&root, &data.days).map_err(|e| ChartError(e.to_string()))?;
    root.present().map_err(|e| ChartError(e.to_string()))?;

    Ok(())
}

fn draw_table_page(
    layer: &PdfLayerReference,
    bold: &IndirectFontRef,
    mono: &IndirectFontRef,
    data: &ReportData,
    rows: &[ReportRow],
) {
    text(
        layer,
        bold,
        12.0,
        MARGIN,
        277.0,
        &format!("Readings - {} - {}", data.greenhouse, data.period),
    );

    let offsets = table::column_offsets();
    let x_at = |chars: usize| MARGIN + chars as f32 * TABLE_CHAR_WIDTH;
    let table_width = x_at(offsets[7]) - MARGIN;
    let line_count = rows.len().max(1) + 1;
    let bottom = TABLE_TOP - line_count as f32 * ROW_HEIGHT;

    // Header background
    layer.set_fill_color(grey(0.88));
    fill_rect(layer, MARGIN, TABLE_TOP, table_width, ROW_HEIGHT);

    // Borders
    layer.set_outline_color(grey(0.4));
    layer.set_outline_thickness(0.5);
    for i in 0..=line_count {
        let y = TABLE_TOP - i as f32 * ROW_HEIGHT;
        rule(layer, (MARGIN, y), (MARGIN + table_width, y));
    }
    for offset in offsets {
        let x = x_at(offset);
        rule(layer, (x, TABLE_TOP), (x, bottom));
    }

    layer.set_fill_color(grey(0.0));
    let baseline = |line: usize| TABLE_TOP - (line as f32 + 1.0) * ROW_HEIGHT + 1.6;
    let write_cells = |cells: &[String; 7], line: usize| {
        for (cell, offset) in cells.iter().zip(offsets) {
            text(layer, mono, TABLE_FONT_SIZE, x_at(offset + 1), baseline(line), cell);
        }
    };

    write_cells(&table::header_cells(), 0);
    if rows.is_empty() {
        text(
            layer,
            mono,
            TABLE_FONT_SIZE,
            x_at(1),
            baseline(1),
            "No readings in this period.",
        );
    }
    for (i, row) in rows.iter().enumerate() {
        write_cells(&table::row_cells(row), i + 1);
    }
}

/// Render the report to PDF bytes.
pub fn render_pdf(data: &ReportData) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Greenhouse report - {}", data.greenhouse),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Summary",
    );
    let font = |f: BuiltinFont| {
        doc.add_builtin_font(f)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))
    };
    let regular = font(BuiltinFont::Helvetica)?;
    let bold = font(BuiltinFont::HelveticaBold)?;
    let mono = font(BuiltinFont::Courier)?;

    let summary_layer = doc.get_page(page).get_layer(layer);
    draw_summary_page(&summary_layer, &regular, &bold, data)?;

    let pages = table::paginate(&data.rows, ROWS_PER_PAGE);
    let total_pages = pages.len() + 1;
    text(&summary_layer, &regular, 8.0, MARGIN, 8.0, &format!("Page 1 of {total_pages}"));

    for (i, rows) in pages.into_iter().enumerate() {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Readings {}", i + 1));
        let layer = doc.get_page(page).get_layer(layer);
        draw_table_page(&layer, &bold, &mono, data, rows);
        text(
            &layer,
            &regular,
            8.0,
            MARGIN,
            8.0,
            &format!("Page {} of {total_pages}", i + 2),
        );
    }

    tracing::debug!(
        greenhouse = %data.greenhouse,
        period = %data.period,
        rows = data.rows.len(),
        pages = total_pages,
        "Report rendered"
    );

    doc.save_to_bytes()
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))
}
