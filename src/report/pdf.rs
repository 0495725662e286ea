//! A plotters drawing backend that paints onto a printpdf layer.
//!
//! Charts are emitted as PDF vector paths and text, so the report needs no
//! raster images and no system fonts. One backend pixel is one PDF point.

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontTransform,
    text_anchor::{HPos, VPos},
};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{Color, IndirectFontRef, Line, Mm, PdfLayerReference, Point, Polygon, Pt, Rgb, TextMatrix};
use std::convert::Infallible;

/// Average Helvetica glyph advance, as a fraction of the font size
const GLYPH_WIDTH: f64 = 0.52;

/// Circles are approximated by polygons with this many sides
const CIRCLE_SEGMENTS: usize = 24;

pub struct PdfBackend<'a> {
    layer: &'a PdfLayerReference,
    font: &'a IndirectFontRef,
    /// Page position of the drawing area's top-left corner, in points
    left: f32,
    top: f32,
    size: (u32, u32),
}

impl<'a> PdfBackend<'a> {
    /// Create a backend drawing into a `size` points area whose top-left
    /// corner sits at `top_left` on the page.
    pub fn new(
        layer: &'a PdfLayerReference,
        font: &'a IndirectFontRef,
        top_left: (Mm, Mm),
        size: (u32, u32),
    ) -> Self {
        Self {
            layer,
            font,
            left: Pt::from(top_left.0).0,
            top: Pt::from(top_left.1).0,
            size,
        }
    }

    fn point(&self, (x, y): BackendCoord) -> Point {
        self.point_f(f64::from(x), f64::from(y))
    }

    /// Backend coordinates grow downwards, PDF coordinates upwards.
    fn point_f(&self, x: f64, y: f64) -> Point {
        Point::new(
            Mm::from(Pt(self.left + x as f32)),
            Mm::from(Pt(self.top - y as f32)),
        )
    }

    fn stroke<S: BackendStyle>(&self, style: &S) {
        self.layer.set_outline_color(pdf_color(style.color()));
        self.layer.set_outline_thickness(style.stroke_width() as f32);
    }

    fn fill_points(&self, points: Vec<Point>, color: BackendColor) {
        if points.len() < 3 || color.alpha <= 0.0 {
            return;
        }
        self.layer.set_fill_color(pdf_color(color));
        self.layer.add_polygon(Polygon {
            rings: vec![points.into_iter().map(|p| (p, false)).collect()],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_points(&self, points: Vec<Point>, closed: bool) {
        if points.len() < 2 {
            return;
        }
        self.layer.add_line(Line {
            points: points.into_iter().map(|p| (p, false)).collect(),
            is_closed: closed,
        });
    }
}

/// PDF colour for a backend colour. Translucency is flattened against the
/// white page background.
fn pdf_color(color: BackendColor) -> Color {
    let alpha = color.alpha.clamp(0.0, 1.0);
    let blend = |c: u8| ((f64::from(c) / 255.0) * alpha + (1.0 - alpha)) as f32;
    let (r, g, b) = color.rgb;
    Color::Rgb(Rgb::new(blend(r), blend(g), blend(b), None))
}

/// Builtin PDF fonts only cover a Latin subset; keep text to ASCII.
pub(crate) fn ascii_fallback(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => Some('a'),
            'é' | 'è' | 'ë' | 'ê' => Some('e'),
            'í' | 'ì' | 'ï' | 'î' => Some('i'),
            'ó' | 'ò' | 'ö' | 'ô' => Some('o'),
            'ú' | 'ù' | 'ü' | 'û' => Some('u'),
            'Á' => Some('A'),
            'É' => Some('E'),
            'Í' => Some('I'),
            'Ó' => Some('O'),
            'Ú' => Some('U'),
            'ñ' => Some('n'),
            'Ñ' => Some('N'),
            '°' => None,
            c if c.is_ascii() => Some(c),
            _ => Some('?'),
        })
        .collect()
}

fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * GLYPH_WIDTH
}

impl DrawingBackend for PdfBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        (x, y): BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let (x, y) = (f64::from(x), f64::from(y));
        self.fill_points(
            vec![
                self.point_f(x, y),
                self.point_f(x + 1.0, y),
                self.point_f(x + 1.0, y + 1.0),
                self.point_f(x, y + 1.0),
            ],
            color,
        );
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if style.color().alpha <= 0.0 {
            return Ok(());
        }
        self.stroke(style);
        self.stroke_points(vec![self.point(from), self.point(to)], false);
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let corners = vec![
            self.point(upper_left),
            self.point((bottom_right.0, upper_left.1)),
            self.point(bottom_right),
            self.point((upper_left.0, bottom_right.1)),
        ];
        if fill {
            self.fill_points(corners, style.color());
        } else if style.color().alpha > 0.0 {
            self.stroke(style);
            self.stroke_points(corners, true);
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if style.color().alpha <= 0.0 {
            return Ok(());
        }
        self.stroke(style);
        let points = path.into_iter().map(|c| self.point(c)).collect();
        self.stroke_points(points, false);
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        (cx, cy): BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let r = f64::from(radius);
        let points: Vec<Point> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                self.point_f(f64::from(cx) + r * a.cos(), f64::from(cy) + r * a.sin())
            })
            .collect();
        if fill {
            self.fill_points(points, style.color());
        } else if style.color().alpha > 0.0 {
            self.stroke(style);
            self.stroke_points(points, true);
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points = vert.into_iter().map(|c| self.point(c)).collect();
        self.fill_points(points, style.color());
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let size = style.size();
        Ok((text_width(text, size).ceil() as u32, size.ceil() as u32))
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        (x, y): BackendCoord,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let color = style.color();
        if color.alpha <= 0.0 || text.is_empty() {
            return Ok(());
        }

        let text = ascii_fallback(text);
        let size = style.size();
        let width = text_width(&text, size);

        // Unit vectors along the baseline and towards the glyph tops, in
        // backend coordinates (y down), plus the PDF rotation in degrees.
        let (along, up, degrees) = match style.transform() {
            FontTransform::Rotate90 => ((0.0, 1.0), (1.0, 0.0), -90.0),
            FontTransform::Rotate180 => ((-1.0, 0.0), (0.0, 1.0), 180.0),
            FontTransform::Rotate270 => ((0.0, -1.0), (-1.0, 0.0), 90.0),
            _ => ((1.0, 0.0), (0.0, -1.0), 0.0),
        };

        let anchor = style.anchor();
        let shift_along = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        // Distance from the anchor down to the baseline
        let shift_down = match anchor.v_pos {
            VPos::Top => size * 0.75,
            VPos::Center => size * 0.35,
            VPos::Bottom => 0.0,
        };

        let bx = f64::from(x) + along.0 * shift_along - up.0 * shift_down;
        let by = f64::from(y) + along.1 * shift_along - up.1 * shift_down;

        self.layer.set_fill_color(pdf_color(color));
        self.layer.begin_text_section();
        self.layer.set_font(self.font, size as f32);
        self.layer.set_text_matrix(TextMatrix::TranslateRotate(
            Pt(self.left + bx as f32),
            Pt(self.top - by as f32),
            degrees,
        ));
        self.layer.write_text(text, self.font);
        self.layer.end_text_section();
        Ok(())
    }
}
