use std::borrow::Cow;

use kurbo::{Cap, Join, PathEl, Stroke, StrokeOpts};

use crate::animate::viewport::Viewport;
use crate::config::ChartStyle;
use crate::format::format_currency;
use crate::foundation::core::Canvas;
use crate::foundation::error::{Error, Result};
use crate::portfolio::simulate::ChartSeries;
use crate::render::frame::FrameRGBA;
use crate::render::ticks::nice_ticks;
use crate::series::time_series::{axis_seconds, axis_timestamp};

/// A renderer that turns one viewport + revealed series prefix into a frame.
///
/// This is the seam between the animation driver and any concrete raster
/// implementation; tests substitute a stub here.
pub trait FrameRenderer {
    /// Render frame `revealed`: the primary curve over points `[0, revealed)`,
    /// the contribution overlay when the series carries one, and the
    /// current-value label(s) at the last revealed point.
    fn render(
        &mut self,
        viewport: &Viewport,
        series: &ChartSeries,
        revealed: usize,
    ) -> Result<FrameRGBA>;
}

/// RGBA8 brush carried through Parley text layouts.
type LabelBrush = [u8; 4];

/// CPU chart renderer powered by `vello_cpu` for vector/text rasterization.
///
/// All IO is front-loaded: the label font is supplied as bytes at construction
/// and nothing is read from disk per frame.
pub struct ChartRenderer {
    canvas: Canvas,
    style: ChartStyle,
    currency_symbol: String,
    label_offset_fraction: f64,
    font: vello_cpu::peniko::FontData,
    font_family: String,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<LabelBrush>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl ChartRenderer {
    /// Build a renderer for the given canvas, style and label font.
    pub fn new(
        canvas: Canvas,
        style: ChartStyle,
        currency_symbol: impl Into<String>,
        label_offset_fraction: f64,
        font_bytes: Vec<u8>,
    ) -> Result<Self> {
        canvas.validate()?;
        style.validate()?;
        if !(label_offset_fraction.is_finite() && label_offset_fraction >= 0.0) {
            return Err(Error::validation(
                "label offset fraction must be finite and >= 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| Error::validation("no font families registered from font bytes"))?;
        let font_family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| Error::validation("registered font family has no name"))?
            .to_string();
        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            canvas,
            style,
            currency_symbol: currency_symbol.into(),
            label_offset_fraction,
            font,
            font_family,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            ctx: None,
        })
    }

    fn layout_text(&mut self, text: &str, size_px: f32, brush: LabelBrush) -> parley::Layout<LabelBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.font_family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<LabelBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl FrameRenderer for ChartRenderer {
    fn render(
        &mut self,
        viewport: &Viewport,
        series: &ChartSeries,
        revealed: usize,
    ) -> Result<FrameRGBA> {
        let width = self.canvas.width;
        let height = self.canvas.height;
        // Validated at construction to fit u16.
        let w16 = width as u16;
        let h16 = height as u16;

        let plot = PlotArea::new(self.canvas, &self.style, viewport);

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w16 && ctx.height() == h16 => ctx,
            _ => vello_cpu::RenderContext::new(w16, h16),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // Background.
        ctx.set_paint(paint_color(self.style.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        // Axis spines (left and bottom only, like the styled source chart).
        ctx.set_paint(paint_color(self.style.axis));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            plot.left - self.style.spine_width,
            plot.top,
            plot.left,
            plot.bottom + self.style.spine_width,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            plot.left - self.style.spine_width,
            plot.bottom,
            plot.right,
            plot.bottom + self.style.spine_width,
        ));

        self.draw_axis_labels(&mut ctx, &plot, viewport)?;
        self.draw_curves(&mut ctx, &plot, series, revealed);
        self.draw_value_labels(&mut ctx, &plot, series, revealed)?;

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        })
    }
}

impl ChartRenderer {
    fn draw_axis_labels(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        plot: &PlotArea,
        viewport: &Viewport,
    ) -> Result<()> {
        let size = self.style.font_size;
        let tick_gap = 8.0;

        for tick in nice_ticks(viewport.y_min, viewport.y_max, self.style.tick_count) {
            let text = format_currency(tick, &self.currency_symbol)?;
            let layout = self.layout_text(&text, size, self.style.axis);
            let x = plot.left - self.style.spine_width - tick_gap - f64::from(layout.width());
            let y = plot.map_y(tick) - f64::from(layout.height()) / 2.0;
            draw_layout(ctx, &self.font, &layout, x, y);
        }

        // Date ticks evenly spaced inside the visible x range, month.year like
        // the source chart's axis formatter.
        let count = self.style.tick_count;
        for i in 1..=count {
            let frac = i as f64 / (count as f64 + 1.0);
            let axis_x = viewport.x_min + (viewport.x_max - viewport.x_min) * frac;
            let text = axis_timestamp(axis_x)?.format("%m.%Y").to_string();
            let layout = self.layout_text(&text, size, self.style.axis);
            let x = plot.map_x(axis_x) - f64::from(layout.width()) / 2.0;
            let y = plot.bottom + self.style.spine_width + tick_gap;
            draw_layout(ctx, &self.font, &layout, x, y);
        }

        Ok(())
    }

    fn draw_curves(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        plot: &PlotArea,
        series: &ChartSeries,
        revealed: usize,
    ) {
        let primary = revealed_polyline(plot, series, revealed, false);
        self.fill_polyline(ctx, &primary, self.style.primary);

        if series.shows_invested() {
            let overlay = revealed_polyline(plot, series, revealed, true);
            self.fill_polyline(ctx, &overlay, self.style.secondary);
        }
    }

    fn fill_polyline(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        points: &[kurbo::Point],
        color: [u8; 4],
    ) {
        if points.len() < 2 {
            return;
        }
        let mut path = kurbo::BezPath::new();
        path.move_to(points[0]);
        for &p in &points[1..] {
            path.line_to(p);
        }
        // Expand the stroke into a fill outline; vello_cpu then only ever
        // fills paths, as in the rest of the pipeline.
        let stroke = Stroke::new(self.style.line_width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &stroke,
            &StrokeOpts::default(),
            0.25,
        );

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint_color(color));
        ctx.fill_path(&bezpath_to_cpu(&outline));
    }

    fn draw_value_labels(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        plot: &PlotArea,
        series: &ChartSeries,
        revealed: usize,
    ) -> Result<()> {
        let viewport = plot.viewport;
        let (last_x, last_value) = if revealed == 0 {
            (viewport.x_min, 0.0)
        } else {
            (
                axis_seconds(series.timestamp(revealed - 1)),
                series.value(revealed - 1),
            )
        };
        // Nudge the label forward along x so it never sits on the line.
        let label_x = last_x + self.label_offset_fraction * (viewport.x_max - viewport.x_min);

        let text = format_currency(last_value, &self.currency_symbol)?;
        let layout = self.layout_text(&text, self.style.label_font_size, self.style.primary);
        let x = plot.clamp_label_x(plot.map_x(label_x), f64::from(layout.width()));
        let y = plot
            .clamp_y(plot.map_y(last_value))
            - f64::from(layout.height()) / 2.0;
        draw_layout(ctx, &self.font, &layout, x, y);

        if series.shows_invested() && revealed > 0 {
            let invested = series.invested(revealed - 1).unwrap_or(0.0);
            let text = format_currency(invested, &self.currency_symbol)?;
            let layout = self.layout_text(&text, self.style.label_font_size, self.style.secondary);
            let x = plot.clamp_label_x(plot.map_x(label_x), f64::from(layout.width()));
            let y = plot
                .clamp_y(plot.map_y(invested))
                - f64::from(layout.height()) / 2.0;
            draw_layout(ctx, &self.font, &layout, x, y);
        }

        Ok(())
    }
}

/// Pixel-space plot rectangle plus the axis-to-pixel mapping for one frame.
struct PlotArea<'a> {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    viewport: &'a Viewport,
}

impl<'a> PlotArea<'a> {
    fn new(canvas: Canvas, style: &ChartStyle, viewport: &'a Viewport) -> Self {
        Self {
            left: style.padding,
            right: f64::from(canvas.width) - style.padding * 0.25,
            top: style.padding * 0.5,
            bottom: f64::from(canvas.height) - style.padding,
            viewport,
        }
    }

    fn map_x(&self, x: f64) -> f64 {
        let span = (self.viewport.x_max - self.viewport.x_min).max(1e-9);
        self.left + (x - self.viewport.x_min) / span * (self.right - self.left)
    }

    fn map_y(&self, y: f64) -> f64 {
        let span = (self.viewport.y_max - self.viewport.y_min).max(1e-9);
        self.bottom - (y - self.viewport.y_min) / span * (self.bottom - self.top)
    }

    fn clamp_y(&self, py: f64) -> f64 {
        py.clamp(self.top, self.bottom)
    }

    /// Pull a label's left edge back so `label_width` pixels of text stay
    /// inside the plot rectangle. The lookahead offset can otherwise push the
    /// label past the right edge near the end of the animation.
    fn clamp_label_x(&self, px: f64, label_width: f64) -> f64 {
        px.min(self.right - label_width).max(self.left)
    }
}

/// Pixel-space polyline over the revealed prefix of one series column.
///
/// Fewer than two revealed points produce no polyline.
fn revealed_polyline(
    plot: &PlotArea,
    series: &ChartSeries,
    revealed: usize,
    invested: bool,
) -> Vec<kurbo::Point> {
    if revealed < 2 {
        return Vec::new();
    }
    (0..revealed)
        .map(|i| {
            let value = if invested {
                series.invested(i).unwrap_or(0.0)
            } else {
                series.value(i)
            };
            kurbo::Point::new(
                plot.map_x(axis_seconds(series.timestamp(i))),
                plot.map_y(value),
            )
        })
        .collect()
}

fn paint_color(rgba: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<LabelBrush>,
    x: f64,
    y: f64,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(paint_color(brush));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/chart.rs"]
mod tests;
