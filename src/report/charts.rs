//! Bar chart rendering.
//!
//! Every chart in the report is a vertical bar chart over categorical
//! labels, rendered to PNG with the bundled DejaVu Sans font.

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use super::format::{format_axis_currency, format_count};
use crate::error::ReportError;
use crate::models::SalesAnalysis;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const SEA_GREEN: RGBColor = RGBColor(46, 139, 87);
const ORANGE: RGBColor = RGBColor(255, 165, 0);

const MAX_Y_LABELS: usize = 10;

/// How values on the vertical axis are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFormat {
    Currency,
    Count,
}

impl AxisFormat {
    fn label(self, value: f64) -> String {
        match self {
            AxisFormat::Currency => format_axis_currency(value),
            AxisFormat::Count => format_count(value.max(0.0).round() as u64),
        }
    }
}

/// A categorical bar chart ready to render.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub color: RGBColor,
    pub size: (u32, u32),
    pub axis: AxisFormat,
}

impl BarChart {
    /// Upper bound of the vertical axis with some headroom.
    ///
    /// Count axes end on a whole number.
    fn y_max(&self) -> f64 {
        let max = self.values.iter().cloned().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return 1.0;
        }
        match self.axis {
            AxisFormat::Currency => max * 1.1,
            AxisFormat::Count => (max * 1.1).ceil(),
        }
    }

    /// Number of vertical axis labels to request.
    ///
    /// Small count axes get one label per unit so no two ticks round to
    /// the same integer.
    fn y_label_count(&self) -> usize {
        match self.axis {
            AxisFormat::Currency => MAX_Y_LABELS,
            AxisFormat::Count => (self.y_max() as usize + 1).min(MAX_Y_LABELS),
        }
    }
}

fn ensure_font() -> Result<(), ReportError> {
    let registered = FONT_REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if *registered {
        Ok(())
    } else {
        Err(ReportError::Font)
    }
}

/// Render a chart to a PNG file, replacing any previous file.
pub fn render_bar_chart(chart: &BarChart, path: &Path) -> Result<(), ReportError> {
    ensure_font()?;
    draw(chart, path).map_err(|e| ReportError::Chart {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!("Rendered chart {}", path.display());
    Ok(())
}

fn draw(chart: &BarChart, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, chart.size).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = chart.labels.len().max(1);
    let label_formatter = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(i) => chart.labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    let axis_formatter = |value: &f64| chart.axis.label(*value);

    let mut context = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT_FAMILY, 24))
        .margin(15)
        .x_label_area_size(160)
        .y_label_area_size(90)
        .build_cartesian_2d((0..slots).into_segmented(), 0.0..chart.y_max())?;

    context
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&label_formatter)
        .x_label_style(
            (FONT_FAMILY, 13)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_labels(chart.y_label_count())
        .y_label_formatter(&axis_formatter)
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    context.draw_series(
        Histogram::vertical(&context)
            .style(chart.color.filled())
            .margin(8)
            .data(chart.values.iter().enumerate().map(|(i, v)| (i, *v))),
    )?;

    root.present()?;
    Ok(())
}

/// Monthly revenue chart.
pub fn monthly_chart(analysis: &SalesAnalysis) -> BarChart {
    BarChart {
        title: "Total Sales by Month".to_string(),
        x_desc: "Month".to_string(),
        y_desc: "Total Sales ($)".to_string(),
        labels: analysis.monthly.iter().map(|m| m.key.to_string()).collect(),
        values: analysis
            .monthly
            .iter()
            .map(|m| m.revenue.to_f64().unwrap_or_default())
            .collect(),
        color: SKY_BLUE,
        size: (1200, 600),
        axis: AxisFormat::Currency,
    }
}

/// City revenue chart.
pub fn city_chart(analysis: &SalesAnalysis) -> BarChart {
    BarChart {
        title: "Total Sales by City".to_string(),
        x_desc: "City".to_string(),
        y_desc: "Total Sales ($)".to_string(),
        labels: analysis.cities.iter().map(|c| c.key.clone()).collect(),
        values: analysis
            .cities
            .iter()
            .map(|c| c.revenue.to_f64().unwrap_or_default())
            .collect(),
        color: LIGHT_CORAL,
        size: (1200, 600),
        axis: AxisFormat::Currency,
    }
}

/// Product volume chart.
pub fn product_chart(analysis: &SalesAnalysis) -> BarChart {
    BarChart {
        title: "Units Sold by Product".to_string(),
        x_desc: "Product".to_string(),
        y_desc: "Total Quantity Sold".to_string(),
        labels: analysis.products.iter().map(|p| p.product.clone()).collect(),
        values: analysis.products.iter().map(|p| p.units as f64).collect(),
        color: SEA_GREEN,
        size: (1400, 700),
        axis: AxisFormat::Count,
    }
}

/// Bundle partners chart.
pub fn bundle_chart(analysis: &SalesAnalysis) -> BarChart {
    BarChart {
        title: format!(
            "Most Frequent Bundles with '{}'",
            analysis.reference_product
        ),
        x_desc: "Co-purchased Product".to_string(),
        y_desc: "Frequency".to_string(),
        labels: analysis.bundles.iter().map(|b| b.product.clone()).collect(),
        values: analysis.bundles.iter().map(|b| b.orders as f64).collect(),
        color: ORANGE,
        size: (1000, 500),
        axis: AxisFormat::Count,
    }
}
