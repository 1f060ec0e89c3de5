//! PDF report assembly.
//!
//! The report has a fixed layout: a title followed by four sections, each
//! with a heading, a short computed narrative and an embedded chart that
//! was already rendered to disk.

use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::format::{format_count, format_currency};
use crate::error::ReportError;
use crate::models::{ArtifactPaths, SalesAnalysis};

/// Title printed at the top of the report.
pub const REPORT_TITLE: &str = "Sales Data Report";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 10.0;
const MARGIN_TOP: f32 = 10.0;
const MARGIN_BOTTOM: f32 = 15.0;
const IMAGE_X: f32 = 20.0;
const IMAGE_WIDTH: f32 = 170.0;
const LINE_HEIGHT: f32 = 10.0;
const MM_PER_PT: f32 = 0.3528;
// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH_EM: f32 = 0.5;

/// One section of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub caption: Option<String>,
    pub image: PathBuf,
}

/// Text and image references of the whole report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

/// Lay out the report content from the computed views.
pub fn build_document(
    analysis: &SalesAnalysis,
    paths: &ArtifactPaths,
) -> Result<ReportDocument, ReportError> {
    let no_data = || ReportError::NoData {
        year: analysis.year,
    };
    let best_month = analysis.best_month().ok_or_else(no_data)?;
    let best_city = analysis.best_city().ok_or_else(no_data)?;
    let top_product = analysis.top_product().ok_or_else(no_data)?;
    let reference = &analysis.reference_product;

    let sections = vec![
        Section {
            heading: "1. Monthly Sales Analysis".to_string(),
            paragraphs: vec![format!(
                "The best month for sales was {} with total revenue of {}.",
                best_month.key,
                format_currency(best_month.revenue, 2)
            )],
            caption: None,
            image: paths.monthly_chart.clone(),
        },
        Section {
            heading: "2. Sales by City".to_string(),
            paragraphs: vec![format!(
                "The top-performing city was {} with total revenue of {}.",
                best_city.key,
                format_currency(best_city.revenue, 2)
            )],
            caption: None,
            image: paths.city_chart.clone(),
        },
        Section {
            heading: "3. Best-Selling Products".to_string(),
            paragraphs: vec![format!(
                "The most sold product was '{}', with {} units sold.",
                top_product.product,
                format_count(top_product.units)
            )],
            caption: None,
            image: paths.product_chart.clone(),
        },
        Section {
            heading: format!("4. Why Did '{}' Sell the Most?", reference),
            paragraphs: vec![
                format!(
                    "The product with the highest units sold was '{}'. There are several key reasons:",
                    reference
                ),
                "- Low price point (~$2-$3), making it ideal for impulse purchases.".to_string(),
                "- It's a universally needed item with repeat demand (for remotes, controllers, toys, etc.).".to_string(),
                "- Bundling data shows it's frequently bought alongside electronics and household devices.".to_string(),
            ],
            caption: Some(format!(
                "Top Products Frequently Bought with '{}'",
                reference
            )),
            image: paths.bundle_chart.clone(),
        },
    ];

    Ok(ReportDocument {
        title: REPORT_TITLE.to_string(),
        sections,
    })
}

/// Greedy word wrap; explicit line breaks are kept.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    lines
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * MM_PER_PT * GLYPH_WIDTH_EM
}

fn chars_per_line(width: f32, size: f32) -> usize {
    (width / (size * MM_PER_PT * GLYPH_WIDTH_EM)).floor() as usize
}

/// Cursor-based writer over a PDF document with automatic page breaks.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    // Distance from the top edge of the current page, in mm
    cursor: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            cursor: MARGIN_TOP,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = MARGIN_TOP;
    }

    fn reserve(&mut self, height: f32) {
        if self.cursor + height > PAGE_HEIGHT - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn line(&mut self, text: &str, size: f32, font: Font, x: f32) {
        self.reserve(LINE_HEIGHT);
        let font = match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::Italic => &self.italic,
        };
        // Baseline sits roughly in the middle of the line box
        let baseline = PAGE_HEIGHT - self.cursor - LINE_HEIGHT * 0.65;
        self.layer.use_text(text, size, Mm(x), Mm(baseline), font);
        self.cursor += LINE_HEIGHT;
    }

    fn centered(&mut self, text: &str, size: f32, font: Font) {
        let x = ((PAGE_WIDTH - text_width(text, size)) / 2.0).max(MARGIN_LEFT);
        self.line(text, size, font, x);
    }

    fn paragraph(&mut self, text: &str, size: f32, font: Font) {
        let width = PAGE_WIDTH - 2.0 * MARGIN_LEFT;
        for line in wrap_text(text, chars_per_line(width, size)) {
            self.line(&line, size, font, MARGIN_LEFT);
        }
    }

    fn gap(&mut self, height: f32) {
        self.cursor += height;
    }

    fn image(&mut self, path: &Path) -> Result<(), ReportError> {
        let image = image_crate::open(path).map_err(|source| ReportError::Image {
            path: path.to_path_buf(),
            source,
        })?;

        let (width_px, height_px) = image.dimensions();
        let dpi = width_px.max(1) as f32 / (IMAGE_WIDTH / 25.4);
        let height = height_px as f32 / dpi * 25.4;

        self.reserve(height);
        Image::from_dynamic_image(&image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(IMAGE_X)),
                translate_y: Some(Mm(PAGE_HEIGHT - self.cursor - height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.cursor += height;
        Ok(())
    }

    fn save(self, path: &Path) -> Result<(), ReportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.doc.save(&mut writer)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

/// Render the report to a PDF file, replacing any previous file.
pub fn write_pdf(document: &ReportDocument, path: &Path) -> Result<(), ReportError> {
    let mut writer = PageWriter::new(&document.title)?;

    writer.centered(&document.title, 16.0, Font::Bold);
    writer.gap(10.0);

    for section in &document.sections {
        writer.line(&section.heading, 12.0, Font::Bold, MARGIN_LEFT);
        for paragraph in &section.paragraphs {
            writer.paragraph(paragraph, 12.0, Font::Regular);
        }
        if let Some(ref caption) = section.caption {
            writer.paragraph(caption, 11.0, Font::Italic);
        }
        writer.image(&section.image)?;
        writer.gap(10.0);
    }

    writer.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BundlePartner, ProductVolume, RevenueTotal, YearMonth};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn analysis() -> SalesAnalysis {
        SalesAnalysis {
            year: 2019,
            records: 4,
            monthly: vec![
                RevenueTotal {
                    key: YearMonth::new(2019, 1),
                    revenue: Decimal::from_str("1822256.73").unwrap(),
                },
                RevenueTotal {
                    key: YearMonth::new(2019, 12),
                    revenue: Decimal::from_str("4613443.34").unwrap(),
                },
            ],
            cities: vec![RevenueTotal {
                key: "San Francisco (CA)".to_string(),
                revenue: Decimal::from_str("8262203.91").unwrap(),
            }],
            products: vec![ProductVolume {
                product: "AAA Batteries (4-pack)".to_string(),
                units: 31017,
            }],
            reference_product: "AAA Batteries (4-pack)".to_string(),
            bundles: vec![BundlePartner {
                product: "Lightning Charging Cable".to_string(),
                orders: 30,
            }],
        }
    }

    #[test]
    fn test_build_document_narrative() {
        let paths = ArtifactPaths::new("cleaned.csv", "reports");
        let document = build_document(&analysis(), &paths).unwrap();

        assert_eq!(document.title, "Sales Data Report");
        assert_eq!(document.sections.len(), 4);
        assert_eq!(
            document.sections[0].paragraphs[0],
            "The best month for sales was 2019-12 with total revenue of $4,613,443.34."
        );
        assert_eq!(
            document.sections[1].paragraphs[0],
            "The top-performing city was San Francisco (CA) with total revenue of $8,262,203.91."
        );
        assert_eq!(
            document.sections[2].paragraphs[0],
            "The most sold product was 'AAA Batteries (4-pack)', with 31,017 units sold."
        );
        assert!(document.sections[3].heading.contains("AAA Batteries (4-pack)"));
        assert_eq!(document.sections[3].image, paths.bundle_chart);
        assert!(document.sections[3].caption.is_some());
    }

    #[test]
    fn test_build_document_without_data() {
        let mut empty = analysis();
        empty.monthly.clear();
        let paths = ArtifactPaths::new("cleaned.csv", "reports");
        assert!(matches!(
            build_document(&empty, &paths),
            Err(ReportError::NoData { year: 2019 })
        ));
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);

        let lines = wrap_text("first\nsecond line", 40);
        assert_eq!(lines, vec!["first", "second line"]);

        let lines = wrap_text("averyveryverylongword", 5);
        assert_eq!(lines, vec!["averyveryverylongword"]);
    }

    #[test]
    fn test_write_pdf_embeds_images() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("cleaned.csv"), dir.path());

        for chart in [
            &paths.monthly_chart,
            &paths.city_chart,
            &paths.product_chart,
            &paths.bundle_chart,
        ] {
            image_crate::RgbImage::from_pixel(120, 60, image_crate::Rgb([200, 100, 50]))
                .save(chart)
                .unwrap();
        }

        let document = build_document(&analysis(), &paths).unwrap();
        write_pdf(&document, &paths.report_pdf).unwrap();

        let bytes = std::fs::read(&paths.report_pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_pdf_missing_image_fails() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("cleaned.csv"), dir.path());
        let document = build_document(&analysis(), &paths).unwrap();

        assert!(matches!(
            write_pdf(&document, &paths.report_pdf),
            Err(ReportError::Image { .. })
        ));
    }
}
