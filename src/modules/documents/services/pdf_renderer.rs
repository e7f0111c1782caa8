// A4 rendering with printpdf's built-in Helvetica.
//
// Coordinates are millimetres from the bottom-left corner. The first page
// carries the letterhead, party block and meta rows; following pages repeat
// only the table header. Totals, notes and terms follow the last row and move
// to a fresh page when they do not fit.

use std::ops::Range;

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use rust_decimal::Decimal;

use crate::config::CompanyConfig;
use crate::core::{AppError, Currency, Result};
use crate::modules::documents::models::{PrintableDocument, PrintableLine};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 6.0;
const TABLE_TOP_FIRST: f32 = 190.0;
const TABLE_TOP_OTHER: f32 = 270.0;
const TABLE_BOTTOM: f32 = 25.0;
const FOOTER_HEIGHT: f32 = 45.0;
const DESCRIPTION_CHARS: usize = 48;

/// Column x positions: #, description, qty, unit, unit price (right), total (right)
const COL_NO: f32 = MARGIN;
const COL_DESC: f32 = MARGIN + 10.0;
const COL_QTY_RIGHT: f32 = 128.0;
const COL_UNIT: f32 = 131.0;
const COL_PRICE_RIGHT: f32 = 168.0;
const COL_TOTAL_RIGHT: f32 = PAGE_WIDTH - MARGIN;

/// Rows that fit on the first and on following pages
pub fn rows_per_page() -> (usize, usize) {
    let first = ((TABLE_TOP_FIRST - ROW_HEIGHT - TABLE_BOTTOM) / ROW_HEIGHT) as usize;
    let other = ((TABLE_TOP_OTHER - ROW_HEIGHT - TABLE_BOTTOM) / ROW_HEIGHT) as usize;
    (first, other)
}

/// Split `count` table rows into per-page ranges; always at least one page
pub fn paginate(count: usize, first_page: usize, other_pages: usize) -> Vec<Range<usize>> {
    let mut pages = vec![0..count.min(first_page)];
    let mut start = pages[0].end;
    while start < count {
        let end = (start + other_pages.max(1)).min(count);
        pages.push(start..end);
        start = end;
    }
    pages
}

/// Approximate Helvetica width, good enough for right alignment of digits
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * 0.3528
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn amount(currency: Currency, value: Decimal) -> String {
    let scale = currency.scale();
    format!("{:.*}", scale as usize, currency.round(value))
}

fn quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
}

impl Canvas<'_> {
    fn text(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer
            .use_text(text, size, Mm(x), Mm(y), &self.fonts.regular);
    }

    fn bold(&self, text: &str, size: f32, x: f32, y: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(y), &self.fonts.bold);
    }

    fn right(&self, text: &str, size: f32, right_x: f32, y: f32) {
        self.text(text, size, right_x - text_width(text, size), y);
    }

    fn rule(&self, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
            ],
            is_closed: false,
        });
    }
}

/// Renders printable documents with the company letterhead
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    company: CompanyConfig,
}

impl PdfRenderer {
    pub fn new(company: CompanyConfig) -> Self {
        Self { company }
    }

    pub fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>> {
        let (doc, page, layer) = PdfDocument::new(
            format!("{} {}", document.title, document.number),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "content",
        );
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| AppError::Pdf(e.to_string()))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| AppError::Pdf(e.to_string()))?,
        };

        let (first_rows, other_rows) = rows_per_page();
        let pages = paginate(document.lines.len(), first_rows, other_rows);
        let page_count = pages.len();

        let mut canvas = Canvas {
            layer: doc.get_page(page).get_layer(layer),
            fonts: &fonts,
        };
        let mut cursor = 0.0;

        for (index, range) in pages.into_iter().enumerate() {
            if index > 0 {
                canvas = Self::new_page(&doc, &fonts);
            }

            let top = if index == 0 {
                self.draw_header(&canvas, document);
                TABLE_TOP_FIRST
            } else {
                canvas.bold(&document.number, 9.0, MARGIN, PAGE_HEIGHT - MARGIN);
                TABLE_TOP_OTHER
            };

            cursor = Self::draw_table(&canvas, document, &document.lines[range], top);
            canvas.text(
                &format!("Page {} of {}", index + 1, page_count),
                8.0,
                PAGE_WIDTH / 2.0 - 10.0,
                10.0,
            );
        }

        if cursor - FOOTER_HEIGHT < TABLE_BOTTOM {
            canvas = Self::new_page(&doc, &fonts);
            cursor = TABLE_TOP_OTHER;
        }
        Self::draw_footer(&canvas, document, cursor);

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| AppError::Pdf(e.to_string()))?;

        tracing::debug!(
            number = %document.number,
            pages = page_count,
            bytes = bytes.len(),
            "Document rendered"
        );
        Ok(bytes)
    }

    fn new_page<'a>(doc: &PdfDocumentReference, fonts: &'a Fonts) -> Canvas<'a> {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        Canvas {
            layer: doc.get_page(page).get_layer(layer),
            fonts,
        }
    }

    fn draw_header(&self, canvas: &Canvas<'_>, document: &PrintableDocument) {
        let mut y = PAGE_HEIGHT - MARGIN - 5.0;
        canvas.bold(&self.company.name, 16.0, MARGIN, y);
        y -= 6.0;
        for line in self.company.address.lines().filter(|l| !l.trim().is_empty()) {
            canvas.text(line, 9.0, MARGIN, y);
            y -= 4.5;
        }
        let contact = [self.company.phone.as_str(), self.company.email.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("  |  ");
        if !contact.is_empty() {
            canvas.text(&contact, 9.0, MARGIN, y);
            y -= 4.5;
        }
        if let Some(tax) = &self.company.tax_number {
            canvas.text(&format!("TRN: {}", tax), 9.0, MARGIN, y);
        }

        let title_y = PAGE_HEIGHT - MARGIN - 5.0;
        canvas.bold(&document.title, 18.0, 130.0, title_y);
        canvas.text(&format!("No: {}", document.number), 10.0, 130.0, title_y - 8.0);
        canvas.text(
            &format!("Date: {}", document.date.format("%d %b %Y")),
            10.0,
            130.0,
            title_y - 13.0,
        );
        let mut meta_y = title_y - 18.0;
        for (label, value) in &document.meta {
            canvas.text(&format!("{}: {}", label, value), 9.0, 130.0, meta_y);
            meta_y -= 4.5;
        }

        canvas.rule(240.0);
        let mut party_y = 233.0;
        canvas.bold(&document.party_heading, 10.0, MARGIN, party_y);
        party_y -= 5.0;
        for line in document.party_lines.iter().take(8) {
            canvas.text(line, 9.0, MARGIN, party_y);
            party_y -= 4.5;
        }
        canvas.text(
            &format!("Currency: {}", document.currency),
            9.0,
            130.0,
            233.0,
        );
    }

    /// Draw the table header and rows; returns the y below the last row
    fn draw_table(
        canvas: &Canvas<'_>,
        document: &PrintableDocument,
        rows: &[PrintableLine],
        top: f32,
    ) -> f32 {
        canvas.bold("#", 9.0, COL_NO, top);
        canvas.bold("Description", 9.0, COL_DESC, top);
        canvas.bold("Qty", 9.0, COL_QTY_RIGHT - text_width("Qty", 9.0), top);
        canvas.bold("Unit", 9.0, COL_UNIT, top);
        canvas.bold("Unit Price", 9.0, COL_PRICE_RIGHT - text_width("Unit Price", 9.0), top);
        canvas.bold("Total", 9.0, COL_TOTAL_RIGHT - text_width("Total", 9.0), top);
        canvas.rule(top - 2.0);

        let mut y = top - ROW_HEIGHT - 1.0;
        for row in rows {
            canvas.text(&row.line_number.to_string(), 9.0, COL_NO, y);
            canvas.text(&truncate(&row.description, DESCRIPTION_CHARS), 9.0, COL_DESC, y);
            canvas.right(&quantity(row.quantity), 9.0, COL_QTY_RIGHT, y);
            canvas.text(&truncate(&row.unit, 8), 9.0, COL_UNIT, y);
            if let Some(price) = row.unit_price {
                canvas.right(&amount(document.currency, price), 9.0, COL_PRICE_RIGHT, y);
            }
            if let Some(total) = row.line_total {
                canvas.right(&amount(document.currency, total), 9.0, COL_TOTAL_RIGHT, y);
            }
            y -= ROW_HEIGHT;
        }
        canvas.rule(y + ROW_HEIGHT - 2.0);
        y
    }

    fn draw_footer(canvas: &Canvas<'_>, document: &PrintableDocument, top: f32) {
        let mut y = top - 2.0;

        if let Some(totals) = &document.totals {
            let currency = document.currency;
            let mut rows = vec![("Subtotal", totals.subtotal)];
            if !totals.discount_total.is_zero() {
                rows.push(("Discount", -totals.discount_total));
            }
            rows.push(("Tax", totals.tax_total));
            for (label, value) in rows {
                canvas.text(label, 9.0, 140.0, y);
                canvas.right(&amount(currency, value), 9.0, COL_TOTAL_RIGHT, y);
                y -= 5.0;
            }
            canvas.bold(&format!("Total ({})", currency), 10.0, 140.0, y);
            let total = amount(currency, totals.total_amount);
            canvas.bold(
                &total,
                10.0,
                COL_TOTAL_RIGHT - text_width(&total, 10.0),
                y,
            );
            y -= 8.0;
        }

        for (heading, body) in [("Notes", &document.notes), ("Terms & Conditions", &document.terms)] {
            if let Some(body) = body.as_deref().filter(|b| !b.trim().is_empty()) {
                canvas.bold(heading, 9.0, MARGIN, y);
                y -= 4.5;
                for line in body.lines().take(4) {
                    canvas.text(&truncate(line, 100), 8.0, MARGIN, y);
                    y -= 4.0;
                }
                y -= 2.0;
            }
        }
    }
}
