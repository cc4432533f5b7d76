use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::layout::{SummaryLayout, MARGIN_X_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, TITLE};
use super::SummaryError;

pub(crate) fn render(layout: &SummaryLayout) -> Result<Vec<u8>, SummaryError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(TITLE, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_error)?;

    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
    for page in 1..layout.pages {
        let (page_index, layer_index) = doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", page + 1),
        );
        layers.push(doc.get_page(page_index).get_layer(layer_index));
    }

    for line in &layout.lines {
        let layer = layers
            .get(line.page)
            .ok_or_else(|| SummaryError::Render(format!("page {} out of range", line.page)))?;
        let font = if line.style.is_bold() { &bold } else { &regular };
        layer.use_text(
            latin_text(&line.text),
            line.style.font_size(),
            Mm(MARGIN_X_MM),
            Mm(line.y_mm),
            font,
        );
    }

    doc.save_to_bytes().map_err(render_error)
}

/// Built-in fonts only cover Latin-1.
fn latin_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

fn render_error<E: std::fmt::Display>(err: E) -> SummaryError {
    SummaryError::Render(err.to_string())
}
