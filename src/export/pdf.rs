use super::{ascii_cell, truncate};
use crate::error::{Result, TeaVisionError};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use teavision_common::ReportTable;

// A4横
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 12.0;

const TITLE_SIZE_PT: f32 = 14.0;
const BODY_SIZE_PT: f32 = 9.0;
const ROW_HEIGHT_MM: f32 = 6.0;
// Helvetica 9pt の平均文字幅の目安
const CHAR_WIDTH_MM: f32 = 1.75;
const CELL_GAP_MM: f32 = 3.0;

/// 各列の描画幅（mm）と最大文字数
fn layout_columns(table: &ReportTable) -> Vec<(f32, usize)> {
    let widths = table.column_widths();
    let usable = PAGE_WIDTH_MM - MARGIN_MM * 2.0;
    let natural: f32 = widths
        .iter()
        .map(|w| *w as f32 * CHAR_WIDTH_MM + CELL_GAP_MM)
        .sum();
    let scale = if natural > usable { usable / natural } else { 1.0 };

    widths
        .iter()
        .map(|w| {
            let mm = (*w as f32 * CHAR_WIDTH_MM + CELL_GAP_MM) * scale;
            let chars = ((mm - CELL_GAP_MM) / CHAR_WIDTH_MM).floor().max(3.0) as usize;
            (mm, chars)
        })
        .collect()
}

fn rows_per_page() -> usize {
    let body = PAGE_HEIGHT_MM - MARGIN_MM * 2.0 - 12.0 - ROW_HEIGHT_MM;
    (body / ROW_HEIGHT_MM).floor().max(1.0) as usize
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    cells: &[String],
    columns: &[(f32, usize)],
    y: f32,
) {
    let mut x = MARGIN_MM;
    for (cell, (width, chars)) in cells.iter().zip(columns) {
        let text = truncate(&ascii_cell(cell), *chars);
        layer.use_text(text, BODY_SIZE_PT, Mm(x), Mm(y), font);
        x += width;
    }
}

/// 表をA4横のPDFに書き出す（行が多い場合は改ページ）
pub fn generate_pdf(table: &ReportTable, output_path: &Path) -> Result<()> {
    let title = ascii_cell(&table.title);
    let (doc, page1, layer1) = PdfDocument::new(
        &title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TeaVisionError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| TeaVisionError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    let columns = layout_columns(table);
    let per_page = rows_per_page();
    let chunks: Vec<&[Vec<String>]> = if table.rows.is_empty() {
        vec![&[]]
    } else {
        table.rows.chunks(per_page).collect()
    };
    let pages = chunks.len();

    for (page_index, chunk) in chunks.into_iter().enumerate() {
        let layer = if page_index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        let heading = if pages > 1 {
            format!("{} ({}/{})", title, page_index + 1, pages)
        } else {
            title.clone()
        };
        layer.use_text(heading, TITLE_SIZE_PT, Mm(MARGIN_MM), Mm(y), &bold);
        y -= 12.0;

        draw_row(&layer, &bold, &table.headers, &columns, y);
        y -= ROW_HEIGHT_MM;

        for row in chunk {
            draw_row(&layer, &font, row, &columns, y);
            y -= ROW_HEIGHT_MM;
        }
    }

    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| TeaVisionError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    Ok(())
}
