//! 表のPNG出力（8x8ビットマップフォントを2倍で描画）

use super::{ascii_cell, row_tone, truncate, RowTone};
use crate::error::{Result, TeaVisionError};
use font8x8::UnicodeFonts;
use image::{Rgb, RgbImage};
use std::path::Path;
use teavision_common::ReportTable;

const SCALE: u32 = 2;
const GLYPH: u32 = 8 * SCALE;
const PADDING: u32 = 12;
const ROW_HEIGHT: u32 = GLYPH + 12;
const MAX_CELL_CHARS: usize = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const HEADER_FILL: Rgb<u8> = Rgb([46, 125, 50]);
const HEADER_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT: Rgb<u8> = Rgb([33, 33, 33]);
const GOOD_FILL: Rgb<u8> = Rgb([220, 237, 200]);
const BAD_FILL: Rgb<u8> = Rgb([255, 205, 210]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

fn draw_char(img: &mut RgbImage, x: u32, y: u32, ch: char, color: Rgb<u8>) {
    let glyph = font8x8::BASIC_FONTS.get(ch).unwrap_or([0; 8]);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8u32 {
            if (bits >> col) & 1 == 1 {
                fill_rect(img, x + col * SCALE, y + row as u32 * SCALE, SCALE, SCALE, color);
            }
        }
    }
}

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    let mut cursor_x = x;
    for ch in text.chars() {
        draw_char(img, cursor_x, y, ch, color);
        cursor_x = cursor_x.saturating_add(GLYPH);
    }
}

/// 表を画像に描画する
pub fn render_table(table: &ReportTable) -> RgbImage {
    let chars: Vec<usize> = table
        .column_widths()
        .into_iter()
        .map(|w| w.clamp(3, MAX_CELL_CHARS))
        .collect();
    let col_widths: Vec<u32> = chars.iter().map(|c| *c as u32 * GLYPH + PADDING * 2).collect();

    let title = ascii_cell(&table.title);
    let table_width: u32 = col_widths.iter().sum();
    let width = (table_width + PADDING * 2).max(title.len() as u32 * GLYPH + PADDING * 2);
    let height = PADDING * 2 + ROW_HEIGHT * (table.rows.len() as u32 + 2);

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    draw_text(&mut img, PADDING, PADDING, &title, TEXT);

    let mut y = PADDING + ROW_HEIGHT;
    fill_rect(&mut img, PADDING, y, table_width, ROW_HEIGHT, HEADER_FILL);
    let mut x = PADDING;
    for ((header, w), max) in table.headers.iter().zip(&col_widths).zip(&chars) {
        draw_text(&mut img, x + PADDING, y + 6, &truncate(&ascii_cell(header), *max), HEADER_TEXT);
        x += w;
    }

    for row in &table.rows {
        y += ROW_HEIGHT;
        match row_tone(table, row) {
            RowTone::Good => fill_rect(&mut img, PADDING, y, table_width, ROW_HEIGHT, GOOD_FILL),
            RowTone::Bad => fill_rect(&mut img, PADDING, y, table_width, ROW_HEIGHT, BAD_FILL),
            RowTone::Plain => {}
        }
        let mut x = PADDING;
        for ((cell, w), max) in row.iter().zip(&col_widths).zip(&chars) {
            draw_text(&mut img, x + PADDING, y + 6, &truncate(&ascii_cell(cell), *max), TEXT);
            x += w;
        }
        fill_rect(&mut img, PADDING, y + ROW_HEIGHT - 1, table_width, 1, GRID);
    }

    img
}

pub fn generate_png(table: &ReportTable, output_path: &Path) -> Result<()> {
    render_table(table)
        .save_with_format(output_path, image::ImageFormat::Png)
        .map_err(|e| TeaVisionError::PngGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportTable {
        let mut table = ReportTable::new("Tea Region Predictions", &["Image Name", "Status"]);
        table.push_row(vec!["a.jpg".into(), "Done".into()]);
        table.push_row(vec!["b.jpg".into(), "Failed".into()]);
        table
    }

    #[test]
    fn test_dimensions_grow_with_rows() {
        let img = render_table(&sample());
        assert_eq!(img.height(), PADDING * 2 + ROW_HEIGHT * 4);
        assert!(img.width() > 0);
    }

    #[test]
    fn test_rows_are_tinted() {
        let img = render_table(&sample());
        // 行の左端（文字が無い位置）で色を確認
        let done_y = PADDING + ROW_HEIGHT * 2 + 2;
        let failed_y = PADDING + ROW_HEIGHT * 3 + 2;
        assert_eq!(*img.get_pixel(PADDING + 1, done_y), GOOD_FILL);
        assert_eq!(*img.get_pixel(PADDING + 1, failed_y), BAD_FILL);
    }
}
