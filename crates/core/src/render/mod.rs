//! Rasterizes a [`LayoutPlan`] into PNG bytes.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use thiserror::Error;

use crate::layout::{font, LayoutPlan, Rect};
use crate::symbol::SymbolImage;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layout places a symbol but none was supplied")]
    MissingSymbol,

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Draw the label described by `plan` and encode it as PNG.
///
/// `symbol` must be the image the plan was computed from. Output is
/// byte-identical for identical inputs.
pub fn render_label(plan: &LayoutPlan, symbol: Option<&SymbolImage>) -> Result<Vec<u8>, RenderError> {
    let mut canvas = RgbImage::from_pixel(plan.canvas.width, plan.canvas.height, BACKGROUND);

    if let Some(rect) = plan.symbol_rect {
        let symbol = symbol.ok_or(RenderError::MissingSymbol)?;
        let scaled = imageops::resize(symbol.pixels(), rect.width, rect.height, FilterType::Lanczos3);
        composite(&mut canvas, &scaled, &rect);
    }

    draw_text(&mut canvas, &plan.name_text, plan.name_font_size, &plan.name_box);
    draw_text(
        &mut canvas,
        &plan.code_date_text,
        plan.code_date_font_size,
        &plan.code_date_box,
    );

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Alpha-blend `overlay` onto `canvas` at `rect`.
fn composite(canvas: &mut RgbImage, overlay: &RgbaImage, rect: &Rect) {
    for (x, y, src) in overlay.enumerate_pixels() {
        let (cx, cy) = (rect.x + x, rect.y + y);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }
        let alpha = src[3] as u32;
        if alpha == 0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx, cy);
        for channel in 0..3 {
            let blended = (src[channel] as u32 * alpha + dst[channel] as u32 * (255 - alpha) + 127) / 255;
            dst[channel] = blended as u8;
        }
    }
}

fn draw_text(canvas: &mut RgbImage, text: &str, size: u32, origin: &Rect) {
    for cell in font::rasterize(text, size) {
        let x_end = (origin.x + cell.x + cell.width).min(canvas.width());
        let y_end = (origin.y + cell.y + cell.height).min(canvas.height());
        for y in (origin.y + cell.y)..y_end {
            for x in (origin.x + cell.x)..x_end {
                canvas.put_pixel(x, y, INK);
            }
        }
    }
}
