//! Label geometry.
//!
//! [`compute_layout`] turns a set record and an optional symbol into a
//! [`LayoutPlan`]: where the symbol goes and at what size, and which text is
//! drawn where at which font size. It is pure; the renderer only executes
//! the plan.

pub mod font;

use thiserror::Error;

use crate::catalog::SetRecord;
use crate::symbol::SymbolImage;

/// Gap between the symbol box, the text column and the right edge.
pub const PADDING: u32 = 20;
/// Largest font size tried for the set name.
pub const NAME_MAX_FONT_SIZE: u32 = 40;
/// Smallest font size for the set name; below this the name is truncated.
pub const NAME_MIN_FONT_SIZE: u32 = 20;
pub const NAME_FONT_STEP: u32 = 1;
pub const CODE_DATE_FONT_SIZE: u32 = 30;
/// Vertical gap between the name and the code/date line.
pub const LINE_GAP: u32 = 10;
/// Longest side over shortest side beyond which a symbol is rejected.
pub const MAX_SYMBOL_ASPECT: u32 = 20;

const ELLIPSIS: &str = "...";

/// Output canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// The printed label target.
    pub const LABEL: CanvasSize = CanvasSize {
        width: 760,
        height: 140,
    };

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::LABEL
    }
}

/// Axis-aligned rectangle; `x + width` and `y + height` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Draw geometry for one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub canvas: CanvasSize,
    /// Square reserved for the symbol at the left edge.
    pub symbol_box: Rect,
    /// Where the scaled symbol lands, or `None` for a text-only label.
    pub symbol_rect: Option<Rect>,
    pub name_box: Rect,
    /// Name as drawn: normalized and possibly truncated.
    pub name_text: String,
    pub name_font_size: u32,
    pub code_date_box: Rect,
    pub code_date_text: String,
    pub code_date_font_size: u32,
}

impl LayoutPlan {
    /// Whether every drawn element lies inside the canvas.
    pub fn fits_canvas(&self) -> bool {
        let bounds = self.canvas.bounds();
        bounds.contains(&self.symbol_box)
            && self.symbol_rect.map_or(true, |r| bounds.contains(&r))
            && bounds.contains(&self.name_box)
            && bounds.contains(&self.code_date_box)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("symbol {width}x{height} cannot be placed on the label")]
    DegenerateSymbol { width: u32, height: u32 },

    #[error("code/date line {text:?} needs {width}px but only {available}px are available")]
    CodeLineOverflow {
        text: String,
        width: u32,
        available: u32,
    },

    #[error("canvas {width}x{height} is too small for a label")]
    CanvasTooSmall { width: u32, height: u32 },
}

/// Result of fitting a single line of text into a width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedText {
    pub text: String,
    pub font_size: u32,
    pub width: u32,
}

/// Fit `text` into `available` pixels.
///
/// Starts at `max_size` and steps down to `min_size`. If the text is still
/// too wide at `min_size` it is cut to the longest prefix that fits with
/// `...` appended. Blank text yields an empty line at `min_size`.
pub fn fit_text(
    text: &str,
    available: u32,
    max_size: u32,
    min_size: u32,
    step: u32,
) -> FittedText {
    let text = font::normalize_text(text.trim());
    let min_size = min_size.min(max_size);

    if text.is_empty() {
        return FittedText {
            text,
            font_size: min_size,
            width: 0,
        };
    }

    let step = step.max(1);
    let mut size = max_size;
    loop {
        let width = font::text_width(&text, size);
        if width <= available {
            return FittedText {
                text,
                font_size: size,
                width,
            };
        }
        if size <= min_size {
            break;
        }
        size = size.saturating_sub(step).max(min_size);
    }

    let truncated = truncate_to_width(&text, available, min_size);
    let width = font::text_width(&truncated, min_size);
    FittedText {
        text: truncated,
        font_size: min_size,
        width,
    }
}

fn truncate_to_width(text: &str, available: u32, size: u32) -> String {
    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let prefix: String = chars[..keep].iter().collect();
        let candidate = format!("{}{}", prefix.trim_end(), ELLIPSIS);
        if font::text_width(&candidate, size) <= available {
            return candidate;
        }
    }
    String::new()
}

/// The code/date line drawn under the name.
pub fn code_date_text(record: &SetRecord) -> String {
    format!("{}   {}", record.code, record.label_date())
}

/// Compute the draw geometry for a label.
pub fn compute_layout(
    record: &SetRecord,
    symbol: Option<&SymbolImage>,
    canvas: CanvasSize,
) -> Result<LayoutPlan, LayoutError> {
    let too_small = || LayoutError::CanvasTooSmall {
        width: canvas.width,
        height: canvas.height,
    };

    let symbol_box = Rect::new(0, 0, canvas.height, canvas.height);
    let text_x = symbol_box.right() + PADDING;
    let available = canvas
        .width
        .checked_sub(text_x + PADDING)
        .filter(|w| *w > 0)
        .ok_or_else(too_small)?;

    let symbol_rect = symbol
        .map(|s| place_symbol(s.width(), s.height(), &symbol_box))
        .transpose()?;

    let code_date = font::normalize_text(&code_date_text(record));
    let code_date_width = font::text_width(&code_date, CODE_DATE_FONT_SIZE);
    if code_date_width > available {
        return Err(LayoutError::CodeLineOverflow {
            text: code_date,
            width: code_date_width,
            available,
        });
    }

    let name = fit_text(
        &record.name,
        available,
        NAME_MAX_FONT_SIZE,
        NAME_MIN_FONT_SIZE,
        NAME_FONT_STEP,
    );

    let name_height = font::line_height(name.font_size);
    let code_date_height = font::line_height(CODE_DATE_FONT_SIZE);
    let block_height = name_height + LINE_GAP + code_date_height;
    let start_y = canvas
        .height
        .checked_sub(block_height)
        .map(|free| free / 2)
        .ok_or_else(too_small)?;

    Ok(LayoutPlan {
        canvas,
        symbol_box,
        symbol_rect,
        name_box: Rect::new(text_x, start_y, name.width, name_height),
        name_text: name.text,
        name_font_size: name.font_size,
        code_date_box: Rect::new(
            text_x,
            start_y + name_height + LINE_GAP,
            code_date_width,
            code_date_height,
        ),
        code_date_text: code_date,
        code_date_font_size: CODE_DATE_FONT_SIZE,
    })
}

/// Scale a `width` x `height` symbol to fit `bounds` and center it.
fn place_symbol(width: u32, height: u32, bounds: &Rect) -> Result<Rect, LayoutError> {
    let degenerate = LayoutError::DegenerateSymbol { width, height };

    if width == 0 || height == 0 {
        return Err(degenerate);
    }
    let (long, short) = (width.max(height), width.min(height));
    if long > short.saturating_mul(MAX_SYMBOL_ASPECT) {
        return Err(degenerate);
    }

    // Integer scaling keeps the floor exact.
    let (w, h) = (width as u64, height as u64);
    let (bw, bh) = (bounds.width as u64, bounds.height as u64);
    let (scaled_w, scaled_h) = if w * bh >= h * bw {
        (bw, h * bw / w)
    } else {
        (w * bh / h, bh)
    };
    let (scaled_w, scaled_h) = (scaled_w as u32, scaled_h as u32);
    if scaled_w == 0 || scaled_h == 0 {
        return Err(degenerate);
    }

    Ok(Rect::new(
        bounds.x + (bounds.width - scaled_w) / 2,
        bounds.y + (bounds.height - scaled_h) / 2,
        scaled_w,
        scaled_h,
    ))
}
