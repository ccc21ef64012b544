//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline's collaborator
//! traits, allowing batch runs to be exercised without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use setlabel_core::testing::{fixtures, MockCatalog, MockPrompt, MockSink};
//!
//! let catalog = MockCatalog::new();
//! let sink = MockSink::new();
//!
//! // Configure mock responses
//! let record = fixtures::set_record("DMU", "Dominaria United", 2022, 9);
//! catalog.add_set_with_symbol(record, fixtures::symbol_png(64, 64)).await;
//!
//! // Use in a BatchOrchestrator...
//! ```

mod mock_catalog;
mod mock_prompt;
mod mock_sink;

pub use mock_catalog::MockCatalog;
pub use mock_prompt::MockPrompt;
pub use mock_sink::MockSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use chrono::NaiveDate;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use crate::catalog::{SetCode, SetRecord, SetSummary};
    use crate::symbol::SymbolImage;

    /// Symbol URI used by [`set_record`].
    pub fn symbol_uri(code: &str) -> String {
        format!("https://symbols.test/sets/{}.png", code.to_ascii_uppercase())
    }

    /// Create a set record released on the first of `month`.
    pub fn set_record(code: &str, name: &str, year: i32, month: u32) -> SetRecord {
        SetRecord {
            code: SetCode::parse(code).expect("fixture set code is valid"),
            name: name.to_string(),
            release_date: NaiveDate::from_ymd_opt(year, month, 1)
                .expect("fixture release date is valid"),
            symbol_uri: Some(symbol_uri(code)),
        }
    }

    /// Create a recent-sets listing entry.
    pub fn set_summary(code: &str, name: &str, released_at: &str) -> SetSummary {
        SetSummary {
            code: code.to_ascii_uppercase(),
            name: name.to_string(),
            released_at: released_at.parse().expect("fixture date is valid"),
            set_type: "expansion".to_string(),
        }
    }

    /// Opaque `width` x `height` symbol bitmap with a transparent margin.
    pub fn symbol_bitmap(width: u32, height: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width + 4, height + 4, Rgba([0, 0, 0, 0]));
        for y in 2..height + 2 {
            for x in 2..width + 2 {
                image.put_pixel(x, y, Rgba([180, 30, 30, 255]));
            }
        }
        image
    }

    /// PNG bytes of a symbol that trims to `width` x `height`.
    pub fn symbol_png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(symbol_bitmap(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("fixture symbol encodes");
        bytes
    }

    /// Normalized symbol of exactly `width` x `height`.
    pub fn symbol_image(width: u32, height: u32) -> SymbolImage {
        SymbolImage::from_dynamic(DynamicImage::ImageRgba8(symbol_bitmap(width, height)))
            .expect("fixture symbol is visible")
    }
}
