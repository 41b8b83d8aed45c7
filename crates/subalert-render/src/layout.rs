//! Card geometry.
//!
//! The card grows to fit its text and never truncates: its width is the wider
//! of the title and body plus [`PADDING`], its height the body height plus
//! [`PADDING`]. The watermark sits flush in the bottom-right corner.

/// Space added to the measured text on both axes.
pub const PADDING: u32 = 75;
/// Side of the square watermark.
pub const WATERMARK_SIZE: u32 = 75;

pub const TITLE_Y: i32 = 10;
pub const BODY_X: i32 = 10;
pub const BODY_Y: i32 = 75;

/// Measured pixel size of a block of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
  pub width:  u32,
  pub height: u32,
}

impl Extent {
  pub fn new(width: u32, height: u32) -> Self { Self { width, height } }
}

/// Where everything goes on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
  pub width:     u32,
  pub height:    u32,
  pub title:     (i32, i32),
  pub body:      (i32, i32),
  pub watermark: (i64, i64),
}

impl CardLayout {
  /// Lay out a card for a title and body of the given sizes.
  pub fn fit(title: Extent, body: Extent) -> Self {
    let width = title.width.max(body.width) + PADDING;
    let height = body.height + PADDING;

    // Centred; `width >= title.width` so this never goes negative.
    let title_x = ((width - title.width) / 2) as i32;

    Self {
      width,
      height,
      title: (title_x, TITLE_Y),
      body: (BODY_X, BODY_Y),
      watermark: (
        i64::from(width) - i64::from(WATERMARK_SIZE),
        i64::from(body.height),
      ),
    }
  }
}
