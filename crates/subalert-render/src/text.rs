//! Text preparation and measurement.

use ab_glyph::{Font, PxScale, ScaleFont};
use imageproc::drawing::text_size;

use crate::layout::Extent;

/// Keep only printable ASCII and line breaks. Everything else is dropped,
/// not substituted.
pub fn printable_ascii(text: &str) -> String {
  text
    .chars()
    .filter(|c| c.is_ascii_graphic() || *c == ' ' || *c == '\n')
    .collect()
}

/// Height of one line of text, including the font's line gap.
pub fn line_height(font: &impl Font, scale: PxScale) -> u32 {
  let scaled = font.as_scaled(scale);
  (scaled.height() + scaled.line_gap()).ceil().max(0.0) as u32
}

/// Measure `text`, which may span several lines: the widest line by the
/// number of lines.
pub fn measure(font: &impl Font, scale: PxScale, text: &str) -> Extent {
  let lines = text.split('\n');
  let (width, count) = lines.fold((0, 0u32), |(width, count), line| {
    let (w, _) = text_size(scale, font, line);
    (width.max(w), count + 1)
  });
  Extent::new(width, count * line_height(font, scale))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_non_ascii() {
    assert_eq!(printable_ascii("🔧 v1.2.0 — out now"), " v1.2.0  out now");
  }

  #[test]
  fn keeps_newlines_drops_other_controls() {
    assert_eq!(printable_ascii("a\tb\r\nc\u{7}"), "ab\nc");
  }

  #[test]
  fn printable_ascii_is_unchanged() {
    let text = "Alice / @alice set identity\n5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    assert_eq!(printable_ascii(text), text);
  }
}
