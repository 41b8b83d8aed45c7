//! [`AlertRenderer`] draws alert cards with fonts and a watermark loaded
//! once at startup.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgba, RgbaImage, imageops::FilterType};
use imageproc::drawing::draw_text_mut;
use subalert_core::alert::{AlertCard, CardRenderer};
use uuid::Uuid;

use crate::{
  AssetLoadError, RenderError,
  layout::{CardLayout, WATERMARK_SIZE},
  text::{line_height, measure, printable_ascii},
};

const BACKGROUND: Rgba<u8> = Rgba([0x36, 0x39, 0x3f, 0xff]);
const FOREGROUND: Rgba<u8> = Rgba([0xd1, 0xd0, 0xb0, 0xff]);

const TITLE_SCALE: f32 = 22.0;
const BODY_SCALE: f32 = 16.0;

/// Where the renderer's assets live and where cards are written.
#[derive(Debug, Clone)]
pub struct AssetPaths {
  pub regular_font: PathBuf,
  pub bold_font:    PathBuf,
  pub watermark:    PathBuf,
  pub output_dir:   PathBuf,
}

pub struct AlertRenderer {
  regular:    FontVec,
  bold:       FontVec,
  /// Already scaled to `WATERMARK_SIZE`.
  watermark:  RgbaImage,
  output_dir: PathBuf,
}

impl AlertRenderer {
  /// Load fonts and the watermark. Any missing or unreadable asset fails the
  /// whole load.
  pub fn load(paths: &AssetPaths) -> Result<Self, AssetLoadError> {
    let regular = load_font(&paths.regular_font)?;
    let bold = load_font(&paths.bold_font)?;

    let watermark = image::open(&paths.watermark)
      .map_err(|source| AssetLoadError::Watermark {
        path: paths.watermark.clone(),
        source,
      })?
      .resize_exact(WATERMARK_SIZE, WATERMARK_SIZE, FilterType::Lanczos3)
      .to_rgba8();

    tracing::debug!(output_dir = %paths.output_dir.display(), "loaded card assets");

    Ok(Self {
      regular,
      bold,
      watermark,
      output_dir: paths.output_dir.clone(),
    })
  }

  /// Render a card and write it to `<output_dir>/<uuid>.png`.
  pub fn render(&self, title: &str, body: &str) -> Result<AlertCard, RenderError> {
    let body = printable_ascii(body);
    let title_scale = PxScale::from(TITLE_SCALE);
    let body_scale = PxScale::from(BODY_SCALE);

    let layout = CardLayout::fit(
      measure(&self.bold, title_scale, title),
      measure(&self.regular, body_scale, &body),
    );

    let mut canvas = compose_background(&layout, &self.watermark);

    let (x, y) = layout.title;
    draw_text_mut(&mut canvas, FOREGROUND, x, y, title_scale, &self.bold, title);

    let step = line_height(&self.regular, body_scale) as i32;
    let (x, mut y) = layout.body;
    for line in body.split('\n') {
      draw_text_mut(&mut canvas, FOREGROUND, x, y, body_scale, &self.regular, line);
      y += step;
    }

    std::fs::create_dir_all(&self.output_dir).map_err(|source| {
      RenderError::OutputDir { path: self.output_dir.clone(), source }
    })?;

    let id = Uuid::new_v4();
    let path = self.output_dir.join(format!("{id}.png"));
    canvas
      .save_with_format(&path, ImageFormat::Png)
      .map_err(|source| RenderError::Write { path: path.clone(), source })?;

    Ok(AlertCard { id, path, width: layout.width, height: layout.height })
  }
}

impl CardRenderer for AlertRenderer {
  type Error = RenderError;

  fn render(&self, title: &str, body: &str) -> Result<AlertCard, RenderError> {
    AlertRenderer::render(self, title, body)
  }
}

fn load_font(path: &Path) -> Result<FontVec, AssetLoadError> {
  let bytes = std::fs::read(path).map_err(|source| AssetLoadError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  FontVec::try_from_vec(bytes)
    .map_err(|_| AssetLoadError::Font { path: path.to_path_buf() })
}

/// A background-filled canvas of the layout's size with the watermark
/// alpha-blended into its corner.
fn compose_background(layout: &CardLayout, watermark: &RgbaImage) -> RgbaImage {
  let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, BACKGROUND);
  let (x, y) = layout.watermark;
  image::imageops::overlay(&mut canvas, watermark, x, y);
  canvas
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::Extent;

  fn half_transparent_watermark() -> RgbaImage {
    // Left half opaque red, right half fully transparent.
    RgbaImage::from_fn(WATERMARK_SIZE, WATERMARK_SIZE, |x, _| {
      if x < WATERMARK_SIZE / 2 {
        Rgba([0xff, 0, 0, 0xff])
      } else {
        Rgba([0, 0xff, 0, 0])
      }
    })
  }

  #[test]
  fn transparent_watermark_pixels_keep_background() {
    let layout = CardLayout::fit(Extent::new(120, 28), Extent::new(300, 64));
    let canvas = compose_background(&layout, &half_transparent_watermark());

    let (wx, wy) = layout.watermark;
    let (wx, wy) = (wx as u32, wy as u32);

    assert_eq!(*canvas.get_pixel(wx + 1, wy + 1), Rgba([0xff, 0, 0, 0xff]));
    assert_eq!(*canvas.get_pixel(wx + WATERMARK_SIZE - 1, wy + 1), BACKGROUND);
    assert_eq!(*canvas.get_pixel(0, 0), BACKGROUND);
  }

  #[test]
  fn canvas_matches_layout() {
    let layout = CardLayout::fit(Extent::new(10, 28), Extent::new(10, 16));
    let canvas = compose_background(&layout, &half_transparent_watermark());
    assert_eq!(canvas.dimensions(), (layout.width, layout.height));
  }

  #[test]
  fn missing_font_is_an_asset_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AssetPaths {
      regular_font: dir.path().join("missing-regular.ttf"),
      bold_font:    dir.path().join("missing-bold.ttf"),
      watermark:    dir.path().join("missing.png"),
      output_dir:   dir.path().join("out"),
    };
    let err = AlertRenderer::load(&paths).err().unwrap();
    assert!(matches!(err, AssetLoadError::Read { .. }));
  }

  #[test]
  fn garbage_font_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("bad.ttf");
    std::fs::write(&font, b"definitely not a font").unwrap();
    let paths = AssetPaths {
      regular_font: font.clone(),
      bold_font:    font,
      watermark:    dir.path().join("missing.png"),
      output_dir:   dir.path().join("out"),
    };
    let err = AlertRenderer::load(&paths).err().unwrap();
    assert!(matches!(err, AssetLoadError::Font { .. }));
  }
  // ─── Rendering with real fonts ──────────────────────────────────────────

  fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
  }

  fn loaded(dir: &Path) -> AlertRenderer {
    let watermark = dir.join("logo.png");
    half_transparent_watermark().save(&watermark).unwrap();
    let paths = AssetPaths {
      regular_font: fixture("DejaVuSansMono.ttf"),
      bold_font:    fixture("DejaVuSansMono-Bold.ttf"),
      watermark,
      output_dir:   dir.join("cards"),
    };
    AlertRenderer::load(&paths).unwrap_or_else(|e| panic!("{e}"))
  }

  #[test]
  fn rendered_card_fits_its_text_and_is_written_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = loaded(dir.path());
    let long = "x".repeat(200);

    for body in ["", "🔧—ü", long.as_str(), "first line\nsecond, longer line\nthird"] {
      let card = renderer.render("New Release", body).unwrap();

      assert_eq!(card.path.parent(), Some(dir.path().join("cards").as_path()));
      assert_eq!(card.path.file_name().unwrap().to_str().unwrap(), format!("{}.png", card.id));

      let written = image::open(&card.path).unwrap();
      assert_eq!((written.width(), written.height()), (card.width, card.height));

      let title = measure(&renderer.bold, PxScale::from(TITLE_SCALE), "New Release");
      let body = measure(&renderer.regular, PxScale::from(BODY_SCALE), &printable_ascii(body));
      assert!(card.width >= title.width.max(body.width) + 75, "{body:?}");
      assert!(card.height >= body.height + 75, "{body:?}");
    }
  }

  #[test]
  fn each_render_gets_its_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = loaded(dir.path());

    let a = renderer.render("Identity Update", "Alice updated").unwrap();
    let b = renderer.render("Identity Update", "Alice updated").unwrap();

    assert_ne!(a.path, b.path);
    assert!(a.path.exists() && b.path.exists());
  }

  #[test]
  fn multi_line_body_is_taller_than_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = loaded(dir.path());

    let one = renderer.render("t", "line").unwrap();
    let three = renderer.render("t", "line\nline\nline").unwrap();
    let step = line_height(&renderer.regular, PxScale::from(BODY_SCALE));

    assert_eq!(three.height, one.height + 2 * step);
  }
}
