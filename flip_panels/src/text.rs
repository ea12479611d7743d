//! Text cards
//!
//! Panels show short multi-line texts. A [`TextRasterizer`] turns a text and a
//! zone style into a [`TextTexture`]: a fixed square canvas with the text
//! word-wrapped and centred on it. The default [`CardRasterizer`] wraps with
//! the same egui font the scene paints with, so the scene can paint the lines
//! at their projected anchors.

use common::Color;
use egui::epaint::text::Fonts;
use egui::text::LayoutJob;
use egui::{Align, Color32, FontDefinitions, FontId};
use glam::Vec2;

const MAX_TEXTURE_SIDE: usize = 8192;

/// Colours and opacity a card is rasterized with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub background: Color,
    pub foreground: Color,
    pub opacity: f32,
}

/// One laid-out line of a card
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Centre of the line in canvas pixels (origin top-left)
    pub center: Vec2,
    /// Width of the line in canvas pixels
    pub width: f32,
}

/// Handle to a rasterized card
#[derive(Debug, Clone, PartialEq)]
pub struct TextTexture {
    /// Unique per rasterization
    pub id: u64,
    pub lines: Vec<TextLine>,
    /// Edge length of the square canvas, in pixels
    pub canvas_px: f32,
    pub font_px: f32,
    pub background: Color,
    pub foreground: Color,
    pub opacity: f32,
}

impl TextTexture {
    /// Line anchor mapped to the panel's local [-0.5,0.5]² plane (y up)
    pub fn local_anchor(&self, line: &TextLine) -> Vec2 {
        Vec2::new(
            line.center.x / self.canvas_px - 0.5,
            0.5 - line.center.y / self.canvas_px,
        )
    }

    /// The card's text, lines joined back together
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Turns text into card textures
pub trait TextRasterizer {
    fn rasterize(&mut self, text: &str, style: &TextStyle) -> TextTexture;
}

/// Card layout on a fixed square canvas, measured with egui's proportional font
pub struct CardRasterizer {
    pub canvas_px: f32,
    pub font_px: f32,
    pub padding_px: f32,
    fonts: Fonts,
    next_id: u64,
}

impl Default for CardRasterizer {
    fn default() -> Self {
        Self::new(512.0, 44.0)
    }
}

impl CardRasterizer {
    pub fn new(canvas_px: f32, font_px: f32) -> Self {
        Self {
            canvas_px,
            font_px,
            padding_px: canvas_px * 0.08,
            fonts: Fonts::new(1.0, MAX_TEXTURE_SIDE, FontDefinitions::default()),
            next_id: 0,
        }
    }

    fn font_id(&self) -> FontId {
        FontId::proportional(self.font_px)
    }

    /// Width available to a line, in canvas pixels
    pub fn max_width(&self) -> f32 {
        (self.canvas_px - 2.0 * self.padding_px).max(1.0)
    }

    /// Lines that fit on the canvas
    pub fn max_lines(&self) -> usize {
        let row_height = self.fonts.row_height(&self.font_id());
        ((self.max_width() / row_height).floor() as usize).max(1)
    }

    /// Unwrapped width of `text` at the card font size
    pub fn measure(&self, text: &str) -> f32 {
        self.fonts
            .layout_no_wrap(text.to_owned(), self.font_id(), Color32::WHITE)
            .size()
            .x
    }
}

impl TextRasterizer for CardRasterizer {
    fn rasterize(&mut self, text: &str, style: &TextStyle) -> TextTexture {
        let mut job = LayoutJob::simple(
            text.to_owned(),
            self.font_id(),
            Color32::WHITE,
            self.max_width(),
        );
        job.halign = Align::Center;
        job.wrap.max_rows = self.max_lines();
        job.wrap.overflow_character = Some('…');
        let galley = self.fonts.layout_job(job);

        let top = (self.canvas_px - galley.rect.height()) / 2.0 - galley.rect.min.y;
        let lines = galley
            .rows
            .iter()
            .map(|row| TextLine {
                text: row
                    .glyphs
                    .iter()
                    .map(|g| g.chr)
                    .collect::<String>()
                    .trim_end()
                    .to_owned(),
                center: Vec2::new(self.canvas_px / 2.0, top + row.rect.center().y),
                width: row.rect.width(),
            })
            .collect();

        self.next_id += 1;
        TextTexture {
            id: self.next_id,
            lines,
            canvas_px: self.canvas_px,
            font_px: self.font_px,
            background: style.background,
            foreground: style.foreground,
            opacity: style.opacity.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            background: [1.0; 4],
            foreground: [0.0, 0.0, 0.0, 1.0],
            opacity: 0.9,
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let mut raster = CardRasterizer::default();
        let card = raster.rasterize("whoever reads", &style());
        assert_eq!(card.text(), "whoever reads");
    }

    #[test]
    fn explicit_newlines_break() {
        let mut raster = CardRasterizer::default();
        let card = raster.rasterize("a\nb c", &style());
        assert_eq!(card.text(), "a\nb c");
    }

    #[test]
    fn wide_glyphs_wrap_inside_the_card() {
        let mut raster = CardRasterizer::default();
        let limit = raster.max_width() + 0.5;
        for text in ["WWWWWWWWWWWWWWWWW", "MMMMMMMM MMMMMMMM", "the room you are in"] {
            let card = raster.rasterize(text, &style());
            assert!(card.lines.len() > 1 || raster.measure(text) <= limit, "{}", text);
            for line in &card.lines {
                assert!(line.width <= limit, "{:?} is {} wide", line.text, line.width);
                assert!(raster.measure(&line.text) <= limit, "{:?}", line.text);
            }
        }
    }

    #[test]
    fn long_words_keep_every_char() {
        let mut raster = CardRasterizer::default();
        let word = "é".repeat(40);
        let card = raster.rasterize(&word, &style());
        assert!(card.lines.len() > 1);
        let joined: String = card.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, word);
    }

    #[test]
    fn lines_are_centred() {
        let mut raster = CardRasterizer::default();
        let card = raster.rasterize("one\ntwo", &style());
        assert_eq!(card.lines.len(), 2);

        let mid = card.canvas_px / 2.0;
        for line in &card.lines {
            assert_eq!(line.center.x, mid);
        }
        let avg = (card.lines[0].center.y + card.lines[1].center.y) / 2.0;
        assert!((avg - mid).abs() < 1.0, "{}", avg);
        assert_eq!(card.local_anchor(&card.lines[0]).x, 0.0);
        assert!(card.local_anchor(&card.lines[0]).y > 0.0);
    }

    #[test]
    fn overflow_is_truncated() {
        let mut raster = CardRasterizer::new(128.0, 40.0);
        let text = "a b c d e f g h i j k l m n o p q r s t u v w x y z";
        let card = raster.rasterize(text, &style());
        assert_eq!(card.lines.len(), raster.max_lines());
        assert!(card.lines.last().map_or(false, |l| l.text.ends_with('…')));
    }

    #[test]
    fn ids_are_unique() {
        let mut raster = CardRasterizer::default();
        let a = raster.rasterize("x", &style());
        let b = raster.rasterize("x", &style());
        assert_ne!(a.id, b.id);
        assert_eq!(a.text(), "x");
    }
}
