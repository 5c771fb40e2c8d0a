//! A 5x7 bitmap font baked into an RGBA atlas at startup.
//!
//! The atlas covers ASCII from space to underscore. Lowercase letters are drawn with the
//! uppercase glyphs and every other character falls back to `?`.

use std::sync::Arc;

use glam::{Vec2, Vec4};

use crate::{
    abs::{Texture, TextureHandle},
    render::ui::uirenderer::{DrawCommand, UIRenderMode},
};

const FIRST_CHAR: u8 = b' ';
const LAST_CHAR: u8 = b'_';
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Atlas cell size, one pixel of spacing right of and below each glyph.
const CELL: (u32, u32) = (GLYPH_WIDTH + 1, GLYPH_HEIGHT + 1);
const COLUMNS: u32 = 16;
const ROWS: u32 = 4;

/// One row per entry, most significant of the low five bits is the leftmost pixel.
#[rustfmt::skip]
const GLYPHS: [[u8; 7]; 64] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04], // !
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // "
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // #
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // $
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // %
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // &
    [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // (
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // )
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // *
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ,
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // .
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // /
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // :
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ;
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // <
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // =
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // >
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // ?
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // @
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // [
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // \
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ]
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // _
];

/// Index of the glyph drawn for `c`.
pub fn glyph_index(c: char) -> u32 {
    let c = c.to_ascii_uppercase();
    if (FIRST_CHAR as char..=LAST_CHAR as char).contains(&c) {
        c as u32 - FIRST_CHAR as u32
    } else {
        b'?' as u32 - FIRST_CHAR as u32
    }
}

/// Texture coordinates of the glyph drawn for `c`, top left first.
pub fn glyph_uvs(c: char) -> [Vec2; 2] {
    let index = glyph_index(c);
    let (width, height) = atlas_size();
    let col = index % COLUMNS;
    let row = index / COLUMNS;
    let min = Vec2::new(
        (col * CELL.0) as f32 / width as f32,
        (row * CELL.1) as f32 / height as f32,
    );
    let size = Vec2::new(
        GLYPH_WIDTH as f32 / width as f32,
        GLYPH_HEIGHT as f32 / height as f32,
    );
    [min, min + size]
}

pub fn atlas_size() -> (u32, u32) {
    (COLUMNS * CELL.0, ROWS * CELL.1)
}

/// Rasterizes every glyph into white RGBA8 pixels on a transparent background.
pub fn bake_atlas() -> Vec<u8> {
    let (width, height) = atlas_size();
    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for (index, glyph) in GLYPHS.iter().enumerate() {
        let origin_x = (index as u32 % COLUMNS) * CELL.0;
        let origin_y = (index as u32 / COLUMNS) * CELL.1;
        for (y, bits) in glyph.iter().enumerate() {
            for x in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - x)) == 0 {
                    continue;
                }
                let offset = (((origin_y + y as u32) * width + origin_x + x) * 4) as usize;
                pixels[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
    }
    pixels
}

/// Size of one character cell at `font_size` pixels of height.
pub fn char_size(font_size: f32) -> Vec2 {
    Vec2::new(font_size * CELL.0 as f32 / CELL.1 as f32, font_size)
}

pub fn measure_text(text: &str, font_size: f32) -> Vec2 {
    let size = char_size(font_size);
    let lines = text.split('\n');
    let (count, widest) = lines.fold((0usize, 0usize), |(count, widest), line| {
        (count + 1, widest.max(line.chars().count()))
    });
    Vec2::new(widest as f32 * size.x, count as f32 * size.y)
}

/// Glyph quads of `text` relative to its top left corner, as `(rect, uv_rect)` pairs.
///
/// Spaces produce no quad but still advance the cursor.
pub fn layout_text(text: &str, font_size: f32) -> Vec<([Vec2; 2], [Vec2; 2])> {
    let size = char_size(font_size);
    // Glyphs cover 5x7 of the 6x8 cell.
    let glyph = size * Vec2::new(
        GLYPH_WIDTH as f32 / CELL.0 as f32,
        GLYPH_HEIGHT as f32 / CELL.1 as f32,
    );
    let mut quads = Vec::new();
    for (row, line) in text.split('\n').enumerate() {
        for (col, c) in line.chars().enumerate() {
            if c == ' ' {
                continue;
            }
            let min = Vec2::new(col as f32 * size.x, row as f32 * size.y);
            quads.push(([min, min + glyph], glyph_uvs(c)));
        }
    }
    quads
}

/// The built-in font uploaded to the GPU.
pub struct Font {
    atlas: Texture,
}

impl Font {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self, String> {
        let (width, height) = atlas_size();
        let atlas = Texture::new_from_data(gl, width, height, &bake_atlas())?;
        Ok(Self { atlas })
    }

    pub fn handle(&self) -> TextureHandle {
        self.atlas.handle()
    }

    /// Draw commands for `text` with its top left corner at `position`.
    pub fn text(&self, text: &str, position: Vec2, font_size: f32, color: Vec4) -> Vec<DrawCommand> {
        let mode = UIRenderMode::Texture(self.handle(), color);
        layout_text(text, font_size)
            .into_iter()
            .map(|([min, max], uv_rect)| DrawCommand {
                rect: [min + position, max + position],
                uv_rect,
                mode,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_table_covers_range() {
        assert_eq!(GLYPHS.len(), (LAST_CHAR - FIRST_CHAR + 1) as usize);
        assert!(GLYPHS.len() <= (COLUMNS * ROWS) as usize);
    }

    #[test]
    fn test_glyph_index_folds_case_and_falls_back() {
        assert_eq!(glyph_index(' '), 0);
        assert_eq!(glyph_index('a'), glyph_index('A'));
        assert_eq!(glyph_index('~'), glyph_index('?'));
        assert_eq!(glyph_index('é'), glyph_index('?'));
    }

    #[test]
    fn test_glyph_uvs_stay_in_atlas() {
        for c in FIRST_CHAR..=LAST_CHAR {
            let [min, max] = glyph_uvs(c as char);
            assert!(min.cmpge(Vec2::ZERO).all());
            assert!(max.cmple(Vec2::ONE).all());
            assert!(max.cmpgt(min).all());
        }
    }

    #[test]
    fn test_baked_atlas_pixels() {
        let (width, height) = atlas_size();
        let pixels = bake_atlas();
        assert_eq!(pixels.len(), (width * height * 4) as usize);

        // Top row of 'T' is solid, the space cell is empty.
        let t = glyph_index('T');
        let x0 = (t % COLUMNS) * CELL.0;
        let y0 = (t / COLUMNS) * CELL.1;
        for x in x0..x0 + GLYPH_WIDTH {
            assert_eq!(pixels[((y0 * width + x) * 4 + 3) as usize], 255);
        }
        assert!(pixels[..(CELL.0 * 4) as usize].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_measure_text() {
        let size = char_size(16.0);
        assert_eq!(size, Vec2::new(12.0, 16.0));
        assert_eq!(measure_text("ABC", 16.0), Vec2::new(36.0, 16.0));
        assert_eq!(measure_text("AB\nCDEF", 16.0), Vec2::new(48.0, 32.0));
        assert_eq!(measure_text("", 16.0), Vec2::new(0.0, 16.0));
    }

    #[test]
    fn test_layout_skips_spaces_but_advances() {
        let quads = layout_text("A B", 8.0);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].0[0], Vec2::ZERO);
        assert_eq!(quads[1].0[0], Vec2::new(12.0, 0.0));
        assert_eq!(quads[0].0[1], Vec2::new(5.0, 7.0));
    }
}
