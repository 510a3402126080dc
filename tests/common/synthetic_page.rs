use page_columns::image::GrayImageU8;

pub const PAPER: u8 = 235;
pub const INK: u8 = 25;

/// Printed five-column table: optional header rule, four vertical rules,
/// and rows of word blocks inside each column.
#[derive(Clone, Debug)]
pub struct TableLayout {
    pub width: usize,
    pub height: usize,
    /// Left edge of the first column (words start `column_margin` further in).
    pub text_left: usize,
    /// y of a 4 px header rule spanning 4%..96% of the width.
    pub rule_y: Option<usize>,
    /// Header words drawn above the rule (or at the top of a headerless page).
    pub header_words: Option<(usize, usize)>,
    /// x of each 2 px separator rule.
    pub separators: [usize; 4],
    /// Vertical extent `[y0, y1)` of the separator rules.
    pub separator_span: (usize, usize),
    pub first_row: usize,
    pub pitch: usize,
    pub rows: usize,
    pub line_height: usize,
    /// Gap between a column's left edge and its words.
    pub column_margin: usize,
    /// Word width in the first column (constant, it drives row detection).
    pub first_word: usize,
    /// Widest word in the other columns.
    pub max_word: usize,
}

impl TableLayout {
    /// 1000×1400 page with a header rule at y=120.
    pub fn standard() -> Self {
        Self {
            width: 1000,
            height: 1400,
            text_left: 0,
            rule_y: Some(120),
            header_words: Some((60, 80)),
            separators: [200, 400, 600, 800],
            separator_span: (130, 1250),
            first_row: 160,
            pitch: 30,
            rows: 36,
            line_height: 12,
            column_margin: 20,
            first_word: 120,
            max_word: 150,
        }
    }

    /// 600×800 page for batch tests.
    pub fn small() -> Self {
        Self {
            width: 600,
            height: 800,
            text_left: 0,
            rule_y: Some(60),
            header_words: Some((30, 44)),
            separators: [120, 240, 360, 480],
            separator_span: (66, 720),
            first_row: 90,
            pitch: 24,
            rows: 25,
            line_height: 10,
            column_margin: 12,
            first_word: 80,
            max_word: 90,
        }
    }

    pub fn last_row_bottom(&self) -> usize {
        self.first_row + (self.rows - 1) * self.pitch + self.line_height
    }

    pub fn render(&self) -> GrayImageU8 {
        let mut img = GrayImageU8::filled(self.width, self.height, PAPER);
        if let Some((y0, y1)) = self.header_words {
            for x0 in (self.width / 10..self.width * 9 / 10).step_by(40) {
                fill_rect(&mut img, x0, y0, x0 + 16, y1);
            }
        }
        if let Some(y) = self.rule_y {
            fill_rect(&mut img, self.width / 25, y, self.width * 24 / 25, y + 4);
        }
        let (sy0, sy1) = self.separator_span;
        for &x in &self.separators {
            fill_rect(&mut img, x, sy0, x + 2, sy1);
        }
        let edges = [
            self.text_left,
            self.separators[0],
            self.separators[1],
            self.separators[2],
            self.separators[3],
            self.width,
        ];
        let min_word = self.max_word / 2;
        for row in 0..self.rows {
            let y = self.first_row + row * self.pitch;
            for col in 0..5 {
                let len = if col == 0 {
                    self.first_word
                } else {
                    min_word + (row * 7 + col * 13) % (self.max_word - min_word + 1)
                };
                let x0 = edges[col] + self.column_margin;
                fill_rect(&mut img, x0, y, x0 + len, y + self.line_height);
            }
        }
        img
    }
}

/// Paints `[x0, x1) × [y0, y1)` with ink, clipped to the image.
pub fn fill_rect(img: &mut GrayImageU8, x0: usize, y0: usize, x1: usize, y1: usize) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.set(x, y, INK);
        }
    }
}

/// Page of full-width text lines spanning `[x0, x1)`, with no rules.
pub fn text_block_page(width: usize, height: usize, x0: usize, x1: usize) -> GrayImageU8 {
    let mut img = GrayImageU8::filled(width, height, PAPER);
    for y in (160..height.saturating_sub(150)).step_by(30) {
        fill_rect(&mut img, x0, y, x1, y + 12);
    }
    img
}

/// Binary mask with full-height vertical lines of `thickness` px at `xs`.
pub fn vertical_line_mask(width: usize, height: usize, xs: &[usize], thickness: usize) -> GrayImageU8 {
    let mut img = GrayImageU8::filled(width, height, 0);
    for &x0 in xs {
        for y in 0..height {
            for x in x0..(x0 + thickness).min(width) {
                img.set(x, y, 255);
            }
        }
    }
    img
}

/// Paper texture that never crosses the binarization threshold.
pub fn light_noise_page(width: usize, height: usize, seed: u64) -> GrayImageU8 {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut img = GrayImageU8::filled(width, height, PAPER);
    for y in 0..height {
        for x in 0..width {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            img.set(x, y, 225 + ((state >> 33) % 31) as u8);
        }
    }
    img
}
