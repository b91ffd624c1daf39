//! Layered character grid.
//!
//! Every cell keeps one optional glyph per [`Layer`]. Nothing is composited
//! at write time: [`Canvas::render`] shows, for each cell, the glyph of the
//! highest populated layer. A corner stamped on [`Layer::Annotations`]
//! therefore always covers a line on [`Layer::Lines`], whichever was drawn
//! first.

/// Z-order of canvas content, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Lines,
    Text,
    Annotations,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Background,
        Layer::Lines,
        Layer::Text,
        Layer::Annotations,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

const LAYER_COUNT: usize = Layer::ALL.len();

/// Box-drawing stroke class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stroke {
    #[default]
    Single,
    Double,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// T-pieces and the four-way cross. The variant names the side the
/// extra arm points to: `Down` is `┬`, `Right` is `├`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Junction {
    Down,
    Up,
    Right,
    Left,
    Cross,
}

struct Glyphs {
    horizontal: char,
    vertical: char,
    corners: [char; 4],
    junctions: [char; 5],
}

const SINGLE: Glyphs = Glyphs {
    horizontal: '─',
    vertical: '│',
    corners: ['┌', '┐', '└', '┘'],
    junctions: ['┬', '┴', '├', '┤', '┼'],
};

const DOUBLE: Glyphs = Glyphs {
    horizontal: '═',
    vertical: '║',
    corners: ['╔', '╗', '╚', '╝'],
    junctions: ['╦', '╩', '╠', '╣', '╬'],
};

const BOLD: Glyphs = Glyphs {
    horizontal: '━',
    vertical: '┃',
    corners: ['┏', '┓', '┗', '┛'],
    junctions: ['┳', '┻', '┣', '┫', '╋'],
};

impl Stroke {
    fn glyphs(self) -> &'static Glyphs {
        match self {
            Stroke::Single => &SINGLE,
            Stroke::Double => &DOUBLE,
            Stroke::Bold => &BOLD,
        }
    }

    pub fn horizontal(self) -> char {
        self.glyphs().horizontal
    }

    pub fn vertical(self) -> char {
        self.glyphs().vertical
    }

    pub fn corner(self, corner: Corner) -> char {
        self.glyphs().corners[corner as usize]
    }

    pub fn junction(self, junction: Junction) -> char {
        self.glyphs().junctions[junction as usize]
    }
}

/// A fixed-size grid of cells, each holding one optional glyph per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<[Option<char>; LAYER_COUNT]>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![[None; LAYER_COUNT]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn slot(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Place a glyph. Out-of-bounds writes are dropped and return `false`.
    /// A glyph already on the same layer is replaced.
    pub fn put(&mut self, x: usize, y: usize, glyph: char, layer: Layer) -> bool {
        match self.slot(x, y) {
            Some(i) => {
                self.cells[i][layer.index()] = Some(glyph);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, x: usize, y: usize, layer: Layer) {
        if let Some(i) = self.slot(x, y) {
            self.cells[i][layer.index()] = None;
        }
    }

    /// The glyph stored on one layer.
    pub fn glyph(&self, x: usize, y: usize, layer: Layer) -> Option<char> {
        self.slot(x, y).and_then(|i| self.cells[i][layer.index()])
    }

    /// The glyph [`render`](Self::render) shows at a cell.
    pub fn visible(&self, x: usize, y: usize) -> char {
        self.slot(x, y)
            .and_then(|i| self.cells[i].iter().rev().find_map(|g| *g))
            .unwrap_or(' ')
    }

    /// Write `text` left to right, one glyph per cell. Returns the number
    /// of cells the text spans.
    pub fn write_text(&mut self, x: usize, y: usize, text: &str, layer: Layer) -> usize {
        let mut count = 0;
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i, y, ch, layer);
            count += 1;
        }
        count
    }

    /// Horizontal run between two columns, inclusive, in either order.
    pub fn hline(&mut self, x1: usize, x2: usize, y: usize, stroke: Stroke, layer: Layer) {
        let glyph = stroke.horizontal();
        for x in x1.min(x2)..=x1.max(x2) {
            self.put(x, y, glyph, layer);
        }
    }

    /// Vertical run between two rows, inclusive, in either order.
    pub fn vline(&mut self, x: usize, y1: usize, y2: usize, stroke: Stroke, layer: Layer) {
        let glyph = stroke.vertical();
        for y in y1.min(y2)..=y1.max(y2) {
            self.put(x, y, glyph, layer);
        }
    }

    pub fn corner(&mut self, x: usize, y: usize, corner: Corner, stroke: Stroke, layer: Layer) {
        self.put(x, y, stroke.corner(corner), layer);
    }

    pub fn junction(
        &mut self,
        x: usize,
        y: usize,
        junction: Junction,
        stroke: Stroke,
        layer: Layer,
    ) {
        self.put(x, y, stroke.junction(junction), layer);
    }

    /// Outline a rectangle on [`Layer::Lines`]. A title is centred in the
    /// top edge on [`Layer::Text`] with one space of padding on each side.
    pub fn draw_box(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        stroke: Stroke,
        title: Option<&str>,
    ) {
        if width < 2 || height < 2 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;

        self.hline(x + 1, right - 1, y, stroke, Layer::Lines);
        self.hline(x + 1, right - 1, bottom, stroke, Layer::Lines);
        if height > 2 {
            self.vline(x, y + 1, bottom - 1, stroke, Layer::Lines);
            self.vline(right, y + 1, bottom - 1, stroke, Layer::Lines);
        }
        self.corner(x, y, Corner::TopLeft, stroke, Layer::Lines);
        self.corner(right, y, Corner::TopRight, stroke, Layer::Lines);
        self.corner(x, bottom, Corner::BottomLeft, stroke, Layer::Lines);
        self.corner(right, bottom, Corner::BottomRight, stroke, Layer::Lines);

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            let padded = format!(" {title} ");
            let len = padded.chars().count();
            let start = x + width.saturating_sub(len) / 2;
            self.write_text(start, y, &padded, Layer::Text);
        }
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of populated cells.
    pub fn bounds(&self) -> Option<(usize, usize, usize, usize)> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.iter().all(Option::is_none) {
                continue;
            }
            let (x, y) = (i % self.width, i / self.width);
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }

    /// Resolve every cell to its topmost glyph. Rows are joined with `\n`
    /// and keep their full width.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width * 3 + 1) * self.height);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.width {
                out.push(self.visible(x, y));
            }
        }
        out
    }
}
