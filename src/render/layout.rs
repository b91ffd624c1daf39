//! Spatial layout of a design.
//!
//! Placement works on *rows*: factors joined by crossing, partial crossing
//! or confounding share one row and are drawn side by side with their
//! connector between them. Rows form a tree through nesting (`↓`) and
//! classification (`:`) links and are placed depth-first from the roots:
//!
//! ```text
//! ┌──────────────────── Design Structure ────────────────────┐
//! │                                                          │
//! │ Lane(4) ════════════════════╗                            │
//! │                             ║                            │
//! │ Hospital(4)                 ║                            │
//! │  ↓                          ║                            │
//! │ Patient(15) ──×── Drug(2) ══╝                            │
//! │  ↓                                                       │
//! │ Cell(5k)                                                 │
//! │  :                                                       │
//! │ CellType(35)                                             │
//! │                                                          │
//! │ Batch: Lane ══ Patient                                   │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Batch factors sit above the structure, one per row. Each batch factor
//! that affects something gets its own flow column right of the
//! structure; the first declared batch takes the outermost column.
//! Every factor is placed exactly once, so a flow line reaches each
//! affected factor at a single position.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

use super::canvas::{Canvas, Corner, Junction, Layer, Stroke};
use crate::model::{Design, DisjointSet, FactorId, RelationKind, Relationship};

/// Returned instead of a diagram when the design has no factors.
pub const EMPTY_DIAGRAM: &str = "Empty design";

/// First content column and row inside the frame.
const MARGIN: usize = 2;

/// Placement recursion bound; deeper rows restart at the left margin.
const MAX_PLACEMENT_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Minimum diagram width in columns, frame included.
    pub min_width: usize,
    /// Text centred in the top edge of the frame.
    pub title: String,
    /// Diagrams with more factors still render but may be dense.
    pub readable_factor_limit: usize,
    /// Blank columns between sibling branches.
    pub branch_gap: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_width: 60,
            title: "Design Structure".to_string(),
            readable_factor_limit: 40,
            branch_gap: 4,
        }
    }
}

/// Top-left cell of a factor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub x: usize,
    pub y: usize,
}

/// A batch factor's route to the factors it affects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLine {
    pub batch: FactorId,
    pub column: usize,
    pub targets: Vec<FactorId>,
}

// ============================================================================
// ROWS
// ============================================================================

/// Factors drawn side by side on one line.
#[derive(Debug)]
struct Row {
    members: Vec<FactorId>,
    /// `connectors[i]` joins `members[i]` and `members[i + 1]`.
    connectors: Vec<RelationKind>,
    /// Classifier rows hang below their subject and only continue
    /// with further classification.
    classifier: bool,
}

#[derive(Debug, Clone, Copy)]
struct ChildEdge {
    child: usize,
    member: usize,
    kind: RelationKind,
}

#[derive(Debug, Clone)]
struct PlacedRow {
    y: usize,
    member_x: Vec<usize>,
    /// Exclusive end column of the row text.
    right: usize,
    /// Children sit three rows down with a branch bar in between.
    bar: bool,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    parent: usize,
    member: usize,
    child: usize,
    kind: RelationKind,
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    right: usize,
    bottom: usize,
}

fn connector_width(kind: RelationKind) -> usize {
    match kind {
        RelationKind::Confounded => 6,
        _ => 7,
    }
}

fn link_glyph(kind: RelationKind) -> char {
    match kind {
        RelationKind::Classifies => ':',
        RelationKind::Crosses => '×',
        RelationKind::PartialCrosses => '◊',
        RelationKind::Confounded => '≈',
        RelationKind::Nests | RelationKind::BatchEffect => '↓',
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

// ============================================================================
// PLANNER
// ============================================================================

struct Planner<'a> {
    design: &'a Design,
    options: &'a LayoutOptions,
    labels: FxHashMap<FactorId, String>,
    outgoing: FxHashMap<FactorId, Vec<&'a Relationship>>,
    batches: Vec<FactorId>,
    rows: Vec<Row>,
    children: Vec<Vec<ChildEdge>>,
    placed: Vec<Option<PlacedRow>>,
    links: Vec<Link>,
    deferred: Vec<usize>,
}

impl<'a> Planner<'a> {
    fn new(design: &'a Design, options: &'a LayoutOptions) -> Self {
        let labels = design.factors().map(|(id, f)| (id, f.label())).collect();

        let mut outgoing: FxHashMap<FactorId, Vec<&Relationship>> = FxHashMap::default();
        for rel in design.live_relationships() {
            outgoing.entry(rel.from).or_default().push(rel);
        }

        let batch_sources: FxHashSet<FactorId> = design
            .live_relationships()
            .filter(|rel| rel.kind == RelationKind::BatchEffect)
            .map(|rel| rel.from)
            .collect();
        let batches = design
            .factors()
            .filter(|(id, f)| f.is_batch() || batch_sources.contains(id))
            .map(|(id, _)| id)
            .collect();

        let mut planner = Self {
            design,
            options,
            labels,
            outgoing,
            batches,
            rows: Vec::new(),
            children: Vec::new(),
            placed: Vec::new(),
            links: Vec::new(),
            deferred: Vec::new(),
        };
        planner.build_rows();
        planner
    }

    fn label_width(&self, id: FactorId) -> usize {
        self.labels.get(&id).map_or(0, |l| text_width(l))
    }

    fn build_rows(&mut self) {
        let design = self.design;
        let batch: FxHashSet<FactorId> = self.batches.iter().copied().collect();
        let main: Vec<FactorId> = design
            .factors()
            .map(|(id, _)| id)
            .filter(|id| !batch.contains(id))
            .collect();
        let in_main: FxHashSet<FactorId> = main.iter().copied().collect();

        let classifiers: FxHashSet<FactorId> = design
            .live_relationships()
            .filter(|rel| {
                rel.kind == RelationKind::Classifies
                    && in_main.contains(&rel.from)
                    && in_main.contains(&rel.to)
            })
            .map(|rel| rel.to)
            .collect();
        let joinable = |id: &FactorId| in_main.contains(id) && !classifiers.contains(id);

        let mut sets = DisjointSet::new(design.arena_len());
        for rel in design.live_relationships() {
            if rel.kind.is_same_level() && joinable(&rel.from) && joinable(&rel.to) {
                sets.union(rel.from.index(), rel.to.index());
            }
        }
        for group in &design.metadata().confound_groups {
            let members: Vec<&FactorId> = group.iter().filter(|id| joinable(id)).collect();
            for pair in members.windows(2) {
                sets.union(pair[0].index(), pair[1].index());
            }
        }

        let mut row_of_root: FxHashMap<usize, usize> = FxHashMap::default();
        let mut row_of: FxHashMap<FactorId, usize> = FxHashMap::default();
        for &id in &main {
            let row = if classifiers.contains(&id) {
                self.rows.push(Row {
                    members: Vec::new(),
                    connectors: Vec::new(),
                    classifier: true,
                });
                self.rows.len() - 1
            } else {
                let root = sets.find(id.index());
                *row_of_root.entry(root).or_insert_with(|| {
                    self.rows.push(Row {
                        members: Vec::new(),
                        connectors: Vec::new(),
                        classifier: false,
                    });
                    self.rows.len() - 1
                })
            };
            self.rows[row].members.push(id);
            row_of.insert(id, row);
        }

        for row in &mut self.rows {
            for i in 1..row.members.len() {
                let (earlier, current) = (&row.members[..i], row.members[i]);
                let kind = design
                    .live_relationships()
                    .find(|rel| {
                        rel.kind.is_same_level()
                            && ((rel.from == current && earlier.contains(&rel.to))
                                || (rel.to == current && earlier.contains(&rel.from)))
                    })
                    .map_or(RelationKind::Confounded, |rel| rel.kind);
                row.connectors.push(kind);
            }
        }

        self.children = vec![Vec::new(); self.rows.len()];
        self.placed = vec![None; self.rows.len()];
        for (r, row) in self.rows.iter().enumerate() {
            let mut seen = FxHashSet::default();
            for (member, id) in row.members.iter().enumerate() {
                for rel in self.outgoing.get(id).into_iter().flatten() {
                    let Some(&child) = row_of.get(&rel.to) else {
                        continue;
                    };
                    let wanted = match rel.kind {
                        RelationKind::Classifies => self.rows[child].classifier,
                        RelationKind::Nests => !row.classifier && !self.rows[child].classifier,
                        _ => false,
                    };
                    if wanted && child != r && seen.insert(child) {
                        self.children[r].push(ChildEdge {
                            child,
                            member,
                            kind: rel.kind,
                        });
                    }
                }
            }
        }
    }

    fn first_row(&self) -> usize {
        if self.batches.is_empty() {
            MARGIN
        } else {
            MARGIN + self.batches.len() + 1
        }
    }

    /// Place every row; returns the first free line below the structure.
    fn place_all(&mut self) -> usize {
        let mut has_parent = vec![false; self.rows.len()];
        for edges in &self.children {
            for edge in edges {
                has_parent[edge.child] = true;
            }
        }
        let roots = (0..self.rows.len()).filter(|&r| !has_parent[r] && !self.rows[r].classifier);
        let mut queue: VecDeque<usize> = roots.chain(0..self.rows.len()).collect();

        let mut y = self.first_row();
        while let Some(row) = self.deferred.pop().or_else(|| queue.pop_front()) {
            if self.placed[row].is_some() {
                continue;
            }
            let extent = self.place(row, MARGIN, y, 0);
            y = extent.bottom + 1;
        }
        y
    }

    fn place(&mut self, r: usize, x: usize, y: usize, depth: usize) -> Extent {
        let mut member_x = Vec::with_capacity(self.rows[r].members.len());
        let mut cursor = x;
        for (i, &id) in self.rows[r].members.iter().enumerate() {
            if i > 0 {
                cursor += connector_width(self.rows[r].connectors[i - 1]);
            }
            member_x.push(cursor);
            cursor += self.label_width(id);
        }
        let mut extent = Extent {
            right: cursor,
            bottom: y + 1,
        };

        let kids: Vec<ChildEdge> = self.children[r]
            .iter()
            .filter(|edge| self.placed[edge.child].is_none())
            .copied()
            .collect();
        let bar = kids.len() > 1;
        self.placed[r] = Some(PlacedRow {
            y,
            member_x: member_x.clone(),
            right: cursor,
            bar,
        });
        if kids.is_empty() {
            return extent;
        }
        if depth >= MAX_PLACEMENT_DEPTH {
            self.deferred.extend(kids.iter().rev().map(|edge| edge.child));
            return extent;
        }

        let child_y = y + if bar { 3 } else { 2 };
        let mut previous_right: Option<usize> = None;
        for edge in kids {
            if self.placed[edge.child].is_some() {
                continue;
            }
            let base = member_x[edge.member];
            let cx = match previous_right {
                Some(right) => base.max(right + self.options.branch_gap),
                None => base,
            };
            let sub = self.place(edge.child, cx, child_y, depth + 1);
            self.links.push(Link {
                parent: r,
                member: edge.member,
                child: edge.child,
                kind: edge.kind,
            });
            previous_right = Some(sub.right);
            extent.right = extent.right.max(sub.right);
            extent.bottom = extent.bottom.max(sub.bottom);
        }
        extent
    }

    fn finish(mut self) -> Layout {
        let structure_end = self.place_all();
        let design = self.design;

        let mut anchors: FxHashMap<FactorId, Anchor> = FxHashMap::default();
        let mut row_ends: FxHashMap<FactorId, usize> = FxHashMap::default();
        let mut structure_right = MARGIN;
        for (i, &id) in self.batches.iter().enumerate() {
            let end = MARGIN + self.label_width(id);
            anchors.insert(id, Anchor { x: MARGIN, y: MARGIN + i });
            row_ends.insert(id, end);
            structure_right = structure_right.max(end);
        }
        for (row, placed) in self.rows.iter().zip(&self.placed) {
            let Some(placed) = placed else { continue };
            for (&id, &x) in row.members.iter().zip(&placed.member_x) {
                anchors.insert(id, Anchor { x, y: placed.y });
                row_ends.insert(id, placed.right);
            }
            structure_right = structure_right.max(placed.right);
        }

        let mut flows = Vec::new();
        for &batch in &self.batches {
            let mut targets: Vec<FactorId> = Vec::new();
            for rel in self.outgoing.get(&batch).into_iter().flatten() {
                if rel.kind == RelationKind::BatchEffect
                    && anchors.contains_key(&rel.to)
                    && !targets.contains(&rel.to)
                {
                    targets.push(rel.to);
                }
            }
            if !targets.is_empty() {
                flows.push(FlowLine {
                    batch,
                    column: 0,
                    targets,
                });
            }
        }
        let first_column = structure_right + 3;
        let count = flows.len();
        for (k, flow) in flows.iter_mut().enumerate() {
            flow.column = first_column + 2 * (count - 1 - k);
        }

        let mut annotations = Vec::new();
        for group in design.confound_group_names() {
            annotations.push(format!("Confounded: {}", group.join(" ≈≈ ")));
        }
        if !annotations.is_empty() && !flows.is_empty() {
            annotations.push(String::new());
        }
        for flow in &flows {
            let targets: Vec<&str> = flow.targets.iter().map(|id| design.name_of(*id)).collect();
            annotations.push(format!(
                "Batch: {} ══ {}",
                design.name_of(flow.batch),
                targets.join(", ")
            ));
        }

        let annotation_y = structure_end;
        let content_bottom = if annotations.is_empty() {
            structure_end.saturating_sub(1)
        } else {
            annotation_y + annotations.len()
        };
        let content_right = annotations
            .iter()
            .map(|line| MARGIN + text_width(line))
            .chain(flows.first().map(|flow| flow.column + 1))
            .fold(structure_right, usize::max);

        let width = self
            .options
            .min_width
            .max(content_right + 2)
            .max(text_width(&self.options.title) + 6);
        let height = content_bottom + 2;

        debug!(
            factors = design.factor_count(),
            rows = self.rows.len(),
            flows = flows.len(),
            width,
            height,
            "computed layout"
        );

        Layout {
            title: self.options.title.clone(),
            width,
            height,
            labels: self.labels,
            anchors,
            row_ends,
            batches: self.batches,
            rows: self.rows,
            placed: self.placed,
            links: self.links,
            flows,
            annotations,
            annotation_y,
        }
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Positions for every factor of a design, ready to draw.
#[derive(Debug)]
pub struct Layout {
    title: String,
    width: usize,
    height: usize,
    labels: FxHashMap<FactorId, String>,
    anchors: FxHashMap<FactorId, Anchor>,
    row_ends: FxHashMap<FactorId, usize>,
    batches: Vec<FactorId>,
    rows: Vec<Row>,
    placed: Vec<Option<PlacedRow>>,
    links: Vec<Link>,
    flows: Vec<FlowLine>,
    annotations: Vec<String>,
    annotation_y: usize,
}

impl Layout {
    pub fn compute(design: &Design, options: &LayoutOptions) -> Self {
        Planner::new(design, options).finish()
    }

    /// `(width, height)` of the diagram, frame included.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn anchor(&self, id: FactorId) -> Option<Anchor> {
        self.anchors.get(&id).copied()
    }

    pub fn flow_lines(&self) -> &[FlowLine] {
        &self.flows
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    fn label(&self, id: FactorId) -> &str {
        self.labels.get(&id).map_or("", String::as_str)
    }

    pub fn draw(&self) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        canvas.draw_box(
            0,
            0,
            self.width,
            self.height,
            Stroke::Single,
            Some(&self.title),
        );

        for &id in &self.batches {
            if let Some(anchor) = self.anchor(id) {
                canvas.write_text(anchor.x, anchor.y, self.label(id), Layer::Text);
            }
        }
        for (row, placed) in self.rows.iter().zip(&self.placed) {
            if let Some(placed) = placed {
                self.draw_row(&mut canvas, row, placed);
            }
        }
        self.draw_links(&mut canvas);
        self.draw_flows(&mut canvas);
        for (i, line) in self.annotations.iter().enumerate() {
            canvas.write_text(MARGIN, self.annotation_y + i, line, Layer::Text);
        }
        canvas
    }

    pub fn render(&self) -> String {
        self.draw().render()
    }

    fn draw_row(&self, canvas: &mut Canvas, row: &Row, placed: &PlacedRow) {
        let y = placed.y;
        for (i, (&id, &x)) in row.members.iter().zip(&placed.member_x).enumerate() {
            let end = x + canvas.write_text(x, y, self.label(id), Layer::Text);
            let Some(&kind) = row.connectors.get(i) else {
                continue;
            };
            match kind {
                RelationKind::Confounded => {
                    canvas.write_text(end + 1, y, "≈≈≈≈", Layer::Text);
                }
                _ => {
                    canvas.hline(end + 1, end + 5, y, Stroke::Single, Layer::Lines);
                    canvas.put(end + 3, y, link_glyph(kind), Layer::Text);
                }
            }
        }
    }

    fn draw_links(&self, canvas: &mut Canvas) {
        let mut by_parent: BTreeMap<(usize, usize), Vec<&Link>> = BTreeMap::new();
        for link in &self.links {
            by_parent.entry((link.parent, link.member)).or_default().push(link);
        }
        let placed_of = |row: usize| self.placed.get(row).and_then(Option::as_ref);

        for ((parent, member), links) in by_parent {
            let Some(parent) = placed_of(parent) else {
                continue;
            };
            let source = parent.member_x[member] + 1;
            let bar_y = parent.y + 1;
            let columns: Vec<(usize, usize, RelationKind)> = links
                .iter()
                .filter_map(|link| {
                    let child = placed_of(link.child)?;
                    Some((child.member_x[0] + 1, child.y, link.kind))
                })
                .collect();

            if parent.bar {
                let last = columns.iter().map(|c| c.0).max().unwrap_or(source);
                if last > source {
                    canvas.hline(source, last, bar_y, Stroke::Single, Layer::Lines);
                }
                let straight_down = columns.iter().any(|c| c.0 == source);
                match (straight_down, last > source) {
                    (true, true) => {
                        canvas.junction(source, bar_y, Junction::Right, Stroke::Single, Layer::Lines)
                    }
                    (true, false) => {
                        canvas.put(source, bar_y, Stroke::Single.vertical(), Layer::Lines);
                    }
                    (false, _) => canvas.corner(
                        source,
                        bar_y,
                        Corner::BottomLeft,
                        Stroke::Single,
                        Layer::Lines,
                    ),
                }
                for &(column, _, _) in columns.iter().filter(|c| c.0 != source) {
                    if column == last {
                        canvas.corner(column, bar_y, Corner::TopRight, Stroke::Single, Layer::Lines);
                    } else {
                        canvas.junction(column, bar_y, Junction::Down, Stroke::Single, Layer::Lines);
                    }
                }
            }
            for (column, child_y, kind) in columns {
                canvas.put(column, child_y - 1, link_glyph(kind), Layer::Text);
            }
        }
    }

    fn draw_flows(&self, canvas: &mut Canvas) {
        struct Segment {
            flow: usize,
            y: usize,
            from: usize,
            to: usize,
        }
        struct Span {
            flow: usize,
            x: usize,
            top: usize,
            bottom: usize,
        }

        let mut segments = Vec::new();
        let mut spans = Vec::new();
        for (index, flow) in self.flows.iter().enumerate() {
            let mut points: BTreeMap<usize, usize> = BTreeMap::new();
            for &id in std::iter::once(&flow.batch).chain(&flow.targets) {
                let (Some(anchor), Some(&end)) = (self.anchor(id), self.row_ends.get(&id)) else {
                    continue;
                };
                let slot = points.entry(anchor.y).or_insert(end);
                *slot = (*slot).max(end);
            }
            let (Some((&top, _)), Some((&bottom, _))) =
                (points.first_key_value(), points.last_key_value())
            else {
                continue;
            };

            let x = flow.column;
            if bottom > top + 1 {
                canvas.vline(x, top + 1, bottom - 1, Stroke::Double, Layer::Lines);
            }
            spans.push(Span {
                flow: index,
                x,
                top,
                bottom,
            });
            for (&y, &end) in &points {
                if end + 1 < x {
                    canvas.hline(end + 1, x - 1, y, Stroke::Double, Layer::Lines);
                    segments.push(Segment {
                        flow: index,
                        y,
                        from: end + 1,
                        to: x - 1,
                    });
                }
                if y == top {
                    canvas.corner(x, y, Corner::TopRight, Stroke::Double, Layer::Annotations);
                } else if y == bottom {
                    canvas.corner(x, y, Corner::BottomRight, Stroke::Double, Layer::Annotations);
                } else {
                    canvas.junction(x, y, Junction::Left, Stroke::Double, Layer::Annotations);
                }
            }
            trace!(
                batch = flow.batch.index(),
                column = x,
                targets = flow.targets.len(),
                "routed flow line"
            );
        }

        for segment in &segments {
            for span in &spans {
                if span.flow != segment.flow
                    && (segment.from..=segment.to).contains(&span.x)
                    && span.top < segment.y
                    && segment.y < span.bottom
                {
                    canvas.junction(
                        span.x,
                        segment.y,
                        Junction::Cross,
                        Stroke::Double,
                        Layer::Annotations,
                    );
                }
            }
        }
    }
}

/// Render a design as a framed character diagram.
pub fn render_diagram(design: &Design, options: &LayoutOptions) -> String {
    if design.is_empty() {
        return EMPTY_DIAGRAM.to_string();
    }
    if design.factor_count() > options.readable_factor_limit {
        warn!(
            factors = design.factor_count(),
            limit = options.readable_factor_limit,
            "design exceeds the readable factor limit; diagram may be dense"
        );
    }
    Layout::compute(design, options).render()
}

impl Design {
    /// The diagram with default [`LayoutOptions`].
    pub fn ascii_diagram(&self) -> String {
        render_diagram(self, &LayoutOptions::default())
    }

    pub fn render_diagram(&self, options: &LayoutOptions) -> String {
        render_diagram(self, options)
    }
}
