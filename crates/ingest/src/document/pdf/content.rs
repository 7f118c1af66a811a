//! Content-stream interpretation: turns text-showing operators into
//! positioned [`TextSpan`]s.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use super::fonts::{inherited, number, resolve, FontMap};
use super::layout::{PageLayout, TextSpan};
use crate::document::ExtractionError;

/// US Letter, used when a page has no usable `MediaBox`.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A TJ adjustment (in thousandths of an em) that moves the pen far enough
/// right to start a new span.
const TJ_SPAN_BREAK: f64 = -200.0;

/// Nesting limit for form XObjects drawn from other forms.
const MAX_FORM_DEPTH: usize = 8;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(self, other: Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f64 {
        let [_, _, c, d, _, _] = self.0;
        c.hypot(d)
    }
}

#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            text: TextState::default(),
        }
    }
}

/// Fonts and XObjects visible to one content stream.
#[derive(Debug, Default)]
struct Resources<'a> {
    fonts: FontMap<'a>,
    xobjects: Option<&'a Dictionary>,
}

impl<'a> Resources<'a> {
    fn for_page(doc: &'a Document, page_id: ObjectId) -> Result<Self, ExtractionError> {
        let (direct, inherited_ids) = doc.get_page_resources(page_id)?;
        let xobjects = direct
            .into_iter()
            .chain(inherited_ids.into_iter().filter_map(|id| doc.get_dictionary(id).ok()))
            .find_map(|resources| xobject_dict(doc, resources));
        Ok(Self {
            fonts: FontMap::for_page(doc, page_id)?,
            xobjects,
        })
    }

    fn for_form(doc: &'a Document, resources: &'a Dictionary) -> Self {
        Self {
            fonts: FontMap::from_resources(doc, resources),
            xobjects: xobject_dict(doc, resources),
        }
    }

    /// The form XObject registered under `name`; images and unknown names
    /// yield `None`.
    fn form(&self, doc: &'a Document, name: &[u8]) -> Option<&'a Stream> {
        let stream = resolve(doc, self.xobjects?.get(name).ok()?).as_stream().ok()?;
        let is_form = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|subtype| subtype == b"Form");
        is_form.then_some(stream)
    }
}

fn xobject_dict<'a>(doc: &'a Document, resources: &'a Dictionary) -> Option<&'a Dictionary> {
    resolve(doc, resources.get(b"XObject").ok()?).as_dict().ok()
}

/// Span being built across the glyphs of one show operation.
struct PendingSpan {
    x: f64,
    y: f64,
    end_x: f64,
    size: f64,
    font: String,
    text: String,
}

/// Interprets one page's operations, following form XObjects.
struct TextInterpreter<'a> {
    doc: &'a Document,
    /// Innermost last; forms without their own resources use their parent's.
    resources: Vec<Resources<'a>>,
    form_depth: usize,
    /// Top edge of the page in user space, to flip y to top-down.
    page_top: f64,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    spans: Vec<TextSpan>,
    pending: Option<PendingSpan>,
}

impl<'a> TextInterpreter<'a> {
    fn new(doc: &'a Document, resources: Resources<'a>, page_top: f64) -> Self {
        Self {
            doc,
            resources: vec![resources],
            form_depth: 0,
            page_top,
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            spans: Vec::new(),
            pending: None,
        }
    }

    fn run(mut self, operations: &[Operation]) -> Result<Vec<TextSpan>, ExtractionError> {
        self.execute_all(operations)?;
        self.flush();
        Ok(self.spans)
    }

    fn execute_all(&mut self, operations: &[Operation]) -> Result<(), ExtractionError> {
        for op in operations {
            self.execute(op)?;
        }
        Ok(())
    }

    fn execute(&mut self, op: &Operation) -> Result<(), ExtractionError> {
        let operands = &op.operands;
        let num = |i: usize| operands.get(i).and_then(number).unwrap_or(0.0);
        match op.operator.as_str() {
            "q" => self.saved.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                let m = Matrix([num(0), num(1), num(2), num(3), num(4), num(5)]);
                self.state.ctm = m.then(self.state.ctm);
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.flush(),
            "Tf" => {
                if let Some(Ok(name)) = operands.first().map(Object::as_name) {
                    self.state.text.font = name.to_vec();
                }
                self.state.text.size = num(1);
            }
            "Tc" => self.state.text.char_spacing = num(0),
            "Tw" => self.state.text.word_spacing = num(0),
            "Tz" => self.state.text.horizontal_scale = num(0) / 100.0,
            "TL" => self.state.text.leading = num(0),
            "Ts" => self.state.text.rise = num(0),
            "Td" => self.move_line(num(0), num(1)),
            "TD" => {
                self.state.text.leading = -num(1);
                self.move_line(num(0), num(1));
            }
            "Tm" => {
                self.flush();
                let m = Matrix([num(0), num(1), num(2), num(3), num(4), num(5)]);
                self.text_matrix = m;
                self.line_matrix = m;
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(bytes);
                }
                self.flush();
            }
            "'" => {
                self.next_line();
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(bytes);
                }
                self.flush();
            }
            "\"" => {
                self.state.text.word_spacing = num(0);
                self.state.text.char_spacing = num(1);
                self.next_line();
                if let Some(bytes) = operands.get(2).and_then(string_bytes) {
                    self.show(bytes);
                }
                self.flush();
            }
            "TJ" => {
                if let Some(Ok(items)) = operands.first().map(Object::as_array) {
                    self.show_array(items);
                }
                self.flush();
            }
            "Do" => {
                if let Some(Ok(name)) = operands.first().map(Object::as_name) {
                    self.draw_form(name)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Run a form XObject's content under its `Matrix`, with the graphics
    /// and text state restored afterwards.
    fn draw_form(&mut self, name: &[u8]) -> Result<(), ExtractionError> {
        let doc = self.doc;
        let Some(form) = self.resources.last().and_then(|r| r.form(doc, name)) else {
            return Ok(());
        };
        if self.form_depth >= MAX_FORM_DEPTH {
            warn!(
                form = %String::from_utf8_lossy(name),
                depth = self.form_depth,
                "form xobjects nested too deeply, skipping"
            );
            return Ok(());
        }

        let content = Content::decode(&form.get_plain_content()?)?;
        let matrix = form
            .dict
            .get(b"Matrix")
            .and_then(Object::as_array)
            .ok()
            .and_then(|values| {
                let values: Vec<f64> = values.iter().filter_map(number).collect();
                <[f64; 6]>::try_from(values).ok()
            })
            .map(Matrix)
            .unwrap_or(Matrix::IDENTITY);
        let own_resources = form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve(doc, r).as_dict().ok())
            .map(|r| Resources::for_form(doc, r));

        self.flush();
        let outer = (self.state.clone(), self.text_matrix, self.line_matrix);
        let saved_depth = self.saved.len();
        self.state.ctm = matrix.then(self.state.ctm);
        let pushed = own_resources.is_some();
        self.resources.extend(own_resources);
        self.form_depth += 1;

        let result = self.execute_all(&content.operations);

        self.flush();
        self.form_depth -= 1;
        if pushed {
            self.resources.pop();
        }
        self.saved.truncate(saved_depth);
        (self.state, self.text_matrix, self.line_matrix) = outer;
        debug!(form = %String::from_utf8_lossy(name), "drew form xobject");
        result
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.flush();
        self.line_matrix = Matrix::translate(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn show_array(&mut self, items: &[Object]) {
        for item in items {
            if let Some(bytes) = string_bytes(item) {
                self.show(bytes);
            } else if let Some(adjustment) = number(item) {
                if adjustment < TJ_SPAN_BREAK {
                    self.flush();
                }
                let text = &self.state.text;
                let tx = -adjustment / 1000.0 * text.size * text.horizontal_scale;
                self.text_matrix = Matrix::translate(tx, 0.0).then(self.text_matrix);
            }
        }
    }

    fn show(&mut self, bytes: &[u8]) {
        let Some(resources) = self.resources.last() else {
            return;
        };
        let text = &self.state.text;
        let font = resources.fonts.get(&text.font);
        let glyphs = font.decode(bytes);
        let rendering = self.text_matrix.then(self.state.ctm);

        if self.pending.is_none() {
            let (x, y) = rendering.apply(0.0, text.rise);
            self.pending = Some(PendingSpan {
                x,
                y,
                end_x: x,
                size: text.size.abs() * rendering.vertical_scale(),
                font: font.base_name.clone(),
                text: String::new(),
            });
        }

        let mut advance = 0.0;
        let mut shown = String::new();
        for glyph in glyphs {
            let spacing = text.char_spacing + if glyph.is_space { text.word_spacing } else { 0.0 };
            advance += (glyph.width * text.size + spacing) * text.horizontal_scale;
            shown.push_str(&glyph.text);
        }
        self.text_matrix = Matrix::translate(advance, 0.0).then(self.text_matrix);

        let (end_x, _) = self.text_matrix.then(self.state.ctm).apply(0.0, 0.0);
        if let Some(pending) = self.pending.as_mut() {
            pending.text.push_str(&shown);
            pending.end_x = pending.end_x.max(end_x);
        }
    }

    fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            if pending.text.is_empty() {
                return;
            }
            self.spans.push(TextSpan {
                x: pending.x,
                baseline: self.page_top - pending.y,
                width: (pending.end_x - pending.x).max(0.0),
                size: pending.size,
                font: pending.font,
                text: pending.text,
            });
        }
    }
}

fn string_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

/// `[x0 y0 x1 y1]` of the page, normalized so that `y1 >= y0`.
fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let values: Option<Vec<f64>> = inherited(doc, page_id, b"MediaBox")
        .and_then(|o| o.as_array().ok())
        .map(|arr| arr.iter().filter_map(number).collect());
    match values.as_deref() {
        Some([x0, y0, x1, y1]) => [x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)],
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// Interpret one page into a [`PageLayout`].
pub fn read_page(
    doc: &Document,
    number: usize,
    page_id: ObjectId,
) -> Result<PageLayout, ExtractionError> {
    let [_, bottom, _, top] = media_box(doc, page_id);
    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;
    let resources = Resources::for_page(doc, page_id)?;
    let spans = TextInterpreter::new(doc, resources, top).run(&content.operations)?;
    debug!(page = number, spans = spans.len(), "interpreted page content");
    Ok(PageLayout::new(number, top - bottom, spans))
}

/// Interpret every page of the document in page order.
pub fn read_pages(doc: &Document) -> Result<Vec<PageLayout>, ExtractionError> {
    let pages = doc.get_pages();
    if pages.is_empty() {
        warn!("pdf has no pages");
    }
    pages
        .into_values()
        .enumerate()
        .map(|(i, page_id)| read_page(doc, i + 1, page_id))
        .collect()
}
