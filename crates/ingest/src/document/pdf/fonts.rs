//! Page font resources: base names, glyph widths and text decoding.
//!
//! Character encodings, including `ToUnicode` CMaps, are resolved by lopdf;
//! this module adds the per-glyph metrics needed to place spans.

use std::collections::BTreeMap;
use std::fmt;

use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use tracing::debug;

use super::layout::DEFAULT_GLYPH_WIDTH;

/// Maximum depth followed through `Parent` links and indirect references.
const MAX_INDIRECTION: usize = 32;

/// What lopdf yields for a code its CMap does not map.
const REPLACEMENT: &str = "\u{FFFD}";

/// Follow indirect references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> &'a Object {
    for _ in 0..MAX_INDIRECTION {
        match object {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => object = target,
                Err(_) => return object,
            },
            _ => return object,
        }
    }
    object
}

pub(crate) fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Look up an inherited page attribute such as `MediaBox`, walking up the
/// page tree.
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INDIRECTION {
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn as_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, object).as_dict().ok()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

/// A decoded character code.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Glyph {
    pub text: String,
    /// Advance width in em.
    pub width: f64,
    /// Single-byte code 32, which receives word spacing.
    pub is_space: bool,
}

/// Everything needed to decode and measure strings shown with one font.
#[derive(Default)]
pub struct FontInfo<'a> {
    pub base_name: String,
    encoding: Option<Encoding<'a>>,
    /// Composite (Type0) fonts use two-byte codes.
    composite: bool,
    first_char: i64,
    widths: Vec<f64>,
    default_width: Option<f64>,
}

impl fmt::Debug for FontInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontInfo")
            .field("base_name", &self.base_name)
            .field("has_encoding", &self.encoding.is_some())
            .field("composite", &self.composite)
            .field("first_char", &self.first_char)
            .field("widths", &self.widths.len())
            .field("default_width", &self.default_width)
            .finish()
    }
}

impl<'a> FontInfo<'a> {
    fn from_dict(doc: &'a Document, dict: &'a Dictionary) -> Self {
        let base_name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| resolve(doc, o).as_name().ok())
            .map(|name| strip_subset_prefix(&String::from_utf8_lossy(name)).to_string())
            .unwrap_or_default();
        let composite = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        let encoding = match dict.get_font_encoding(doc) {
            Ok(encoding) => Some(encoding),
            Err(e) => {
                debug!(font = %base_name, error = %e, "font has no usable encoding");
                None
            }
        };

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(number)
            .unwrap_or(0.0) as i64;
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| number(resolve(doc, w)).unwrap_or(0.0) / 1000.0)
                    .collect()
            })
            .unwrap_or_default();
        let default_width = composite
            .then(|| descendant_default_width(doc, dict))
            .flatten();

        Self {
            base_name,
            encoding,
            composite,
            first_char,
            widths,
            default_width,
        }
    }

    fn width_of(&self, code: u32) -> f64 {
        let index = code as i64 - self.first_char;
        if index >= 0 {
            if let Some(w) = self.widths.get(index as usize) {
                if *w > 0.0 {
                    return *w;
                }
            }
        }
        self.default_width.unwrap_or(DEFAULT_GLYPH_WIDTH)
    }

    /// Unicode text of one character code. Single-byte codes the encoding
    /// cannot map are read as Latin-1; two-byte codes are glyph ids and
    /// carry no text.
    fn text_of(&self, code: &[u8]) -> String {
        let decoded = self
            .encoding
            .as_ref()
            .and_then(|encoding| Document::decode_text(encoding, code).ok());
        match decoded {
            Some(text) if text != REPLACEMENT => text,
            _ => match code {
                [byte] => char::from(*byte).to_string(),
                _ => String::new(),
            },
        }
    }

    /// Decode a string operand into glyphs.
    pub(crate) fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        let code_len = if self.composite { 2 } else { 1 };
        bytes
            .chunks(code_len)
            .map(|chunk| {
                let code = code_of(chunk);
                Glyph {
                    text: self.text_of(chunk),
                    width: self.width_of(code),
                    is_space: code_len == 1 && code == 32,
                }
            })
            .collect()
    }
}

fn descendant_default_width(doc: &Document, dict: &Dictionary) -> Option<f64> {
    let descendants = resolve(doc, dict.get(b"DescendantFonts").ok()?).as_array().ok()?;
    let descendant = as_dict(doc, descendants.first()?)?;
    let dw = descendant.get(b"DW").ok().and_then(number).unwrap_or(1000.0);
    Some(dw / 1000.0)
}

/// `AAAAAA+Arial-BoldMT` -> `Arial-BoldMT`
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

/// Fonts visible to one content stream, keyed by resource name (`F1`, ...).
#[derive(Debug, Default)]
pub struct FontMap<'a> {
    fonts: BTreeMap<Vec<u8>, FontInfo<'a>>,
    fallback: FontInfo<'a>,
}

impl<'a> FontMap<'a> {
    /// Fonts of a page, including those inherited from the page tree.
    pub fn for_page(doc: &'a Document, page_id: ObjectId) -> Result<Self, lopdf::Error> {
        Ok(Self::from_dicts(doc, doc.get_page_fonts(page_id)?))
    }

    /// Fonts declared in a `Resources` dictionary, as carried by form XObjects.
    pub fn from_resources(doc: &'a Document, resources: &'a Dictionary) -> Self {
        let dicts: BTreeMap<Vec<u8>, &Dictionary> = resources
            .get(b"Font")
            .ok()
            .and_then(|fonts| as_dict(doc, fonts))
            .map(|fonts| {
                fonts
                    .iter()
                    .filter_map(|(name, font)| Some((name.clone(), as_dict(doc, font)?)))
                    .collect()
            })
            .unwrap_or_default();
        Self::from_dicts(doc, dicts)
    }

    fn from_dicts(doc: &'a Document, dicts: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        let fonts = dicts
            .into_iter()
            .map(|(name, dict)| (name, FontInfo::from_dict(doc, dict)))
            .collect();
        Self {
            fonts,
            fallback: FontInfo::default(),
        }
    }

    /// Font for a resource name; unknown names decode as single-byte text.
    pub fn get(&self, name: &[u8]) -> &FontInfo<'a> {
        self.fonts.get(name).unwrap_or(&self.fallback)
    }
}
