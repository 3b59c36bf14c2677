use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;

use crate::PdfError;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// A font resource referenced by a page.
#[derive(Debug, Clone)]
pub struct FontResource {
    /// Resource key as used by `Tf` (e.g. `b"F1"`).
    pub key: Vec<u8>,
    pub base_font: Option<String>,
    pub encoding: Option<String>,
}

/// Vertical extent of a page's MediaBox in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub bottom: f32,
    pub top: f32,
}

impl PageBox {
    /// Reads `[llx lly urx ury]`; the corners may come in either order.
    pub fn from_media_box(values: &[f32]) -> Option<Self> {
        match values {
            [_, lly, _, ury, ..] => Some(Self {
                bottom: lly.min(*ury),
                top: lly.max(*ury),
            }),
            _ => None,
        }
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Distance of a user-space `y` below the top edge.
    pub fn flip(&self, y: f32) -> f32 {
        self.top - y
    }
}

/// A lopdf-independent operand, enough to drive the text state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    pub fn number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One content-stream operation.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// Numeric operand at `index`, if present.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(Operand::number)
    }
}

pub fn convert_operand(obj: &lopdf::Object) -> Operand {
    match obj {
        lopdf::Object::Integer(i) => Operand::Number(*i as f32),
        lopdf::Object::Real(f) => Operand::Number(*f),
        lopdf::Object::Name(n) => Operand::Name(n.clone()),
        lopdf::Object::String(s, _) => Operand::Str(s.clone()),
        lopdf::Object::Array(arr) => Operand::Array(arr.iter().map(convert_operand).collect()),
        _ => Operand::Other,
    }
}

/// Best-effort decoding of raw PDF string bytes.
///
/// UTF-16BE with BOM first, then UTF-8, then Latin-1 byte-for-byte.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, payload @ ..] = bytes {
        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Abstraction over the PDF parser so layout code can run against mocks.
pub trait PdfBackend {
    /// 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// The page's MediaBox, used to flip `y` so it grows downward.
    fn page_box(&self, page: PageId) -> Result<PageBox, PdfError>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError>;

    /// Decoded content-stream operations of a page.
    fn page_ops(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the bytes of a text-showing operand for the given font.
    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String;
}

/// [`PdfBackend`] backed by [`lopdf::Document`].
#[derive(Debug)]
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    pub fn load_file(path: &Path) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load(path).map_err(|e| match e {
            lopdf::Error::IO(io) => PdfError::Io(io),
            other => PdfError::Parse(other.to_string()),
        })?;
        Self::checked(doc)
    }

    fn checked(doc: lopdf::Document) -> Result<Self, PdfError> {
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// String entries of the trailer's Info dictionary (`Title`, `Author`, ...).
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();

        let info = match self.doc.trailer.get(b"Info") {
            Ok(lopdf::Object::Reference(id)) => self.doc.get_dictionary(*id).ok(),
            Ok(lopdf::Object::Dictionary(d)) => Some(d),
            _ => None,
        };
        let Some(info) = info else {
            return meta;
        };

        for (key, value) in info.iter() {
            if let lopdf::Object::String(bytes, _) = value {
                meta.insert(
                    String::from_utf8_lossy(key).into_owned(),
                    decode_text_simple(bytes),
                );
            }
        }
        meta
    }

    /// Walk up the page tree until a MediaBox is found.
    fn media_box(&self, id: lopdf::ObjectId) -> Option<Vec<f32>> {
        let dict = self.doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = match obj {
                lopdf::Object::Reference(r) => self.doc.get_object(*r).ok()?.as_array().ok()?,
                other => other.as_array().ok()?,
            };
            return arr
                .iter()
                .map(|o| match o {
                    lopdf::Object::Integer(i) => Some(*i as f32),
                    lopdf::Object::Real(f) => Some(*f),
                    _ => None,
                })
                .collect();
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        self.media_box(parent)
    }

    fn font_encoding(&self, page: PageId, font_key: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font = fonts.get(font_key)?;
        match font.get(b"Encoding").ok()? {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_box(&self, page: PageId) -> Result<PageBox, PdfError> {
        self.media_box(page)
            .as_deref()
            .and_then(PageBox::from_media_box)
            .ok_or_else(|| {
                PdfError::Parse(format!(
                    "MediaBox not found for page object {} {}",
                    page.0, page.1
                ))
            })
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let name_of = |dict: &lopdf::Dictionary, key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };

        Ok(fonts
            .iter()
            .map(|(key, dict)| FontResource {
                key: key.clone(),
                base_font: name_of(dict, b"BaseFont"),
                encoding: name_of(dict, b"Encoding"),
            })
            .collect())
    }

    fn page_ops(&self, page: PageId) -> Result<Vec<ContentOp>, PdfError> {
        let data = self
            .doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))?;
        let content = Content::decode(&data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .iter()
            .map(|op| ContentOp {
                operator: op.operator.clone(),
                operands: op.operands.iter().map(convert_operand).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String {
        // Identity-H/V fonts carry 2-byte codes; try them as UTF-16BE first.
        let identity = self
            .font_encoding(page, font_key)
            .is_some_and(|enc| enc.contains("Identity"));
        if identity && bytes.len() >= 2 && bytes.len() % 2 == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }

        decode_text_simple(bytes)
    }
}
