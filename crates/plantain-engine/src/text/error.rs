use std::fmt;

/// Errors produced while loading fonts or querying font tables.
#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    /// The font program could not be parsed.
    Parse(String),
    /// Glyph rasters did not fit into the fixed-size atlas.
    AtlasOverflow { ch: char },
    /// The font has no glyph for this character.
    MissingGlyph(char),
    /// The font has no kerning entry for this pair.
    NoKerning { left: char, right: char },
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Parse(msg) => write!(f, "font parse error: {msg}"),
            FontError::AtlasOverflow { ch } => {
                write!(f, "glyph atlas too small to fit {ch:?} and the glyphs after it")
            }
            FontError::MissingGlyph(ch) => write!(f, "font has no glyph for {ch:?}"),
            FontError::NoKerning { left, right } => {
                write!(f, "no kerning data for {left:?}{right:?}")
            }
        }
    }
}

impl std::error::Error for FontError {}
