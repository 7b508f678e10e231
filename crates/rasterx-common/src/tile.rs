//! Tile naming for tiled raster directories.
//!
//! A tile is named after its south-west corner, e.g. `N45E006` or `S07W120`.
//! The file name is produced from a template that knows four fields:
//! `x_sep`, `x`, `y_sep` and `y`. Two templates ship built in
//! (`AsterGDEM` and `SRTM`); callers can register more by name.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// Wrap a longitude (in whole degrees) into `[-180, 179]`.
///
/// Only values above 179 are shifted: `179 -> 179`, `180 -> -180`,
/// `359 -> -1`.
pub fn normalize_longitude(x: i32) -> i32 {
    if x > 179 {
        x - 360
    } else {
        x
    }
}

// ============================================================================
// Tile coordinates
// ============================================================================

/// Hemisphere letter used in tile names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn letter(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Integer south-west corner of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `E` for `x >= 0`, `W` otherwise.
    pub fn x_hemisphere(&self) -> Hemisphere {
        if self.x < 0 {
            Hemisphere::West
        } else {
            Hemisphere::East
        }
    }

    /// `N` for `y >= 0`, `S` otherwise.
    pub fn y_hemisphere(&self) -> Hemisphere {
        if self.y < 0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{}{:03}",
            self.y_hemisphere(),
            self.y.unsigned_abs(),
            self.x_hemisphere(),
            self.x.unsigned_abs()
        )
    }
}

// ============================================================================
// Tile size
// ============================================================================

/// Tile edge length in whole coordinate units, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TileSizeRepr", into = "TileSizeRepr")]
pub struct TileSize {
    x: u32,
    y: u32,
}

impl TileSize {
    pub fn new(x: u32, y: u32) -> CommonResult<Self> {
        if x == 0 || y == 0 {
            return Err(CommonError::InvalidTileSize(format!(
                "tile size must be positive (got {}x{})",
                x, y
            )));
        }
        Ok(Self { x, y })
    }

    pub fn square(size: u32) -> CommonResult<Self> {
        Self::new(size, size)
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    /// Parse `"2"` or `"2,1"`.
    pub fn parse(s: &str) -> CommonResult<Self> {
        let parse_one = |part: &str| -> CommonResult<u32> {
            part.trim()
                .parse::<u32>()
                .map_err(|_| CommonError::InvalidTileSize(s.to_string()))
        };

        match s.split_once(',') {
            Some((x, y)) => Self::new(parse_one(x)?, parse_one(y)?),
            None => Self::square(parse_one(s)?),
        }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

/// Config form of a tile size: a scalar or an `[x, y]` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum TileSizeRepr {
    Scalar(u32),
    Pair([u32; 2]),
}

impl TryFrom<TileSizeRepr> for TileSize {
    type Error = CommonError;

    fn try_from(repr: TileSizeRepr) -> CommonResult<Self> {
        match repr {
            TileSizeRepr::Scalar(size) => TileSize::square(size),
            TileSizeRepr::Pair([x, y]) => TileSize::new(x, y),
        }
    }
}

impl From<TileSize> for TileSizeRepr {
    fn from(size: TileSize) -> Self {
        if size.x == size.y {
            TileSizeRepr::Scalar(size.x)
        } else {
            TileSizeRepr::Pair([size.x, size.y])
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    XSep,
    X,
    YSep,
    Y,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "x_sep" => Some(Field::XSep),
            "x" => Some(Field::X),
            "y_sep" => Some(Field::YSep),
            "y" => Some(Field::Y),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Field::X | Field::Y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        field: Field,
        width: usize,
        zero_pad: bool,
    },
}

/// A parsed tile file name template.
///
/// Supports `{name}`, `{name:d}`, `{name:0Nd}`, `{name:Nd}` and the
/// `{{`/`}}` escapes. Numeric fields are formatted as absolute values;
/// the sign lives in the hemisphere letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl TileTemplate {
    pub fn parse(template: &str) -> CommonResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(CommonError::invalid_template(
                        template,
                        "single '}' encountered",
                    ));
                }
                '{' => {
                    let mut spec = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        spec.push(c);
                    }
                    if !closed {
                        return Err(CommonError::invalid_template(template, "unclosed '{'"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Self::parse_field(template, &spec)?);
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    fn parse_field(template: &str, spec: &str) -> CommonResult<Segment> {
        let (name, format) = match spec.split_once(':') {
            Some((name, format)) => (name, Some(format)),
            None => (spec, None),
        };

        let field = Field::from_name(name).ok_or_else(|| {
            CommonError::invalid_template(template, format!("unknown field '{}'", name))
        })?;

        let Some(format) = format else {
            return Ok(Segment::Field {
                field,
                width: 0,
                zero_pad: false,
            });
        };

        if !field.is_numeric() {
            return Err(CommonError::invalid_template(
                template,
                format!("field '{}' does not take a format spec", name),
            ));
        }

        let digits = format.strip_suffix('d').ok_or_else(|| {
            CommonError::invalid_template(template, format!("unsupported format '{}'", format))
        })?;
        let zero_pad = digits.starts_with('0');
        let width = if digits.is_empty() {
            0
        } else {
            digits.parse::<usize>().map_err(|_| {
                CommonError::invalid_template(template, format!("bad width in '{}'", format))
            })?
        };

        Ok(Segment::Field {
            field,
            width,
            zero_pad,
        })
    }

    /// The template string this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render the template for a tile corner.
    pub fn format(&self, coord: TileCoord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field {
                    field,
                    width,
                    zero_pad,
                } => {
                    let width = *width;
                    match field {
                        Field::XSep => out.push(coord.x_hemisphere().letter()),
                        Field::YSep => out.push(coord.y_hemisphere().letter()),
                        Field::X | Field::Y => {
                            let value = if *field == Field::X {
                                coord.x.unsigned_abs()
                            } else {
                                coord.y.unsigned_abs()
                            };
                            if *zero_pad {
                                out.push_str(&format!("{:0width$}", value, width = width));
                            } else {
                                out.push_str(&format!("{:>width$}", value, width = width));
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for TileTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Built-in named templates.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("AsterGDEM", "*_{y_sep}{y:02d}{x_sep}{x:03d}*"),
    ("SRTM", "{y_sep}{y:02d}{x_sep}{x:03d}*"),
];

/// Named templates: the built-ins plus any the caller registers.
///
/// A name that is not registered is treated as a template string itself.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    /// Registry with only the built-in templates.
    pub fn new() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, template)| (name.to_string(), template.to_string()))
            .collect();
        Self { templates }
    }

    /// Built-ins extended (or overridden) by `extra`.
    pub fn with_templates(extra: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (name, template) in extra {
            registry.register(name.clone(), template.clone());
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Look up `name_or_template` and parse the result.
    pub fn resolve(&self, name_or_template: &str) -> CommonResult<TileTemplate> {
        let template = self.get(name_or_template).unwrap_or(name_or_template);
        TileTemplate::parse(template)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tile spec
// ============================================================================

/// How tiles in a directory are named and sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSpec {
    /// Built-in template name or a literal template string.
    pub template: String,
    /// Appended to the rendered template, e.g. `.nc` or `.zip`.
    pub ext: String,
    /// Treat x as longitude and wrap it into `[-180, 179]`.
    pub lonlat: bool,
    #[serde(rename = "tilesize")]
    pub tile_size: TileSize,
}

impl Default for TileSpec {
    fn default() -> Self {
        Self {
            template: "AsterGDEM".to_string(),
            ext: ".nc".to_string(),
            lonlat: true,
            tile_size: TileSize::default(),
        }
    }
}

impl TileSpec {
    /// Glob expression for the tile at `coord` (without the base directory).
    pub fn tile_pattern(&self, registry: &TemplateRegistry, coord: TileCoord) -> CommonResult<String> {
        let template = registry.resolve(&self.template)?;
        Ok(format!("{}{}", template.format(coord), self.ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(179), 179);
        assert_eq!(normalize_longitude(180), -180);
        assert_eq!(normalize_longitude(359), -1);
        assert_eq!(normalize_longitude(-10), -10);
    }

    #[test]
    fn test_coord_display() {
        assert_eq!(TileCoord::new(3, -7).to_string(), "S07E003");
        assert_eq!(TileCoord::new(-120, 45).to_string(), "N45W120");
        assert_eq!(TileCoord::new(0, 0).to_string(), "N00E000");
    }

    #[test]
    fn test_space_padded_width() {
        let template = TileTemplate::parse("{x:4d}|{y}").unwrap();
        assert_eq!(template.format(TileCoord::new(-12, 5)), "  12|5");
    }
}
