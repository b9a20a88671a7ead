//! ASCII PLY polygon support on top of `ply-rs`
//!
//! Only the subset needed to describe wireframe geometry is accepted: an ASCII
//! 1.0 header with a `vertex` element whose first three properties are `x y z`,
//! optionally followed by a `face` element with a single `vertex_indices` list.
//! Anything richer that would otherwise be silently misread (binary bodies,
//! extra elements, list properties on vertices, extra face properties) is
//! rejected as [`ParseErrorKind::UnsupportedFormat`].
//!
//! The header grammar and the typed element values come from `ply-rs`. The body
//! is fed to it one line at a time so every error keeps its line number.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use ply_rs::{
    parser::Parser,
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Header, Ply, Property, PropertyDef, PropertyType, ScalarType,
    },
    writer::Writer,
};
use scenecrate_core::{Color, Polygon, Vector3d};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IoError, ParseError, ParseErrorKind};

/// Options for turning PLY geometry into polygons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlyReadOptions {
    /// Factor every vertex position is multiplied by
    pub scale: f64,
    /// Split faces with more than three vertices into a triangle fan
    pub triangulate: bool,
    /// Color given to every produced polygon
    pub color: Color,
}

impl Default for PlyReadOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            triangulate: false,
            color: Color::default(),
        }
    }
}

impl PlyReadOptions {
    pub fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

/// Options for writing polygons as ASCII PLY
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlyWriteOptions {
    /// Emitted as `comment` lines in the header, one per line of text
    pub comment: Option<String>,
}

/// The decoded vertex and face tables of a PLY file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlyMesh {
    pub vertices: Vec<Vector3d>,
    /// Vertex indices per face, each with at least three entries
    pub faces: Vec<Vec<usize>>,
    pub comments: Vec<String>,
}

impl PlyMesh {
    /// One polygon per face, with positions looked up by index and scaled.
    ///
    /// Meshes from [`parse_mesh`] always convert. A hand-built mesh whose face
    /// has fewer than three entries or an index past the vertex table is
    /// rejected with [`ParseErrorKind::BadIndex`] at line 0.
    pub fn to_polygons(&self, options: &PlyReadOptions) -> Result<Vec<Polygon>, ParseError> {
        let mut polygons = Vec::with_capacity(self.faces.len());

        for (f, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(ParseError::new(
                    ParseErrorKind::BadIndex,
                    0,
                    format!("face {f} has {} vertices, at least 3 are required", face.len()),
                ));
            }
            let corners = face
                .iter()
                .map(|&i| match self.vertices.get(i) {
                    Some(v) => Ok(*v * options.scale),
                    None => Err(ParseError::new(
                        ParseErrorKind::BadIndex,
                        0,
                        format!("face {f} refers to vertex {i} of {}", self.vertices.len()),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?;

            if options.triangulate && corners.len() > 3 {
                for pair in corners[1..].windows(2) {
                    polygons.push(Polygon::new(vec![corners[0], pair[0], pair[1]]).with_color(options.color));
                }
            } else {
                polygons.push(Polygon::new(corners).with_color(options.color));
            }
        }

        Ok(polygons)
    }
}

/// Numbered lines of the input, skipping blank ones
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.lines().enumerate(),
            last: 0,
        }
    }

    fn next_content(&mut self) -> Option<(usize, &'a str)> {
        for (i, line) in self.inner.by_ref() {
            self.last = i + 1;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Some((i + 1, trimmed));
            }
        }
        None
    }

    /// The line number just past the end of the input
    fn end(&self) -> usize {
        self.last + 1
    }
}

fn header_error(line: usize, detail: impl Into<String>) -> ParseError {
    ParseError::new(ParseErrorKind::MalformedHeader, line, detail)
}

fn unsupported(line: usize, detail: impl Into<String>) -> ParseError {
    ParseError::new(ParseErrorKind::UnsupportedFormat, line, detail)
}

fn bad_number(line: usize, detail: impl Into<String>) -> ParseError {
    ParseError::new(ParseErrorKind::BadNumber, line, detail)
}

/// Header lines up to and including `end_header`
fn split_header<'a>(lines: &mut Lines<'a>) -> Result<Vec<(usize, &'a str)>, ParseError> {
    let mut header = Vec::new();
    loop {
        let Some((n, line)) = lines.next_content() else {
            return Err(header_error(lines.end(), "missing 'end_header'"));
        };
        header.push((n, line));
        if line == "end_header" {
            return Ok(header);
        }
    }
}

fn join(lines: &[(usize, &str)]) -> String {
    lines.iter().fold(String::new(), |mut text, (_, line)| {
        text.push_str(line);
        text.push('\n');
        text
    })
}

fn read_header(parser: &Parser<DefaultElement>, lines: &[(usize, &str)]) -> Result<Header, ParseError> {
    parser
        .read_header(&mut join(lines).as_bytes())
        .map_err(|err| header_error(rejected_line(parser, lines), err.to_string()))
}

/// The first header line `ply-rs` refuses, found by closing ever longer prefixes
fn rejected_line(parser: &Parser<DefaultElement>, lines: &[(usize, &str)]) -> usize {
    let Some(((end, _), body)) = lines.split_last() else {
        return 0;
    };
    (1..=body.len())
        .find(|&k| {
            let mut prefix = join(&body[..k]);
            prefix.push_str("end_header\n");
            parser.read_header(&mut prefix.as_bytes()).is_err()
        })
        .map_or(*end, |k| body[k - 1].0)
}

/// Line of the first header line starting with `keyword` (and `name`, if given)
fn declaration_line(lines: &[(usize, &str)], keyword: &str, name: Option<&str>) -> Option<usize> {
    lines.iter().find_map(|&(n, line)| {
        let mut tokens = line.split_whitespace();
        let matches = tokens.next() == Some(keyword) && name.map_or(true, |name| tokens.next() == Some(name));
        matches.then_some(n)
    })
}

fn is_integer(ty: &ScalarType) -> bool {
    !matches!(ty, ScalarType::Float | ScalarType::Double)
}

/// Restrict a parsed header to the accepted subset
fn check_subset(header: &Header, lines: &[(usize, &str)]) -> Result<(), ParseError> {
    let end = lines.last().map_or(0, |&(n, _)| n);

    let Some(format_line) = declaration_line(lines, "format", None) else {
        return Err(header_error(end, "missing 'format' line"));
    };
    if !matches!(header.encoding, Encoding::Ascii) {
        return Err(unsupported(format_line, "binary bodies are not supported"));
    }
    if header.version.major != 1 || header.version.minor != 0 {
        return Err(unsupported(
            format_line,
            format!("PLY version {}.{} is not supported", header.version.major, header.version.minor),
        ));
    }

    let mut declared: Vec<&str> = Vec::new();
    for &(n, line) in lines {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("element") {
            continue;
        }
        let name = tokens.next().unwrap_or_default();
        if declared.contains(&name) {
            return Err(header_error(n, format!("duplicate '{name}' element")));
        }
        if name == "face" && !declared.contains(&"vertex") {
            return Err(header_error(n, "'face' element declared before 'vertex'"));
        }
        declared.push(name);
    }

    for (name, element) in &header.elements {
        let n = declaration_line(lines, "element", Some(name.as_str())).unwrap_or(end);
        match name.as_str() {
            "vertex" => check_vertex(element, n)?,
            "face" => check_face(element, n)?,
            other => return Err(unsupported(n, format!("element '{other}' is not supported"))),
        }
    }

    if !header.elements.contains_key("vertex") {
        return Err(header_error(end, "missing 'vertex' element"));
    }
    Ok(())
}

fn check_vertex(element: &ElementDef, n: usize) -> Result<(), ParseError> {
    if let Some(list) = element
        .properties
        .values()
        .find(|p| matches!(p.data_type, PropertyType::List(..)))
    {
        return Err(unsupported(n, format!("list property '{}' on vertices", list.name)));
    }
    let leading: Vec<&str> = element.properties.keys().take(3).map(String::as_str).collect();
    if leading != ["x", "y", "z"] {
        return Err(unsupported(n, format!("vertex properties must start with x y z, found {leading:?}")));
    }
    Ok(())
}

fn check_face(element: &ElementDef, n: usize) -> Result<(), ParseError> {
    let mut properties = element.properties.values();
    let Some(list) = properties.next() else {
        if element.count > 0 {
            return Err(header_error(n, "face element has no 'vertex_indices' list"));
        }
        return Ok(());
    };
    if let Some(extra) = properties.next() {
        return Err(unsupported(n, format!("extra face property '{}'", extra.name)));
    }
    match &list.data_type {
        PropertyType::List(count, index) if is_integer(count) && is_integer(index) => {}
        PropertyType::List(..) => return Err(unsupported(n, "face lists must use integer count and index types")),
        PropertyType::Scalar(_) => return Err(unsupported(n, format!("face property '{}' is not a list", list.name))),
    }
    if !matches!(list.name.as_str(), "vertex_indices" | "vertex_index") {
        return Err(unsupported(n, format!("face list '{}' is not supported", list.name)));
    }
    Ok(())
}

/// Decode one body line against its element declaration
fn read_element(
    parser: &Parser<DefaultElement>,
    header: &Header,
    single: &ElementDef,
    line: &str,
    n: usize,
) -> Result<DefaultElement, ParseError> {
    let mut text = String::with_capacity(line.len() + 1);
    text.push_str(line);
    text.push('\n');
    parser
        .read_payload_for_element(&mut text.as_bytes(), single, header)
        .map_err(|err| bad_number(n, format!("invalid {} '{line}': {err}", single.name)))?
        .pop()
        .ok_or_else(|| bad_number(n, format!("empty {} line", single.name)))
}

fn coordinate(element: &DefaultElement, axis: &str, n: usize) -> Result<f64, ParseError> {
    let value = match element.get(axis) {
        Some(Property::Float(v)) => f64::from(*v),
        Some(Property::Double(v)) => *v,
        Some(Property::Char(v)) => f64::from(*v),
        Some(Property::UChar(v)) => f64::from(*v),
        Some(Property::Short(v)) => f64::from(*v),
        Some(Property::UShort(v)) => f64::from(*v),
        Some(Property::Int(v)) => f64::from(*v),
        Some(Property::UInt(v)) => f64::from(*v),
        _ => return Err(bad_number(n, format!("vertex has no scalar '{axis}'"))),
    };
    if !value.is_finite() {
        return Err(bad_number(n, format!("'{axis}' is not a finite number")));
    }
    Ok(value)
}

/// Check the declared index count against the tokens on a face line
fn check_face_arity(line: &str, n: usize) -> Result<(), ParseError> {
    let mut tokens = line.split_whitespace();
    let count_token = tokens.next().unwrap_or_default();
    let count: usize = count_token
        .parse()
        .map_err(|_| bad_number(n, format!("'{count_token}' is not a vertex count")))?;
    if count < 3 {
        return Err(ParseError::new(
            ParseErrorKind::BadIndex,
            n,
            format!("face has {count} vertices, at least 3 are required"),
        ));
    }
    let listed = tokens.count();
    if listed < count {
        return Err(ParseError::new(
            ParseErrorKind::TruncatedBody,
            n,
            format!("face declares {count} indices but lists {listed}"),
        ));
    }
    if listed > count {
        return Err(ParseError::new(
            ParseErrorKind::BadIndex,
            n,
            format!("face lists more than the declared {count} indices"),
        ));
    }
    Ok(())
}

fn face_indices(element: &DefaultElement, list: &str, vertex_count: usize, n: usize) -> Result<Vec<usize>, ParseError> {
    let raw: Vec<i64> = match element.get(list) {
        Some(Property::ListChar(v)) => v.iter().map(|&i| i64::from(i)).collect(),
        Some(Property::ListUChar(v)) => v.iter().map(|&i| i64::from(i)).collect(),
        Some(Property::ListShort(v)) => v.iter().map(|&i| i64::from(i)).collect(),
        Some(Property::ListUShort(v)) => v.iter().map(|&i| i64::from(i)).collect(),
        Some(Property::ListInt(v)) => v.iter().map(|&i| i64::from(i)).collect(),
        Some(Property::ListUInt(v)) => v.iter().map(|&i| i64::from(i)).collect(),
        _ => return Err(bad_number(n, format!("face has no integer list '{list}'"))),
    };
    raw.into_iter()
        .map(|index| match usize::try_from(index) {
            Ok(i) if i < vertex_count => Ok(i),
            _ => Err(ParseError::new(
                ParseErrorKind::BadIndex,
                n,
                format!("index {index} out of range for {vertex_count} vertices"),
            )),
        })
        .collect()
}

/// Decode an ASCII PLY document into its vertex and face tables
pub fn parse_mesh(input: &str) -> Result<PlyMesh, ParseError> {
    let mut lines = Lines::new(input);
    let header_lines = split_header(&mut lines)?;
    let parser = Parser::<DefaultElement>::new();
    let header = read_header(&parser, &header_lines)?;
    check_subset(&header, &header_lines)?;

    // declared counts are untrusted
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (name, element) in &header.elements {
        let mut single = element.clone();
        single.count = 1;
        let list = element.properties.keys().next().map_or("vertex_indices", String::as_str);

        for i in 0..element.count {
            let Some((n, line)) = lines.next_content() else {
                return Err(ParseError::new(
                    ParseErrorKind::TruncatedBody,
                    lines.end(),
                    format!("expected {} {name} lines, found {i}", element.count),
                ));
            };
            if name == "vertex" {
                let parsed = read_element(&parser, &header, &single, line, n)?;
                let x = coordinate(&parsed, "x", n)?;
                let y = coordinate(&parsed, "y", n)?;
                let z = coordinate(&parsed, "z", n)?;
                vertices.push(Vector3d::new(x, y, z));
            } else {
                check_face_arity(line, n)?;
                let parsed = read_element(&parser, &header, &single, line, n)?;
                faces.push(face_indices(&parsed, list, vertices.len(), n)?);
            }
        }
    }

    if let Some((n, _)) = lines.next_content() {
        warn!(line = n, "ignoring trailing content after the declared PLY body");
    }

    let comments = header
        .comments
        .iter()
        .chain(&header.obj_infos)
        .map(|c| c.trim().to_string())
        .collect();

    debug!(vertices = vertices.len(), faces = faces.len(), "parsed PLY mesh");
    Ok(PlyMesh {
        vertices,
        faces,
        comments,
    })
}

/// Decode an ASCII PLY document straight into polygons.
///
/// Either every face becomes a polygon or an error is returned; no partial list
/// is ever produced.
pub fn parse_polygons(input: &str, options: &PlyReadOptions) -> Result<Vec<Polygon>, ParseError> {
    parse_mesh(input)?.to_polygons(options)
}

/// Read a whole PLY stream and decode it into polygons
pub fn read_polygons<R: BufRead>(mut reader: R, options: &PlyReadOptions) -> Result<Vec<Polygon>, IoError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(parse_polygons(&input, options)?)
}

/// Read a PLY file and decode it into polygons
pub fn read_polygons_file<P: AsRef<Path>>(path: P, options: &PlyReadOptions) -> Result<Vec<Polygon>, IoError> {
    let file = File::open(path)?;
    read_polygons(BufReader::new(file), options)
}

fn polygons_to_ply(polygons: &[Polygon], options: &PlyWriteOptions) -> io::Result<Ply<DefaultElement>> {
    let widest = polygons.iter().map(Polygon::vertex_count).max().unwrap_or(0);
    let count_type = if widest > u8::MAX as usize {
        ScalarType::UInt
    } else {
        ScalarType::UChar
    };

    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    if let Some(comment) = &options.comment {
        ply.header
            .comments
            .extend(comment.lines().filter(|line| !line.trim().is_empty()).map(str::to_string));
    }

    let mut vertex_element = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_element
            .properties
            .add(PropertyDef::new(axis.to_string(), PropertyType::Scalar(ScalarType::Double)));
    }
    ply.header.elements.add(vertex_element);

    let mut face_element = ElementDef::new("face".to_string());
    face_element.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(count_type, ScalarType::Int),
    ));
    ply.header.elements.add(face_element);

    let mut vertices = Vec::new();
    let mut faces = Vec::with_capacity(polygons.len());
    for polygon in polygons {
        let mut indices = Vec::with_capacity(polygon.vertex_count());
        for v in &polygon.vertices {
            let index = i32::try_from(vertices.len())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many vertices for int indices"))?;
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Double(v.x));
            vertex.insert("y".to_string(), Property::Double(v.y));
            vertex.insert("z".to_string(), Property::Double(v.z));
            vertices.push(vertex);
            indices.push(index);
        }
        let mut face = DefaultElement::new();
        face.insert("vertex_indices".to_string(), Property::ListInt(indices));
        faces.push(face);
    }

    ply.payload.insert("vertex".to_string(), vertices);
    ply.payload.insert("face".to_string(), faces);
    Ok(ply)
}

/// Write polygons as an ASCII PLY document that [`parse_polygons`] reads back.
///
/// Each polygon contributes its own vertices; shared positions are not merged.
pub fn write_polygons<W: Write>(polygons: &[Polygon], mut writer: W, options: &PlyWriteOptions) -> io::Result<()> {
    let mut ply = polygons_to_ply(polygons, options)?;
    Writer::<DefaultElement>::new().write_ply(&mut writer, &mut ply)?;
    writer.flush()
}

/// Write polygons to a PLY file
pub fn write_polygons_file<P: AsRef<Path>>(polygons: &[Polygon], path: P, options: &PlyWriteOptions) -> Result<(), IoError> {
    let file = File::create(path)?;
    write_polygons(polygons, BufWriter::new(file), options)?;
    Ok(())
}
