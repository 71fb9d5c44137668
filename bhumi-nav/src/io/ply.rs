//! PLY point cloud reader.
//!
//! Supports `ascii`, `binary_little_endian` and `binary_big_endian` bodies.
//! Only the `vertex` element is read: `x`, `y`, `z` of any scalar type plus
//! optional `red`, `green`, `blue`. Other vertex properties are skipped, as
//! are elements declared before the vertices. Elements after the vertices
//! are never touched.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::cloud::PointCloud;
use crate::error::{NavError, Result};

fn format_err(msg: impl Into<String>) -> NavError {
    NavError::PointCloudFormat(format!("PLY: {}", msg.into()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Ascii,
    LittleEndian,
    BigEndian,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl Scalar {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => Scalar::I8,
            "uchar" | "uint8" => Scalar::U8,
            "short" | "int16" => Scalar::I16,
            "ushort" | "uint16" => Scalar::U16,
            "int" | "int32" => Scalar::I32,
            "uint" | "uint32" => Scalar::U32,
            "float" | "float32" => Scalar::F32,
            "double" | "float64" => Scalar::F64,
            _ => return None,
        })
    }

    fn size(self) -> usize {
        match self {
            Scalar::I8 | Scalar::U8 => 1,
            Scalar::I16 | Scalar::U16 => 2,
            Scalar::I32 | Scalar::U32 | Scalar::F32 => 4,
            Scalar::F64 => 8,
        }
    }

    /// `bytes.len()` must equal `self.size()`
    fn decode(self, bytes: &[u8], little: bool) -> f64 {
        macro_rules! num {
            ($t:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                if little {
                    <$t>::from_le_bytes(buf) as f64
                } else {
                    <$t>::from_be_bytes(buf) as f64
                }
            }};
        }
        match self {
            Scalar::I8 => num!(i8),
            Scalar::U8 => num!(u8),
            Scalar::I16 => num!(i16),
            Scalar::U16 => num!(u16),
            Scalar::I32 => num!(i32),
            Scalar::U32 => num!(u32),
            Scalar::F32 => num!(f32),
            Scalar::F64 => num!(f64),
        }
    }
}

#[derive(Clone, Debug)]
enum Property {
    Scalar { name: String, ty: Scalar },
    List { count: Scalar, item: Scalar },
}

#[derive(Clone, Debug)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
}

/// Column indices of the vertex fields we keep
struct VertexLayout {
    xyz: [usize; 3],
    rgb: Option<[usize; 3]>,
}

impl VertexLayout {
    fn new(vertex: &Element) -> Result<Self> {
        let find = |wanted: &str| {
            vertex
                .properties
                .iter()
                .position(|p| matches!(p, Property::Scalar { name, .. } if name == wanted))
        };
        let xyz = match (find("x"), find("y"), find("z")) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => return Err(format_err("vertex element lacks x/y/z properties")),
        };
        let rgb = match (find("red"), find("green"), find("blue")) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => None,
        };
        Ok(Self { xyz, rgb })
    }
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let mut line = String::new();
    let mut next_line = |line: &mut String| -> Result<bool> {
        line.clear();
        Ok(reader.read_line(line)? > 0)
    };

    if !next_line(&mut line)? || line.trim() != "ply" {
        return Err(format_err("missing 'ply' magic"));
    }

    let mut encoding = None;
    let mut elements: Vec<Element> = Vec::new();
    loop {
        if !next_line(&mut line)? {
            return Err(format_err("unexpected EOF in header"));
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["end_header"] => break,
            ["format", kind, _version] => {
                encoding = Some(match *kind {
                    "ascii" => Encoding::Ascii,
                    "binary_little_endian" => Encoding::LittleEndian,
                    "binary_big_endian" => Encoding::BigEndian,
                    other => return Err(format_err(format!("unknown format '{}'", other))),
                });
            }
            ["comment", ..] | ["obj_info", ..] | [] => {}
            ["element", name, count] => {
                let count = count
                    .parse()
                    .map_err(|_| format_err(format!("invalid element count '{}'", count)))?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            ["property", "list", count, item, _name] => {
                let property = Property::List {
                    count: Scalar::parse(count)
                        .ok_or_else(|| format_err(format!("unknown type '{}'", count)))?,
                    item: Scalar::parse(item)
                        .ok_or_else(|| format_err(format!("unknown type '{}'", item)))?,
                };
                elements
                    .last_mut()
                    .ok_or_else(|| format_err("property before any element"))?
                    .properties
                    .push(property);
            }
            ["property", ty, name] => {
                let property = Property::Scalar {
                    name: name.to_string(),
                    ty: Scalar::parse(ty)
                        .ok_or_else(|| format_err(format!("unknown type '{}'", ty)))?,
                };
                elements
                    .last_mut()
                    .ok_or_else(|| format_err("property before any element"))?
                    .properties
                    .push(property);
            }
            _ => return Err(format_err(format!("unexpected header line '{}'", line.trim()))),
        }
    }

    let encoding = encoding.ok_or_else(|| format_err("missing format line"))?;
    Ok(Header { encoding, elements })
}

/// Values of one element record, one f64 per scalar property. Lists are
/// consumed and reported as NaN.
trait RecordSource {
    fn record(&mut self, element: &Element, out: &mut Vec<f64>) -> Result<()>;
}

struct AsciiSource<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> RecordSource for AsciiSource<R> {
    fn record(&mut self, element: &Element, out: &mut Vec<f64>) -> Result<()> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(format_err(format!("unexpected EOF in '{}' data", element.name)));
        }
        let mut tokens = self.line.split_whitespace();
        let mut next = || -> Result<f64> {
            let token = tokens
                .next()
                .ok_or_else(|| format_err(format!("short '{}' record", element.name)))?;
            token
                .parse::<f64>()
                .map_err(|_| format_err(format!("invalid number '{}'", token)))
        };
        out.clear();
        for property in &element.properties {
            match property {
                Property::Scalar { .. } => out.push(next()?),
                Property::List { .. } => {
                    let n = next()? as usize;
                    for _ in 0..n {
                        next()?;
                    }
                    out.push(f64::NAN);
                }
            }
        }
        Ok(())
    }
}

struct BinarySource<R> {
    reader: R,
    little: bool,
    buf: [u8; 8],
}

impl<R: Read> BinarySource<R> {
    fn read(&mut self, ty: Scalar) -> Result<f64> {
        let bytes = &mut self.buf[..ty.size()];
        self.reader
            .read_exact(bytes)
            .map_err(|_| format_err("unexpected EOF in binary data"))?;
        Ok(ty.decode(bytes, self.little))
    }
}

impl<R: Read> RecordSource for BinarySource<R> {
    fn record(&mut self, element: &Element, out: &mut Vec<f64>) -> Result<()> {
        out.clear();
        for property in &element.properties {
            match *property {
                Property::Scalar { ty, .. } => {
                    let v = self.read(ty)?;
                    out.push(v);
                }
                Property::List { count, item } => {
                    let n = self.read(count)? as usize;
                    for _ in 0..n {
                        self.read(item)?;
                    }
                    out.push(f64::NAN);
                }
            }
        }
        Ok(())
    }
}

/// Upper bound on vertices reserved up front; header counts are untrusted.
const MAX_PREALLOC: usize = 1 << 20;

fn read_vertices(header: &Header, source: &mut dyn RecordSource) -> Result<PointCloud> {
    let mut record = Vec::new();
    for element in &header.elements {
        if element.name != "vertex" {
            for _ in 0..element.count {
                source.record(element, &mut record)?;
            }
            continue;
        }

        let layout = VertexLayout::new(element)?;
        let reserve = element.count.min(MAX_PREALLOC);
        let mut points = Vec::with_capacity(reserve);
        let mut colors = layout.rgb.map(|_| Vec::with_capacity(reserve));
        for _ in 0..element.count {
            source.record(element, &mut record)?;
            let [x, y, z] = layout.xyz;
            points.push(Point3::new(record[x], record[y], record[z]));
            if let (Some(rgb), Some(colors)) = (layout.rgb, colors.as_mut()) {
                colors.push(rgb.map(|i| record[i].round().clamp(0.0, 255.0) as u8));
            }
        }
        return match colors {
            Some(colors) => PointCloud::with_colors(points, colors),
            None => Ok(PointCloud::new(points)),
        };
    }
    Err(format_err("no vertex element"))
}

/// Read a PLY cloud from a reader
pub fn read_ply<R: BufRead>(mut reader: R) -> Result<PointCloud> {
    let header = parse_header(&mut reader)?;
    let cloud = match header.encoding {
        Encoding::Ascii => read_vertices(
            &header,
            &mut AsciiSource {
                reader,
                line: String::new(),
            },
        )?,
        Encoding::LittleEndian | Encoding::BigEndian => read_vertices(
            &header,
            &mut BinarySource {
                reader,
                little: header.encoding == Encoding::LittleEndian,
                buf: [0; 8],
            },
        )?,
    };
    log::debug!(
        "[Ply] Read {} vertices ({:?}, colors: {})",
        cloud.len(),
        header.encoding,
        cloud.colors().is_some()
    );
    Ok(cloud)
}

/// Read a PLY cloud from a file
pub fn load_ply(path: &Path) -> Result<PointCloud> {
    read_ply(BufReader::new(File::open(path)?))
}

/// Write a cloud as ASCII PLY
pub fn write_ply<W: Write>(writer: &mut W, cloud: &PointCloud) -> Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    if cloud.colors().is_some() {
        writeln!(writer, "property uchar red")?;
        writeln!(writer, "property uchar green")?;
        writeln!(writer, "property uchar blue")?;
    }
    writeln!(writer, "end_header")?;

    for (i, p) in cloud.points().iter().enumerate() {
        write!(writer, "{} {} {}", p.x, p.y, p.z)?;
        if let Some(colors) = cloud.colors() {
            let [r, g, b] = colors[i];
            write!(writer, " {} {} {}", r, g, b)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
