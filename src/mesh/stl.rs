//! STL (Stereolithography) file format support.
//!
//! Reads both ASCII and binary STL and writes either encoding.
//!
//! # Format Detection
//!
//! A file is binary when its length is exactly `84 + 50 * n`, where `n` is
//! the triangle count stored after the 80-byte header. Otherwise a file
//! starting with `solid` is read as ASCII. Checking the size first matters
//! because plenty of binary exporters put `solid` in their header.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count
//! end
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{face_normal, IndexedMesh, Point3};
use crate::config::StlFormat;
use crate::error::{KeychainError, Result};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Text written into the binary header.
const HEADER_TEXT: &[u8] = b"Binary STL generated by spotify-keychain";

/// Load a mesh from an STL file.
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<IndexedMesh> {
    let bytes = std::fs::read(path.as_ref())?;
    read_stl(&bytes)
}

/// Parse STL bytes, detecting the encoding.
pub fn read_stl(bytes: &[u8]) -> Result<IndexedMesh> {
    if is_binary(bytes) {
        return read_binary(bytes);
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(HEADER_SIZE)]);
    if head.trim_start().starts_with("solid") {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| KeychainError::mesh(format!("ASCII STL is not valid UTF-8: {}", e)))?;
        return read_ascii(text);
    }

    if bytes.len() < HEADER_SIZE + 4 {
        return Err(KeychainError::mesh("file too small to be valid STL"));
    }
    read_binary(bytes)
}

fn declared_count(bytes: &[u8]) -> Option<usize> {
    let raw = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize)
}

fn is_binary(bytes: &[u8]) -> bool {
    declared_count(bytes)
        .and_then(|n| n.checked_mul(TRIANGLE_SIZE))
        .and_then(|body| body.checked_add(HEADER_SIZE + 4))
        .is_some_and(|expected| expected == bytes.len())
}

fn read_binary(bytes: &[u8]) -> Result<IndexedMesh> {
    let count = declared_count(bytes)
        .ok_or_else(|| KeychainError::mesh("binary STL header is truncated"))?;

    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if available < count {
        return Err(KeychainError::mesh(format!(
            "binary STL declares {} triangles but holds {}",
            count, available
        )));
    }

    let mut mesh = IndexedMesh::with_capacity(count * 3, count);
    for chunk in body.chunks_exact(TRIANGLE_SIZE).take(count) {
        // Normal (first 12 bytes) is recomputed on write.
        mesh.push_triangle(
            read_vertex(&chunk[12..24]),
            read_vertex(&chunk[24..36]),
            read_vertex(&chunk[36..48]),
        );
    }
    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> Point3<f64> {
    let f = |i: usize| f64::from(f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]));
    Point3::new(f(0), f(4), f(8))
}

fn read_ascii(text: &str) -> Result<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut corners: Vec<Point3<f64>> = Vec::with_capacity(3);
    let mut in_loop = false;

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let coords: Vec<f64> = parts
                    .take(3)
                    .map(str::parse::<f64>)
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| {
                        KeychainError::mesh(format!("line {}: bad vertex: {}", line_no + 1, e))
                    })?;
                if coords.len() != 3 {
                    return Err(KeychainError::mesh(format!(
                        "line {}: vertex needs three coordinates",
                        line_no + 1
                    )));
                }
                corners.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if let [a, b, c] = corners[..] {
                    mesh.push_triangle(a, b, c);
                } else {
                    return Err(KeychainError::mesh(format!(
                        "line {}: facet has {} vertices",
                        line_no + 1,
                        corners.len()
                    )));
                }
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(mesh)
}

/// Save a mesh to an STL file in the given encoding.
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, format: StlFormat) -> Result<()> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "keychain".to_string());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer, format, &name)?;
    writer.flush()?;
    Ok(())
}

/// Encode a mesh as STL into any writer.
pub fn write_stl<W: Write>(
    mesh: &IndexedMesh,
    writer: W,
    format: StlFormat,
    name: &str,
) -> Result<()> {
    match format {
        StlFormat::Binary => write_binary(mesh, writer),
        StlFormat::Ascii => write_ascii(mesh, writer, name),
    }
}

fn write_binary<W: Write>(mesh: &IndexedMesh, mut writer: W) -> Result<()> {
    let mut header = [b' '; HEADER_SIZE];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.face_count())
        .map_err(|_| KeychainError::mesh("too many triangles for binary STL"))?;
    writer.write_all(&count.to_le_bytes())?;

    for i in 0..mesh.face_count() {
        let [a, b, c] = mesh
            .triangle(i)
            .ok_or_else(|| KeychainError::mesh(format!("face {} has an invalid index", i)))?;
        let n = face_normal(&a, &b, &c);

        for value in [n.x, n.y, n.z, a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z] {
            writer.write_all(&(value as f32).to_le_bytes())?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

fn write_ascii<W: Write>(mesh: &IndexedMesh, mut writer: W, name: &str) -> Result<()> {
    writeln!(writer, "solid {}", name)?;
    for i in 0..mesh.face_count() {
        let [a, b, c] = mesh
            .triangle(i)
            .ok_or_else(|| KeychainError::mesh(format!("face {} has an invalid index", i)))?;
        let n = face_normal(&a, &b, &c);
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in [a, b, c] {
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {}", name)?;
    Ok(())
}
