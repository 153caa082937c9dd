//! STEP (ISO 10303) import.
//!
//! Base models are authored in CAD and exported as STEP. The file is parsed
//! with `ruststep` (through `truck-stepio`), every shell is converted to a
//! truck B-rep and tessellated with `truck-meshalgo`, and the triangles are
//! appended to one [`IndexedMesh`].
//!
//! Each shell is meshed twice. The coarse mesh only measures the shell, and
//! [`fine_tolerance`] turns its size into the tolerance of the kept mesh.

use std::path::Path;

use truck_meshalgo::prelude::*;
use truck_polymesh::PolygonMesh;
use truck_stepio::r#in::Table;

use super::{IndexedMesh, Point3};
use crate::error::{KeychainError, Result};

/// Tolerance of the first, bounding-box-only tessellation pass
const COARSE_TOLERANCE: f64 = 0.01;

/// Final tolerance as a fraction of the bounding box diameter
const RELATIVE_TOLERANCE: f64 = 0.001;

/// Load and tessellate a STEP file.
pub fn load_step<P: AsRef<Path>>(path: P) -> Result<IndexedMesh> {
    let path = path.as_ref();
    let step_string = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KeychainError::BaseModelNotFound {
                path: path.to_path_buf(),
            }
        } else {
            KeychainError::Io(e)
        }
    })?;

    read_step(&step_string)
}

/// Tessellate STEP text.
pub fn read_step(step_string: &str) -> Result<IndexedMesh> {
    let exchange = truck_stepio::r#in::ruststep::parser::parse(step_string)
        .map_err(|e| KeychainError::mesh(format!("failed to parse STEP file: {}", e)))?;

    if exchange.data.is_empty() {
        return Err(KeychainError::mesh("STEP file contains no data sections"));
    }

    let table = Table::from_data_section(&exchange.data[0]);

    let mut mesh = IndexedMesh::new();
    let mut skipped = 0usize;

    for holder in table.shell.values() {
        let Ok(shell) = table.to_compressed_shell(holder) else {
            skipped += 1;
            continue;
        };

        let size = shell
            .robust_triangulation(COARSE_TOLERANCE)
            .to_polygon()
            .bounding_box()
            .diameter();
        let shell_mesh = shell.robust_triangulation(fine_tolerance(size)).to_polygon();
        append_polymesh(&shell_mesh, &mut mesh);
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} STEP shells that failed to convert", skipped);
    }

    if mesh.is_empty() {
        return Err(KeychainError::mesh(
            "STEP file contains no geometry or tessellation failed",
        ));
    }

    tracing::debug!(
        "Tessellated STEP into {} triangles ({} vertices)",
        mesh.face_count(),
        mesh.vertex_count()
    );

    Ok(mesh)
}

/// Tessellation tolerance for a shell of the given bounding-box diameter
///
/// Empty or degenerate shells report a non-positive or infinite diameter;
/// they fall back to the coarse tolerance.
pub fn fine_tolerance(diameter: f64) -> f64 {
    let tolerance = diameter * RELATIVE_TOLERANCE;
    if tolerance.is_finite() && tolerance > 0.0 {
        tolerance
    } else {
        COARSE_TOLERANCE
    }
}

/// Append a truck `PolygonMesh`; quads become two triangles.
#[allow(clippy::cast_possible_truncation)]
fn append_polymesh(poly: &PolygonMesh, mesh: &mut IndexedMesh) {
    let offset = mesh.vertices.len() as u32;
    let index = |v: &truck_polymesh::StandardVertex| v.pos as u32 + offset;

    mesh.vertices
        .extend(poly.positions().iter().map(|p| Point3::new(p.x, p.y, p.z)));
    mesh.faces
        .extend(poly.tri_faces().iter().map(|t| [index(&t[0]), index(&t[1]), index(&t[2])]));
    for q in poly.quad_faces() {
        mesh.faces.push([index(&q[0]), index(&q[1]), index(&q[2])]);
        mesh.faces.push([index(&q[0]), index(&q[2]), index(&q[3])]);
    }
}
