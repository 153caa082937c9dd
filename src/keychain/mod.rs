//! Parametric relief for the keychain
//!
//! Each code bar becomes a slot: a stadium footprint (a rectangle capped by
//! two semicircles) extruded along +Z. Slots stand side by side along X and
//! run lengthwise along Y, so the relief reads like the printed code.
//!
//! The relief is merged with the base model as overlapping closed shells.
//! No boolean union is computed.

use std::f64::consts::PI;

use nalgebra::Point2;

use crate::config::ReliefLayout;
use crate::error::{KeychainError, Result};
use crate::mesh::{IndexedMesh, Point3};

/// Stadium outline, counter-clockwise seen from +Z
///
/// The upper arc is centred at `center.y + length / 2`, the lower one at
/// `center.y - length / 2`. Each arc has `segments + 1` points.
fn slot_outline(center: Point2<f64>, length: f64, radius: f64, segments: usize) -> Vec<Point2<f64>> {
    let half = length / 2.0;
    let mut outline = Vec::with_capacity(2 * (segments + 1));

    for (arc_y, start) in [(center.y + half, 0.0), (center.y - half, PI)] {
        for i in 0..=segments {
            let angle = start + PI * i as f64 / segments as f64;
            outline.push(Point2::new(
                center.x + radius * angle.cos(),
                arc_y + radius * angle.sin(),
            ));
        }
    }

    outline
}

/// Closed slot prism spanning `z0 .. z0 + depth`
///
/// `length` is the distance between the arc centres and `width` the arc
/// diameter. Faces wind outward.
pub fn slot_prism(
    center: Point2<f64>,
    length: f64,
    width: f64,
    depth: f64,
    z0: f64,
    segments: usize,
) -> Result<IndexedMesh> {
    if !(width > 0.0 && width.is_finite()) {
        return Err(KeychainError::mesh(format!("invalid slot width {}", width)));
    }
    if !(depth > 0.0 && depth.is_finite()) {
        return Err(KeychainError::mesh(format!("invalid slot depth {}", depth)));
    }
    if !(length >= 0.0 && length.is_finite()) {
        return Err(KeychainError::mesh(format!("invalid slot length {}", length)));
    }

    let segments = segments.max(1);
    let outline = slot_outline(center, length, width / 2.0, segments);
    let n = outline.len() as u32;
    let z1 = z0 + depth;

    let mut mesh = IndexedMesh::with_capacity(2 * outline.len() + 2, 4 * outline.len());

    // Rings: bottom 0..n, top n..2n
    for z in [z0, z1] {
        for p in &outline {
            mesh.push_vertex(Point3::new(p.x, p.y, z));
        }
    }
    let bottom_center = mesh.push_vertex(Point3::new(center.x, center.y, z0));
    let top_center = mesh.push_vertex(Point3::new(center.x, center.y, z1));

    for i in 0..n {
        let next = (i + 1) % n;
        let (b0, b1) = (i, next);
        let (t0, t1) = (n + i, n + next);

        mesh.faces.push([bottom_center, b1, b0]);
        mesh.faces.push([top_center, t0, t1]);
        mesh.faces.push([b0, b1, t1]);
        mesh.faces.push([b0, t1, t0]);
    }

    Ok(mesh)
}

/// One slot per bar, left to right
pub fn build_relief(bars: &[f64], layout: &ReliefLayout) -> Result<IndexedMesh> {
    let mut relief = IndexedMesh::new();

    for (i, &height) in bars.iter().enumerate() {
        let (x, y) = layout.bar_center(i);
        let slot = slot_prism(
            Point2::new(x, y),
            layout.bar_length(height),
            layout.slot_width,
            layout.depth,
            layout.base_z,
            layout.arc_segments,
        )
        .map_err(|e| e.with_context(format!("bar {} (height {})", i, height)))?;
        relief.merge(&slot);
    }

    Ok(relief)
}

/// Base model with the relief bars added
pub fn compose_keychain(
    base: &IndexedMesh,
    bars: &[f64],
    layout: &ReliefLayout,
) -> Result<IndexedMesh> {
    let relief = build_relief(bars, layout)?;

    let mut model = IndexedMesh::with_capacity(
        base.vertex_count() + relief.vertex_count(),
        base.face_count() + relief.face_count(),
    );
    model.merge(base);
    model.merge(&relief);

    tracing::debug!(
        "Composed keychain: {} base + {} relief triangles",
        base.face_count(),
        relief.face_count()
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Area of the polygonal stadium built with `segments` per arc
    fn outline_area(length: f64, radius: f64, segments: usize) -> f64 {
        let n = segments as f64;
        n * radius * radius * (PI / n).sin() + 2.0 * radius * length
    }

    #[test]
    fn test_slot_volume() {
        let mesh = slot_prism(Point2::new(3.0, -2.0), 5.0, 1.0, 4.0, 0.0, 16).unwrap();
        let expected = outline_area(5.0, 0.5, 16) * 4.0;
        assert!((mesh.signed_volume() - expected).abs() < 1e-9);
        assert!(mesh.indices_valid());
    }

    #[test]
    fn test_slot_bounds() {
        let mesh = slot_prism(Point2::new(10.0, 7.5), 9.0, 1.0, 4.0, 1.0, 8).unwrap();
        let b = mesh.bounds().unwrap();
        assert!((b.min.x - 9.5).abs() < 1e-12);
        assert!((b.max.x - 10.5).abs() < 1e-12);
        assert!((b.min.y - (7.5 - 4.5 - 0.5)).abs() < 1e-12);
        assert!((b.max.y - (7.5 + 4.5 + 0.5)).abs() < 1e-12);
        assert_eq!(b.min.z, 1.0);
        assert_eq!(b.max.z, 5.0);
    }

    #[test]
    fn test_slot_is_closed() {
        // Every edge of a closed mesh is shared by exactly two faces,
        // traversed once in each direction.
        let mesh = slot_prism(Point2::new(0.0, 0.0), 2.0, 1.0, 1.0, 0.0, 6).unwrap();
        let mut edges = std::collections::HashMap::new();
        for &[a, b, c] in &mesh.faces {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *edges.entry((u, v)).or_insert(0) += 1;
            }
        }
        for (&(u, v), &count) in &edges {
            assert_eq!(count, 1);
            assert_eq!(edges.get(&(v, u)), Some(&1));
        }
    }

    #[test]
    fn test_single_segment_is_a_box() {
        let mesh = slot_prism(Point2::new(0.0, 0.0), 2.0, 1.0, 3.0, 0.0, 0).unwrap();
        assert!((mesh.signed_volume() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_dimensions() {
        let c = Point2::new(0.0, 0.0);
        assert!(slot_prism(c, 1.0, 0.0, 1.0, 0.0, 8).is_err());
        assert!(slot_prism(c, 1.0, 1.0, -1.0, 0.0, 8).is_err());
        assert!(slot_prism(c, f64::NAN, 1.0, 1.0, 0.0, 8).is_err());
    }

    #[test]
    fn test_relief_positions_bars() {
        let layout = ReliefLayout::default();
        let relief = build_relief(&[1.0, 8.0, 3.0], &layout).unwrap();

        let expected: f64 = [1.0, 8.0, 3.0]
            .iter()
            .map(|&h| outline_area(layout.bar_length(h), 0.5, layout.arc_segments) * layout.depth)
            .sum();
        assert!((relief.volume() - expected).abs() < 1e-9);

        let b = relief.bounds().unwrap();
        assert!((b.min.x - (15.5 - 0.5)).abs() < 1e-12);
        assert!((b.max.x - (15.5 + 2.0 * 1.88 + 0.5)).abs() < 1e-9);
        // Tallest bar sets the Y extent
        assert!((b.max.y - (7.5 + 8.0 * 0.9 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_compose_keeps_base() {
        let base = crate::mesh::tests::unit_cube();
        let model = compose_keychain(&base, &[2.0, 2.0], &ReliefLayout::default()).unwrap();
        let relief = build_relief(&[2.0, 2.0], &ReliefLayout::default()).unwrap();

        assert_eq!(model.face_count(), base.face_count() + relief.face_count());
        assert!((model.volume() - (1.0 + relief.volume())).abs() < 1e-9);
        assert!(model.indices_valid());
    }

    #[test]
    fn test_empty_bars() {
        let relief = build_relief(&[], &ReliefLayout::default()).unwrap();
        assert!(relief.is_empty());
    }
}
