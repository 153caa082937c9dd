//! Triangle meshes and mesh file formats
//!
//! The keychain is assembled as an [`IndexedMesh`]: a base model loaded from
//! STEP or STL plus the relief bars built in [`crate::keychain`].
//!
//! # Coordinate System
//!
//! Right-handed, millimetres, Z up. Faces wind counter-clockwise when viewed
//! from outside, so normals point outward by the right-hand rule.
//!
//! # Submodules
//!
//! - [`stl`] - ASCII and binary STL reading and writing
//! - `step` - STEP import through the truck CAD kernel (feature `step`)

#[cfg(feature = "step")]
pub mod step;
pub mod stl;

pub use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for no points
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let first = points.next()?;
        let mut bounds = Self::new(*first, *first);
        for p in points {
            bounds.expand_to_include(p);
        }
        Some(bounds)
    }

    pub fn expand_to_include(&mut self, p: &Point3<f64>) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the diagonal
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Triangle mesh with indexed vertices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Append a vertex and return its index
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, p: Point3<f64>) -> u32 {
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    /// Append a triangle as three fresh vertices
    pub fn push_triangle(&mut self, a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) {
        let i = self.push_vertex(a);
        self.push_vertex(b);
        self.push_vertex(c);
        self.faces.push([i, i + 1, i + 2]);
    }

    /// Append all vertices and faces of `other`
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &IndexedMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter())
    }

    /// Corner positions of face `index`
    pub fn triangle(&self, index: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.faces.get(index)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        (0..self.faces.len()).filter_map(move |i| self.triangle(i))
    }

    /// Signed volume (positive for outward-wound closed meshes)
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    pub fn surface_area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() / 2.0)
            .sum()
    }

    /// Check that every face references an existing vertex
    pub fn indices_valid(&self) -> bool {
        let n = self.vertices.len();
        self.faces.iter().flatten().all(|&i| (i as usize) < n)
    }
}

/// Outward unit normal of a triangle, zero for degenerate triangles
pub fn face_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > f64::EPSILON {
        n / len
    } else {
        Vector3::zeros()
    }
}
