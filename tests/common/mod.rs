//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};
use spotify_keychain::config::StlFormat;
use spotify_keychain::mesh::stl::save_stl;
use spotify_keychain::mesh::{IndexedMesh, Point3};

/// A track ID that parses as a direct link
pub const TRACK_ID: &str = "4cOdK2wGLETKBW3PvgPWqT";

/// Heights (in units) painted by [`code_image`]
pub const CODE_UNITS: [u32; 23] = [
    1, 3, 5, 8, 2, 4, 7, 1, 6, 3, 2, 8, 5, 1, 4, 6, 2, 7, 3, 5, 1, 8, 4,
];

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_millis(100)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

pub fn track_url() -> String {
    format!("https://open.spotify.com/track/{}?si=abc123", TRACK_ID)
}

/// Paint a 640x160 code image: one 8px bar per unit height, 20px per unit
pub fn code_image(units: &[u32]) -> RgbImage {
    let mut img = RgbImage::from_pixel(640, 160, Rgb([0, 0, 0]));
    for (i, &u) in units.iter().enumerate() {
        let x0 = 170 + i as u32 * 19;
        let height = u * 20;
        let y0 = (160 - height) / 2;
        for x in x0..x0 + 8 {
            for y in y0..y0 + height {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
    }
    img
}

/// Encode an image as PNG bytes
pub fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding failed");
    bytes
}

/// The standard synthetic code as PNG bytes
pub fn code_png() -> Vec<u8> {
    png_bytes(&code_image(&CODE_UNITS))
}

/// Closed axis-aligned box with outward facing triangles
pub fn box_mesh(min: [f64; 3], max: [f64; 3]) -> IndexedMesh {
    let p = |x: usize, y: usize, z: usize| {
        Point3::new(
            if x == 0 { min[0] } else { max[0] },
            if y == 0 { min[1] } else { max[1] },
            if z == 0 { min[2] } else { max[2] },
        )
    };

    let mut mesh = IndexedMesh::new();
    let quads = [
        [p(0, 0, 0), p(0, 1, 0), p(1, 1, 0), p(1, 0, 0)], // -z
        [p(0, 0, 1), p(1, 0, 1), p(1, 1, 1), p(0, 1, 1)], // +z
        [p(0, 0, 0), p(1, 0, 0), p(1, 0, 1), p(0, 0, 1)], // -y
        [p(0, 1, 0), p(0, 1, 1), p(1, 1, 1), p(1, 1, 0)], // +y
        [p(0, 0, 0), p(0, 0, 1), p(0, 1, 1), p(0, 1, 0)], // -x
        [p(1, 0, 0), p(1, 1, 0), p(1, 1, 1), p(1, 0, 1)], // +x
    ];
    for [a, b, c, d] in quads {
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
    }
    mesh
}

/// Plate under the default relief layout: 60 x 15 x 3 mm, top face at z = 0
pub fn keychain_plate() -> IndexedMesh {
    box_mesh([0.0, 0.0, -3.0], [60.0, 15.0, 0.0])
}

/// Write the plate as a binary STL into `dir`
pub fn write_plate(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    save_stl(&keychain_plate(), &path, StlFormat::Binary).expect("writing base model failed");
    path
}
