// Geometry generators for Starfield-3D
//
// Texture coordinates use the wgpu convention: (0, 0) is the top-left texel.

use std::f32::consts::{PI, TAU};

/// Vertex layout shared by every mesh
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// CPU-side triangle list, counter-clockwise front faces.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Ring in the XY plane around the Z axis.
///
/// `radius` is the distance from the centre to the middle of the tube,
/// `tube` the tube radius.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;

            let x = (radius + tube * v.cos()) * u.cos();
            let y = (radius + tube * v.cos()) * u.sin();
            let z = tube * v.sin();

            // Normal points away from the tube centre line
            let cx = radius * u.cos();
            let cy = radius * u.sin();
            let normal = normalize([x - cx, y - cy, z]);

            mesh.vertices.push(Vertex::new(
                [x, y, z],
                normal,
                [
                    i as f32 / tubular_segments as f32,
                    1.0 - j as f32 / radial_segments as f32,
                ],
            ));
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;

            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh
}

/// UV sphere centred on the origin.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = MeshData::default();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;

            let x = -(u * TAU).cos() * (v * PI).sin();
            let y = (v * PI).cos();
            let z = (u * TAU).sin() * (v * PI).sin();

            mesh.vertices.push(Vertex::new(
                [x * radius, y * radius, z * radius],
                normalize([x, y, z]),
                [u, v],
            ));
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            // Skip the degenerate triangle at each pole
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh
}

/// Axis-aligned box centred on the origin, one full texture per face.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);

    // Each face lists bottom-left, bottom-right, top-right, top-left as seen from outside
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([ 1.0,  0.0,  0.0], [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([-1.0,  0.0,  0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
        ([ 0.0,  1.0,  0.0], [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([ 0.0, -1.0,  0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
        ([ 0.0,  0.0,  1.0], [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([ 0.0,  0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut mesh = MeshData::default();
    for (normal, corners) in faces {
        let base = mesh.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(UVS) {
            mesh.vertices.push(Vertex::new(corner, normal, uv));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    mesh
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn assert_unit_normals(mesh: &MeshData) {
        for vertex in &mesh.vertices {
            assert_relative_eq!(Vec3::from(vertex.normal).length(), 1.0, epsilon = 1e-4);
        }
    }

    fn assert_indices_in_range(mesh: &MeshData) {
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    /// Front faces must wind counter-clockwise when seen from outside.
    fn assert_outward_winding(mesh: &MeshData, centre: impl Fn(Vec3) -> Vec3) {
        for tri in mesh.indices.chunks(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(mesh.vertices[i as usize].position))
                .collect();
            let face_normal = (p[1] - p[0]).cross(p[2] - p[0]);
            if face_normal.length() < 1e-6 {
                continue;
            }
            let mid = (p[0] + p[1] + p[2]) / 3.0;
            assert!(face_normal.dot(mid - centre(mid)) > 0.0);
        }
    }

    #[test]
    fn torus_counts() {
        let mesh = torus(10.0, 3.0, 16, 100);
        assert_eq!(mesh.vertices.len(), 17 * 101);
        assert_eq!(mesh.triangle_count(), 16 * 100 * 2);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
    }

    #[test]
    fn torus_extent() {
        let mesh = torus(10.0, 3.0, 16, 100);
        let max_r = mesh
            .vertices
            .iter()
            .map(|v| Vec3::from(v.position).truncate().length())
            .fold(0.0_f32, f32::max);
        assert_relative_eq!(max_r, 13.0, epsilon = 1e-3);
        assert!(mesh.vertices.iter().all(|v| v.position[2].abs() <= 3.0 + 1e-4));
    }

    #[test]
    fn torus_faces_point_outward() {
        let mesh = torus(10.0, 3.0, 16, 100);
        assert_outward_winding(&mesh, |p| p.truncate().normalize().extend(0.0) * 10.0);
    }

    #[test]
    fn sphere_counts_and_radius() {
        let mesh = sphere(3.0, 32, 32);
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.triangle_count(), 2 * 32 * 31);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        for vertex in &mesh.vertices {
            assert_relative_eq!(Vec3::from(vertex.position).length(), 3.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn sphere_faces_point_outward() {
        assert_outward_winding(&sphere(0.25, 24, 24), |_| Vec3::ZERO);
    }

    #[test]
    fn cuboid_counts_and_extent() {
        let mesh = cuboid(3.0, 3.0, 3.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 1.5)));
    }

    #[test]
    fn cuboid_faces_point_outward() {
        assert_outward_winding(&cuboid(3.0, 2.0, 1.0), |_| Vec3::ZERO);
    }
}
