//! CPU-side geometry descriptions handed to the renderer for upload.

use fnv::FnvHashSet;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    Triangles,
}

#[derive(Clone, Debug)]
pub struct GeometryDesc {
    pub label: &'static str,
    pub topology: Topology,
    pub positions: Vec<Vec3>,
    /// Per-vertex colors; the material color is used when absent.
    pub colors: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub indices: Option<Vec<u32>>,
}

impl GeometryDesc {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn points(label: &'static str, positions: Vec<Vec3>, colors: Vec<Vec3>) -> Self {
        Self {
            label,
            topology: Topology::Points,
            positions,
            colors: Some(colors),
            uvs: None,
            indices: None,
        }
    }

    /// Latitude/longitude sphere with equirectangular UVs.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut positions = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        let mut uvs = Vec::with_capacity(positions.capacity());
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let theta = v * PI;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let phi = u * TAU;
                positions.push(Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                ));
                uvs.push(Vec2::new(u, 1.0 - v));
            }
        }
        let row = ws + 1;
        let mut indices = Vec::with_capacity((ws * hs * 6) as usize);
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self {
            label: "sphere",
            topology: Topology::Triangles,
            positions,
            colors: None,
            uvs: Some(uvs),
            indices: Some(indices),
        }
    }

    /// Axis-aligned box centered at the origin, four vertices per face.
    pub fn cuboid(size: f32) -> Self {
        let h = size * 0.5;
        // (normal axis, u axis, v axis)
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let mut positions = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push((n + u * su + v * sv) * h);
                uvs.push(Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self {
            label: "cuboid",
            topology: Topology::Triangles,
            positions,
            colors: None,
            uvs: Some(uvs),
            indices: Some(indices),
        }
    }

    /// The twelve edges of a cube as a line list.
    pub fn cuboid_edges(size: f32) -> Self {
        let mut edges = Self::polyhedron_edges(Polyhedron::Hexahedron, 1.0);
        let h = size * 0.5;
        // Hexahedron corners sit at unit radius; rescale to half-extent `h`.
        let k = h * 3.0_f32.sqrt();
        for p in &mut edges.positions {
            *p *= k;
        }
        edges.label = "cuboid_edges";
        edges
    }

    /// Closed circle in the XZ plane as a line list.
    pub fn ring(radius: f32, segments: u32) -> Self {
        let n = segments.max(3);
        let positions = (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * TAU;
                Vec3::new(radius * a.cos(), 0.0, radius * a.sin())
            })
            .collect::<Vec<_>>();
        let indices = (0..n).flat_map(|i| [i, (i + 1) % n]).collect();
        Self {
            label: "ring",
            topology: Topology::Lines,
            positions,
            colors: None,
            uvs: None,
            indices: Some(indices),
        }
    }

    /// Camera-independent square used for icon markers.
    pub fn quad(size: f32) -> Self {
        let h = size * 0.5;
        Self {
            label: "quad",
            topology: Topology::Triangles,
            positions: vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            colors: None,
            uvs: Some(vec![
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            ]),
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
        }
    }

    /// Unique edges of an indexed triangle mesh as a line list sharing its vertices.
    pub fn wireframe_of(mesh: &GeometryDesc) -> Self {
        let mut seen = FnvHashSet::default();
        let mut lines = Vec::new();
        if let (Topology::Triangles, Some(idx)) = (mesh.topology, &mesh.indices) {
            for tri in idx.chunks_exact(3) {
                for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                    let key = (a.min(b), a.max(b));
                    if seen.insert(key) {
                        lines.extend_from_slice(&[key.0, key.1]);
                    }
                }
            }
        }
        Self {
            label: "wireframe",
            topology: Topology::Lines,
            positions: mesh.positions.clone(),
            colors: None,
            uvs: None,
            indices: Some(lines),
        }
    }

    /// Edge list of a platonic solid with circumradius `radius`.
    pub fn polyhedron_edges(kind: Polyhedron, radius: f32) -> Self {
        let verts = kind.vertices();
        // Edges of a platonic solid are exactly the vertex pairs at minimum distance.
        let mut min_d = f32::MAX;
        for i in 0..verts.len() {
            for j in (i + 1)..verts.len() {
                min_d = min_d.min(verts[i].distance(verts[j]));
            }
        }
        let mut indices = Vec::new();
        for i in 0..verts.len() {
            for j in (i + 1)..verts.len() {
                if (verts[i].distance(verts[j]) - min_d).abs() < 1e-3 {
                    indices.extend_from_slice(&[i as u32, j as u32]);
                }
            }
        }
        Self {
            label: kind.label(),
            topology: Topology::Lines,
            positions: verts.into_iter().map(|v| v * radius).collect(),
            colors: None,
            uvs: None,
            indices: Some(indices),
        }
    }

    /// Component-wise bounds of the positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polyhedron {
    Tetrahedron,
    Hexahedron,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl Polyhedron {
    pub const ALL: [Polyhedron; 5] = [
        Polyhedron::Tetrahedron,
        Polyhedron::Hexahedron,
        Polyhedron::Octahedron,
        Polyhedron::Dodecahedron,
        Polyhedron::Icosahedron,
    ];

    pub fn edge_count(self) -> usize {
        match self {
            Polyhedron::Tetrahedron => 6,
            Polyhedron::Hexahedron | Polyhedron::Octahedron => 12,
            Polyhedron::Dodecahedron | Polyhedron::Icosahedron => 30,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Polyhedron::Tetrahedron => "tetrahedron",
            Polyhedron::Hexahedron => "hexahedron",
            Polyhedron::Octahedron => "octahedron",
            Polyhedron::Dodecahedron => "dodecahedron",
            Polyhedron::Icosahedron => "icosahedron",
        }
    }

    /// Unit-circumradius vertices.
    fn vertices(self) -> Vec<Vec3> {
        let phi = (1.0 + 5.0_f32.sqrt()) * 0.5;
        let inv = 1.0 / phi;
        let raw: Vec<Vec3> = match self {
            Polyhedron::Tetrahedron => vec![
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
            ],
            Polyhedron::Hexahedron => {
                let mut v = Vec::with_capacity(8);
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            v.push(Vec3::new(x, y, z));
                        }
                    }
                }
                v
            }
            Polyhedron::Octahedron => vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ],
            Polyhedron::Dodecahedron => {
                let mut v = Vec::with_capacity(20);
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            v.push(Vec3::new(x, y, z));
                        }
                    }
                }
                for a in [-inv, inv] {
                    for b in [-phi, phi] {
                        v.push(Vec3::new(0.0, a, b));
                        v.push(Vec3::new(a, b, 0.0));
                        v.push(Vec3::new(b, 0.0, a));
                    }
                }
                v
            }
            Polyhedron::Icosahedron => {
                let mut v = Vec::with_capacity(12);
                for a in [-1.0, 1.0] {
                    for b in [-phi, phi] {
                        v.push(Vec3::new(0.0, a, b));
                        v.push(Vec3::new(a, b, 0.0));
                        v.push(Vec3::new(b, 0.0, a));
                    }
                }
                v
            }
        };
        raw.into_iter().map(|p| p.normalize()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platonic_edge_counts() {
        for kind in Polyhedron::ALL {
            let g = GeometryDesc::polyhedron_edges(kind, 1.0);
            let edges = g.indices.as_ref().map(|i| i.len() / 2).unwrap_or(0);
            assert_eq!(edges, kind.edge_count(), "{kind:?}");
        }
    }

    #[test]
    fn cube_edges_span_the_cube() {
        let g = GeometryDesc::cuboid_edges(2.0);
        let (lo, hi) = g.bounds().unwrap();
        assert!((lo - Vec3::splat(-1.0)).abs().max_element() < 1e-5);
        assert!((hi - Vec3::splat(1.0)).abs().max_element() < 1e-5);
        assert_eq!(g.indices.unwrap().len(), 24);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let g = GeometryDesc::uv_sphere(2.0, 16, 8);
        assert!(g.positions.iter().all(|p| (p.length() - 2.0).abs() < 1e-4));
        let idx = g.indices.as_ref().unwrap();
        assert_eq!(idx.len() % 3, 0);
        assert!(idx.iter().all(|&i| (i as usize) < g.positions.len()));
    }

    #[test]
    fn wireframe_shares_vertices_and_dedups_edges() {
        let quad = GeometryDesc::quad(1.0);
        let wire = GeometryDesc::wireframe_of(&quad);
        assert_eq!(wire.positions.len(), 4);
        // 4 border edges + 1 diagonal
        assert_eq!(wire.indices.unwrap().len(), 10);
    }

    #[test]
    fn ring_is_closed() {
        let g = GeometryDesc::ring(3.0, 8);
        let idx = g.indices.unwrap();
        assert_eq!(idx.len(), 16);
        assert_eq!(idx[15], 0);
    }
}
