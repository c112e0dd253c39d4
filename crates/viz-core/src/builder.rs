//! Scene Builder: one parametrized construction path for every widget kind.
//!
//! `blueprint` is pure (seeded RNG, no GPU); `build` acquires resources for a
//! blueprint and wraps them in a [`SceneInstance`].

use crate::animate::AnimationState;
use crate::camera::Camera;
use crate::color::hsl_to_rgb;
use crate::constants::*;
use crate::geometry::{GeometryDesc, Polyhedron};
use crate::instance::{PendingTexture, SceneInstance};
use crate::material::MaterialDesc;
use crate::registry::{GeometryId, MaterialId, ResourceRegistry};
use crate::renderer::Renderer;
use crate::scene::{
    BloomSettings, ElementRole, HueRange, Light, Lights, OrbitItem, SceneConfig, SceneGraph,
    SceneKind, SceneTag, SurfaceSize, Transform, VisualElement,
};
use glam::Vec3;
use rand::prelude::*;
use std::f32::consts::TAU;

/// Everything needed to instantiate a scene, before any GPU allocation.
#[derive(Clone, Debug)]
pub struct SceneBlueprint {
    pub tag: SceneTag,
    pub graph: SceneGraph,
    pub geometries: Vec<GeometryDesc>,
    /// `None` slots are filled later (texture-backed materials).
    pub materials: Vec<Option<MaterialDesc>>,
    pub anim: AnimationState,
    pub(crate) pending_texture: Option<PendingTexture>,
}

impl SceneBlueprint {
    fn new(tag: SceneTag, camera: Camera) -> Self {
        Self {
            tag,
            graph: SceneGraph {
                camera,
                lights: Lights::new(),
                post: None,
                root: Transform::default(),
                elements: Vec::new(),
            },
            geometries: Vec::new(),
            materials: Vec::new(),
            anim: AnimationState::default(),
            pending_texture: None,
        }
    }

    fn geometry(&mut self, desc: GeometryDesc) -> GeometryId {
        self.geometries.push(desc);
        GeometryId(self.geometries.len() - 1)
    }

    fn material(&mut self, desc: Option<MaterialDesc>) -> MaterialId {
        self.materials.push(desc);
        MaterialId(self.materials.len() - 1)
    }

    fn element(&mut self, element: VisualElement) -> usize {
        self.graph.elements.push(element);
        self.graph.elements.len() - 1
    }

    pub fn texture_url(&self) -> Option<&str> {
        self.pending_texture.as_ref().map(|p| p.url.as_str())
    }
}

/// Build a populated scene instance for `config`, sized to `surface`.
pub fn build<R: Renderer>(
    config: &SceneConfig,
    renderer: R,
    surface: SurfaceSize,
    registry: &ResourceRegistry,
) -> SceneInstance<R> {
    SceneInstance::from_blueprint(blueprint(config, surface), renderer, surface, registry)
}

pub fn blueprint(config: &SceneConfig, surface: SurfaceSize) -> SceneBlueprint {
    let mut rng = StdRng::seed_from_u64(config.seed_or_default());
    let aspect = surface.aspect();
    let bp = match &config.kind {
        SceneKind::ParticleField { count, color_range } => {
            particle_field(&mut rng, *count, *color_range, aspect)
        }
        SceneKind::TechOrbit { items } => tech_orbit(items, aspect),
        SceneKind::TexturedSphere { image_url } => textured_sphere(image_url, aspect),
        SceneKind::WireframeCube => wireframe_cube(aspect),
        SceneKind::BloomBackground => bloom_background(&mut rng, aspect),
    };
    log::info!(
        "[builder] {} blueprint: {} elements, {} geometries",
        bp.tag.name(),
        bp.graph.elements.len(),
        bp.geometries.len()
    );
    bp
}

fn random_point(rng: &mut StdRng, edge: f32) -> Vec3 {
    let h = edge * 0.5;
    Vec3::new(rng.gen_range(-h..h), rng.gen_range(-h..h), rng.gen_range(-h..h))
}

fn particle_field(rng: &mut StdRng, count: usize, hues: HueRange, aspect: f32) -> SceneBlueprint {
    let mut bp = SceneBlueprint::new(
        SceneTag::ParticleField,
        Camera::looking_at_origin(Vec3::new(0.0, 0.0, CAMERA_Z), aspect),
    );
    let (lo, hi) = hues.sanitized().ordered();
    let count = count.min(MAX_PARTICLE_COUNT);
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    for _ in 0..count {
        positions.push(random_point(rng, PARTICLE_SPREAD));
        let hue = rng.gen_range(lo..=hi);
        colors.push(hsl_to_rgb(hue, PARTICLE_SATURATION, PARTICLE_LIGHTNESS));
    }
    let geometry = bp.geometry(GeometryDesc::points("particle_field", positions.clone(), colors));
    let material = bp.material(Some(MaterialDesc::points(PARTICLE_SIZE, PARTICLE_OPACITY)));
    let mut particles = VisualElement::new(ElementRole::Particles, geometry, Some(material));
    particles.opacity = PARTICLE_OPACITY;
    particles.positions = Some(positions);
    bp.element(particles);
    bp
}

/// Marker angle for item `index` of `total`, evenly spaced around the circle.
#[inline]
pub fn orbit_angle(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    index as f32 / total as f32 * TAU
}

fn tech_orbit(items: &[OrbitItem], aspect: f32) -> SceneBlueprint {
    let mut bp = SceneBlueprint::new(
        SceneTag::TechOrbit,
        Camera::looking_at_origin(Vec3::new(0.0, 0.0, CAMERA_Z), aspect),
    );
    bp.graph.lights.push(Light::Ambient {
        color: Vec3::ONE,
        intensity: AMBIENT_INTENSITY,
    });
    let total = items.len();
    let ring = bp.geometry(GeometryDesc::ring(ORBIT_RADIUS, ORBIT_RING_SEGMENTS));
    let marker = bp.geometry(GeometryDesc::quad(ORBIT_MARKER_SIZE));
    for (index, item) in items.iter().enumerate() {
        let color = item
            .color
            .map(Vec3::from)
            .unwrap_or_else(|| hsl_to_rgb(index as f32 / total as f32, 0.7, 0.6));

        let ring_mat = bp.material(Some(MaterialDesc::line(Vec3::ONE, ORBIT_RING_OPACITY)));
        let mut ring_el = VisualElement::new(ElementRole::OrbitRing { index }, ring, Some(ring_mat));
        ring_el.opacity = ORBIT_RING_OPACITY;
        bp.element(ring_el);

        let angle = orbit_angle(index, total);
        let marker_mat = bp.material(Some(MaterialDesc::basic(color, 1.0)));
        let mut marker_el = VisualElement::new(ElementRole::Marker { index }, marker, Some(marker_mat));
        marker_el.transform = Transform::at(Vec3::new(
            ORBIT_RADIUS * angle.cos(),
            0.0,
            ORBIT_RADIUS * angle.sin(),
        ));
        marker_el.color = color;
        bp.element(marker_el);
    }
    bp
}

fn textured_sphere(url: &str, aspect: f32) -> SceneBlueprint {
    let mut bp = SceneBlueprint::new(
        SceneTag::TexturedSphere,
        Camera::looking_at_origin(Vec3::new(0.0, 0.0, CAMERA_Z), aspect),
    );
    bp.graph.lights.push(Light::Ambient {
        color: Vec3::ONE,
        intensity: AMBIENT_INTENSITY,
    });
    bp.graph.lights.push(Light::Directional {
        color: Vec3::ONE,
        intensity: DIRECTIONAL_INTENSITY,
        position: Vec3::new(5.0, 3.0, 5.0),
    });
    let sphere_desc = GeometryDesc::uv_sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS);
    let wire_desc = GeometryDesc::wireframe_of(&sphere_desc);
    let sphere_geo = bp.geometry(sphere_desc);
    let wire_geo = bp.geometry(wire_desc);
    // Both materials wait for the texture; until then the elements are inert.
    let sphere_mat = bp.material(None);
    let wire_mat = bp.material(None);
    bp.element(VisualElement::new(ElementRole::Sphere, sphere_geo, None));
    let mut wire = VisualElement::new(ElementRole::SphereWireframe, wire_geo, None);
    wire.transform.scale = Vec3::splat(SPHERE_WIREFRAME_SCALE);
    wire.opacity = SPHERE_WIREFRAME_OPACITY;
    bp.element(wire);
    bp.pending_texture = Some(PendingTexture {
        url: url.to_owned(),
        sphere_material: sphere_mat,
        wire_material: wire_mat,
    });
    bp
}

fn wireframe_cube(aspect: f32) -> SceneBlueprint {
    let mut bp = SceneBlueprint::new(
        SceneTag::WireframeCube,
        Camera::looking_at_origin(Vec3::new(0.0, 0.0, CAMERA_Z), aspect),
    );
    let fill_color = hsl_to_rgb(0.0, CUBE_SATURATION, CUBE_LIGHTNESS);
    let edge_color = hsl_to_rgb(CUBE_EDGE_HUE_OFFSET, CUBE_SATURATION, CUBE_LIGHTNESS);
    let fill_geo = bp.geometry(GeometryDesc::cuboid(CUBE_SIZE));
    let edge_geo = bp.geometry(GeometryDesc::cuboid_edges(CUBE_SIZE));
    let fill_mat = bp.material(Some(MaterialDesc::basic(fill_color, CUBE_FILL_OPACITY)));
    let edge_mat = bp.material(Some(MaterialDesc::line(edge_color, 1.0)));
    let mut fill = VisualElement::new(ElementRole::CubeFill, fill_geo, Some(fill_mat));
    fill.color = fill_color;
    fill.opacity = CUBE_FILL_OPACITY;
    bp.element(fill);
    let mut edges = VisualElement::new(ElementRole::CubeEdges, edge_geo, Some(edge_mat));
    edges.color = edge_color;
    bp.element(edges);
    bp
}

fn bloom_background(rng: &mut StdRng, aspect: f32) -> SceneBlueprint {
    let home = Vec3::new(0.0, 0.0, BLOOM_CAMERA_Z);
    let mut bp = SceneBlueprint::new(SceneTag::BloomBackground, Camera::looking_at_origin(home, aspect));
    bp.anim.camera_home = home;
    bp.graph.lights.push(Light::Ambient {
        color: Vec3::ONE,
        intensity: AMBIENT_INTENSITY,
    });
    bp.graph.lights.push(Light::Directional {
        color: Vec3::ONE,
        intensity: DIRECTIONAL_INTENSITY,
        position: Vec3::new(1.0, 1.0, 1.0),
    });
    bp.graph.post = Some(BloomSettings {
        strength: BLOOM_STRENGTH,
        radius: BLOOM_RADIUS,
        threshold: BLOOM_THRESHOLD,
    });

    let mut positions = Vec::with_capacity(BLOOM_PARTICLE_COUNT);
    let mut colors = Vec::with_capacity(BLOOM_PARTICLE_COUNT);
    for _ in 0..BLOOM_PARTICLE_COUNT {
        positions.push(random_point(rng, BLOOM_PARTICLE_SPREAD));
        colors.push(hsl_to_rgb(rng.gen::<f32>(), PARTICLE_SATURATION, PARTICLE_LIGHTNESS));
    }
    let pts_geo = bp.geometry(GeometryDesc::points("bloom_particles", positions, colors));
    let pts_mat = bp.material(Some(MaterialDesc::points(PARTICLE_SIZE, PARTICLE_OPACITY)));
    let mut particles = VisualElement::new(ElementRole::Particles, pts_geo, Some(pts_mat));
    particles.opacity = PARTICLE_OPACITY;
    bp.element(particles);

    for i in 0..BLOOM_POLYHEDRA_COUNT {
        let kind = Polyhedron::ALL[i % Polyhedron::ALL.len()];
        let color = hsl_to_rgb(rng.gen::<f32>(), 0.8, 0.6);
        let geo = bp.geometry(GeometryDesc::polyhedron_edges(kind, 1.0));
        let mat = bp.material(Some(MaterialDesc::line(color, BLOOM_POLYHEDRA_OPACITY)));
        let spin = Vec3::new(
            rng.gen_range(-BLOOM_POLYHEDRA_SPIN_MAX..BLOOM_POLYHEDRA_SPIN_MAX),
            rng.gen_range(-BLOOM_POLYHEDRA_SPIN_MAX..BLOOM_POLYHEDRA_SPIN_MAX),
            0.0,
        );
        let mut el = VisualElement::new(ElementRole::Polyhedron { spin }, geo, Some(mat));
        el.transform = Transform::at(random_point(rng, BLOOM_POLYHEDRA_SPREAD));
        el.transform.scale =
            Vec3::splat(rng.gen_range(BLOOM_POLYHEDRA_SCALE_MIN..BLOOM_POLYHEDRA_SCALE_MAX));
        el.color = color;
        el.opacity = BLOOM_POLYHEDRA_OPACITY;
        bp.element(el);
    }
    bp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_angles_are_evenly_spaced() {
        assert_eq!(orbit_angle(0, 4), 0.0);
        assert!((orbit_angle(1, 4) - TAU / 4.0).abs() < 1e-6);
        assert_eq!(orbit_angle(0, 0), 0.0);
    }

    #[test]
    fn same_seed_same_layout() {
        let cfg = SceneConfig::new(SceneKind::BloomBackground).with_seed(7);
        let a = blueprint(&cfg, SurfaceSize::new(800, 600));
        let b = blueprint(&cfg, SurfaceSize::new(800, 600));
        let pa: Vec<_> = a.graph.elements.iter().map(|e| e.transform.position).collect();
        let pb: Vec<_> = b.graph.elements.iter().map(|e| e.transform.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn sphere_waits_for_texture() {
        let cfg = SceneConfig::new(SceneKind::TexturedSphere {
            image_url: "/me.jpg".into(),
        });
        let bp = blueprint(&cfg, SurfaceSize::new(300, 300));
        assert_eq!(bp.texture_url(), Some("/me.jpg"));
        assert!(bp.graph.elements.iter().all(|e| !e.is_ready()));
        assert!(bp.materials.iter().all(Option::is_none));
    }
}
