mod common;

use common::{surface, MockRenderer};
use std::f32::consts::TAU;
use viz_core::color::rgb_hue;
use viz_core::constants::{BLOOM_PARTICLE_COUNT, BLOOM_POLYHEDRA_COUNT, ORBIT_RADIUS, PARTICLE_SPREAD};
use viz_core::{
    blueprint, build, ElementRole, HueRange, Light, OrbitItem, ResourceRegistry, SceneConfig,
    SceneKind, SceneTag, Topology,
};

fn particle_cfg(count: usize, min: f32, max: f32) -> SceneConfig {
    SceneConfig::new(SceneKind::ParticleField {
        count,
        color_range: HueRange { min, max },
    })
}

#[test]
fn particle_field_has_exactly_n_points_in_bounds_and_hue_range() {
    for (i, count) in [0usize, 1, 50, 777].into_iter().enumerate() {
        let cfg = particle_cfg(count, 0.2, 0.45).with_seed(i as u64);
        let bp = blueprint(&cfg, surface());
        assert_eq!(bp.geometries.len(), 1);
        let g = &bp.geometries[0];
        assert_eq!(g.topology, Topology::Points);
        assert_eq!(g.positions.len(), count);
        let h = PARTICLE_SPREAD * 0.5;
        assert!(g
            .positions
            .iter()
            .all(|p| p.abs().max_element() <= h), "positions outside cube");
        let colors = g.colors.as_ref().unwrap();
        assert_eq!(colors.len(), count);
        let range = HueRange { min: 0.2, max: 0.45 };
        for c in colors {
            assert!(range.contains(rgb_hue(*c)), "hue {} outside range", rgb_hue(*c));
        }
    }
}

#[test]
fn reversed_hue_range_is_accepted() {
    let bp = blueprint(&particle_cfg(20, 0.6, 0.5), surface());
    let range = HueRange { min: 0.5, max: 0.6 };
    for c in bp.geometries[0].colors.as_ref().unwrap() {
        assert!(range.contains(rgb_hue(*c)));
    }
}

#[test]
fn non_finite_hue_bounds_fall_back_to_default_range() {
    for (min, max) in [(0.0, f32::INFINITY), (f32::NAN, 0.5), (-3.0e38, 3.0e38)] {
        let bp = blueprint(&particle_cfg(10, min, max), surface());
        let colors = bp.geometries[0].colors.as_ref().unwrap();
        assert_eq!(colors.len(), 10);
        let expected = HueRange { min, max }.sanitized();
        for c in colors {
            assert!(expected.contains(rgb_hue(*c)));
        }
    }
}

#[test]
fn tech_orbit_markers_sit_at_even_angles_on_one_radius() {
    let items: Vec<_> = ["Rust", "WGSL", "TypeScript", "Postgres", "Docker"]
        .into_iter()
        .map(OrbitItem::named)
        .collect();
    let k = items.len();
    let bp = blueprint(&SceneConfig::new(SceneKind::TechOrbit { items }), surface());
    let mut markers: Vec<_> = bp
        .graph
        .elements
        .iter()
        .filter_map(|e| match e.role {
            ElementRole::Marker { index } => Some((index, e.transform.position)),
            _ => None,
        })
        .collect();
    markers.sort_by_key(|(i, _)| *i);
    assert_eq!(markers.len(), k);
    for (i, p) in markers {
        assert!((p.length() - ORBIT_RADIUS).abs() < 1e-4);
        let expected = TAU * i as f32 / k as f32;
        let angle = p.z.atan2(p.x).rem_euclid(TAU);
        let diff = (angle - expected).abs();
        assert!(diff < 1e-4 || (TAU - diff) < 1e-4, "item {i}: {angle} vs {expected}");
    }
    let rings = bp
        .graph
        .count(|r| matches!(r, ElementRole::OrbitRing { .. }));
    assert_eq!(rings, k);
}

#[test]
fn empty_orbit_builds_nothing_to_draw() {
    let bp = blueprint(
        &SceneConfig::new(SceneKind::TechOrbit { items: vec![] }),
        surface(),
    );
    assert!(bp.graph.elements.is_empty());
}

#[test]
fn wireframe_cube_has_fill_and_edges() {
    let bp = blueprint(&SceneConfig::new(SceneKind::WireframeCube), surface());
    assert_eq!(bp.graph.count(|r| *r == ElementRole::CubeFill), 1);
    assert_eq!(bp.graph.count(|r| *r == ElementRole::CubeEdges), 1);
    let fill = bp.graph.find(|r| *r == ElementRole::CubeFill).unwrap();
    assert!(fill.opacity < 1.0);
}

#[test]
fn bloom_background_composition() {
    let bp = blueprint(&SceneConfig::new(SceneKind::BloomBackground), surface());
    assert_eq!(bp.tag, SceneTag::BloomBackground);
    assert!(bp.graph.post.is_some());
    assert!(bp.graph.lights.iter().any(|l| matches!(l, Light::Ambient { .. })));
    assert!(bp.graph.lights.iter().any(|l| matches!(l, Light::Directional { .. })));
    let particles = bp.graph.find(|r| *r == ElementRole::Particles).unwrap();
    assert_eq!(bp.geometries[particles.geometry.0].positions.len(), BLOOM_PARTICLE_COUNT);
    let polys: Vec<_> = bp
        .graph
        .elements
        .iter()
        .filter(|e| matches!(e.role, ElementRole::Polyhedron { .. }))
        .collect();
    assert_eq!(polys.len(), BLOOM_POLYHEDRA_COUNT);
    assert!(polys.iter().all(|p| p.opacity < 0.5));
    assert!(polys
        .windows(2)
        .any(|w| w[0].transform.position != w[1].transform.position));
}

#[test]
fn build_acquires_every_slot() {
    let registry = ResourceRegistry::new();
    let (renderer, _log) = MockRenderer::new();
    let scene = build(
        &SceneConfig::new(SceneKind::WireframeCube),
        renderer,
        surface(),
        &registry,
    );
    assert_eq!(registry.live_handles(), 1);
    assert_eq!(registry.live_resources().geometries, 2);
    assert_eq!(registry.live_resources().materials, 2);
    assert!(scene.graph().elements.iter().all(|e| e.is_ready()));
}

#[test]
fn failed_material_leaves_element_inert() {
    let registry = ResourceRegistry::new();
    let (mut renderer, _log) = MockRenderer::new();
    renderer.fail_materials = true;
    let scene = build(
        &SceneConfig::new(SceneKind::WireframeCube),
        renderer,
        surface(),
        &registry,
    );
    assert!(scene.graph().elements.iter().all(|e| !e.is_ready()));
}
