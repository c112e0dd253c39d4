//! Per-kind mutation rules applied once per frame.
//!
//! Every rule only touches elements whose material is ready; an element still
//! waiting on a texture is left as built for that frame.

use crate::color::hsl_to_rgb;
use crate::constants::*;
use crate::input::InputState;
use crate::scene::{ElementRole, SceneGraph, SceneTag};
use glam::{Vec2, Vec3};

/// Cross-frame animation state that is not part of the scene graph itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationState {
    /// Current cycling hue (wireframe cube).
    pub hue: f32,
    /// Camera rest position the pointer offset is applied around.
    pub camera_home: Vec3,
}

/// What the frame changed that must be pushed to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepEffects {
    pub positions_dirty: bool,
}

pub fn step(
    tag: SceneTag,
    graph: &mut SceneGraph,
    anim: &mut AnimationState,
    elapsed: f32,
    input: InputState,
) -> StepEffects {
    match tag {
        SceneTag::ParticleField => step_particle_field(graph, elapsed, input.pointer),
        SceneTag::TechOrbit => step_tech_orbit(graph, elapsed, input.pointer),
        SceneTag::TexturedSphere => step_textured_sphere(graph, elapsed),
        SceneTag::WireframeCube => step_wireframe_cube(graph, anim, elapsed, input.pointer),
        SceneTag::BloomBackground => step_bloom_background(graph, anim, elapsed, input.pointer),
    }
}

/// Rotation blended towards the pointer target plus cumulative vertical drift.
pub fn step_particle_field(graph: &mut SceneGraph, elapsed: f32, pointer: Vec2) -> StepEffects {
    let mut effects = StepEffects::default();
    let target = Vec2::new(pointer.y * PARTICLE_POINTER_GAIN, pointer.x * PARTICLE_POINTER_GAIN);
    for e in graph.elements.iter_mut() {
        if e.role != ElementRole::Particles || !e.is_ready() {
            continue;
        }
        let base = elapsed * PARTICLE_ROTATION_SPEED;
        let rot = &mut e.transform.rotation;
        rot.y = base + (target.y - base) * PARTICLE_POINTER_BLEND;
        rot.x += (target.x - rot.x) * PARTICLE_POINTER_BLEND;

        // Drift is never normalized and accumulates over the scene lifetime.
        if let Some(positions) = e.positions.as_mut() {
            for (i, p) in positions.iter_mut().enumerate() {
                p.y += (elapsed + i as f32 * PARTICLE_DRIFT_PHASE_STEP).sin() * PARTICLE_DRIFT_AMPLITUDE;
            }
            effects.positions_dirty = !positions.is_empty();
        }
    }
    effects
}

pub fn step_tech_orbit(graph: &mut SceneGraph, elapsed: f32, pointer: Vec2) -> StepEffects {
    graph.root.rotation.y = elapsed * ORBIT_SPIN_Y + pointer.x * ORBIT_POINTER_GAIN;
    graph.root.rotation.x = elapsed * ORBIT_SPIN_X + pointer.y * ORBIT_POINTER_GAIN;
    for e in graph.elements.iter_mut() {
        if let ElementRole::Marker { index } = e.role {
            if e.is_ready() {
                e.transform.position.y =
                    (elapsed * ORBIT_BOB_SPEED + index as f32).sin() * ORBIT_BOB_AMPLITUDE;
            }
        }
    }
    StepEffects::default()
}

pub fn step_textured_sphere(graph: &mut SceneGraph, elapsed: f32) -> StepEffects {
    for e in graph.elements.iter_mut() {
        if !matches!(e.role, ElementRole::Sphere | ElementRole::SphereWireframe) || !e.is_ready() {
            continue;
        }
        e.transform.rotation.y = elapsed * SPHERE_SPIN_Y;
        e.transform.rotation.x = elapsed * SPHERE_SPIN_X;
    }
    StepEffects::default()
}

#[inline]
pub fn cube_hue(elapsed: f32) -> f32 {
    (elapsed * CUBE_HUE_SPEED).rem_euclid(1.0)
}

pub fn step_wireframe_cube(
    graph: &mut SceneGraph,
    anim: &mut AnimationState,
    elapsed: f32,
    pointer: Vec2,
) -> StepEffects {
    graph.root.rotation.x = elapsed * CUBE_SPIN + pointer.y * CUBE_POINTER_GAIN;
    graph.root.rotation.y = elapsed * CUBE_SPIN + pointer.x * CUBE_POINTER_GAIN;
    anim.hue = cube_hue(elapsed);
    for e in graph.elements.iter_mut() {
        if !e.is_ready() {
            continue;
        }
        match e.role {
            ElementRole::CubeFill => {
                e.color = hsl_to_rgb(anim.hue, CUBE_SATURATION, CUBE_LIGHTNESS);
            }
            ElementRole::CubeEdges => {
                e.color = hsl_to_rgb(anim.hue + CUBE_EDGE_HUE_OFFSET, CUBE_SATURATION, CUBE_LIGHTNESS);
            }
            _ => {}
        }
    }
    StepEffects::default()
}

pub fn step_bloom_background(
    graph: &mut SceneGraph,
    anim: &mut AnimationState,
    elapsed: f32,
    pointer: Vec2,
) -> StepEffects {
    for e in graph.elements.iter_mut() {
        if !e.is_ready() {
            continue;
        }
        match e.role {
            ElementRole::Particles => e.transform.rotation.y = elapsed * BLOOM_PARTICLE_SPIN,
            ElementRole::Polyhedron { spin } => e.transform.rotation += spin,
            _ => {}
        }
    }
    let target = anim.camera_home
        + Vec3::new(
            pointer.x * BLOOM_CAMERA_POINTER_GAIN,
            pointer.y * BLOOM_CAMERA_POINTER_GAIN,
            0.0,
        );
    let cam = &mut graph.camera;
    cam.eye.x += (target.x - cam.eye.x) * BLOOM_CAMERA_EASE;
    cam.eye.y += (target.y - cam.eye.y) * BLOOM_CAMERA_EASE;
    cam.target = Vec3::ZERO;
    StepEffects::default()
}
