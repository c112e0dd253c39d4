//! Declarative widget configuration and the per-instance scene graph.

use crate::camera::Camera;
use crate::constants::MAX_PARTICLE_COUNT;
use crate::error::SceneError;
use crate::registry::{GeometryId, MaterialId};
use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------- Configuration ----------------

/// Inclusive hue interval in turns (0..1).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HueRange {
    pub min: f32,
    pub max: f32,
}

impl Default for HueRange {
    fn default() -> Self {
        Self { min: 0.55, max: 0.75 }
    }
}

impl HueRange {
    /// Bounds in ascending order.
    pub fn ordered(self) -> (f32, f32) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    pub fn is_valid(self) -> bool {
        (0.0..=1.0).contains(&self.min) && (0.0..=1.0).contains(&self.max)
    }

    /// Bounds clamped to 0..1; non-finite bounds fall back to the default.
    pub fn sanitized(self) -> Self {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Self::default();
        }
        Self {
            min: self.min.clamp(0.0, 1.0),
            max: self.max.clamp(0.0, 1.0),
        }
    }

    pub fn contains(self, hue: f32) -> bool {
        let (lo, hi) = self.ordered();
        hue >= lo - 1e-4 && hue <= hi + 1e-4
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitItem {
    pub name: String,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

impl OrbitItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }
}

fn default_particle_count() -> usize {
    2000
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SceneKind {
    ParticleField {
        #[serde(default = "default_particle_count")]
        count: usize,
        #[serde(default, rename = "colorRange")]
        color_range: HueRange,
    },
    TechOrbit {
        #[serde(default)]
        items: Vec<OrbitItem>,
    },
    TexturedSphere {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    WireframeCube,
    BloomBackground,
}

impl SceneKind {
    pub fn tag(&self) -> SceneTag {
        match self {
            SceneKind::ParticleField { .. } => SceneTag::ParticleField,
            SceneKind::TechOrbit { .. } => SceneTag::TechOrbit,
            SceneKind::TexturedSphere { .. } => SceneTag::TexturedSphere,
            SceneKind::WireframeCube => SceneTag::WireframeCube,
            SceneKind::BloomBackground => SceneTag::BloomBackground,
        }
    }
}

/// Parameter-free discriminant of [`SceneKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneTag {
    ParticleField,
    TechOrbit,
    TexturedSphere,
    WireframeCube,
    BloomBackground,
}

impl SceneTag {
    pub fn name(self) -> &'static str {
        match self {
            SceneTag::ParticleField => "particle-field",
            SceneTag::TechOrbit => "tech-orbit",
            SceneTag::TexturedSphere => "textured-sphere",
            SceneTag::WireframeCube => "wireframe-cube",
            SceneTag::BloomBackground => "bloom-background",
        }
    }
}

/// Mount-time configuration of one widget.
///
/// JSON form: `{"kind": "particle-field", "count": 500, "colorRange": {"min": 0.5, "max": 0.7}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(flatten)]
    pub kind: SceneKind,
    /// Seed for randomized layout; a fixed default keeps widgets reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SceneConfig {
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(kind: SceneKind) -> Self {
        Self { kind, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the builder cannot honour.
    pub fn validate(&self) -> Result<(), SceneError> {
        if let SceneKind::ParticleField { count, color_range } = &self.kind {
            if *count > MAX_PARTICLE_COUNT {
                return Err(SceneError::Invalid(format!(
                    "count {} exceeds {}",
                    count, MAX_PARTICLE_COUNT
                )));
            }
            if !color_range.is_valid() {
                return Err(SceneError::Invalid(format!(
                    "colorRange {}..{} outside 0..1",
                    color_range.min, color_range.max
                )));
            }
        }
        Ok(())
    }

    pub fn seed_or_default(&self) -> u64 {
        self.seed.unwrap_or(Self::DEFAULT_SEED)
    }
}

// ---------------- Scene graph ----------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(self) -> f32 {
        crate::input::aspect_ratio(self.width as f32, self.height as f32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles (radians), applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, q, self.position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: Vec3,
        intensity: f32,
    },
    Directional {
        color: Vec3,
        intensity: f32,
        /// Position the light shines from, towards the origin.
        position: Vec3,
    },
}

pub type Lights = SmallVec<[Light; 2]>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ElementRole {
    Particles,
    Marker { index: usize },
    OrbitRing { index: usize },
    Sphere,
    SphereWireframe,
    CubeFill,
    CubeEdges,
    Polyhedron { spin: Vec3 },
}

/// One renderable unit owned by its scene.
#[derive(Clone, Debug)]
pub struct VisualElement {
    pub role: ElementRole,
    pub geometry: GeometryId,
    /// `None` while the material is not ready (e.g. texture still loading).
    pub material: Option<MaterialId>,
    pub transform: Transform,
    pub color: Vec3,
    pub opacity: f32,
    /// CPU copy of point positions mutated per frame.
    pub positions: Option<Vec<Vec3>>,
}

impl VisualElement {
    pub fn new(role: ElementRole, geometry: GeometryId, material: Option<MaterialId>) -> Self {
        Self {
            role,
            geometry,
            material,
            transform: Transform::default(),
            color: Vec3::ONE,
            opacity: 1.0,
            positions: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.material.is_some()
    }

    pub fn tint(&self) -> Vec4 {
        self.color.extend(self.opacity)
    }
}

/// Camera, lights and elements of one scene; no GPU handles.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    pub camera: Camera,
    pub lights: Lights,
    pub post: Option<BloomSettings>,
    /// Group transform applied on top of every element transform.
    pub root: Transform,
    pub elements: Vec<VisualElement>,
}

impl SceneGraph {
    pub fn find(&self, role: impl Fn(&ElementRole) -> bool) -> Option<&VisualElement> {
        self.elements.iter().find(|e| role(&e.role))
    }

    pub fn count(&self, role: impl Fn(&ElementRole) -> bool) -> usize {
        self.elements.iter().filter(|e| role(&e.role)).count()
    }
}
