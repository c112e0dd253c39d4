//! The seam between scene bookkeeping and a concrete graphics backend.

use crate::geometry::GeometryDesc;
use crate::material::MaterialDesc;
use crate::scene::{BloomSettings, Light, SurfaceSize};
use glam::{Mat4, Vec3, Vec4};

/// One draw call resolved against live GPU objects.
pub struct DrawItem<'a, R: Renderer + ?Sized> {
    pub geometry: &'a R::Geometry,
    pub material: &'a R::Material,
    pub model: Mat4,
    pub tint: Vec4,
}

pub struct RenderFrame<'a, R: Renderer + ?Sized> {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub lights: &'a [Light],
    pub items: Vec<DrawItem<'a, R>>,
    /// Composite a bloom pass over the base render when present.
    pub bloom: Option<BloomSettings>,
}

/// Graphics backend owning one output surface and its context.
///
/// Geometry and material objects are owned by the caller and handed back for
/// release; `release` tears down the context itself and is called last.
pub trait Renderer {
    type Geometry;
    type Material;

    fn create_geometry(&mut self, desc: &GeometryDesc) -> anyhow::Result<Self::Geometry>;
    /// Overwrite vertex positions of a geometry created from point data.
    fn write_positions(&mut self, geometry: &mut Self::Geometry, positions: &[Vec3]);
    fn release_geometry(&mut self, geometry: Self::Geometry);

    fn create_material(&mut self, desc: &MaterialDesc) -> anyhow::Result<Self::Material>;
    fn release_material(&mut self, material: Self::Material);

    fn resize(&mut self, size: SurfaceSize);
    fn render(&mut self, frame: &RenderFrame<'_, Self>) -> anyhow::Result<()>;

    /// Free the underlying graphics context.
    fn release(&mut self);
}
