//! Ownership and ordered disposal of per-scene GPU resources.
//!
//! A [`ResourceHandle`] bundles the renderer context with every geometry and
//! material slot of one scene. Slots may be empty (creation failed, or the
//! material is still waiting on a texture) and disposal copes with any mix.
//! Disposal is idempotent: geometries, then materials, then the context.

use crate::geometry::GeometryDesc;
use crate::material::MaterialDesc;
use crate::renderer::{DrawItem, RenderFrame, Renderer};
use crate::scene::{SceneGraph, SurfaceSize};
use fnv::FnvHashMap;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub geometries: usize,
    pub materials: usize,
}

#[derive(Debug, Default)]
struct LiveEntry {
    label: &'static str,
    counts: ResourceCounts,
}

#[derive(Debug, Default)]
struct Book {
    next_id: u64,
    live: FnvHashMap<HandleId, LiveEntry>,
}

pub struct AcquireConfig<'a> {
    pub label: &'static str,
    pub surface: SurfaceSize,
    pub geometries: &'a [GeometryDesc],
    /// `None` reserves a slot whose material arrives later.
    pub materials: &'a [Option<MaterialDesc>],
}

/// Tracks every live [`ResourceHandle`]; clones share the same book.
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    book: Rc<RefCell<Book>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the renderer to the target surface and create every requested
    /// geometry and material. Individual failures leave an empty slot.
    pub fn acquire<R: Renderer>(&self, mut renderer: R, config: AcquireConfig<'_>) -> ResourceHandle<R> {
        renderer.resize(config.surface);
        let geometries = config
            .geometries
            .iter()
            .map(|desc| match renderer.create_geometry(desc) {
                Ok(g) => Some(g),
                Err(e) => {
                    log::warn!("[registry] {} geometry '{}' failed: {:?}", config.label, desc.label, e);
                    None
                }
            })
            .collect::<Vec<_>>();
        let materials = config
            .materials
            .iter()
            .map(|slot| {
                let desc = slot.as_ref()?;
                match renderer.create_material(desc) {
                    Ok(m) => Some(m),
                    Err(e) => {
                        log::warn!("[registry] {} material '{}' failed: {:?}", config.label, desc.label, e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        let counts = ResourceCounts {
            geometries: geometries.iter().flatten().count(),
            materials: materials.iter().flatten().count(),
        };
        let id = {
            let mut book = self.book.borrow_mut();
            let id = HandleId(book.next_id);
            book.next_id += 1;
            book.live.insert(
                id,
                LiveEntry {
                    label: config.label,
                    counts,
                },
            );
            id
        };
        log::info!(
            "[registry] acquired {} {:?}: {} geometries, {} materials",
            config.label,
            id,
            counts.geometries,
            counts.materials
        );
        ResourceHandle {
            id,
            registry: self.clone(),
            geometries,
            materials,
            renderer: Some(renderer),
        }
    }

    /// Create a material into slot `id` of a live handle. Returns `false` when
    /// the handle is already disposed or creation failed.
    pub fn install_material<R: Renderer>(
        &self,
        handle: &mut ResourceHandle<R>,
        id: MaterialId,
        desc: &MaterialDesc,
    ) -> bool {
        let Some(renderer) = handle.renderer.as_mut() else {
            return false;
        };
        let Some(slot) = handle.materials.get_mut(id.0) else {
            return false;
        };
        let material = match renderer.create_material(desc) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("[registry] material '{}' failed: {:?}", desc.label, e);
                return false;
            }
        };
        let replaced = slot.replace(material);
        if let Some(old) = replaced {
            renderer.release_material(old);
        } else if let Some(entry) = self.book.borrow_mut().live.get_mut(&handle.id) {
            entry.counts.materials += 1;
        }
        true
    }

    /// Release everything the handle owns. Safe to call any number of times.
    pub fn dispose<R: Renderer>(&self, handle: &mut ResourceHandle<R>) {
        let Some(mut renderer) = handle.renderer.take() else {
            return;
        };
        for g in handle.geometries.drain(..).flatten() {
            renderer.release_geometry(g);
        }
        for m in handle.materials.drain(..).flatten() {
            renderer.release_material(m);
        }
        renderer.release();
        drop(renderer);
        if let Some(entry) = self.book.borrow_mut().live.remove(&handle.id) {
            log::info!("[registry] disposed {} {:?}", entry.label, handle.id);
        }
    }

    pub fn live_handles(&self) -> usize {
        self.book.borrow().live.len()
    }

    pub fn live_resources(&self) -> ResourceCounts {
        self.book
            .borrow()
            .live
            .values()
            .fold(ResourceCounts::default(), |acc, e| ResourceCounts {
                geometries: acc.geometries + e.counts.geometries,
                materials: acc.materials + e.counts.materials,
            })
    }
}

/// Opaque bundle of one scene's renderer, geometries and materials.
pub struct ResourceHandle<R: Renderer> {
    id: HandleId,
    registry: ResourceRegistry,
    geometries: Vec<Option<R::Geometry>>,
    materials: Vec<Option<R::Material>>,
    renderer: Option<R>,
}

impl<R: Renderer> ResourceHandle<R> {
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// `false` once disposed.
    pub fn is_live(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn has_geometry(&self, id: GeometryId) -> bool {
        matches!(self.geometries.get(id.0), Some(Some(_)))
    }

    pub fn has_material(&self, id: MaterialId) -> bool {
        matches!(self.materials.get(id.0), Some(Some(_)))
    }

    pub(crate) fn write_positions(&mut self, id: GeometryId, positions: &[Vec3]) {
        if let (Some(r), Some(Some(g))) = (self.renderer.as_mut(), self.geometries.get_mut(id.0)) {
            r.write_positions(g, positions);
        }
    }

    pub(crate) fn resize(&mut self, size: SurfaceSize) {
        if let Some(r) = self.renderer.as_mut() {
            r.resize(size);
        }
    }

    /// Draw every element whose geometry and material are both present.
    /// Returns `Ok(false)` without touching anything once disposed.
    pub(crate) fn render(&mut self, graph: &SceneGraph) -> anyhow::Result<bool> {
        let Self {
            renderer,
            geometries,
            materials,
            ..
        } = self;
        let Some(renderer) = renderer.as_mut() else {
            return Ok(false);
        };
        let (geometries, materials) = (&*geometries, &*materials);
        let root = graph.root.matrix();
        let items = graph
            .elements
            .iter()
            .filter_map(|e| {
                let geometry = geometries.get(e.geometry.0)?.as_ref()?;
                let material = materials.get(e.material?.0)?.as_ref()?;
                Some(DrawItem {
                    geometry,
                    material,
                    model: root * e.transform.matrix(),
                    tint: e.tint(),
                })
            })
            .collect();
        let view = graph.camera.view_matrix();
        let projection = graph.camera.projection_matrix();
        let frame = RenderFrame {
            view,
            projection,
            view_projection: projection * view,
            camera_position: graph.camera.eye,
            lights: graph.lights.as_slice(),
            items,
            bloom: graph.post,
        };
        renderer.render(&frame)?;
        Ok(true)
    }
}

impl<R: Renderer> Drop for ResourceHandle<R> {
    fn drop(&mut self) {
        if self.is_live() {
            log::warn!("[registry] {:?} dropped while live; disposing", self.id);
            let registry = self.registry.clone();
            registry.dispose(self);
        }
    }
}
