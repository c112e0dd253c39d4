//! One live widget scene: graph, animation driver and owned GPU resources.

use crate::animate::{self, AnimationState};
use crate::builder::SceneBlueprint;
use crate::driver::{AnimationDriver, DriverState};
use crate::error::TextureError;
use crate::input::InputState;
use crate::material::{MaterialDesc, TextureData};
use crate::registry::{AcquireConfig, MaterialId, ResourceHandle, ResourceRegistry};
use crate::renderer::Renderer;
use crate::scene::{ElementRole, SceneGraph, SceneTag, SurfaceSize};
use crate::texture::TextureTicket;
use glam::Vec3;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PendingTexture {
    pub(crate) url: String,
    pub(crate) sphere_material: MaterialId,
    pub(crate) wire_material: MaterialId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Not running, or resources already released.
    Skipped,
    /// The renderer reported an error; the loop keeps going.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureOutcome {
    Applied,
    /// Load or upload failed; an untextured material was installed instead.
    Degraded,
    /// The scene was torn down (or the ticket is foreign); nothing touched.
    Stale,
}

pub struct SceneInstance<R: Renderer> {
    tag: SceneTag,
    graph: SceneGraph,
    anim: AnimationState,
    driver: AnimationDriver,
    registry: ResourceRegistry,
    resources: ResourceHandle<R>,
    pending_texture: Option<PendingTexture>,
}

impl<R: Renderer> SceneInstance<R> {
    pub fn from_blueprint(
        bp: SceneBlueprint,
        renderer: R,
        surface: SurfaceSize,
        registry: &ResourceRegistry,
    ) -> Self {
        let resources = registry.acquire(
            renderer,
            AcquireConfig {
                label: bp.tag.name(),
                surface,
                geometries: &bp.geometries,
                materials: &bp.materials,
            },
        );
        let mut graph = bp.graph;
        // Elements whose slot failed to allocate stay in the graph but never draw.
        for e in graph.elements.iter_mut() {
            if let Some(m) = e.material {
                if !resources.has_material(m) {
                    e.material = None;
                }
            }
        }
        Self {
            tag: bp.tag,
            graph,
            anim: bp.anim,
            driver: AnimationDriver::new(),
            registry: registry.clone(),
            resources,
            pending_texture: bp.pending_texture,
        }
    }

    pub fn tag(&self) -> SceneTag {
        self.tag
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn animation(&self) -> &AnimationState {
        &self.anim
    }

    pub fn state(&self) -> DriverState {
        self.driver.state()
    }

    pub fn elapsed(&self) -> f32 {
        self.driver.elapsed()
    }

    pub fn frames(&self) -> u64 {
        self.driver.frames()
    }

    pub fn resources(&self) -> &ResourceHandle<R> {
        &self.resources
    }

    /// Ticket for the texture this scene is waiting on, if any.
    pub fn texture_request(&self) -> Option<TextureTicket> {
        self.pending_texture.as_ref().map(|p| TextureTicket {
            handle: self.resources.id(),
            url: p.url.clone(),
        })
    }

    /// `Idle -> Running`.
    pub fn start(&mut self) -> bool {
        let started = self.driver.start();
        if started {
            log::info!("[scene] {} running", self.tag.name());
        }
        started
    }

    /// Advance the clock by `dt`, apply this kind's mutation rules using the
    /// latest input snapshot, and render.
    pub fn frame(&mut self, dt: Duration, input: InputState) -> FrameOutcome {
        if !self.resources.is_live() {
            return FrameOutcome::Skipped;
        }
        let Some(elapsed) = self.driver.begin_frame(dt) else {
            return FrameOutcome::Skipped;
        };
        self.graph.camera.aspect = input.aspect;
        let effects = animate::step(self.tag, &mut self.graph, &mut self.anim, elapsed, input);
        if effects.positions_dirty {
            for e in self.graph.elements.iter().filter(|e| e.is_ready()) {
                if let Some(p) = e.positions.as_deref() {
                    self.resources.write_positions(e.geometry, p);
                }
            }
        }
        match self.resources.render(&self.graph) {
            Ok(true) => FrameOutcome::Rendered,
            Ok(false) => FrameOutcome::Skipped,
            Err(e) => {
                log::error!("[scene] {} render error: {:?}", self.tag.name(), e);
                FrameOutcome::Failed
            }
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.graph.camera.aspect = size.aspect();
        self.resources.resize(size);
    }

    /// Stop the driver and release every GPU resource. Only the first call
    /// does anything; the caller must already have cancelled its frame task.
    pub fn stop(&mut self) -> bool {
        let first = self.driver.stop();
        self.pending_texture = None;
        self.registry.dispose(&mut self.resources);
        if first {
            log::info!(
                "[scene] {} stopped after {} frames",
                self.tag.name(),
                self.driver.frames()
            );
        }
        first
    }

    /// Complete an asynchronous texture load. A ticket arriving after `stop`
    /// is ignored without touching any resource.
    pub fn apply_texture(
        &mut self,
        ticket: &TextureTicket,
        result: Result<TextureData, TextureError>,
    ) -> TextureOutcome {
        let live = self.driver.state() != DriverState::Stopped && self.resources.is_live();
        let matches = ticket.handle == self.resources.id()
            && self.pending_texture.as_ref().is_some_and(|p| p.url == ticket.url);
        if !live || !matches {
            log::debug!("[scene] stale texture completion for {}", ticket.url);
            return TextureOutcome::Stale;
        }
        let Some(pending) = self.pending_texture.take() else {
            return TextureOutcome::Stale;
        };

        let fallback = || {
            let mut plain = MaterialDesc::basic(Vec3::splat(0.6), 1.0);
            plain.lit = true;
            plain
        };
        let (mut desc, mut outcome) = match result {
            Ok(tex) => (MaterialDesc::textured(tex), TextureOutcome::Applied),
            Err(e) => {
                log::warn!("[scene] texture {} unavailable, using plain material: {}", pending.url, e);
                (fallback(), TextureOutcome::Degraded)
            }
        };
        let wire_desc = MaterialDesc::line(Vec3::ONE, crate::constants::SPHERE_WIREFRAME_OPACITY);

        let mut sphere_ok = self
            .registry
            .install_material(&mut self.resources, pending.sphere_material, &desc);
        if !sphere_ok && outcome == TextureOutcome::Applied {
            log::warn!("[scene] texture {} rejected by renderer, using plain material", pending.url);
            desc = fallback();
            outcome = TextureOutcome::Degraded;
            sphere_ok = self
                .registry
                .install_material(&mut self.resources, pending.sphere_material, &desc);
        }
        let wire_ok = self
            .registry
            .install_material(&mut self.resources, pending.wire_material, &wire_desc);
        for e in self.graph.elements.iter_mut() {
            match e.role {
                ElementRole::Sphere if sphere_ok => {
                    e.material = Some(pending.sphere_material);
                    e.color = desc.color;
                }
                ElementRole::SphereWireframe if wire_ok => {
                    e.material = Some(pending.wire_material);
                    e.color = wire_desc.color;
                }
                _ => {}
            }
        }
        outcome
    }
}
