#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec3;
use viz_core::{
    FrameTask, GeometryDesc, ListenerGuard, MaterialDesc, RenderFrame, Renderer, SurfaceMount,
    SurfaceSize,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Resize(SurfaceSize),
    CreateGeometry(u32, &'static str),
    WritePositions(u32),
    ReleaseGeometry(u32),
    CreateMaterial(u32, &'static str),
    ReleaseMaterial(u32),
    Render { items: usize, bloom: bool },
    Release,
}

#[derive(Debug, Default)]
pub struct MockLog {
    pub events: Vec<Event>,
    pub live_geometries: Vec<u32>,
    pub live_materials: Vec<u32>,
    pub released: bool,
    /// Calls that arrived after the context was released.
    pub use_after_release: usize,
    pub last_positions: Vec<Vec3>,
    next_id: u32,
}

impl MockLog {
    pub fn renders(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Render { .. }))
            .count()
    }

    pub fn last_render(&self) -> Option<(usize, bool)> {
        self.events.iter().rev().find_map(|e| match e {
            Event::Render { items, bloom } => Some((*items, *bloom)),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct MockGeometry {
    pub id: u32,
    pub vertices: usize,
}

#[derive(Debug)]
pub struct MockMaterial {
    pub id: u32,
    pub textured: bool,
}

#[derive(Clone, Default)]
pub struct MockRenderer {
    pub log: Rc<RefCell<MockLog>>,
    pub fail_geometry: Option<&'static str>,
    pub fail_materials: bool,
    /// Refuse only materials that carry a texture.
    pub fail_textures: bool,
}

impl MockRenderer {
    pub fn new() -> (Self, Rc<RefCell<MockLog>>) {
        let r = Self::default();
        let log = r.log.clone();
        (r, log)
    }

    fn guard(&self) {
        let mut log = self.log.borrow_mut();
        if log.released {
            log.use_after_release += 1;
        }
    }

    fn next_id(&self) -> u32 {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        log.next_id
    }
}

impl Renderer for MockRenderer {
    type Geometry = MockGeometry;
    type Material = MockMaterial;

    fn create_geometry(&mut self, desc: &GeometryDesc) -> anyhow::Result<MockGeometry> {
        self.guard();
        if self.fail_geometry == Some(desc.label) {
            anyhow::bail!("refusing geometry {}", desc.label);
        }
        let id = self.next_id();
        let mut log = self.log.borrow_mut();
        log.events.push(Event::CreateGeometry(id, desc.label));
        log.live_geometries.push(id);
        Ok(MockGeometry {
            id,
            vertices: desc.vertex_count(),
        })
    }

    fn write_positions(&mut self, geometry: &mut MockGeometry, positions: &[Vec3]) {
        self.guard();
        let mut log = self.log.borrow_mut();
        log.events.push(Event::WritePositions(geometry.id));
        log.last_positions = positions.to_vec();
    }

    fn release_geometry(&mut self, geometry: MockGeometry) {
        self.guard();
        let mut log = self.log.borrow_mut();
        log.events.push(Event::ReleaseGeometry(geometry.id));
        log.live_geometries.retain(|g| *g != geometry.id);
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> anyhow::Result<MockMaterial> {
        self.guard();
        if self.fail_materials || (self.fail_textures && desc.texture.is_some()) {
            anyhow::bail!("refusing material {}", desc.label);
        }
        let id = self.next_id();
        let mut log = self.log.borrow_mut();
        log.events.push(Event::CreateMaterial(id, desc.label));
        log.live_materials.push(id);
        Ok(MockMaterial {
            id,
            textured: desc.texture.is_some(),
        })
    }

    fn release_material(&mut self, material: MockMaterial) {
        self.guard();
        let mut log = self.log.borrow_mut();
        log.events.push(Event::ReleaseMaterial(material.id));
        log.live_materials.retain(|m| *m != material.id);
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.guard();
        self.log.borrow_mut().events.push(Event::Resize(size));
    }

    fn render(&mut self, frame: &RenderFrame<'_, Self>) -> anyhow::Result<()> {
        self.guard();
        self.log.borrow_mut().events.push(Event::Render {
            items: frame.items.len(),
            bloom: frame.bloom.is_some(),
        });
        Ok(())
    }

    fn release(&mut self) {
        self.guard();
        let mut log = self.log.borrow_mut();
        log.events.push(Event::Release);
        log.released = true;
    }
}

/// Frame task driven by hand: `pending` mirrors one outstanding callback.
#[derive(Clone, Default)]
pub struct ManualFrames {
    pub pending: Rc<Cell<usize>>,
    pub cancels: Rc<Cell<usize>>,
}

impl FrameTask for ManualFrames {
    fn cancel(&mut self) {
        self.cancels.set(self.cancels.get() + 1);
        self.pending.set(0);
    }

    fn pending_frames(&self) -> usize {
        self.pending.get()
    }
}

#[derive(Clone, Default)]
pub struct CountingListeners {
    pub detaches: Rc<Cell<usize>>,
    attached: Rc<Cell<bool>>,
}

impl CountingListeners {
    pub fn attached() -> Self {
        let l = Self::default();
        l.attached.set(true);
        l
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }
}

impl ListenerGuard for CountingListeners {
    fn detach(&mut self) {
        if self.attached.replace(false) {
            self.detaches.set(self.detaches.get() + 1);
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeSurface {
    pub attached: Rc<Cell<bool>>,
    pub detaches: Rc<Cell<usize>>,
}

impl FakeSurface {
    pub fn attached() -> Self {
        let s = Self::default();
        s.attached.set(true);
        s
    }
}

impl SurfaceMount for FakeSurface {
    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn detach(&mut self) {
        self.detaches.set(self.detaches.get() + 1);
        self.attached.set(false);
    }
}

pub fn surface() -> SurfaceSize {
    SurfaceSize::new(800, 600)
}
