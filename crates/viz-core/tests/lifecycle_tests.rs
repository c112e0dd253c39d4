mod common;

use common::{surface, CountingListeners, FakeSurface, ManualFrames, MockLog, MockRenderer};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use viz_core::{
    build, DriverState, FrameTask, InputState, MountController, MountParts, MountPhase,
    ResourceRegistry, SceneConfig, SceneKind, SharedScene, TextureData, TextureOutcome,
};

struct Rig {
    registry: ResourceRegistry,
    log: Rc<RefCell<MockLog>>,
    frames: ManualFrames,
    listeners: CountingListeners,
    surface: FakeSurface,
}

impl Rig {
    fn new() -> Self {
        Self {
            registry: ResourceRegistry::new(),
            log: Rc::default(),
            frames: ManualFrames::default(),
            listeners: CountingListeners::attached(),
            surface: FakeSurface::attached(),
        }
    }

    fn parts(&self, config: &SceneConfig) -> MountParts<MockRenderer> {
        let renderer = MockRenderer {
            log: self.log.clone(),
            ..Default::default()
        };
        let scene = build(config, renderer, surface(), &self.registry);
        MountParts {
            scene: Rc::new(RefCell::new(scene)),
            surface: Box::new(self.surface.clone()),
            listeners: Some(Box::new(self.listeners.clone())),
        }
    }

    fn start_frames(&self) -> impl FnOnce(&SharedScene<MockRenderer>) -> Box<dyn FrameTask> {
        let frames = self.frames.clone();
        move |_scene: &SharedScene<MockRenderer>| -> Box<dyn FrameTask> {
            frames.pending.set(1);
            Box::new(frames)
        }
    }

    fn mount(&self, controller: &mut MountController<MockRenderer>, config: &SceneConfig) -> bool {
        let Some(ticket) = controller.begin_mount() else {
            return false;
        };
        controller.finish_mount(ticket, self.parts(config), self.start_frames())
    }
}

fn cube() -> SceneConfig {
    SceneConfig::new(SceneKind::WireframeCube)
}

#[test]
fn mount_starts_the_scene_and_frames() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    assert!(rig.mount(&mut controller, &cube()));
    assert_eq!(controller.phase(), MountPhase::Mounted);
    assert_eq!(rig.frames.pending_frames(), 1);
    let scene = controller.scene().unwrap();
    assert_eq!(scene.borrow().state(), DriverState::Running);
    assert_eq!(rig.registry.live_handles(), 1);
}

#[test]
fn mount_then_immediate_unmount_leaves_nothing_live() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    rig.mount(&mut controller, &cube());
    assert!(controller.unmount());

    assert_eq!(rig.registry.live_handles(), 0);
    assert_eq!(rig.registry.live_resources().geometries, 0);
    assert_eq!(rig.frames.pending_frames(), 0);
    assert!(!rig.listeners.is_attached());
    assert!(!rig.surface.attached.get());
    let log = rig.log.borrow();
    assert!(log.released);
    assert!(log.live_geometries.is_empty());
    assert!(log.live_materials.is_empty());
}

#[test]
fn unmount_twice_is_harmless() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    rig.mount(&mut controller, &cube());
    assert!(controller.unmount());
    let events = rig.log.borrow().events.len();
    assert!(!controller.unmount());

    assert_eq!(rig.frames.pending_frames(), 0);
    assert_eq!(rig.frames.cancels.get(), 1);
    assert_eq!(rig.listeners.detaches.get(), 1);
    assert_eq!(rig.surface.detaches.get(), 1);
    assert_eq!(rig.log.borrow().events.len(), events);
    assert_eq!(rig.log.borrow().use_after_release, 0);
}

#[test]
fn unmount_without_mount_is_a_no_op() {
    let mut controller: MountController<MockRenderer> = MountController::new();
    assert!(!controller.unmount());
    assert_eq!(controller.phase(), MountPhase::Unmounted);
}

#[test]
fn second_mount_is_refused_while_mounted() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    assert!(rig.mount(&mut controller, &cube()));
    assert!(controller.begin_mount().is_none());
    assert_eq!(rig.registry.live_handles(), 1);
}

#[test]
fn remount_after_unmount_builds_a_fresh_scene() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    rig.mount(&mut controller, &cube());
    let first = controller.scene().unwrap();
    controller.unmount();

    let rig2 = Rig::new();
    assert!(rig2.mount(&mut controller, &cube()));
    let second = controller.scene().unwrap();
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(first.borrow().state(), DriverState::Stopped);
    assert_eq!(second.borrow().state(), DriverState::Running);
}

#[test]
fn unmount_during_mount_discards_late_parts() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    let ticket = controller.begin_mount().unwrap();
    assert_eq!(controller.phase(), MountPhase::Mounting);
    assert!(controller.unmount());

    let parts = rig.parts(&cube());
    let started = Rc::new(std::cell::Cell::new(false));
    let flag = started.clone();
    let installed = controller.finish_mount(ticket, parts, move |_| {
        flag.set(true);
        Box::new(ManualFrames::default())
    });
    assert!(!installed);
    assert!(!started.get());
    assert_eq!(controller.phase(), MountPhase::Unmounted);
    assert_eq!(rig.registry.live_handles(), 0);
    assert!(!rig.listeners.is_attached());
    assert_eq!(rig.surface.detaches.get(), 1);
    assert_eq!(rig.log.borrow().renders(), 0);
}

#[test]
fn abandoned_mount_allows_a_retry() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    let ticket = controller.begin_mount().unwrap();
    controller.abandon_mount(ticket);
    assert_eq!(controller.phase(), MountPhase::Unmounted);
    assert!(rig.mount(&mut controller, &cube()));
}

#[test]
fn surface_removed_by_host_is_not_detached_again() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    rig.mount(&mut controller, &cube());
    rig.surface.attached.set(false);
    controller.unmount();
    assert_eq!(rig.surface.detaches.get(), 0);
    assert_eq!(rig.registry.live_handles(), 0);
}

#[test]
fn shared_input_mount_has_no_listeners_to_detach() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    let ticket = controller.begin_mount().unwrap();
    let mut parts = rig.parts(&cube());
    parts.listeners = None;
    assert!(controller.finish_mount(ticket, parts, rig.start_frames()));
    controller.unmount();
    assert_eq!(rig.listeners.detaches.get(), 0);
    assert_eq!(rig.registry.live_handles(), 0);
}

#[test]
fn texture_completing_after_teardown_is_ignored() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    let config = SceneConfig::new(SceneKind::TexturedSphere {
        image_url: "/avatar.webp".into(),
    });
    rig.mount(&mut controller, &config);
    let scene = controller.scene().unwrap();
    let ticket = scene.borrow().texture_request().unwrap();
    controller.unmount();

    let events = rig.log.borrow().events.len();
    let tex = TextureData {
        width: 2,
        height: 2,
        rgba: vec![0; 16],
    };
    let outcome = scene.borrow_mut().apply_texture(&ticket, Ok(tex));
    assert_eq!(outcome, TextureOutcome::Stale);
    let log = rig.log.borrow();
    assert_eq!(log.events.len(), events);
    assert_eq!(log.use_after_release, 0);
    assert_eq!(rig.registry.live_handles(), 0);
}

#[test]
fn frame_callback_after_teardown_does_nothing() {
    let rig = Rig::new();
    let mut controller = MountController::new();
    rig.mount(&mut controller, &cube());
    let scene = controller.scene().unwrap();
    scene
        .borrow_mut()
        .frame(Duration::from_millis(16), InputState::default());
    controller.unmount();

    // A callback that was already queued when teardown ran.
    scene
        .borrow_mut()
        .frame(Duration::from_millis(16), InputState::default());
    let log = rig.log.borrow();
    assert_eq!(log.renders(), 1);
    assert_eq!(log.use_after_release, 0);
}

#[test]
fn dropping_the_controller_tears_down() {
    let rig = Rig::new();
    {
        let mut controller = MountController::new();
        rig.mount(&mut controller, &cube());
    }
    assert_eq!(rig.registry.live_handles(), 0);
    assert_eq!(rig.frames.pending_frames(), 0);
}

#[test]
fn widgets_on_one_page_are_independent() {
    let registry = ResourceRegistry::new();
    let (a, log_a) = MockRenderer::new();
    let (b, log_b) = MockRenderer::new();
    let mut first = build(&cube(), a, surface(), &registry);
    let mut second = build(
        &SceneConfig::new(SceneKind::BloomBackground),
        b,
        surface(),
        &registry,
    );
    first.start();
    second.start();
    assert_eq!(registry.live_handles(), 2);
    first.stop();
    assert_eq!(registry.live_handles(), 1);
    second.frame(Duration::from_millis(16), InputState::default());
    assert!(log_a.borrow().released);
    assert!(!log_b.borrow().released);
    assert_eq!(log_b.borrow().renders(), 1);
}

#[test]
fn mount_without_a_container_is_a_no_op() {
    let rig = Rig::new();
    let mut controller = MountController::<MockRenderer>::new();
    assert!(controller.begin_mount_into(None::<&str>).is_none());
    assert_eq!(controller.phase(), MountPhase::Unmounted);
    assert!(!controller.unmount());

    let (ticket, container) = controller.begin_mount_into(Some("host")).unwrap();
    assert_eq!(container, "host");
    assert_eq!(controller.phase(), MountPhase::Mounting);
    assert!(controller.finish_mount(ticket, rig.parts(&cube()), rig.start_frames()));
    assert_eq!(controller.phase(), MountPhase::Mounted);
    assert!(controller.begin_mount_into(Some("host")).is_none());
}
