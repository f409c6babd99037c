use std::fmt;

use cgmath::Matrix4;

use super::lighting::{Lighting, LightingSnapshot};
use super::object::Group;
use super::transform::Transform;
use crate::config::{LightingConfig, SceneConfig};
use crate::core::events::{Event, EventBus, ListenerId};
use crate::error::Result;
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::rendering::{Frame, RenderTarget};

/// Handle to a static object registered with the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEventKind {
    DayNightToggled,
    ObjectAdded,
    ObjectRemoved,
    Resized,
}

impl fmt::Display for SceneEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SceneEventKind::DayNightToggled => "scene:dayNightToggled",
            SceneEventKind::ObjectAdded => "object:added",
            SceneEventKind::ObjectRemoved => "object:removed",
            SceneEventKind::Resized => "scene:resized",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Emitted after every mode-dependent value has been switched
    DayNightToggled { is_night: bool },
    ObjectAdded { id: ObjectId, name: String },
    ObjectRemoved { id: ObjectId, name: String },
    Resized { width: u32, height: u32 },
}

impl Event for SceneEvent {
    type Kind = SceneEventKind;

    fn kind(&self) -> SceneEventKind {
        match self {
            SceneEvent::DayNightToggled { .. } => SceneEventKind::DayNightToggled,
            SceneEvent::ObjectAdded { .. } => SceneEventKind::ObjectAdded,
            SceneEvent::ObjectRemoved { .. } => SceneEventKind::ObjectRemoved,
            SceneEvent::Resized { .. } => SceneEventKind::Resized,
        }
    }
}

/// Scene-owned mesh that is not a placed item (ground, border)
#[derive(Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub group: Group,
    pub transform: Transform,
}

/// Camera, lights, static objects and the target frames are drawn into
pub struct Scene<R: RenderTarget> {
    camera: PerspectiveCamera,
    lighting: Lighting,
    objects: Vec<SceneObject>,
    target: R,
    events: EventBus<SceneEvent>,
    next_object: u64,
}

impl<R: RenderTarget> Scene<R> {
    /// Creates a daytime scene whose camera matches the target's aspect ratio
    pub fn new(scene: &SceneConfig, lighting: &LightingConfig, target: R) -> Self {
        let (width, height) = target.size();
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        Self {
            camera: PerspectiveCamera::new(scene, aspect),
            lighting: Lighting::new(scene, lighting),
            objects: Vec::new(),
            target,
            events: EventBus::new(),
            next_object: 1,
        }
    }

    pub fn on<F>(&mut self, kind: SceneEventKind, handler: F) -> ListenerId
    where
        F: FnMut(&SceneEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn off(&mut self, kind: SceneEventKind, id: Option<ListenerId>) -> usize {
        self.events.off(kind, id)
    }

    pub fn add_object(&mut self, name: &str, group: Group, transform: Transform) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        self.objects.push(SceneObject {
            id,
            name: name.to_string(),
            group,
            transform,
        });

        log::debug!("Scene object '{}' added as {:?}", name, id);
        self.events.emit(&SceneEvent::ObjectAdded {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Removes an object and releases its parts
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        let mut object = self.objects.remove(index);
        object.group.release();

        self.events.emit(&SceneEvent::ObjectRemoved {
            id,
            name: object.name.clone(),
        });
        Some(object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Flips between day and night
    ///
    /// # Returns
    /// `true` when the scene is now in night mode
    pub fn toggle_day_night(&mut self) -> bool {
        let night = !self.lighting.is_night();
        self.set_night_mode(night);
        night
    }

    /// Applies a lighting mode; emits only when the mode actually changes
    pub fn set_night_mode(&mut self, night: bool) {
        if self.lighting.is_night() == night {
            return;
        }
        self.lighting.set_night(night);
        log::debug!("Scene switched to {} mode", if night { "night" } else { "day" });
        self.events
            .emit(&SceneEvent::DayNightToggled { is_night: night });
    }

    pub fn is_night(&self) -> bool {
        self.lighting.is_night()
    }

    pub fn lighting(&self) -> LightingSnapshot {
        self.lighting.snapshot()
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.resize_projection(width, height);
        self.target.resize(width, height);
        self.events.emit(&SceneEvent::Resized { width, height });
    }

    /// Draws static objects followed by `items` into the target
    ///
    /// # Arguments
    /// * `items` - Extra groups with their world matrices, usually the placed items
    pub fn render<'a, I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a Group, Matrix4<f32>)>,
    {
        let mut frame = Frame::new(self.camera.uniform(), &self.lighting);
        for object in &self.objects {
            frame.push_group(&object.group, object.transform.matrix());
        }
        for (group, world) in items {
            frame.push_group(group, world);
        }
        self.target.render(&frame)
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    /// Releases every static object and drops all listeners
    pub fn dispose(&mut self) {
        for object in &mut self.objects {
            object.group.release();
        }
        self.objects.clear();
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::Shape;
    use crate::gfx::rendering::HeadlessTarget;
    use crate::gfx::resources::{AssetManager, MaterialDesc};
    use crate::gfx::scene::object::{identity, MeshPart, PointLight};
    use cgmath::Vector3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene() -> Scene<HeadlessTarget> {
        Scene::new(
            &SceneConfig::default(),
            &LightingConfig::default(),
            HeadlessTarget::new(1200, 800),
        )
    }

    fn cube(assets: &mut AssetManager) -> Group {
        let mut group = Group::new();
        group.add(MeshPart::new(
            assets.geometry(Shape::cuboid(1.0, 1.0, 1.0)),
            assets.material(&MaterialDesc::lambert(0x8B4513)),
            identity(),
        ));
        group
    }

    #[test]
    fn test_toggle_twice_restores_lighting() {
        let mut scene = scene();
        let before = scene.lighting();

        assert!(scene.toggle_day_night());
        assert_ne!(scene.lighting(), before);
        assert!(!scene.toggle_day_night());
        assert_eq!(scene.lighting(), before);
    }

    #[test]
    fn test_listener_sees_complete_switch() {
        let mut scene = scene();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scene.on(SceneEventKind::DayNightToggled, move |event| {
            if let SceneEvent::DayNightToggled { is_night } = event {
                sink.borrow_mut().push(*is_night);
            }
            Ok(())
        });

        scene.toggle_day_night();
        scene.set_night_mode(true);
        scene.toggle_day_night();
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_render_collects_objects_and_lights() {
        let mut assets = AssetManager::with_seed(3);
        let mut scene = scene();
        scene.add_object("ground", cube(&mut assets), Transform::default());

        let mut lamp = cube(&mut assets);
        lamp.add_light(PointLight::new(0xFFFF99, 0.8, 4.0, Vector3::new(0.0, 2.0, 0.0)));
        let world = Transform::at(1.0, 0.0, 1.0).matrix();
        scene.render([(&lamp, world)]).unwrap();

        let frame = scene.target().last_frame().unwrap();
        assert_eq!(frame.draw_calls, 2);
        assert_eq!(frame.point_lights, 1);
        assert_eq!(frame.directional_lights, 1);
        assert_eq!(scene.target().frames_rendered(), 1);
    }

    #[test]
    fn test_remove_object_releases_group() {
        let mut assets = AssetManager::with_seed(3);
        let mut scene = scene();
        let id = scene.add_object("border", cube(&mut assets), Transform::default());

        let removed = scene.remove_object(id).unwrap();
        assert!(removed.group.is_empty());
        assert!(scene.remove_object(id).is_none());
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_resize_updates_camera_and_target() {
        let mut scene = scene();
        scene.resize(800, 800);
        assert_eq!(scene.camera().aspect, 1.0);
        assert_eq!(scene.target().size(), (800, 800));
    }
}
