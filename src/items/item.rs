//! A placed garden item: identity, transform and its procedural mesh group

use std::fmt;

use cgmath::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use super::kind::{ItemCategory, ItemKind};
use crate::animation::{Animatable, TweenTargets};
use crate::gfx::picking::AABB;
use crate::gfx::resources::rgb_from_hex;
use crate::gfx::scene::object::{Group, PointLight};
use crate::gfx::scene::Transform;

/// Tag carried by the lamp glass part
pub const GLASS_TAG: &str = "glass";
/// Glass glow while the lamp is lit
pub const LAMP_GLOW: u32 = 0x333300;

/// Unique item identifier, e.g. `TreeItem_1718000000000_1a`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(kind: ItemKind, created_ms: u64, serial: u64) -> Self {
        Self(format!("{}_{}_{:x}", kind.class_name(), created_ms, serial))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex serial after the last `_`, if the id has one
    pub fn serial(&self) -> Option<u64> {
        let (_, serial) = self.0.rsplit_once('_')?;
        u64::from_str_radix(serial, 16).ok()
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialized form of an item; the mesh is rebuilt from `(kind, seed)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub category: ItemCategory,
    pub subtype: String,
    pub seed: u64,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

/// A decorative object placed in the garden
///
/// The item owns its mesh group. [`Item::dispose`] releases the group's parts
/// and lights; calling it again is a no-op.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    seed: u64,
    pub transform: Transform,
    group: Group,
    night_mode: bool,
    disposed: bool,
}

impl Item {
    pub(crate) fn new(id: ItemId, kind: ItemKind, seed: u64, group: Group) -> Self {
        Self {
            id,
            kind,
            seed,
            transform: Transform::default(),
            group,
            night_mode: false,
            disposed: false,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn category(&self) -> ItemCategory {
        self.kind.category()
    }

    pub fn subtype(&self) -> &'static str {
        self.kind.subtype()
    }

    /// Seed the mesh was generated from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position
    }

    /// Moves the item; items always stand on the ground, so `y` is dropped
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform.position = Vector3::new(position.x, 0.0, position.z);
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.transform.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.transform.scale = Vector3::new(scale, scale, scale);
    }

    pub fn set_scale_xyz(&mut self, scale: Vector3<f32>) {
        self.transform.scale = scale;
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.transform.rotation
    }

    /// Sets the heading about the vertical axis, keeping X and Z rotation
    pub fn set_rotation_y(&mut self, angle: f32) {
        self.transform.rotation.y = angle;
    }

    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.transform.rotation = rotation;
    }

    pub fn enable_shadows(&mut self) {
        self.group.set_shadows(true, true);
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.transform.matrix()
    }

    /// World-space bounds, `None` once disposed
    pub fn bounding_box(&self) -> Option<AABB> {
        self.group
            .bounds()
            .map(|bounds| bounds.transform(&self.world_matrix()))
    }

    pub fn height(&self) -> f32 {
        self.bounding_box().map_or(0.0, |bounds| bounds.size().y)
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.group.lights
    }

    pub fn is_night_mode(&self) -> bool {
        self.night_mode
    }

    /// Shows lights and lights up the lamp glass at night; other kinds only
    /// remember the mode
    pub fn toggle_night_mode(&mut self, night: bool) {
        self.night_mode = night;
        if !self.kind.has_lights() {
            return;
        }

        for light in &mut self.group.lights {
            light.visible = night;
        }
        let glow = if night { rgb_from_hex(LAMP_GLOW) } else { [0.0; 3] };
        for glass in self.group.parts_tagged(GLASS_TAG) {
            glass.emissive = Some(glow);
        }
    }

    /// Releases every owned part and light
    ///
    /// # Returns
    /// Number of parts released; `0` on repeated calls
    pub fn dispose(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        self.disposed = true;
        let released = self.group.release();
        log::debug!("Disposed {} ({} parts)", self.id, released);
        released
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            id: self.id.clone(),
            category: self.category(),
            subtype: self.subtype().to_string(),
            seed: self.seed,
            position: self.transform.position.into(),
            rotation: self.transform.rotation.into(),
            scale: self.transform.scale.into(),
        }
    }
}

/// Items are equal when identity, recipe and placement match. The mesh
/// follows from the recipe and the lighting mode from the garden state.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.seed == other.seed
            && self.transform == other.transform
    }
}

impl TweenTargets<ItemId> for [Item] {
    fn animatable_mut(&mut self, key: &ItemId) -> Option<&mut dyn Animatable> {
        self.iter_mut()
            .find(|item| &item.id == key)
            .map(|item| &mut item.transform as &mut dyn Animatable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::AssetManager;
    use crate::items::builders;
    use crate::items::kind::{DecorationKind, TreeKind};

    fn item(kind: ItemKind) -> Item {
        let mut assets = AssetManager::with_seed(0);
        let group = builders::build(kind, &mut assets, 42);
        Item::new(ItemId::new(kind, 0, 1), kind, 42, group)
    }

    #[test]
    fn test_set_position_keeps_item_on_ground() {
        let mut oak = item(ItemKind::Tree(TreeKind::Oak));
        oak.set_position(Vector3::new(2.0, 5.0, -3.0));
        assert_eq!(oak.position(), Vector3::new(2.0, 0.0, -3.0));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut oak = item(ItemKind::Tree(TreeKind::Oak));
        assert!(oak.dispose() > 0);
        assert!(oak.is_disposed());
        assert_eq!(oak.dispose(), 0);
        assert!(oak.bounding_box().is_none());
    }

    #[test]
    fn test_lamp_night_mode_lights_glass() {
        let mut lamp = item(ItemKind::Decoration(DecorationKind::Lamp));
        assert!(lamp.lights().iter().all(|l| !l.visible));

        lamp.toggle_night_mode(true);
        assert!(lamp.lights().iter().all(|l| l.visible));
        let glass = lamp
            .group()
            .parts
            .iter()
            .find(|p| p.tag == Some(GLASS_TAG))
            .unwrap();
        assert_eq!(glass.emissive_color(), rgb_from_hex(LAMP_GLOW));

        lamp.toggle_night_mode(false);
        assert!(lamp.lights().iter().all(|l| !l.visible));
    }

    #[test]
    fn test_bounding_box_follows_transform() {
        let mut oak = item(ItemKind::Tree(TreeKind::Oak));
        let height = oak.height();
        oak.set_position(Vector3::new(4.0, 0.0, 0.0));
        oak.set_scale(2.0);

        let bounds = oak.bounding_box().unwrap();
        assert!((bounds.size().y - height * 2.0).abs() < 1e-4);
        assert!((bounds.center().x - 4.0).abs() < 0.5);
    }

    #[test]
    fn test_items_resolve_as_tween_targets() {
        let mut items = vec![item(ItemKind::Tree(TreeKind::Pine))];
        let id = items[0].id().clone();
        let targets: &mut [Item] = &mut items;
        let transform = targets.animatable_mut(&id).unwrap();
        transform.set_channel(crate::animation::Channel::ScaleX, 0.5);
        assert_eq!(items[0].scale().x, 0.5);
        assert!(items.as_mut_slice().animatable_mut(&ItemId::from("missing")).is_none());
    }

    #[test]
    fn test_record_carries_placement() {
        let mut oak = item(ItemKind::Tree(TreeKind::Oak));
        oak.set_position(Vector3::new(1.0, 0.0, 2.0));
        oak.set_rotation_y(0.5);
        let record = oak.to_record();
        assert_eq!(record.category, ItemCategory::Tree);
        assert_eq!(record.subtype, "oak");
        assert_eq!(record.position, [1.0, 0.0, 2.0]);
        assert_eq!(record.rotation[1], 0.5);
        assert_eq!(record.seed, 42);
    }
}
