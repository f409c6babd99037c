use std::f32::consts::TAU;

use super::BuildContext;
use crate::gfx::geometry::Shape;
use crate::gfx::resources::MaterialDesc;
use crate::gfx::scene::Transform;
use crate::items::kind::TreeKind;

const BARK: u32 = 0x8B4513;
const LEAVES: u32 = 0x228B22;
const NEEDLES: u32 = 0x0F5132;
const TRUNK_HEIGHT: f32 = 0.8;

pub(super) fn build(ctx: &mut BuildContext<'_>, kind: TreeKind) {
    match kind {
        TreeKind::Oak => oak(ctx),
        TreeKind::Pine => pine(ctx),
    }
}

fn trunk(ctx: &mut BuildContext<'_>, radius: f32) {
    ctx.part(
        BuildContext::cylinder(radius, radius * 1.5, TRUNK_HEIGHT),
        &MaterialDesc::lambert(BARK),
        Transform::at(0.0, TRUNK_HEIGHT / 2.0, 0.0),
    );
}

/// Trunk, round crown and five jittered leaf clusters around it
fn oak(ctx: &mut BuildContext<'_>) {
    let crown_radius = 0.8;
    let leaves = MaterialDesc::lambert(LEAVES);

    trunk(ctx, 0.1);
    ctx.part(
        BuildContext::sphere(crown_radius),
        &leaves,
        Transform::at(0.0, TRUNK_HEIGHT + crown_radius * 0.6, 0.0),
    );

    let distance = crown_radius * 0.7;
    for i in 0..5 {
        let angle = i as f32 / 5.0 * TAU;
        let y = TRUNK_HEIGHT + crown_radius * 0.4 + ctx.jitter(0.3);
        ctx.part(
            BuildContext::sphere(crown_radius * 0.3),
            &leaves,
            Transform::at(angle.cos() * distance, y, angle.sin() * distance),
        );
    }
}

/// Trunk and four stacked cones narrowing towards the top
fn pine(ctx: &mut BuildContext<'_>) {
    let cone_height = 0.8;
    let needles = MaterialDesc::lambert(NEEDLES);

    trunk(ctx, 0.08);
    for i in 0..4 {
        let radius = 0.6 - i as f32 * 0.12;
        ctx.part(
            Shape::cone(radius, cone_height, 8),
            &needles,
            Transform::at(0.0, TRUNK_HEIGHT + i as f32 * 0.4 + cone_height / 2.0, 0.0),
        );
    }
}
