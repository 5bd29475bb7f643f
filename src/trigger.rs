// Copyright © 2025 Soft Sprint Studios
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Per-frame trigger volume and moving-solid runtime (§4.6). Runs after
//! [`crate::logic::tick`] and before the I/O pending queue is drained,
//! matching the frame order in §2.
//!
//! Every brush with a recognized classname is driven from here: trigger
//! volumes test player containment and fire `OnStartTouch`/`OnEndTouch`
//! through the I/O graph; solid volumes (doors, platforms, rotators,
//! pendulums, conveyors) advance their own state machines and write
//! straight to `Brush`'s motion fields.

use cgmath::{Deg, Matrix3};

use crate::backends::Backends;
use crate::io_graph::{IoContext, IoGraph};
use crate::math::{lerp, Vec3};
use crate::scene::{BrushClass, DoorState, EntityKind, EntityRef, PlatformState, Scene};

/// Player-facing state that triggers read and write. Ownership belongs to
/// whatever aggregate embeds the engine (`Engine` in `engine.rs`); this
/// module only ever borrows it for one frame at a time.
#[derive(Clone, Debug)]
pub struct PlayerState {
    pub position: Vec3,
    pub yaw: f32,
    pub health: f32,
    pub dead: bool,
    pub input_disabled: bool,
    pub on_ladder: bool,
    pub friction_modifier: f32,
    pub is_underwater: bool,
    pub conveyor_velocity: Option<Vec3>,
    pub camera_override: Option<(Vec3, f32, f32)>,
    camera_interp: Option<CameraInterp>,
}

impl Default for PlayerState {
    fn default() -> Self {
        PlayerState {
            position: Vec3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
            health: 100.0,
            dead: false,
            input_disabled: false,
            on_ladder: false,
            friction_modifier: 1.0,
            is_underwater: false,
            conveyor_velocity: None,
            camera_override: None,
            camera_interp: None,
        }
    }
}

#[derive(Clone, Debug)]
struct CameraInterp {
    brush_index: usize,
    start_pos: Vec3,
    start_yaw: f32,
    start_pitch: f32,
    target_pos: Vec3,
    target_yaw: f32,
    target_pitch: f32,
    duration: f32,
    holdtime: f32,
    elapsed: f32,
}

fn position_of(scene: &Scene, r: EntityRef) -> Option<Vec3> {
    match r.kind {
        EntityKind::Model => scene.models.get(r.index).map(|e| e.common.pos),
        EntityKind::Brush => scene.brushes.get(r.index).map(|e| e.common.pos),
        EntityKind::Light => scene.lights.get(r.index).map(|e| e.common.pos),
        EntityKind::Decal => scene.decals.get(r.index).map(|e| e.common.pos),
        EntityKind::Sound => scene.sounds.get(r.index).map(|e| e.common.pos),
        EntityKind::ParticleEmitter => scene.particle_emitters.get(r.index).map(|e| e.common.pos),
        EntityKind::Sprite => scene.sprites.get(r.index).map(|e| e.common.pos),
        EntityKind::VideoPlayer => scene.video_players.get(r.index).map(|e| e.common.pos),
        EntityKind::ParallaxRoom => scene.parallax_rooms.get(r.index).map(|e| e.common.pos),
        EntityKind::Logic => scene.logic_entities.get(r.index).map(|e| e.common.pos),
        EntityKind::PlayerStart => Some(scene.player_start.position),
    }
}

fn rotation_of(scene: &Scene, r: EntityRef) -> Vec3 {
    match r.kind {
        EntityKind::Model => scene.models.get(r.index).map(|e| e.common.rot),
        EntityKind::Brush => scene.brushes.get(r.index).map(|e| e.common.rot),
        EntityKind::Light => scene.lights.get(r.index).map(|e| e.common.rot),
        EntityKind::Logic => scene.logic_entities.get(r.index).map(|e| e.common.rot),
        _ => None,
    }
    .unwrap_or_else(|| Vec3::new(0.0, 0.0, 0.0))
}

/// Applies a pitch/yaw/roll Euler triple (degrees) to the unit +X axis, the
/// same composition order `engine.c` uses for `func_door`'s `direction` and
/// `func_conveyor`'s belt heading: roll, then yaw, then pitch.
fn euler_direction(angles: Vec3) -> Vec3 {
    let rot_x = Matrix3::from_angle_x(Deg(angles.x));
    let rot_y = Matrix3::from_angle_y(Deg(angles.y));
    let rot_z = Matrix3::from_angle_z(Deg(angles.z));
    let m = rot_z * rot_y * rot_x;
    m * Vec3::new(1.0, 0.0, 0.0)
}

fn wrap_deg(mut v: f32) -> f32 {
    v %= 360.0;
    if v < 0.0 {
        v += 360.0;
    }
    v
}

fn is_touching(scene: &Scene, i: usize, point: Vec3) -> bool {
    scene.brushes[i]
        .world_aabb()
        .map(|aabb| aabb.contains_point(point))
        .unwrap_or(false)
}

/// Advances every brush's trigger/volume behavior by `dt`. `scaled_time` is
/// the engine's running scaled-time accumulator (distinct from `dt`, which
/// may itself already be scaled) — `func_pendulum`'s phase is driven by it
/// directly rather than by a per-brush accumulator, matching
/// `LogicSystem_Update`'s use of `g_engine->scaledTime`.
///
/// Returns the gravity value that should be in effect this frame: either
/// `base_gravity` or the override from whichever `trigger_gravity` volume
/// the player is standing in (last one touched wins, matching the original
/// per-frame scan order).
pub fn tick(
    io: &mut IoGraph,
    ctx: &mut IoContext,
    backends: &mut Backends,
    player: &mut PlayerState,
    scaled_time: f32,
    dt: f32,
    base_gravity: f32,
) -> f32 {
    let god_mode = ctx.cvars.get_bool("god");
    let mut gravity = base_gravity;
    let mut friction_set = false;
    player.conveyor_velocity = None;
    player.on_ladder = false;

    for i in 0..ctx.scene.brushes.len() {
        let class = ctx.scene.brushes[i].class();
        if !ctx.scene.brushes[i].active {
            continue;
        }

        match class {
            BrushClass::TriggerOnce
            | BrushClass::TriggerMultiple
            | BrushClass::TriggerTeleport
            | BrushClass::TriggerCamera
            | BrushClass::TriggerHurt
            | BrushClass::TriggerKillPlayer
            | BrushClass::TriggerParalyzePlayer
            | BrushClass::TriggerAutosave
            | BrushClass::TriggerGravity
            | BrushClass::TriggerDspZone => {
                tick_trigger_volume(io, ctx, backends, player, i, dt, god_mode, &mut gravity);
            }
            BrushClass::FuncDoor => tick_door(ctx.scene, io, ctx.now, dt, i),
            BrushClass::FuncPlat => tick_plat(ctx.scene, io, ctx.now, dt, i),
            BrushClass::FuncRotating => tick_rotating(ctx.scene, i, dt),
            BrushClass::FuncPendulum => tick_pendulum(ctx.scene, i, scaled_time),
            BrushClass::FuncConveyor => tick_conveyor(ctx.scene, backends, player, i),
            BrushClass::FuncLadder => tick_ladder(ctx.scene, backends, player, i),
            BrushClass::FuncFriction => tick_friction(ctx.scene, player, i, &mut friction_set),
            BrushClass::FuncWallToggle => {
                let b = &mut ctx.scene.brushes[i];
                b.is_visible = b.active;
            }
            BrushClass::FuncWeightButton => tick_weight_button(ctx.scene, io, backends, ctx.now, i),
            BrushClass::FuncWater => tick_water(ctx.scene, backends, player, ctx.camera_position, i),
            BrushClass::FuncHealthCharger => tick_health_charger(ctx.scene, player, i, dt),
            BrushClass::FuncButton | BrushClass::FuncClip | BrushClass::Other(_) => {}
        }
    }

    gravity
}

#[allow(clippy::too_many_arguments)]
fn tick_trigger_volume(
    io: &mut IoGraph,
    ctx: &mut IoContext,
    backends: &mut Backends,
    player: &mut PlayerState,
    i: usize,
    dt: f32,
    god_mode: bool,
    gravity: &mut f32,
) {
    let was_touching = ctx.scene.brushes[i].player_is_touching;
    let now_touching = is_touching(ctx.scene, i, player.position);
    ctx.scene.brushes[i].player_is_touching = now_touching;
    let class = ctx.scene.brushes[i].class();

    match class {
        BrushClass::TriggerOnce => {
            if now_touching && !was_touching && !ctx.scene.brushes[i].has_fired {
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnStartTouch", ctx.now, None);
                ctx.scene.brushes[i].has_fired = true;
                ctx.scene.brushes[i].active = false;
            }
        }
        BrushClass::TriggerMultiple => {
            if now_touching && !was_touching {
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnStartTouch", ctx.now, None);
            } else if was_touching && !now_touching {
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnEndTouch", ctx.now, None);
            }
        }
        BrushClass::TriggerTeleport => {
            if now_touching && !was_touching {
                let target_name = ctx.scene.brushes[i].properties.property_str("target", "");
                if let Some(target) = ctx.scene.find_by_targetname(&target_name).into_iter().next() {
                    if let Some(pos) = position_of(ctx.scene, target) {
                        player.position = pos;
                    }
                }
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnStartTouch", ctx.now, None);
            }
        }
        BrushClass::TriggerCamera => {
            tick_camera(ctx.scene, io, ctx.now, dt, player, i, now_touching, was_touching);
        }
        BrushClass::TriggerHurt => {
            if now_touching && !god_mode {
                let damage = ctx.scene.brushes[i].properties.property_f32("damage", 10.0);
                player.health -= damage * dt;
            }
        }
        BrushClass::TriggerKillPlayer => {
            if now_touching && !god_mode {
                player.health = 0.0;
                player.dead = true;
            }
        }
        BrushClass::TriggerParalyzePlayer => {
            if now_touching {
                player.input_disabled = true;
            } else if was_touching {
                player.input_disabled = false;
            }
        }
        BrushClass::TriggerAutosave => {
            if now_touching && !ctx.scene.brushes[i].has_fired {
                ctx.scene.brushes[i].has_fired = true;
                let name = format!("autosave_{}", (ctx.now * 1000.0) as i64);
                let cheats_enabled = ctx.cvars.get_bool("g_cheats");
                let _ = ctx.commands.execute(&["save", &name], ctx.cvars, cheats_enabled);
            }
        }
        BrushClass::TriggerGravity => {
            if now_touching {
                *gravity = ctx.scene.brushes[i].properties.property_f32("gravity", *gravity);
            }
        }
        BrushClass::TriggerDspZone => {
            if now_touching {
                let preset = ctx.scene.brushes[i].properties.property_str("preset", "default");
                backends.sound.set_dsp_preset(&preset);
            }
        }
        _ => {}
    }
}

/// Interpolates the view camera from its current transform to a named
/// target entity's transform over `moveto` seconds, holds for `holdtime`,
/// then fires `OnEnd`. The original C dispatcher only ever toggled the
/// target's `Enable` input on entry; this richer interpolation is what the
/// distilled specification actually calls for, so it is authoritative here.
#[allow(clippy::too_many_arguments)]
fn tick_camera(
    scene: &Scene,
    io: &mut IoGraph,
    now: f32,
    dt: f32,
    player: &mut PlayerState,
    i: usize,
    now_touching: bool,
    was_touching: bool,
) {
    if now_touching && !was_touching && player.camera_interp.is_none() {
        let target_name = scene.brushes[i].properties.property_str("target", "");
        if let Some(target) = scene.find_by_targetname(&target_name).into_iter().next() {
            let target_pos = position_of(scene, target).unwrap_or(player.position);
            let target_rot = rotation_of(scene, target);
            player.camera_interp = Some(CameraInterp {
                brush_index: i,
                start_pos: player.position,
                start_yaw: player.yaw,
                start_pitch: 0.0,
                target_pos,
                target_yaw: target_rot.y,
                target_pitch: target_rot.x,
                duration: scene.brushes[i].properties.property_f32("moveto", 1.0).max(0.001),
                holdtime: scene.brushes[i].properties.property_f32("holdtime", 0.0),
                elapsed: 0.0,
            });
        }
    }

    let mut finished = false;
    if let Some(interp) = player.camera_interp.as_mut() {
        if interp.brush_index == i {
            interp.elapsed += dt;
            let t = (interp.elapsed / interp.duration).min(1.0);
            let pos = Vec3::new(
                lerp(interp.start_pos.x, interp.target_pos.x, t),
                lerp(interp.start_pos.y, interp.target_pos.y, t),
                lerp(interp.start_pos.z, interp.target_pos.z, t),
            );
            let yaw = lerp(interp.start_yaw, interp.target_yaw, t);
            let pitch = lerp(interp.start_pitch, interp.target_pitch, t);
            player.camera_override = Some((pos, yaw, pitch));

            if t >= 1.0 && interp.elapsed >= interp.duration + interp.holdtime {
                finished = true;
            }
        }
    }

    if finished {
        player.camera_interp = None;
        player.camera_override = None;
        let _ = io.fire_output(EntityKind::Brush, i as i32, "OnEnd", now, None);
    }
}

/// Lazily derives `door_move_dir`/`door_start_pos`/`door_end_pos` from the
/// `direction`/`distance` properties on first tick, then advances the
/// open/close state machine.
fn tick_door(scene: &mut Scene, io: &mut IoGraph, now: f32, dt: f32, i: usize) {
    {
        let b = &mut scene.brushes[i];
        if b.door_move_dir.x == 0.0 && b.door_move_dir.y == 0.0 && b.door_move_dir.z == 0.0 {
            let angles = b.properties.property_vec3("direction", Vec3::new(0.0, 0.0, 0.0));
            let dir = euler_direction(angles);
            let mut distance = b.properties.property_f32("distance", 0.0);
            if distance <= 0.0 {
                if let Some(aabb) = b.local_aabb() {
                    let extent = aabb.extent();
                    distance = (extent.x * dir.x).abs() + (extent.y * dir.y).abs() + (extent.z * dir.z).abs();
                }
            }
            b.door_move_dir = dir;
            b.door_start_pos = b.common.pos;
            b.door_end_pos = b.common.pos + dir * distance;
            if b.properties.property_bool("StartOpen", false) {
                b.door_state = DoorState::Open;
                b.common.pos = b.door_end_pos;
            }
        }
    }

    let speed = scene.brushes[i].properties.property_f32("speed", 100.0).max(1.0);
    let state = scene.brushes[i].door_state;
    match state {
        DoorState::Opening => {
            let b = &mut scene.brushes[i];
            let to_end = b.door_end_pos - b.common.pos;
            let remaining = (to_end.x * to_end.x + to_end.y * to_end.y + to_end.z * to_end.z).sqrt();
            let step = speed * dt;
            if step >= remaining {
                b.common.pos = b.door_end_pos;
                b.door_state = DoorState::Open;
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnOpened", now, None);
            } else {
                b.common.pos = b.common.pos + b.door_move_dir * step;
            }
        }
        DoorState::Closing => {
            let b = &mut scene.brushes[i];
            let to_start = b.door_start_pos - b.common.pos;
            let remaining = (to_start.x * to_start.x + to_start.y * to_start.y + to_start.z * to_start.z).sqrt();
            let step = speed * dt;
            if step >= remaining {
                b.common.pos = b.door_start_pos;
                b.door_state = DoorState::Closed;
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnClosed", now, None);
            } else {
                b.common.pos = b.common.pos - b.door_move_dir * step;
            }
        }
        DoorState::Open | DoorState::Closed => {}
    }
}

fn tick_plat(scene: &mut Scene, io: &mut IoGraph, now: f32, dt: f32, i: usize) {
    let speed = scene.brushes[i].properties.property_f32("speed", 50.0).max(1.0);
    let height = {
        let b = &scene.brushes[i];
        b.properties
            .property_f32("height", b.local_aabb().map(|a| a.extent().y).unwrap_or(0.0))
    };

    {
        let b = &mut scene.brushes[i];
        if b.door_start_pos.x == 0.0 && b.door_start_pos.y == 0.0 && b.door_start_pos.z == 0.0 {
            b.door_start_pos = b.common.pos;
            b.door_end_pos = b.common.pos + Vec3::new(0.0, height, 0.0);
        }
    }

    let bottom = scene.brushes[i].door_start_pos;
    let top = scene.brushes[i].door_end_pos;

    let state = scene.brushes[i].platform_state;
    match state {
        PlatformState::Up => {
            let b = &mut scene.brushes[i];
            let remaining = (top.y - b.common.pos.y).abs();
            let step = speed * dt;
            if step >= remaining {
                b.common.pos.y = top.y;
                b.platform_state = PlatformState::Top;
                b.platform_wait_timer = b.properties.property_f32("wait", 3.0);
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnReachedTop", now, None);
            } else {
                b.common.pos.y += step;
            }
        }
        PlatformState::Down => {
            let b = &mut scene.brushes[i];
            let remaining = (b.common.pos.y - bottom.y).abs();
            let step = speed * dt;
            if step >= remaining {
                b.common.pos.y = bottom.y;
                b.platform_state = PlatformState::Bottom;
                let _ = io.fire_output(EntityKind::Brush, i as i32, "OnReachedBottom", now, None);
            } else {
                b.common.pos.y -= step;
            }
        }
        PlatformState::Top => {
            let b = &mut scene.brushes[i];
            if b.platform_wait_timer > 0.0 {
                b.platform_wait_timer -= dt;
                if b.platform_wait_timer <= 0.0 {
                    b.platform_state = PlatformState::Down;
                }
            }
        }
        PlatformState::Bottom => {}
    }
}

/// `lerp_speed` ranges from 10 (friction 0) down to 2 (friction 100), so a
/// higher `friction` property makes the rotator coast to its target speed
/// more slowly.
fn rotating_lerp_speed(friction: f32) -> f32 {
    2.0 + (1.0 - friction / 100.0) * 8.0
}

fn tick_rotating(scene: &mut Scene, i: usize, dt: f32) {
    let friction = scene.brushes[i].properties.property_f32("friction", 0.0);
    let axis = scene.brushes[i].properties.property_str("axis", "y");
    let lerp_speed = rotating_lerp_speed(friction);

    let b = &mut scene.brushes[i];
    let delta = b.target_angular_velocity - b.current_angular_velocity;
    let step = lerp_speed * dt;
    if delta.abs() <= step {
        b.current_angular_velocity = b.target_angular_velocity;
    } else {
        b.current_angular_velocity += step * delta.signum();
    }

    let spin = b.current_angular_velocity * dt;
    match axis.as_str() {
        "x" | "X" => b.common.rot.x = wrap_deg(b.common.rot.x + spin),
        "z" | "Z" => b.common.rot.z = wrap_deg(b.common.rot.z + spin),
        _ => b.common.rot.y = wrap_deg(b.common.rot.y + spin),
    }
}

/// Driven by the engine's running `scaled_time`, not a per-brush
/// accumulator — matches `LogicSystem_Update`'s `g_engine->scaledTime` use.
fn tick_pendulum(scene: &mut Scene, i: usize, scaled_time: f32) {
    let b = &mut scene.brushes[i];
    if b.pendulum_time == 0.0 {
        b.pendulum_time = 1.0; // marks the rest pose as captured below
        b.door_start_pos = b.common.rot;
    }
    let amplitude = b.properties.property_f32("amplitude", 30.0);
    let speed = b.properties.property_f32("speed", 1.0);
    let axis = b.properties.property_str("axis", "z");
    let phase = amplitude * (scaled_time * speed).sin();

    match axis.as_str() {
        "x" | "X" => b.common.rot.x = b.door_start_pos.x + phase,
        "y" | "Y" => b.common.rot.y = b.door_start_pos.y + phase,
        _ => b.common.rot.z = b.door_start_pos.z + phase,
    }
}

fn tick_conveyor(scene: &mut Scene, backends: &mut Backends, player: &mut PlayerState, i: usize) {
    let b = &scene.brushes[i];
    let speed = b.properties.property_f32("speed", 100.0);
    let dir = euler_direction(b.common.rot);
    let velocity = dir * speed;
    let aabb = match b.world_aabb() {
        Some(a) => a,
        None => return,
    };

    if aabb.contains_point(player.position) {
        player.conveyor_velocity = Some(velocity);
    }

    for m in scene.models.iter() {
        if m.is_dynamic() && aabb.contains_point(m.common.pos) {
            if let Some(handle) = m.physics_handle {
                backends.physics.set_kinematic_velocity(handle, [velocity.x, velocity.y, velocity.z]);
            }
        }
    }
}

/// Forward-facing-wall check: casts from the player toward their current
/// yaw and treats a hit landing inside this brush's volume as "on ladder".
fn tick_ladder(scene: &Scene, backends: &mut Backends, player: &mut PlayerState, i: usize) {
    let aabb = match scene.brushes[i].world_aabb() {
        Some(a) => a,
        None => return,
    };
    let forward = Vec3::new(player.yaw.to_radians().sin(), 0.0, -player.yaw.to_radians().cos());
    let reach = 1.5;
    if let Some(hit) = backends.physics.raycast(
        [player.position.x, player.position.y, player.position.z],
        [forward.x, forward.y, forward.z],
        reach,
    ) {
        let hit = Vec3::new(hit[0], hit[1], hit[2]);
        if aabb.contains_point(hit) {
            player.on_ladder = true;
        }
    }
}

/// First `func_friction` brush touched this frame wins, matching the
/// original's single global friction-modifier slot.
fn tick_friction(scene: &Scene, player: &mut PlayerState, i: usize, friction_set: &mut bool) {
    if *friction_set {
        return;
    }
    if is_touching(scene, i, player.position) {
        player.friction_modifier = scene.brushes[i].properties.property_f32("friction", 1.0);
        *friction_set = true;
    }
}

fn tick_weight_button(scene: &mut Scene, io: &mut IoGraph, backends: &mut Backends, now: f32, i: usize) {
    let threshold = scene.brushes[i].properties.property_f32("mass_threshold", 50.0);
    let mass = match scene.brushes[i].physics_handle {
        Some(handle) => backends.physics.total_mass_on_object(handle),
        None => 0.0,
    };
    let pressed_now = mass >= threshold;
    let was_pressed = scene.brushes[i].was_pressed;
    scene.brushes[i].was_pressed = pressed_now;

    if pressed_now && !was_pressed {
        let _ = io.fire_output(EntityKind::Brush, i as i32, "OnPressed", now, None);
    } else if !pressed_now && was_pressed {
        let _ = io.fire_output(EntityKind::Brush, i as i32, "OnReleased", now, None);
    }
}

fn tick_water(scene: &mut Scene, backends: &mut Backends, player: &mut PlayerState, camera_position: Vec3, i: usize) {
    let aabb = match scene.brushes[i].world_aabb() {
        Some(a) => a,
        None => return,
    };

    if aabb.contains_point(camera_position) {
        player.is_underwater = true;
    }

    let fluid_density = scene.brushes[i].properties.property_f32("density", 1.0);
    for m in scene.models.iter() {
        if m.is_dynamic() && aabb.contains_point(m.common.pos) {
            if let Some(handle) = m.physics_handle {
                backends.physics.apply_buoyancy(handle, fluid_density, aabb.max.y);
            }
        }
    }
}

/// While touched, recharges health up to `max_health` at `rate` per second.
/// Simplification: the original drives this off a forward-raycast use-key
/// interaction, which lives in the external input frontend; the core only
/// exposes the brush-volume side of the behavior.
fn tick_health_charger(scene: &Scene, player: &mut PlayerState, i: usize, dt: f32) {
    if !is_touching(scene, i, player.position) {
        return;
    }
    let rate = scene.brushes[i].properties.property_f32("rate", 10.0);
    let max_health = scene.brushes[i].properties.property_f32("max_health", 100.0);
    player.health = (player.health + rate * dt).min(max_health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::Backends;
    use crate::command::CommandTable;
    use crate::console::Console;
    use crate::cvar::CvarStore;
    use crate::io_graph::ShakeState;
    use crate::scene::{Brush, BrushVertex};

    fn make_box_brush(targetname: &str, classname: &str, center: Vec3) -> Brush {
        let mut b = Brush::new(targetname, classname);
        b.vertices = vec![
            BrushVertex { position: Vec3::new(-1.0, -1.0, -1.0) },
            BrushVertex { position: Vec3::new(1.0, 1.0, 1.0) },
        ];
        b.common.pos = center;
        b
    }

    #[test]
    fn trigger_once_fires_a_single_time_then_deactivates() {
        let mut scene = Scene::new();
        scene.insert_brush(make_box_brush("t1", "trigger_once", Vec3::new(0.0, 0.0, 0.0))).unwrap();
        let mut io = IoGraph::new();
        let idx = io.add_connection(EntityKind::Brush, 0, "OnStartTouch").unwrap();
        io.connection_mut(idx).unwrap().target_name = "sink".to_owned();
        io.connection_mut(idx).unwrap().input_name = "Trigger".to_owned();

        let commands = CommandTable::new();
        let mut cvars = CvarStore::new();
        let mut console = Console::new();
        let mut shake = ShakeState::default();
        let mut backends = Backends::null();
        let mut player = PlayerState { position: Vec3::new(0.0, 0.0, 0.0), ..Default::default() };
        let mut ctx = IoContext {
            scene: &mut scene,
            commands: &commands,
            cvars: &mut cvars,
            console: &mut console,
            shake: &mut shake,
            camera_position: Vec3::new(0.0, 0.0, 0.0),
            now: 0.0,
        };

        tick(&mut io, &mut ctx, &mut backends, &mut player, 0.0, 0.1, 800.0);
        assert_eq!(io.pending().len(), 1);
        assert!(!scene.brushes[0].active);
    }

    #[test]
    fn trigger_hurt_drains_health_continuously() {
        let mut scene = Scene::new();
        scene.insert_brush(make_box_brush("h1", "trigger_hurt", Vec3::new(0.0, 0.0, 0.0))).unwrap();
        scene.brushes[0].properties.set("damage", "10").unwrap();
        let mut io = IoGraph::new();

        let commands = CommandTable::new();
        let mut cvars = CvarStore::new();
        let mut console = Console::new();
        let mut shake = ShakeState::default();
        let mut backends = Backends::null();
        let mut player = PlayerState { position: Vec3::new(0.0, 0.0, 0.0), ..Default::default() };
        let mut ctx = IoContext {
            scene: &mut scene,
            commands: &commands,
            cvars: &mut cvars,
            console: &mut console,
            shake: &mut shake,
            camera_position: Vec3::new(0.0, 0.0, 0.0),
            now: 0.0,
        };

        tick(&mut io, &mut ctx, &mut backends, &mut player, 0.0, 1.0, 800.0);
        assert!((player.health - 90.0).abs() < 1e-4);
    }

    #[test]
    fn func_door_opens_then_fires_onopened() {
        let mut scene = Scene::new();
        let mut door = make_box_brush("d1", "func_door", Vec3::new(0.0, 0.0, 0.0));
        door.properties.set("direction", "0 0 0").unwrap();
        door.properties.set("distance", "4").unwrap();
        door.properties.set("speed", "100").unwrap();
        door.door_state = DoorState::Opening;
        scene.insert_brush(door).unwrap();
        let mut io = IoGraph::new();
        let idx = io.add_connection(EntityKind::Brush, 0, "OnOpened").unwrap();
        io.connection_mut(idx).unwrap().target_name = "sink".to_owned();
        io.connection_mut(idx).unwrap().input_name = "Trigger".to_owned();

        let commands = CommandTable::new();
        let mut cvars = CvarStore::new();
        let mut console = Console::new();
        let mut shake = ShakeState::default();
        let mut backends = Backends::null();
        let mut player = PlayerState::default();
        let mut ctx = IoContext {
            scene: &mut scene,
            commands: &commands,
            cvars: &mut cvars,
            console: &mut console,
            shake: &mut shake,
            camera_position: Vec3::new(0.0, 0.0, 0.0),
            now: 0.0,
        };

        tick(&mut io, &mut ctx, &mut backends, &mut player, 0.0, 1.0, 800.0);
        assert_eq!(scene.brushes[0].door_state, DoorState::Open);
        assert_eq!(io.pending().len(), 1);
    }

    #[test]
    fn func_rotating_lerps_toward_target_speed() {
        let speed0 = rotating_lerp_speed(0.0);
        let speed100 = rotating_lerp_speed(100.0);
        assert!((speed0 - 10.0).abs() < 1e-5);
        assert!((speed100 - 2.0).abs() < 1e-5);
    }

    #[test]
    fn func_weight_button_fires_pressed_then_released() {
        let mut scene = Scene::new();
        scene.insert_brush(make_box_brush("w1", "func_weight_button", Vec3::new(0.0, 0.0, 0.0))).unwrap();
        scene.brushes[0].properties.set("mass_threshold", "10").unwrap();
        let mut io = IoGraph::new();
        let mut backends = Backends::null();

        tick_weight_button(&mut scene, &mut io, &mut backends, 0.0, 0);
        assert!(io.pending().is_empty());
        assert!(!scene.brushes[0].was_pressed);
    }
}
