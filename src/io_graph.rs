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

//! The gameplay event layer (§4.4): a static Output→Input connection table,
//! a time-ordered pending-delivery queue, and the `execute_input` dispatch
//! table that gives classnames their runtime behavior.

use rand::Rng;

use crate::command::{tokenize, CommandTable};
use crate::console::Console;
use crate::cvar::CvarStore;
use crate::error::IoGraphError;
use crate::math::Vec3;
use crate::scene::{BrushClass, DoorState, EntityKind, LogicClass, PlatformState, Scene};

pub const MAX_IO_CONNECTIONS: usize = 1024;
pub const MAX_PENDING_EVENTS: usize = 256;
const FIELD_LEN: usize = 63;

fn clamp_field(s: &str) -> String {
    if s.len() <= FIELD_LEN {
        s.to_owned()
    } else {
        s.chars().take(FIELD_LEN).collect()
    }
}

fn rand_uniform(min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rand::thread_rng().gen_range(min, max)
}

#[derive(Clone, Debug)]
pub struct Connection {
    pub active: bool,
    pub source_kind: EntityKind,
    pub source_index: i32,
    pub output_name: String,
    pub target_name: String,
    pub input_name: String,
    pub parameter: String,
    pub delay: f32,
    pub fire_once: bool,
    pub has_fired: bool,
}

impl Connection {
    fn new(source_kind: EntityKind, source_index: i32, output_name: &str) -> Connection {
        Connection {
            active: true,
            source_kind,
            source_index,
            output_name: clamp_field(output_name),
            target_name: String::new(),
            input_name: String::new(),
            parameter: String::new(),
            delay: 0.0,
            fire_once: false,
            has_fired: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PendingEvent {
    pub active: bool,
    pub target_name: String,
    pub input_name: String,
    pub parameter: String,
    pub execution_time: f32,
}

/// Everything `execute_input` needs beyond the I/O graph itself: the world
/// state it mutates and the collaborators it may call into
/// (`point_servercommand`, `game_end`).
pub struct IoContext<'a> {
    pub scene: &'a mut Scene,
    pub commands: &'a CommandTable,
    pub cvars: &'a mut CvarStore,
    pub console: &'a mut Console,
    pub shake: &'a mut ShakeState,
    pub camera_position: Vec3,
    pub now: f32,
}

/// Global screen-shake parameters written directly by `env_shake` (§4.4).
#[derive(Clone, Debug, Default)]
pub struct ShakeState {
    pub amplitude: f32,
    pub frequency: f32,
    pub duration_timer: f32,
}

/// The connection table and pending-event queue.
pub struct IoGraph {
    connections: Vec<Connection>,
    pending: Vec<PendingEvent>,
}

impl IoGraph {
    pub fn new() -> IoGraph {
        IoGraph {
            connections: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn pending(&self) -> &[PendingEvent] {
        &self.pending
    }

    /// Appends a connection, initialized inactive-but-targeted; the caller
    /// fills in `target_name`/`input_name`/`parameter`/`delay`/`fire_once`
    /// via [`IoGraph::connection_mut`].
    pub fn add_connection(
        &mut self,
        source_kind: EntityKind,
        source_index: i32,
        output_name: &str,
    ) -> Result<usize, IoGraphError> {
        if self.connections.len() >= MAX_IO_CONNECTIONS {
            return Err(IoGraphError::TooManyConnections(MAX_IO_CONNECTIONS));
        }
        self.connections.push(Connection::new(source_kind, source_index, output_name));
        Ok(self.connections.len() - 1)
    }

    pub fn connection_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.connections.get_mut(index)
    }

    pub fn remove_connection(&mut self, index: usize) {
        if index < self.connections.len() {
            self.connections.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.connections.clear();
        self.pending.clear();
    }

    /// Schedules delivery for every matching, not-yet-fired connection.
    pub fn fire_output(
        &mut self,
        source_kind: EntityKind,
        source_index: i32,
        output_name: &str,
        now: f32,
        parameter_override: Option<&str>,
    ) -> Result<(), IoGraphError> {
        let matches: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.active
                    && c.source_kind == source_kind
                    && c.source_index == source_index
                    && c.output_name == output_name
                    && !(c.fire_once && c.has_fired)
            })
            .map(|(i, _)| i)
            .collect();

        for idx in matches {
            if self.pending.len() >= MAX_PENDING_EVENTS {
                return Err(IoGraphError::TooManyPendingEvents(MAX_PENDING_EVENTS));
            }
            let conn = &mut self.connections[idx];
            let parameter = parameter_override.unwrap_or(&conn.parameter).to_owned();
            self.pending.push(PendingEvent {
                active: true,
                target_name: conn.target_name.clone(),
                input_name: conn.input_name.clone(),
                parameter: clamp_field(&parameter),
                execution_time: now + conn.delay,
            });
            conn.has_fired = true;
        }
        Ok(())
    }

    /// Delivers every event whose `execution_time` has arrived, then
    /// compacts the queue in a single stable pass.
    pub fn process_pending(&mut self, now: f32, ctx: &mut IoContext) {
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].active && self.pending[i].execution_time <= now {
                let target = self.pending[i].target_name.clone();
                let input = self.pending[i].input_name.clone();
                let parameter = self.pending[i].parameter.clone();
                self.pending[i].active = false;
                self.execute_input(&target, &input, &parameter, ctx);
            }
            i += 1;
        }
        self.pending.retain(|e| e.active);
    }

    /// Two-level dispatch: first on the target's class, then on `input_name`.
    /// A connection whose target name matches no entity is silently ignored.
    pub fn execute_input(&mut self, target_name: &str, input_name: &str, parameter: &str, ctx: &mut IoContext) {
        self.execute_logic_input(target_name, input_name, parameter, ctx);
        self.execute_model_input(target_name, input_name, parameter, ctx);
        self.execute_brush_input(target_name, input_name, parameter, ctx);
        Self::execute_light_input(target_name, input_name, ctx.scene);
        Self::execute_sound_input(target_name, input_name, ctx.scene);
        Self::execute_particle_input(target_name, input_name, ctx.scene);
        Self::execute_video_input(target_name, input_name, ctx.scene);
        Self::execute_sprite_input(target_name, input_name, ctx.scene);
    }

    fn execute_logic_input(&mut self, target_name: &str, input_name: &str, parameter: &str, ctx: &mut IoContext) {
        let indices: Vec<usize> = ctx
            .scene
            .logic_entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.common.targetname == target_name)
            .map(|(i, _)| i)
            .collect();

        for i in indices {
            let class = ctx.scene.logic_entities[i].class();
            match class {
                LogicClass::Timer => match input_name {
                    "StartTimer" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.active = true;
                        ent.float_a = ent.properties.property_f32("delay", 1.0);
                    }
                    "StopTimer" => ctx.scene.logic_entities[i].active = false,
                    "ToggleTimer" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.active = !ent.active;
                        if ent.active && ent.float_a <= 0.0 {
                            ent.float_a = ent.properties.property_f32("delay", 1.0);
                        }
                    }
                    _ => {}
                },
                LogicClass::MathCounter => {
                    let (min, max) = {
                        let ent = &ctx.scene.logic_entities[i];
                        (ent.properties.property_i32("min", 0), ent.properties.property_i32("max", 0))
                    };
                    let value: f32 = if !parameter.is_empty() {
                        parameter.parse().unwrap_or(1.0)
                    } else {
                        1.0
                    };

                    let divide_by_zero = {
                        let ent = &mut ctx.scene.logic_entities[i];
                        match input_name {
                            "Add" => {
                                ent.float_a += value;
                                false
                            }
                            "Subtract" => {
                                ent.float_a -= value;
                                false
                            }
                            "Multiply" => {
                                ent.float_a *= value;
                                false
                            }
                            "Divide" => {
                                if value != 0.0 {
                                    ent.float_a /= value;
                                    false
                                } else {
                                    true
                                }
                            }
                            _ => false,
                        }
                    };
                    if divide_by_zero {
                        ctx.console.report(IoGraphError::DivideByZero);
                        continue;
                    }

                    let float_a = ctx.scene.logic_entities[i].float_a;
                    if max != 0 && float_a >= max as f32 {
                        let _ = self.fire_output(EntityKind::Logic, i as i32, "OnHitMax", ctx.now, None);
                    }
                    if min != 0 && float_a <= min as f32 {
                        let _ = self.fire_output(EntityKind::Logic, i as i32, "OnHitMin", ctx.now, None);
                    }
                }
                LogicClass::Random => match input_name {
                    "Enable" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        if !ent.active {
                            let min_t = ent.properties.property_f32("min_time", 0.0);
                            let max_t = ent.properties.property_f32("max_time", 0.0);
                            ent.float_a = rand_uniform(min_t, max_t);
                        }
                        ent.active = true;
                    }
                    "Disable" => ctx.scene.logic_entities[i].active = false,
                    _ => {}
                },
                LogicClass::Relay => match input_name {
                    "Trigger" => {
                        if ctx.scene.logic_entities[i].active {
                            let _ = self.fire_output(EntityKind::Logic, i as i32, "OnTrigger", ctx.now, None);
                        }
                    }
                    "Enable" => ctx.scene.logic_entities[i].active = true,
                    "Disable" => ctx.scene.logic_entities[i].active = false,
                    "Toggle" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.active = !ent.active;
                    }
                    _ => {}
                },
                LogicClass::ServerCommand => {
                    if input_name == "Command" && !parameter.is_empty() {
                        let argv = tokenize(parameter);
                        if !argv.is_empty() {
                            let cheats_enabled = ctx.cvars.get_bool("g_cheats");
                            let out = ctx.commands.execute(&argv, ctx.cvars, cheats_enabled);
                            if !out.is_empty() {
                                ctx.console.println(out);
                            }
                        }
                    }
                }
                LogicClass::Compare => {
                    match input_name {
                        "SetValue" => {
                            ctx.scene.logic_entities[i].float_a = parameter.parse().unwrap_or(0.0);
                        }
                        "SetCompareValue" => {
                            let _ = ctx.scene.logic_entities[i].properties.set("CompareValue", parameter);
                        }
                        "Compare" | "SetValueCompare" => {
                            if input_name == "SetValueCompare" {
                                ctx.scene.logic_entities[i].float_a = parameter.parse().unwrap_or(0.0);
                            }
                            let val_a = ctx.scene.logic_entities[i].float_a;
                            let val_b = ctx.scene.logic_entities[i].properties.property_f32("CompareValue", 0.0);
                            let param_out = format!("{:.6}", val_a);

                            // Both OnNotEqualTo and OnGreaterThan fire when val_a > val_b:
                            // preserved from the original dispatcher, not a bug.
                            if val_a < val_b {
                                let _ = self.fire_output(EntityKind::Logic, i as i32, "OnLessThan", ctx.now, Some(&param_out));
                            }
                            if val_a == val_b {
                                let _ = self.fire_output(EntityKind::Logic, i as i32, "OnEqualTo", ctx.now, Some(&param_out));
                            }
                            if val_a != val_b {
                                let _ = self.fire_output(EntityKind::Logic, i as i32, "OnNotEqualTo", ctx.now, Some(&param_out));
                            }
                            if val_a > val_b {
                                let _ = self.fire_output(EntityKind::Logic, i as i32, "OnGreaterThan", ctx.now, Some(&param_out));
                            }
                        }
                        _ => {}
                    }
                }
                LogicClass::EnvBlackhole => match input_name {
                    "Enable" => ctx.scene.logic_entities[i].active = true,
                    "Disable" => ctx.scene.logic_entities[i].active = false,
                    _ => {}
                },
                LogicClass::EnvFade => match input_name {
                    "FadeIn" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.int_a = 1;
                        ent.float_a = 0.0;
                    }
                    "FadeOut" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.int_a = 2;
                        ent.float_a = 0.0;
                    }
                    "Fade" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.int_a = 4;
                        ent.float_a = 0.0;
                    }
                    _ => {}
                },
                LogicClass::EnvShake => {
                    let ent = &ctx.scene.logic_entities[i];
                    let global_shake = ent.properties.property_bool("GlobalShake", false);
                    let radius = ent.properties.property_f32("radius", 500.0);
                    let delta = ctx.camera_position - ent.common.pos;
                    let dist_sq = delta.x * delta.x + delta.y * delta.y + delta.z * delta.z;
                    let in_range = global_shake || dist_sq < radius * radius;

                    match input_name {
                        "StartShake" if in_range => {
                            ctx.shake.amplitude = ent.properties.property_f32("amplitude", 4.0);
                            ctx.shake.frequency = ent.properties.property_f32("frequency", 40.0);
                            ctx.shake.duration_timer = ent.properties.property_f32("duration", 1.0);
                        }
                        "StopShake" if in_range => {
                            ctx.shake.amplitude = 0.0;
                            ctx.shake.duration_timer = 0.0;
                        }
                        _ => {}
                    }
                }
                LogicClass::EnvFog | LogicClass::EnvOverlay | LogicClass::EnvGlow | LogicClass::EnvBeam
                | LogicClass::EnvCable | LogicClass::EnvReflectionProbe | LogicClass::Keypad => match input_name {
                    "Enable" => ctx.scene.logic_entities[i].active = true,
                    "Disable" => ctx.scene.logic_entities[i].active = false,
                    "Toggle" => {
                        let ent = &mut ctx.scene.logic_entities[i];
                        ent.active = !ent.active;
                    }
                    _ => {}
                },
                LogicClass::GameEnd => {
                    if input_name == "EndGame" {
                        let cheats_enabled = ctx.cvars.get_bool("g_cheats");
                        ctx.commands.execute(&["disconnect"], ctx.cvars, cheats_enabled);
                    }
                }
                LogicClass::Other(_) => {}
            }
        }
    }

    fn execute_model_input(&mut self, target_name: &str, input_name: &str, parameter: &str, ctx: &mut IoContext) {
        for m in ctx.scene.models.iter_mut().filter(|m| m.common.targetname == target_name) {
            match input_name {
                "EnablePhysics" => m.is_physics_enabled = true,
                "DisablePhysics" => m.is_physics_enabled = false,
                "PlayAnimation" => {
                    let noloop = parameter.contains("noloop");
                    m.animation.current_animation = 0;
                    m.animation.time = 0.0;
                    m.animation.playing = true;
                    m.animation.looping = !noloop;
                }
                _ => {}
            }
        }
    }

    fn execute_brush_input(&mut self, target_name: &str, input_name: &str, _parameter: &str, ctx: &mut IoContext) {
        let indices: Vec<usize> = ctx
            .scene
            .brushes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.common.targetname == target_name && !b.classname.trim().is_empty())
            .map(|(i, _)| i)
            .collect();

        for i in indices {
            let class = ctx.scene.brushes[i].class();
            match class {
                BrushClass::FuncButton => match input_name {
                    "Lock" => {
                        let b = &mut ctx.scene.brushes[i];
                        b.locked = true;
                        let _ = b.properties.set("locked", "1");
                    }
                    "Unlock" => {
                        let b = &mut ctx.scene.brushes[i];
                        b.locked = false;
                        let _ = b.properties.set("locked", "0");
                    }
                    "Press" => {
                        let locked = ctx.scene.brushes[i].properties.property_bool("locked", false);
                        let output = if locked { "OnUseLocked" } else { "OnPressed" };
                        let _ = self.fire_output(EntityKind::Brush, i as i32, output, ctx.now, None);
                    }
                    _ => {}
                },
                BrushClass::FuncRotating => {
                    let speed = ctx.scene.brushes[i].properties.property_f32("speed", 10.0);
                    let b = &mut ctx.scene.brushes[i];
                    match input_name {
                        "Start" => b.target_angular_velocity = speed,
                        "Stop" => b.target_angular_velocity = 0.0,
                        "Toggle" => {
                            b.target_angular_velocity = if b.target_angular_velocity > 0.001 { 0.0 } else { speed };
                        }
                        _ => {}
                    }
                }
                BrushClass::FuncPlat => {
                    let b = &mut ctx.scene.brushes[i];
                    match input_name {
                        "Raise" => {
                            if b.platform_state == PlatformState::Bottom {
                                b.platform_state = PlatformState::Up;
                            }
                        }
                        "Lower" => {
                            if b.platform_state == PlatformState::Top {
                                b.platform_state = PlatformState::Down;
                            }
                        }
                        "Toggle" => {
                            b.platform_state = match b.platform_state {
                                PlatformState::Top => PlatformState::Down,
                                PlatformState::Bottom => PlatformState::Up,
                                other => other,
                            };
                        }
                        _ => {}
                    }
                }
                _ => {}
            }

            let b = &mut ctx.scene.brushes[i];
            match input_name {
                "Enable" => b.active = true,
                "Disable" => b.active = false,
                "Toggle" => b.active = !b.active,
                _ => {}
            }
        }
    }

    fn execute_light_input(target_name: &str, input_name: &str, scene: &mut Scene) {
        for l in scene.lights.iter_mut().filter(|l| l.common.targetname == target_name) {
            match input_name {
                "TurnOn" => l.is_on = true,
                "TurnOff" => l.is_on = false,
                "Toggle" => l.is_on = !l.is_on,
                _ => {}
            }
            l.update_intensity();
        }
    }

    fn execute_sound_input(target_name: &str, input_name: &str, scene: &mut Scene) {
        for s in scene.sounds.iter_mut().filter(|s| s.common.targetname == target_name) {
            match input_name {
                "PlaySound" => s.play_on_start = true,
                "StopSound" => s.play_on_start = false,
                "EnableLoop" => s.is_looping = true,
                "DisableLoop" => s.is_looping = false,
                "ToggleLoop" => s.is_looping = !s.is_looping,
                _ => {}
            }
        }
    }

    fn execute_particle_input(target_name: &str, input_name: &str, scene: &mut Scene) {
        for p in scene.particle_emitters.iter_mut().filter(|p| p.common.targetname == target_name) {
            match input_name {
                "TurnOn" => p.is_on = true,
                "TurnOff" => p.is_on = false,
                "Toggle" => p.is_on = !p.is_on,
                _ => {}
            }
        }
    }

    fn execute_video_input(target_name: &str, input_name: &str, scene: &mut Scene) {
        use crate::scene::VideoState;
        for v in scene.video_players.iter_mut().filter(|v| v.common.targetname == target_name) {
            match input_name {
                "startvideo" => v.state = VideoState::Playing,
                "stopvideo" => v.state = VideoState::Stopped,
                "restartvideo" => v.state = VideoState::Playing,
                _ => {}
            }
        }
    }

    fn execute_sprite_input(target_name: &str, input_name: &str, scene: &mut Scene) {
        for s in scene.sprites.iter_mut().filter(|s| s.common.targetname == target_name) {
            match input_name {
                "TurnOn" => s.visible = true,
                "TurnOff" => s.visible = false,
                "Toggle" => s.visible = !s.visible,
                _ => {}
            }
        }
    }
}

impl Default for IoGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandTable;
    use crate::console::Console;
    use crate::cvar::CvarStore;
    use crate::scene::{Brush, Light, LightKind, Logic, Scene};

    fn ctx_harness<'a>(
        scene: &'a mut Scene,
        commands: &'a CommandTable,
        cvars: &'a mut CvarStore,
        console: &'a mut Console,
        shake: &'a mut ShakeState,
    ) -> IoContext<'a> {
        IoContext {
            scene,
            commands,
            cvars,
            console,
            shake,
            camera_position: Vec3::new(0.0, 0.0, 0.0),
            now: 0.0,
        }
    }

    #[test]
    fn fire_once_generates_a_single_pending_event() {
        let mut io = IoGraph::new();
        let idx = io.add_connection(EntityKind::Logic, 0, "OnTrigger").unwrap();
        {
            let conn = io.connection_mut(idx).unwrap();
            conn.target_name = "door1".to_owned();
            conn.input_name = "Enable".to_owned();
            conn.fire_once = true;
        }

        io.fire_output(EntityKind::Logic, 0, "OnTrigger", 0.0, None).unwrap();
        io.fire_output(EntityKind::Logic, 0, "OnTrigger", 1.0, None).unwrap();
        assert_eq!(io.pending().len(), 1);
    }

    #[test]
    fn logic_compare_fires_both_not_equal_and_greater_than() {
        let mut io = IoGraph::new();
        let idx_ne = io.add_connection(EntityKind::Logic, 0, "OnNotEqualTo").unwrap();
        io.connection_mut(idx_ne).unwrap().target_name = "sink".to_owned();
        io.connection_mut(idx_ne).unwrap().input_name = "Enable".to_owned();
        let idx_gt = io.add_connection(EntityKind::Logic, 0, "OnGreaterThan").unwrap();
        io.connection_mut(idx_gt).unwrap().target_name = "sink".to_owned();
        io.connection_mut(idx_gt).unwrap().input_name = "Enable".to_owned();

        let mut scene = Scene::new();
        let mut logic = Logic::new("cmp", "logic_compare");
        logic.float_a = 5.0;
        logic.properties.set("CompareValue", "1").unwrap();
        scene.insert_logic(logic).unwrap();
        scene.insert_logic(Logic::new("sink", "logic_relay")).unwrap();

        let mut commands = CommandTable::new();
        let mut cvars = CvarStore::new();
        let mut console = Console::new();
        let mut shake = ShakeState::default();
        let mut ctx = ctx_harness(&mut scene, &mut commands, &mut cvars, &mut console, &mut shake);

        io.execute_input("cmp", "Compare", "", &mut ctx);
        assert_eq!(io.pending().len(), 2);
    }

    #[test]
    fn brush_lock_blocks_nothing_here_but_press_fires_onpressed() {
        let mut io = IoGraph::new();
        let idx = io.add_connection(EntityKind::Brush, 0, "OnPressed").unwrap();
        io.connection_mut(idx).unwrap().target_name = "light1".to_owned();
        io.connection_mut(idx).unwrap().input_name = "Toggle".to_owned();

        let mut scene = Scene::new();
        scene.insert_brush(Brush::new("button1", "func_button")).unwrap();
        scene.insert_light(Light::new("light1", LightKind::Point)).unwrap();

        let mut commands = CommandTable::new();
        let mut cvars = CvarStore::new();
        let mut console = Console::new();
        let mut shake = ShakeState::default();
        let mut ctx = ctx_harness(&mut scene, &mut commands, &mut cvars, &mut console, &mut shake);

        io.execute_input("button1", "Press", "", &mut ctx);
        assert_eq!(io.pending().len(), 1);
    }

    #[test]
    fn process_pending_delivers_due_events_and_compacts() {
        let mut io = IoGraph::new();
        let mut scene = Scene::new();
        scene.insert_light(Light::new("lamp", LightKind::Point)).unwrap();
        scene.lights[0].is_on = false;

        io.fire_output(EntityKind::Logic, 0, "unused", 0.0, None).unwrap();
        // Manually enqueue since there's no connection configured for this source.
        io.pending.push(PendingEvent {
            active: true,
            target_name: "lamp".to_owned(),
            input_name: "TurnOn".to_owned(),
            parameter: String::new(),
            execution_time: 1.0,
        });

        let mut commands = CommandTable::new();
        let mut cvars = CvarStore::new();
        let mut console = Console::new();
        let mut shake = ShakeState::default();
        let mut ctx = ctx_harness(&mut scene, &mut commands, &mut cvars, &mut console, &mut shake);

        io.process_pending(0.5, &mut ctx);
        assert!(!ctx.scene.lights[0].is_on);

        io.process_pending(1.5, &mut ctx);
        assert!(ctx.scene.lights[0].is_on);
        assert!(io.pending().is_empty());
    }
}
