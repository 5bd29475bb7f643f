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

//! Entity kinds and their typed payloads (§3).
//!
//! Per the design notes, `classname` strings are kept for file-format
//! compatibility but interned into an enum (`BrushClass`, `LogicClass`) at
//! load time; string dispatch remains only at the wire boundary. Properties
//! stay an open-ended `map<string,string>` — the author-facing map-editor
//! contract is that new classes with new keys may appear without
//! recompiling consumers — with typed accessors layered on top.

use std::collections::HashMap;

use cgmath::{Matrix4, Vector2, Vector3};

use crate::backends::{
    Backends, CubemapHandle, LightmapAtlasHandle, ModelHandle, ParticleSystemHandle,
    RigidBodyHandle, ShadowMapHandle, SoundSourceHandle, VideoDecoderHandle,
};
use crate::error::SceneError;
use crate::math::Vec3;

pub const MAX_TARGETNAME_LEN: usize = 63;
pub const MAX_PROPERTIES: usize = 32;

/// Truncates a string to the targetname length limit (§3 Common fields).
pub fn clamp_name(s: &str) -> String {
    if s.len() <= MAX_TARGETNAME_LEN {
        s.to_owned()
    } else {
        s.chars().take(MAX_TARGETNAME_LEN).collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Model,
    Brush,
    Light,
    Decal,
    Sound,
    ParticleEmitter,
    Sprite,
    VideoPlayer,
    ParallaxRoom,
    Logic,
    PlayerStart,
}

/// Identity of a live entity: the pair (kind, index-in-array). Not stable
/// across deletes of *other* entities of the same kind (§3).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub index: usize,
}

impl EntityRef {
    pub fn new(kind: EntityKind, index: usize) -> EntityRef {
        EntityRef { kind, index }
    }
}

/// Fields shared by every entity kind (§3 Common fields).
#[derive(Clone, Debug)]
pub struct Common {
    pub targetname: String,
    pub pos: Vec3,
    /// Orientation in Euler degrees.
    pub rot: Vec3,
}

impl Common {
    pub fn new(targetname: &str) -> Common {
        Common {
            targetname: clamp_name(targetname),
            pos: Vec3::new(0.0, 0.0, 0.0),
            rot: Vec3::new(0.0, 0.0, 0.0),
        }
    }
}

/// An open-ended key/value bag, bounded at [`MAX_PROPERTIES`] entries.
/// Brushes and logic entities carry one; new classnames can introduce new
/// keys without any code change here (Design Notes: do not materialize a
/// struct per classname).
#[derive(Clone, Debug, Default)]
pub struct PropertyMap(HashMap<String, String>);

impl PropertyMap {
    pub fn new() -> PropertyMap {
        PropertyMap(HashMap::new())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SceneError> {
        if !self.0.contains_key(key) && self.0.len() >= MAX_PROPERTIES {
            return Err(SceneError::TooManyProperties(MAX_PROPERTIES));
        }
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn property_str(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_owned()
    }

    pub fn property_f32(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    pub fn property_i32(&self, key: &str, default: i32) -> i32 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    pub fn property_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => default,
        }
    }

    pub fn property_vec3(&self, key: &str, default: Vec3) -> Vec3 {
        match self.get(key) {
            Some(v) => {
                let parts: Vec<f32> = v.split_whitespace().filter_map(|p| p.parse().ok()).collect();
                if parts.len() == 3 {
                    Vec3::new(parts[0], parts[1], parts[2])
                } else {
                    default
                }
            }
            None => default,
        }
    }

    /// Every stored key/value pair, in arbitrary order. Used by the map
    /// serializer to dump a classname's full property bag without having
    /// to know its keys ahead of time.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct AnimationState {
    pub current_animation: i32,
    pub time: f32,
    pub playing: bool,
    pub looping: bool,
    pub animated_local_transform: Matrix4<f32>,
    pub bone_matrices: Option<Vec<Matrix4<f32>>>,
}

impl Default for AnimationState {
    fn default() -> Self {
        AnimationState {
            current_animation: -1,
            time: 0.0,
            playing: false,
            looping: false,
            animated_local_transform: Matrix4::from_scale(1.0),
            bone_matrices: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Model {
    pub common: Common,
    pub model_path: String,
    pub scale: Vec3,
    pub mass: f32,
    pub fade_start: f32,
    pub fade_end: f32,
    pub sway: bool,
    pub is_physics_enabled: bool,
    pub model_matrix: Matrix4<f32>,
    pub render_handle: Option<ModelHandle>,
    pub physics_handle: Option<RigidBodyHandle>,
    pub animation: AnimationState,
}

impl Model {
    pub fn new(targetname: &str, model_path: &str) -> Model {
        Model {
            common: Common::new(targetname),
            model_path: model_path.to_owned(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            mass: 0.0,
            fade_start: 0.0,
            fade_end: 0.0,
            sway: false,
            is_physics_enabled: false,
            model_matrix: Matrix4::from_scale(1.0),
            render_handle: None,
            physics_handle: None,
            animation: AnimationState::default(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.render_handle.take() {
            backends.render.free_model(h);
        }
        if let Some(h) = self.physics_handle.take() {
            backends.physics.destroy_rigid_body(h);
        }
    }
}

// ---------------------------------------------------------------------
// Brush
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BrushVertex {
    pub position: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct FaceLayer {
    pub material: Option<String>,
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
    pub uv_rotation: f32,
}

#[derive(Clone, Debug, Default)]
pub struct BrushFace {
    pub vertex_indices: Vec<usize>,
    /// Up to four stacked material layers.
    pub layers: Vec<FaceLayer>,
    pub blendmap_path: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlatformState {
    Bottom,
    Up,
    Top,
    Down,
}

/// Interned form of `Brush.classname`; string dispatch only happens at the
/// map-load wire boundary (Design Notes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrushClass {
    TriggerOnce,
    TriggerMultiple,
    TriggerTeleport,
    TriggerCamera,
    TriggerHurt,
    TriggerKillPlayer,
    TriggerParalyzePlayer,
    TriggerAutosave,
    TriggerGravity,
    TriggerDspZone,
    FuncDoor,
    FuncPlat,
    FuncRotating,
    FuncPendulum,
    FuncConveyor,
    FuncLadder,
    FuncFriction,
    FuncWallToggle,
    FuncWeightButton,
    FuncWater,
    FuncButton,
    FuncHealthCharger,
    FuncClip,
    /// Static, non-interactive world geometry, or any classname this build
    /// does not recognize. Kept as the raw string so the map-editor
    /// contract (new classes without a recompile) still holds.
    Other(String),
}

impl BrushClass {
    pub fn from_classname(classname: &str) -> BrushClass {
        // Per §9 Open Questions: normalize at intern time so stray
        // leading/trailing whitespace can't silently disable behavior.
        match classname.trim() {
            "trigger_once" => BrushClass::TriggerOnce,
            "trigger_multiple" => BrushClass::TriggerMultiple,
            "trigger_teleport" => BrushClass::TriggerTeleport,
            "trigger_camera" => BrushClass::TriggerCamera,
            "trigger_hurt" => BrushClass::TriggerHurt,
            "trigger_killplayer" => BrushClass::TriggerKillPlayer,
            "trigger_paralyzeplayer" => BrushClass::TriggerParalyzePlayer,
            "trigger_autosave" => BrushClass::TriggerAutosave,
            "trigger_gravity" => BrushClass::TriggerGravity,
            "trigger_dspzone" => BrushClass::TriggerDspZone,
            "func_door" => BrushClass::FuncDoor,
            "func_plat" => BrushClass::FuncPlat,
            "func_rotating" => BrushClass::FuncRotating,
            "func_pendulum" => BrushClass::FuncPendulum,
            "func_conveyor" => BrushClass::FuncConveyor,
            "func_ladder" => BrushClass::FuncLadder,
            "func_friction" => BrushClass::FuncFriction,
            "func_wall_toggle" => BrushClass::FuncWallToggle,
            "func_weight_button" => BrushClass::FuncWeightButton,
            "func_water" => BrushClass::FuncWater,
            "func_button" => BrushClass::FuncButton,
            "func_healthcharger" => BrushClass::FuncHealthCharger,
            "func_clip" => BrushClass::FuncClip,
            other => BrushClass::Other(other.to_owned()),
        }
    }

    pub fn is_trigger_volume(&self) -> bool {
        matches!(
            self,
            BrushClass::TriggerOnce
                | BrushClass::TriggerMultiple
                | BrushClass::TriggerTeleport
                | BrushClass::TriggerCamera
                | BrushClass::TriggerHurt
                | BrushClass::TriggerKillPlayer
                | BrushClass::TriggerParalyzePlayer
                | BrushClass::TriggerAutosave
                | BrushClass::TriggerGravity
                | BrushClass::TriggerDspZone
        )
    }
}

#[derive(Clone, Debug)]
pub struct Brush {
    pub common: Common,
    pub classname: String,
    pub vertices: Vec<BrushVertex>,
    pub faces: Vec<BrushFace>,
    pub properties: PropertyMap,

    pub door_state: DoorState,
    pub door_start_pos: Vec3,
    pub door_end_pos: Vec3,
    pub door_move_dir: Vec3,

    pub platform_state: PlatformState,
    pub platform_wait_timer: f32,

    pub target_angular_velocity: f32,
    pub current_angular_velocity: f32,

    pub pendulum_time: f32,

    pub active: bool,
    pub player_is_touching: bool,
    pub is_visible: bool,
    pub has_fired: bool,
    pub was_pressed: bool,
    pub locked: bool,

    pub lightmap_atlas: Option<LightmapAtlasHandle>,
    pub cubemap: Option<CubemapHandle>,
    pub physics_handle: Option<RigidBodyHandle>,
}

impl Brush {
    pub fn new(targetname: &str, classname: &str) -> Brush {
        Brush {
            common: Common::new(targetname),
            classname: classname.to_owned(),
            vertices: Vec::new(),
            faces: Vec::new(),
            properties: PropertyMap::new(),
            door_state: DoorState::Closed,
            door_start_pos: Vec3::new(0.0, 0.0, 0.0),
            door_end_pos: Vec3::new(0.0, 0.0, 0.0),
            door_move_dir: Vec3::new(0.0, 0.0, 0.0),
            platform_state: PlatformState::Bottom,
            platform_wait_timer: 0.0,
            target_angular_velocity: 0.0,
            current_angular_velocity: 0.0,
            pendulum_time: 0.0,
            active: true,
            player_is_touching: false,
            is_visible: true,
            has_fired: false,
            was_pressed: false,
            locked: false,
            lightmap_atlas: None,
            cubemap: None,
            physics_handle: None,
        }
    }

    pub fn class(&self) -> BrushClass {
        BrushClass::from_classname(&self.classname)
    }

    pub fn local_aabb(&self) -> Option<crate::math::Aabb> {
        crate::math::Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }

    pub fn world_aabb(&self) -> Option<crate::math::Aabb> {
        self.local_aabb().map(|aabb| aabb.translated(self.common.pos))
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.lightmap_atlas.take() {
            backends.render.free_lightmap_atlas(h);
        }
        if let Some(h) = self.cubemap.take() {
            backends.render.free_cubemap(h);
        }
        if let Some(h) = self.physics_handle.take() {
            backends.physics.destroy_rigid_body(h);
        }
    }
}

// ---------------------------------------------------------------------
// Light
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Spot,
}

/// Style 0 is steady; 1..12 select a named Quake-style flicker pattern;
/// 13 uses `custom`. Advances one character every 0.1s (§3 invariants).
#[derive(Clone, Debug)]
pub struct LightStyle {
    pub preset: u8,
    pub custom: Option<String>,
    pub preset_time: f32,
    pub preset_index: usize,
}

impl Default for LightStyle {
    fn default() -> Self {
        LightStyle {
            preset: 0,
            custom: None,
            preset_time: 0.0,
            preset_index: 0,
        }
    }
}

/// Built-in style strings for presets 1..12. Index 0 is unused (steady is
/// handled separately; `intensity == base_intensity` whenever `is_on`).
pub const LIGHT_STYLE_PRESETS: [&str; 13] = [
    "m",
    "mmnmmommommnonmmonqnmmo",
    "abcdefghmmmmmaaaaabcdefgh",
    "mmmmmaaaaammmmmaaaaaabcdefgasdfasdf",
    "mamamamamama",
    "jklmnopqrstuvwxyzyxwvutsrqponmlkj",
    "mmmaaaabcdefgmmmmaaaammmaamm",
    "mmmaaammmaaammmabcdefaaaammmmabcdefmmmaaaa",
    "aaaaaaaazzzzzzzz",
    "mmamammmmammamamaaamammma",
    "abcdefghijklmnopqrrqponmlkjihgfedcba",
    "mmnommomhkjklmmjimminnjlmkhkjj",
    "m",
];

impl LightStyle {
    pub fn factor(&self) -> f32 {
        if self.preset == 0 {
            return 1.0;
        }
        let pattern: &str = if self.preset == 13 {
            match &self.custom {
                Some(s) if !s.is_empty() => s.as_str(),
                _ => return 1.0,
            }
        } else {
            LIGHT_STYLE_PRESETS
                .get(self.preset as usize)
                .copied()
                .unwrap_or("m")
        };

        let chars: Vec<char> = pattern.chars().collect();
        if chars.is_empty() {
            return 1.0;
        }
        let c = chars[self.preset_index % chars.len()];
        let c = c.max('a').min('z');
        ((c as u8 - b'a') as f32 / (b'm' - b'a') as f32).clamp(0.0, 2.0)
    }

    /// Advances the style cursor by `dt` seconds, stepping once per 0.1s
    /// "frame" as required by §3.
    pub fn tick(&mut self, dt: f32) {
        if self.preset == 0 {
            return;
        }
        self.preset_time += dt;
        let len = if self.preset == 13 {
            self.custom.as_ref().map(|s| s.chars().count()).unwrap_or(1).max(1)
        } else {
            LIGHT_STYLE_PRESETS
                .get(self.preset as usize)
                .map(|s| s.chars().count())
                .unwrap_or(1)
                .max(1)
        };
        while self.preset_time >= 0.1 {
            self.preset_time -= 0.1;
            self.preset_index = (self.preset_index + 1) % len;
        }
    }
}

#[derive(Clone, Debug)]
pub struct Light {
    pub common: Common,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub base_intensity: f32,
    pub is_on: bool,
    pub is_static: bool,
    pub radius: f32,
    pub cutoff: f32,
    pub outer_cutoff: f32,
    pub style: LightStyle,
    pub shadow_map: Option<ShadowMapHandle>,
}

impl Light {
    pub fn new(targetname: &str, kind: LightKind) -> Light {
        Light {
            common: Common::new(targetname),
            kind,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            base_intensity: 1.0,
            is_on: true,
            is_static: false,
            radius: 10.0,
            cutoff: 0.9,
            outer_cutoff: 0.8,
            style: LightStyle::default(),
            shadow_map: None,
        }
    }

    /// Re-derives `intensity` from `base_intensity`, `is_on` and the current
    /// style factor, as required by the §3 invariant.
    pub fn update_intensity(&mut self) {
        self.intensity = if self.is_on {
            self.base_intensity * self.style.factor()
        } else {
            0.0
        };
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.shadow_map.take() {
            backends.render.free_shadow_map(h);
        }
    }
}

// ---------------------------------------------------------------------
// Decal
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Decal {
    pub common: Common,
    pub size: Vec3,
    pub material: String,
    pub lightmap_atlases: Vec<LightmapAtlasHandle>,
}

impl Decal {
    pub fn new(targetname: &str, material: &str) -> Decal {
        Decal {
            common: Common::new(targetname),
            size: Vec3::new(1.0, 1.0, 1.0),
            material: material.to_owned(),
            lightmap_atlases: Vec::new(),
        }
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        for h in self.lightmap_atlases.drain(..) {
            backends.render.free_lightmap_atlas(h);
        }
    }
}

// ---------------------------------------------------------------------
// Sound
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Sound {
    pub common: Common,
    pub buffer_path: String,
    pub source: Option<SoundSourceHandle>,
    pub volume: f32,
    pub pitch: f32,
    pub max_distance: f32,
    pub is_looping: bool,
    pub play_on_start: bool,
}

impl Sound {
    pub fn new(targetname: &str, buffer_path: &str) -> Sound {
        Sound {
            common: Common::new(targetname),
            buffer_path: buffer_path.to_owned(),
            source: None,
            volume: 1.0,
            pitch: 1.0,
            max_distance: 32.0,
            is_looping: false,
            play_on_start: false,
        }
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.source.take() {
            backends.sound.stop_source(h);
        }
    }
}

// ---------------------------------------------------------------------
// ParticleEmitter
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ParticleEmitter {
    pub common: Common,
    pub par_path: String,
    pub on_by_default: bool,
    pub is_on: bool,
    pub system: Option<ParticleSystemHandle>,
}

impl ParticleEmitter {
    pub fn new(targetname: &str, par_path: &str) -> ParticleEmitter {
        ParticleEmitter {
            common: Common::new(targetname),
            par_path: par_path.to_owned(),
            on_by_default: true,
            is_on: true,
            system: None,
        }
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.system.take() {
            backends.particles.free(h);
        }
    }
}

// ---------------------------------------------------------------------
// Sprite
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Sprite {
    pub common: Common,
    pub material: String,
    pub scale: f32,
    pub visible: bool,
}

impl Sprite {
    pub fn new(targetname: &str, material: &str) -> Sprite {
        Sprite {
            common: Common::new(targetname),
            material: material.to_owned(),
            scale: 1.0,
            visible: true,
        }
    }

    pub fn free_handles(&mut self, _backends: &mut Backends) {}
}

// ---------------------------------------------------------------------
// VideoPlayer
// ---------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VideoState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Debug)]
pub struct VideoPlayer {
    pub common: Common,
    pub path: String,
    pub size: Vector2<f32>,
    pub play_on_start: bool,
    pub looping: bool,
    pub state: VideoState,
    pub decoder: Option<VideoDecoderHandle>,
}

impl VideoPlayer {
    pub fn new(targetname: &str, path: &str) -> VideoPlayer {
        VideoPlayer {
            common: Common::new(targetname),
            path: path.to_owned(),
            size: Vector2::new(1.0, 1.0),
            play_on_start: false,
            looping: false,
            state: VideoState::Stopped,
            decoder: None,
        }
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.decoder.take() {
            backends.video.close(h);
        }
    }
}

// ---------------------------------------------------------------------
// ParallaxRoom
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ParallaxRoom {
    pub common: Common,
    pub cubemap: Option<CubemapHandle>,
    pub size: Vector2<f32>,
    pub room_depth: f32,
}

impl ParallaxRoom {
    pub fn new(targetname: &str) -> ParallaxRoom {
        ParallaxRoom {
            common: Common::new(targetname),
            cubemap: None,
            size: Vector2::new(1.0, 1.0),
            room_depth: 1.0,
        }
    }

    pub fn free_handles(&mut self, backends: &mut Backends) {
        if let Some(h) = self.cubemap.take() {
            backends.render.free_cubemap(h);
        }
    }
}

// ---------------------------------------------------------------------
// Logic
// ---------------------------------------------------------------------

/// Interned form of a logic entity's `classname` (Design Notes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogicClass {
    Timer,
    MathCounter,
    Random,
    Relay,
    ServerCommand,
    Compare,
    EnvFade,
    EnvShake,
    EnvFog,
    EnvBlackhole,
    EnvGlow,
    EnvBeam,
    EnvCable,
    EnvOverlay,
    EnvReflectionProbe,
    GameEnd,
    Keypad,
    Other(String),
}

impl LogicClass {
    pub fn from_classname(classname: &str) -> LogicClass {
        match classname.trim() {
            "logic_timer" => LogicClass::Timer,
            "math_counter" => LogicClass::MathCounter,
            "logic_random" => LogicClass::Random,
            "logic_relay" => LogicClass::Relay,
            "point_servercommand" => LogicClass::ServerCommand,
            "logic_compare" => LogicClass::Compare,
            "env_fade" => LogicClass::EnvFade,
            "env_shake" => LogicClass::EnvShake,
            "env_fog" => LogicClass::EnvFog,
            "env_blackhole" => LogicClass::EnvBlackhole,
            "env_glow" => LogicClass::EnvGlow,
            "env_beam" => LogicClass::EnvBeam,
            "env_cable" => LogicClass::EnvCable,
            "env_overlay" => LogicClass::EnvOverlay,
            "env_reflectionprobe" => LogicClass::EnvReflectionProbe,
            "game_end" => LogicClass::GameEnd,
            "keypad" => LogicClass::Keypad,
            other => LogicClass::Other(other.to_owned()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Logic {
    pub common: Common,
    pub classname: String,
    pub properties: PropertyMap,
    pub active: bool,
    pub float_a: f32,
    pub int_a: i32,
}

impl Logic {
    pub fn new(targetname: &str, classname: &str) -> Logic {
        Logic {
            common: Common::new(targetname),
            classname: classname.to_owned(),
            properties: PropertyMap::new(),
            active: false,
            float_a: 0.0,
            int_a: 0,
        }
    }

    pub fn class(&self) -> LogicClass {
        LogicClass::from_classname(&self.classname)
    }

    pub fn free_handles(&mut self, _backends: &mut Backends) {}
}

// ---------------------------------------------------------------------
// PlayerStart
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PlayerStart {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for PlayerStart {
    fn default() -> Self {
        PlayerStart {
            position: Vec3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_style_factor_at_a_and_m() {
        let mut style = LightStyle {
            preset: 1,
            custom: None,
            preset_time: 0.0,
            preset_index: 0,
        };
        // preset 1 starts on 'm' -> factor 1.0
        assert!((style.factor() - 1.0).abs() < 1e-5);
        style.preset_index = 1; // 'm' again in "mmnmmommommnonmmonqnmmo"
        let _ = style.factor();
    }

    #[test]
    fn brush_class_normalizes_whitespace() {
        assert_eq!(BrushClass::from_classname(" func_door \n"), BrushClass::FuncDoor);
    }

    #[test]
    fn property_map_caps_at_max() {
        let mut props = PropertyMap::new();
        for i in 0..MAX_PROPERTIES {
            props.set(&format!("k{}", i), "v").unwrap();
        }
        assert!(props.set("overflow", "v").is_err());
        // updating an existing key never hits the cap.
        props.set("k0", "updated").unwrap();
        assert_eq!(props.get("k0"), Some("updated"));
    }

    #[test]
    fn targetname_is_clamped() {
        let long = "x".repeat(200);
        let common = Common::new(&long);
        assert_eq!(common.targetname.len(), MAX_TARGETNAME_LEN);
    }
}
