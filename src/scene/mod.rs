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

//! The level data model (§3, §4.3): fixed-capacity typed containers for
//! every entity kind, plus the handful of scene-wide settings (sun, fog,
//! post-process, skybox).
//!
//! Identity is the pair `(EntityKind, index)`. Insertion always shifts
//! `[index..]` right by one, regardless of kind. Deletion differs by kind:
//! `Model` and `Brush` are "compacting" containers and delete with
//! `swap_remove` (the entity that used to sit last now lives at the deleted
//! slot); every other kind shifts its tail down with `remove`, preserving
//! the relative order of survivors.

pub mod entity;

use cgmath::Vector3;

use crate::backends::Backends;
use crate::error::SceneError;
use crate::math::Vec3;

pub use entity::{
    clamp_name, AnimationState, Brush, BrushClass, BrushFace, BrushVertex, Common, Decal,
    DoorState, EntityKind, EntityRef, FaceLayer, Light, LightKind, LightStyle, Logic, LogicClass,
    Model, ParallaxRoom, ParticleEmitter, PlatformState, PlayerStart, PropertyMap, Sound, Sprite,
    VideoPlayer, VideoState, LIGHT_STYLE_PRESETS, MAX_PROPERTIES, MAX_TARGETNAME_LEN,
};

pub const LIGHTS_CAPACITY: usize = 256;
pub const BRUSHES_CAPACITY: usize = 8192;
pub const DECALS_CAPACITY: usize = 8192;
pub const SOUNDS_CAPACITY: usize = 2048;
pub const PARTICLE_EMITTERS_CAPACITY: usize = 2048;
pub const SPRITES_CAPACITY: usize = 8192;
pub const VIDEO_PLAYERS_CAPACITY: usize = 32;
pub const PARALLAX_ROOMS_CAPACITY: usize = 128;
pub const LOGIC_ENTITIES_CAPACITY: usize = 8192;

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Model => "model",
        EntityKind::Brush => "brush",
        EntityKind::Light => "light",
        EntityKind::Decal => "decal",
        EntityKind::Sound => "sound",
        EntityKind::ParticleEmitter => "particle_emitter",
        EntityKind::Sprite => "sprite",
        EntityKind::VideoPlayer => "video_player",
        EntityKind::ParallaxRoom => "parallax_room",
        EntityKind::Logic => "logic",
        EntityKind::PlayerStart => "player_start",
    }
}

/// Appends `item` to `vec` unless that would exceed `capacity`.
fn push_capped<T>(vec: &mut Vec<T>, item: T, capacity: usize, kind: EntityKind) -> Result<usize, SceneError> {
    if vec.len() >= capacity {
        return Err(SceneError::ContainerFull {
            kind: kind_name(kind),
            capacity,
        });
    }
    vec.push(item);
    Ok(vec.len() - 1)
}

/// Inserts `item` at `index`, shifting every later element right by one.
/// Identical across every entity kind (Design Notes).
fn insert_at<T>(vec: &mut Vec<T>, index: usize, item: T, capacity: usize, kind: EntityKind) -> Result<(), SceneError> {
    if vec.len() >= capacity {
        return Err(SceneError::ContainerFull {
            kind: kind_name(kind),
            capacity,
        });
    }
    let index = index.min(vec.len());
    vec.insert(index, item);
    Ok(())
}

/// Deletes by swapping the last element into `index` (Model, Brush).
fn swap_delete<T>(vec: &mut Vec<T>, index: usize, kind: EntityKind) -> Result<T, SceneError> {
    if index >= vec.len() {
        return Err(SceneError::NoSuchEntity {
            kind: kind_name(kind),
            index,
        });
    }
    Ok(vec.swap_remove(index))
}

/// Deletes by shifting the tail down (every kind but Model, Brush).
fn shift_delete<T>(vec: &mut Vec<T>, index: usize, kind: EntityKind) -> Result<T, SceneError> {
    if index >= vec.len() {
        return Err(SceneError::NoSuchEntity {
            kind: kind_name(kind),
            index,
        });
    }
    Ok(vec.remove(index))
}

#[derive(Clone, Debug)]
pub struct Sun {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub enabled: bool,
}

impl Default for Sun {
    fn default() -> Self {
        Sun {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            enabled: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Fog {
    pub color: Vec3,
    pub density: f32,
    pub start: f32,
    pub end: f32,
    pub enabled: bool,
}

impl Default for Fog {
    fn default() -> Self {
        Fog {
            color: Vec3::new(0.5, 0.5, 0.5),
            density: 0.0,
            start: 0.0,
            end: 1000.0,
            enabled: false,
        }
    }
}

/// Screen-space post-process state, including the `env_fade` overlay (§4.5).
#[derive(Clone, Debug)]
pub struct PostProcess {
    pub fade_active: bool,
    pub fade_alpha: f32,
    pub fade_color: Vec3,
    pub vignette: f32,
    pub saturation: f32,
}

impl Default for PostProcess {
    fn default() -> Self {
        PostProcess {
            fade_active: false,
            fade_alpha: 0.0,
            fade_color: Vec3::new(0.0, 0.0, 0.0),
            vignette: 0.0,
            saturation: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Skybox {
    pub material: Option<String>,
    pub rotation_speed: f32,
}

/// The full level data model: one `Vec<T>` per entity kind, plus the
/// scene-wide settings.
pub struct Scene {
    pub lights: Vec<Light>,
    pub brushes: Vec<Brush>,
    pub models: Vec<Model>,
    pub decals: Vec<Decal>,
    pub sounds: Vec<Sound>,
    pub particle_emitters: Vec<ParticleEmitter>,
    pub sprites: Vec<Sprite>,
    pub video_players: Vec<VideoPlayer>,
    pub parallax_rooms: Vec<ParallaxRoom>,
    pub logic_entities: Vec<Logic>,

    pub player_start: PlayerStart,
    pub sun: Sun,
    pub fog: Fog,
    pub post: PostProcess,
    pub skybox: Skybox,
    pub map_path: Option<String>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene {
            lights: Vec::new(),
            brushes: Vec::new(),
            models: Vec::new(),
            decals: Vec::new(),
            sounds: Vec::new(),
            particle_emitters: Vec::new(),
            sprites: Vec::new(),
            video_players: Vec::new(),
            parallax_rooms: Vec::new(),
            logic_entities: Vec::new(),
            player_start: PlayerStart::default(),
            sun: Sun::default(),
            fog: Fog::default(),
            post: PostProcess::default(),
            skybox: Skybox::default(),
            map_path: None,
        }
    }

    pub fn insert_model(&mut self, m: Model) -> Result<usize, SceneError> {
        push_capped(&mut self.models, m, usize::MAX, EntityKind::Model)
    }

    pub fn insert_model_at(&mut self, index: usize, m: Model) -> Result<(), SceneError> {
        insert_at(&mut self.models, index, m, usize::MAX, EntityKind::Model)
    }

    pub fn delete_model(&mut self, index: usize, backends: &mut Backends) -> Result<Model, SceneError> {
        let mut m = swap_delete(&mut self.models, index, EntityKind::Model)?;
        m.free_handles(backends);
        Ok(m)
    }

    pub fn insert_brush(&mut self, b: Brush) -> Result<usize, SceneError> {
        push_capped(&mut self.brushes, b, BRUSHES_CAPACITY, EntityKind::Brush)
    }

    pub fn insert_brush_at(&mut self, index: usize, b: Brush) -> Result<(), SceneError> {
        insert_at(&mut self.brushes, index, b, BRUSHES_CAPACITY, EntityKind::Brush)
    }

    pub fn delete_brush(&mut self, index: usize, backends: &mut Backends) -> Result<Brush, SceneError> {
        let mut b = swap_delete(&mut self.brushes, index, EntityKind::Brush)?;
        b.free_handles(backends);
        Ok(b)
    }

    pub fn insert_light(&mut self, l: Light) -> Result<usize, SceneError> {
        push_capped(&mut self.lights, l, LIGHTS_CAPACITY, EntityKind::Light)
    }

    pub fn insert_light_at(&mut self, index: usize, l: Light) -> Result<(), SceneError> {
        insert_at(&mut self.lights, index, l, LIGHTS_CAPACITY, EntityKind::Light)
    }

    pub fn delete_light(&mut self, index: usize, backends: &mut Backends) -> Result<Light, SceneError> {
        let mut l = shift_delete(&mut self.lights, index, EntityKind::Light)?;
        l.free_handles(backends);
        Ok(l)
    }

    pub fn insert_decal(&mut self, d: Decal) -> Result<usize, SceneError> {
        push_capped(&mut self.decals, d, DECALS_CAPACITY, EntityKind::Decal)
    }

    pub fn insert_decal_at(&mut self, index: usize, d: Decal) -> Result<(), SceneError> {
        insert_at(&mut self.decals, index, d, DECALS_CAPACITY, EntityKind::Decal)
    }

    pub fn delete_decal(&mut self, index: usize, backends: &mut Backends) -> Result<Decal, SceneError> {
        let mut d = shift_delete(&mut self.decals, index, EntityKind::Decal)?;
        d.free_handles(backends);
        Ok(d)
    }

    pub fn insert_sound(&mut self, s: Sound) -> Result<usize, SceneError> {
        push_capped(&mut self.sounds, s, SOUNDS_CAPACITY, EntityKind::Sound)
    }

    pub fn insert_sound_at(&mut self, index: usize, s: Sound) -> Result<(), SceneError> {
        insert_at(&mut self.sounds, index, s, SOUNDS_CAPACITY, EntityKind::Sound)
    }

    pub fn delete_sound(&mut self, index: usize, backends: &mut Backends) -> Result<Sound, SceneError> {
        let mut s = shift_delete(&mut self.sounds, index, EntityKind::Sound)?;
        s.free_handles(backends);
        Ok(s)
    }

    pub fn insert_particle_emitter(&mut self, p: ParticleEmitter) -> Result<usize, SceneError> {
        push_capped(&mut self.particle_emitters, p, PARTICLE_EMITTERS_CAPACITY, EntityKind::ParticleEmitter)
    }

    pub fn insert_particle_emitter_at(&mut self, index: usize, p: ParticleEmitter) -> Result<(), SceneError> {
        insert_at(&mut self.particle_emitters, index, p, PARTICLE_EMITTERS_CAPACITY, EntityKind::ParticleEmitter)
    }

    pub fn delete_particle_emitter(&mut self, index: usize, backends: &mut Backends) -> Result<ParticleEmitter, SceneError> {
        let mut p = shift_delete(&mut self.particle_emitters, index, EntityKind::ParticleEmitter)?;
        p.free_handles(backends);
        Ok(p)
    }

    pub fn insert_sprite(&mut self, s: Sprite) -> Result<usize, SceneError> {
        push_capped(&mut self.sprites, s, SPRITES_CAPACITY, EntityKind::Sprite)
    }

    pub fn insert_sprite_at(&mut self, index: usize, s: Sprite) -> Result<(), SceneError> {
        insert_at(&mut self.sprites, index, s, SPRITES_CAPACITY, EntityKind::Sprite)
    }

    pub fn delete_sprite(&mut self, index: usize, backends: &mut Backends) -> Result<Sprite, SceneError> {
        let mut s = shift_delete(&mut self.sprites, index, EntityKind::Sprite)?;
        s.free_handles(backends);
        Ok(s)
    }

    pub fn insert_video_player(&mut self, v: VideoPlayer) -> Result<usize, SceneError> {
        push_capped(&mut self.video_players, v, VIDEO_PLAYERS_CAPACITY, EntityKind::VideoPlayer)
    }

    pub fn insert_video_player_at(&mut self, index: usize, v: VideoPlayer) -> Result<(), SceneError> {
        insert_at(&mut self.video_players, index, v, VIDEO_PLAYERS_CAPACITY, EntityKind::VideoPlayer)
    }

    pub fn delete_video_player(&mut self, index: usize, backends: &mut Backends) -> Result<VideoPlayer, SceneError> {
        let mut v = shift_delete(&mut self.video_players, index, EntityKind::VideoPlayer)?;
        v.free_handles(backends);
        Ok(v)
    }

    pub fn insert_parallax_room(&mut self, p: ParallaxRoom) -> Result<usize, SceneError> {
        push_capped(&mut self.parallax_rooms, p, PARALLAX_ROOMS_CAPACITY, EntityKind::ParallaxRoom)
    }

    pub fn insert_parallax_room_at(&mut self, index: usize, p: ParallaxRoom) -> Result<(), SceneError> {
        insert_at(&mut self.parallax_rooms, index, p, PARALLAX_ROOMS_CAPACITY, EntityKind::ParallaxRoom)
    }

    pub fn delete_parallax_room(&mut self, index: usize, backends: &mut Backends) -> Result<ParallaxRoom, SceneError> {
        let mut p = shift_delete(&mut self.parallax_rooms, index, EntityKind::ParallaxRoom)?;
        p.free_handles(backends);
        Ok(p)
    }

    pub fn insert_logic(&mut self, l: Logic) -> Result<usize, SceneError> {
        push_capped(&mut self.logic_entities, l, LOGIC_ENTITIES_CAPACITY, EntityKind::Logic)
    }

    pub fn insert_logic_at(&mut self, index: usize, l: Logic) -> Result<(), SceneError> {
        insert_at(&mut self.logic_entities, index, l, LOGIC_ENTITIES_CAPACITY, EntityKind::Logic)
    }

    pub fn delete_logic(&mut self, index: usize, backends: &mut Backends) -> Result<Logic, SceneError> {
        let mut l = shift_delete(&mut self.logic_entities, index, EntityKind::Logic)?;
        l.free_handles(backends);
        Ok(l)
    }

    pub fn find_by_targetname(&self, targetname: &str) -> Vec<EntityRef> {
        let mut out = Vec::new();
        macro_rules! scan {
            ($field:ident, $kind:expr) => {
                for (i, e) in self.$field.iter().enumerate() {
                    if e.common.targetname == targetname {
                        out.push(EntityRef::new($kind, i));
                    }
                }
            };
        }
        scan!(models, EntityKind::Model);
        scan!(brushes, EntityKind::Brush);
        scan!(lights, EntityKind::Light);
        scan!(decals, EntityKind::Decal);
        scan!(sounds, EntityKind::Sound);
        scan!(particle_emitters, EntityKind::ParticleEmitter);
        scan!(sprites, EntityKind::Sprite);
        scan!(video_players, EntityKind::VideoPlayer);
        scan!(parallax_rooms, EntityKind::ParallaxRoom);
        scan!(logic_entities, EntityKind::Logic);
        out
    }

    /// Tears down every live entity, freeing backend resources in the order
    /// required by §4.3: particle systems first, then parallax room
    /// cubemaps, then light shadow maps, then brush resources (cubemap,
    /// lightmap atlas, physics body — face data drops with the `Vec`), then
    /// model resources (render handle, physics body), then sound sources,
    /// then decal lightmap atlases and video decoders (handle-bearing kinds
    /// the original freeing order omitted).
    pub fn clear(&mut self, backends: &mut Backends) {
        for p in self.particle_emitters.drain(..) {
            let mut p = p;
            p.free_handles(backends);
        }

        for p in self.parallax_rooms.drain(..) {
            let mut p = p;
            p.free_handles(backends);
        }

        for l in self.lights.drain(..) {
            let mut l = l;
            l.free_handles(backends);
        }

        for b in self.brushes.drain(..) {
            let mut b = b;
            b.free_handles(backends);
        }

        for m in self.models.drain(..) {
            let mut m = m;
            m.free_handles(backends);
        }

        for s in self.sounds.drain(..) {
            let mut s = s;
            s.free_handles(backends);
        }

        for d in self.decals.drain(..) {
            let mut d = d;
            d.free_handles(backends);
        }

        self.sprites.clear();

        for v in self.video_players.drain(..) {
            let mut v = v;
            v.free_handles(backends);
        }

        self.logic_entities.clear();

        self.player_start = PlayerStart::default();
        self.sun = Sun::default();
        self.fog = Fog::default();
        self.post = PostProcess::default();
        self.skybox = Skybox::default();
        self.map_path = None;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapts a [`Vector3<f32>`] literal into the crate's `Vec3` alias; kept for
/// callers outside this module that build points from raw components.
pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vector3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::Backends;

    #[test]
    fn brush_delete_uses_swap_remove_semantics() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        scene.insert_brush(Brush::new("a", "func_door")).unwrap();
        scene.insert_brush(Brush::new("b", "func_door")).unwrap();
        scene.insert_brush(Brush::new("c", "func_door")).unwrap();

        scene.delete_brush(0, &mut backends).unwrap();

        // index 0 now holds what was the last element ("c"); "b" unmoved.
        assert_eq!(scene.brushes[0].common.targetname, "c");
        assert_eq!(scene.brushes[1].common.targetname, "b");
    }

    #[test]
    fn light_delete_uses_shift_remove_semantics() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        scene.insert_light(Light::new("a", LightKind::Point)).unwrap();
        scene.insert_light(Light::new("b", LightKind::Point)).unwrap();
        scene.insert_light(Light::new("c", LightKind::Point)).unwrap();

        scene.delete_light(0, &mut backends).unwrap();

        // order preserved: b then c.
        assert_eq!(scene.lights[0].common.targetname, "b");
        assert_eq!(scene.lights[1].common.targetname, "c");
    }

    #[test]
    fn insert_at_is_identical_shift_semantics_across_kinds() {
        let mut scene = Scene::new();
        scene.insert_brush(Brush::new("a", "func_door")).unwrap();
        scene.insert_brush(Brush::new("c", "func_door")).unwrap();
        scene.insert_brush_at(1, Brush::new("b", "func_door")).unwrap();

        let names: Vec<&str> = scene.brushes.iter().map(|b| b.common.targetname.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn container_enforces_capacity() {
        let mut scene = Scene::new();
        for i in 0..LIGHTS_CAPACITY {
            scene.insert_light(Light::new(&format!("l{}", i), LightKind::Point)).unwrap();
        }
        assert!(scene.insert_light(Light::new("overflow", LightKind::Point)).is_err());
    }

    #[test]
    fn clear_frees_all_handles_and_resets_settings() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        let mut model = Model::new("m", "models/foo.mdl");
        model.render_handle = Some(backends.render.load_model("models/foo.mdl"));
        scene.insert_model(model).unwrap();
        scene.sun.enabled = true;

        scene.clear(&mut backends);

        assert!(scene.models.is_empty());
        assert!(!scene.sun.enabled);
    }

    #[test]
    fn find_by_targetname_scans_every_kind() {
        let mut scene = Scene::new();
        scene.insert_brush(Brush::new("door1", "func_door")).unwrap();
        scene.insert_light(Light::new("door1", LightKind::Point)).unwrap();

        let refs = scene.find_by_targetname("door1");
        assert_eq!(refs.len(), 2);
    }
}
