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

//! Editor undo/redo engine (§4.7): a two-stack action log of deep-copied
//! entity snapshots, with exact inverse semantics for create/delete/modify.
//!
//! An [`EntitySnapshot`] captures a whole entity struct by value — every
//! entity type already derives `Clone`, so capturing one is a deep copy of
//! its vertices/faces/properties for free. What a snapshot does *not* carry
//! is any externally-owned handle: re-applying a snapshot always re-hydrates
//! render/physics/sound/video resources from the entity's own path fields
//! rather than reusing whatever handle happened to be live when it was
//! captured.
//!
//! A snapshot can be re-applied two ways. [`apply_state`] inserts it at its
//! recorded index, shifting whatever else is there — the cardinality-changing
//! path used by create/delete/merge. [`overwrite_state`] instead writes it
//! over the entity already occupying that index, freeing the old occupant's
//! handles first and never touching array length or order — the path used
//! by an ordinary modify, where the edited entity never moves and a
//! compacting container (brush/model) must not have its other elements
//! reshuffled underneath it.

use std::collections::VecDeque;

use crate::backends::Backends;
use crate::error::{SceneError, UndoError};
use crate::scene::{
    Brush, Decal, EntityKind, EntityRef, Light, Logic, Model, ParallaxRoom, ParticleEmitter, Scene, Sound, Sprite,
    VideoPlayer,
};

const UNDO_CAPACITY: usize = 128;

/// By-value copy of one entity plus the index it lived at when captured.
#[derive(Clone, Debug)]
pub struct EntitySnapshot {
    pub index: usize,
    pub payload: EntityPayload,
}

impl EntitySnapshot {
    pub fn kind(&self) -> EntityKind {
        self.payload.kind()
    }
}

#[derive(Clone, Debug)]
pub enum EntityPayload {
    Model(Model),
    Brush(Brush),
    Light(Light),
    Decal(Decal),
    Sound(Sound),
    ParticleEmitter(ParticleEmitter),
    Sprite(Sprite),
    VideoPlayer(VideoPlayer),
    ParallaxRoom(ParallaxRoom),
    Logic(Logic),
}

impl EntityPayload {
    fn kind(&self) -> EntityKind {
        match self {
            EntityPayload::Model(_) => EntityKind::Model,
            EntityPayload::Brush(_) => EntityKind::Brush,
            EntityPayload::Light(_) => EntityKind::Light,
            EntityPayload::Decal(_) => EntityKind::Decal,
            EntityPayload::Sound(_) => EntityKind::Sound,
            EntityPayload::ParticleEmitter(_) => EntityKind::ParticleEmitter,
            EntityPayload::Sprite(_) => EntityKind::Sprite,
            EntityPayload::VideoPlayer(_) => EntityKind::VideoPlayer,
            EntityPayload::ParallaxRoom(_) => EntityKind::ParallaxRoom,
            EntityPayload::Logic(_) => EntityKind::Logic,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Modify,
    Create,
    Delete,
    /// `after_states.len() == 1 && before_states.len() > 1`, tagged
    /// explicitly rather than inferred from cardinality: an ordinary
    /// single-input single-output modify can have the same shape by
    /// coincidence and must not be undone as a merge.
    Merge,
}

#[derive(Clone, Debug)]
pub struct Action {
    pub kind: ActionKind,
    pub before_states: Vec<EntitySnapshot>,
    pub after_states: Vec<EntitySnapshot>,
    pub description: String,
}

/// Captures the live entity at `r` into an [`EntitySnapshot`], or `None` if
/// `r` names a kind the undo engine doesn't track (`PlayerStart` is a
/// singleton field, not an array entry, and has no undo history).
pub fn capture_state(scene: &Scene, r: EntityRef) -> Option<EntitySnapshot> {
    let payload = match r.kind {
        EntityKind::Model => scene.models.get(r.index).cloned().map(EntityPayload::Model),
        EntityKind::Brush => scene.brushes.get(r.index).cloned().map(EntityPayload::Brush),
        EntityKind::Light => scene.lights.get(r.index).cloned().map(EntityPayload::Light),
        EntityKind::Decal => scene.decals.get(r.index).cloned().map(EntityPayload::Decal),
        EntityKind::Sound => scene.sounds.get(r.index).cloned().map(EntityPayload::Sound),
        EntityKind::ParticleEmitter => scene
            .particle_emitters
            .get(r.index)
            .cloned()
            .map(EntityPayload::ParticleEmitter),
        EntityKind::Sprite => scene.sprites.get(r.index).cloned().map(EntityPayload::Sprite),
        EntityKind::VideoPlayer => scene.video_players.get(r.index).cloned().map(EntityPayload::VideoPlayer),
        EntityKind::ParallaxRoom => scene.parallax_rooms.get(r.index).cloned().map(EntityPayload::ParallaxRoom),
        EntityKind::Logic => scene.logic_entities.get(r.index).cloned().map(EntityPayload::Logic),
        EntityKind::PlayerStart => None,
    }?;
    Some(EntitySnapshot { index: r.index, payload })
}

/// Re-inserts `snapshot` at its recorded index, re-hydrating every
/// externally-owned handle it references rather than trusting any handle
/// baked into the payload (§4.7 "External reconstruction on apply").
fn apply_state(scene: &mut Scene, backends: &mut Backends, snapshot: &EntitySnapshot) -> Result<(), SceneError> {
    match &snapshot.payload {
        EntityPayload::Model(m) => {
            let mut m = m.clone();
            m.render_handle = Some(backends.render.load_model(&m.model_path));
            if m.is_dynamic() {
                m.physics_handle = Some(backends.physics.create_dynamic_convex_hull(&[], m.mass));
            } else if m.is_physics_enabled {
                m.physics_handle = Some(backends.physics.create_static_trimesh(&[], &[]));
            }
            scene.insert_model_at(snapshot.index, m)
        }
        EntityPayload::Brush(b) => {
            let mut b = b.clone();
            let points: Vec<[f32; 3]> = b.vertices.iter().map(|v| [v.position.x, v.position.y, v.position.z]).collect();
            let mass = b.properties.property_f32("mass", 0.0);
            if !points.is_empty() {
                b.physics_handle = Some(if mass > 0.0 {
                    backends.physics.create_dynamic_convex_hull(&points, mass)
                } else {
                    backends.physics.create_static_convex_hull(&points)
                });
            }
            scene.insert_brush_at(snapshot.index, b)
        }
        EntityPayload::Light(l) => {
            let mut l = l.clone();
            l.shadow_map = Some(backends.render.create_shadow_map());
            scene.insert_light_at(snapshot.index, l)
        }
        EntityPayload::Decal(d) => {
            let mut d = d.clone();
            d.lightmap_atlases.clear();
            scene.insert_decal_at(snapshot.index, d)
        }
        EntityPayload::Sound(s) => {
            let mut s = s.clone();
            s.source = Some(backends.sound.play_source(&s.buffer_path, s.is_looping));
            scene.insert_sound_at(snapshot.index, s)
        }
        EntityPayload::ParticleEmitter(p) => {
            let mut p = p.clone();
            p.system = Some(backends.particles.load_template(&p.par_path));
            scene.insert_particle_emitter_at(snapshot.index, p)
        }
        EntityPayload::Sprite(s) => scene.insert_sprite_at(snapshot.index, s.clone()),
        EntityPayload::VideoPlayer(v) => {
            let mut v = v.clone();
            let handle = backends.video.open(&v.path);
            backends.video.seek_to_start(handle);
            v.decoder = Some(handle);
            scene.insert_video_player_at(snapshot.index, v)
        }
        EntityPayload::ParallaxRoom(p) => scene.insert_parallax_room_at(snapshot.index, p.clone()),
        EntityPayload::Logic(l) => scene.insert_logic_at(snapshot.index, l.clone()),
    }
}

/// Overwrites the entity at `snapshot.index` in place: frees the handles the
/// *current* occupant holds, writes `snapshot`'s payload over it without
/// touching array length or order, then re-hydrates the new occupant's own
/// handles. This is the `apply_state(..., is_creation=false)` path — used
/// for an ordinary (non-merge) modify, where the edited entity never moves.
/// Unlike [`apply_state`], which inserts (shifting everything after it),
/// this never reorders the compacting containers (brush/model, whose delete
/// is a `swap_remove`), so applying an index-preserving update cannot swap a
/// later entity into another's place the way delete-then-reinsert would.
fn overwrite_state(scene: &mut Scene, backends: &mut Backends, snapshot: &EntitySnapshot) -> Result<(), SceneError> {
    let index = snapshot.index;
    match &snapshot.payload {
        EntityPayload::Model(m) => {
            let slot = scene
                .models
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "model", index })?;
            slot.free_handles(backends);
            let mut m = m.clone();
            m.render_handle = Some(backends.render.load_model(&m.model_path));
            if m.is_dynamic() {
                m.physics_handle = Some(backends.physics.create_dynamic_convex_hull(&[], m.mass));
            } else if m.is_physics_enabled {
                m.physics_handle = Some(backends.physics.create_static_trimesh(&[], &[]));
            }
            scene.models[index] = m;
            Ok(())
        }
        EntityPayload::Brush(b) => {
            let slot = scene
                .brushes
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "brush", index })?;
            slot.free_handles(backends);
            let mut b = b.clone();
            let points: Vec<[f32; 3]> = b.vertices.iter().map(|v| [v.position.x, v.position.y, v.position.z]).collect();
            let mass = b.properties.property_f32("mass", 0.0);
            if !points.is_empty() {
                b.physics_handle = Some(if mass > 0.0 {
                    backends.physics.create_dynamic_convex_hull(&points, mass)
                } else {
                    backends.physics.create_static_convex_hull(&points)
                });
            }
            scene.brushes[index] = b;
            Ok(())
        }
        EntityPayload::Light(l) => {
            let slot = scene
                .lights
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "light", index })?;
            slot.free_handles(backends);
            let mut l = l.clone();
            l.shadow_map = Some(backends.render.create_shadow_map());
            scene.lights[index] = l;
            Ok(())
        }
        EntityPayload::Decal(d) => {
            let slot = scene
                .decals
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "decal", index })?;
            slot.free_handles(backends);
            let mut d = d.clone();
            d.lightmap_atlases.clear();
            scene.decals[index] = d;
            Ok(())
        }
        EntityPayload::Sound(s) => {
            let slot = scene
                .sounds
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "sound", index })?;
            slot.free_handles(backends);
            let mut s = s.clone();
            s.source = Some(backends.sound.play_source(&s.buffer_path, s.is_looping));
            scene.sounds[index] = s;
            Ok(())
        }
        EntityPayload::ParticleEmitter(p) => {
            let slot = scene
                .particle_emitters
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "particle_emitter", index })?;
            slot.free_handles(backends);
            let mut p = p.clone();
            p.system = Some(backends.particles.load_template(&p.par_path));
            scene.particle_emitters[index] = p;
            Ok(())
        }
        EntityPayload::Sprite(s) => {
            let slot = scene
                .sprites
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "sprite", index })?;
            slot.free_handles(backends);
            scene.sprites[index] = s.clone();
            Ok(())
        }
        EntityPayload::VideoPlayer(v) => {
            let slot = scene
                .video_players
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "video_player", index })?;
            slot.free_handles(backends);
            let mut v = v.clone();
            let handle = backends.video.open(&v.path);
            backends.video.seek_to_start(handle);
            v.decoder = Some(handle);
            scene.video_players[index] = v;
            Ok(())
        }
        EntityPayload::ParallaxRoom(p) => {
            let slot = scene
                .parallax_rooms
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "parallax_room", index })?;
            slot.free_handles(backends);
            scene.parallax_rooms[index] = p.clone();
            Ok(())
        }
        EntityPayload::Logic(l) => {
            let slot = scene
                .logic_entities
                .get_mut(index)
                .ok_or(SceneError::NoSuchEntity { kind: "logic", index })?;
            slot.free_handles(backends);
            scene.logic_entities[index] = l.clone();
            Ok(())
        }
    }
}

/// Overwrites every snapshot in `states` in place; order doesn't matter
/// since none of these writes shift any other entity's index.
fn overwrite_all(scene: &mut Scene, backends: &mut Backends, states: &[EntitySnapshot]) {
    for snapshot in states {
        let _ = overwrite_state(scene, backends, snapshot);
    }
}

fn raw_delete(scene: &mut Scene, backends: &mut Backends, kind: EntityKind, index: usize) -> Result<(), SceneError> {
    match kind {
        EntityKind::Model => scene.delete_model(index, backends).map(|_| ()),
        EntityKind::Brush => scene.delete_brush(index, backends).map(|_| ()),
        EntityKind::Light => scene.delete_light(index, backends).map(|_| ()),
        EntityKind::Decal => scene.delete_decal(index, backends).map(|_| ()),
        EntityKind::Sound => scene.delete_sound(index, backends).map(|_| ()),
        EntityKind::ParticleEmitter => scene.delete_particle_emitter(index, backends).map(|_| ()),
        EntityKind::Sprite => scene.delete_sprite(index, backends).map(|_| ()),
        EntityKind::VideoPlayer => scene.delete_video_player(index, backends).map(|_| ()),
        EntityKind::ParallaxRoom => scene.delete_parallax_room(index, backends).map(|_| ()),
        EntityKind::Logic => scene.delete_logic(index, backends).map(|_| ()),
        EntityKind::PlayerStart => Ok(()),
    }
}

/// Deletes every snapshot in `states`, highest index first within each
/// kind so earlier deletes don't shift the indices later ones target.
fn raw_delete_all(scene: &mut Scene, backends: &mut Backends, states: &[EntitySnapshot]) {
    let mut by_kind: Vec<(EntityKind, usize)> = states.iter().map(|s| (s.kind(), s.index)).collect();
    by_kind.sort_by(|a, b| b.1.cmp(&a.1));
    for (kind, index) in by_kind {
        let _ = raw_delete(scene, backends, kind, index);
    }
}

/// Inserts every snapshot in `states`, lowest index first within each kind
/// so each insertion lands exactly where it was recorded.
fn apply_all(scene: &mut Scene, backends: &mut Backends, states: &[EntitySnapshot]) {
    let mut ordered: Vec<&EntitySnapshot> = states.iter().collect();
    ordered.sort_by_key(|s| s.index);
    for snapshot in ordered {
        let _ = apply_state(scene, backends, snapshot);
    }
}

/// Two bounded action stacks driving the editor's undo/redo commands.
/// Capacity 128; pushing past capacity evicts the oldest entry.
pub struct UndoEngine {
    undo_stack: VecDeque<Action>,
    redo_stack: VecDeque<Action>,
    multi_before: Vec<EntitySnapshot>,
}

impl UndoEngine {
    pub fn new() -> UndoEngine {
        UndoEngine {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            multi_before: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push(&mut self, action: Action) {
        if self.undo_stack.len() >= UNDO_CAPACITY {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(action);
        self.redo_stack.clear();
    }

    /// Captures `before_states` for every selected entity ahead of an
    /// in-progress multi-selection edit. Pair with [`UndoEngine::end_multi`].
    pub fn begin_multi(&mut self, scene: &Scene, selections: &[EntityRef]) {
        self.multi_before = selections.iter().filter_map(|r| capture_state(scene, *r)).collect();
    }

    /// Captures `after_states` for the current selection and pushes a
    /// `ModifyEntity` action. The selection's cardinality may differ from
    /// what `begin_multi` recorded (a merge collapses several into one);
    /// use [`UndoEngine::push_merge`] for that case instead.
    pub fn end_multi(&mut self, scene: &Scene, selections: &[EntityRef], description: &str) {
        let after_states: Vec<EntitySnapshot> = selections.iter().filter_map(|r| capture_state(scene, *r)).collect();
        let before_states = std::mem::take(&mut self.multi_before);
        if before_states.is_empty() && after_states.is_empty() {
            return;
        }
        self.push(Action {
            kind: ActionKind::Modify,
            before_states,
            after_states,
            description: description.to_owned(),
        });
    }

    pub fn push_create(&mut self, scene: &Scene, selections: &[EntityRef], description: &str) {
        let after_states: Vec<EntitySnapshot> = selections.iter().filter_map(|r| capture_state(scene, *r)).collect();
        if after_states.is_empty() {
            return;
        }
        self.push(Action {
            kind: ActionKind::Create,
            before_states: Vec::new(),
            after_states,
            description: description.to_owned(),
        });
    }

    pub fn push_delete(&mut self, before_states: Vec<EntitySnapshot>, description: &str) {
        if before_states.is_empty() {
            return;
        }
        self.push(Action {
            kind: ActionKind::Delete,
            before_states,
            after_states: Vec::new(),
            description: description.to_owned(),
        });
    }

    /// Pushes a `ModifyEntity` action recording a cardinality-changing edit
    /// (several brushes collapsed into one, typically a CSG merge).
    pub fn push_merge(&mut self, before: Vec<EntitySnapshot>, after: Vec<EntitySnapshot>, description: &str) {
        self.push(Action {
            kind: ActionKind::Merge,
            before_states: before,
            after_states: after,
            description: description.to_owned(),
        });
    }

    pub fn undo(&mut self, scene: &mut Scene, backends: &mut Backends) -> Result<(), UndoError> {
        let action = self.undo_stack.pop_back().ok_or(UndoError::NothingToUndo)?;
        match action.kind {
            ActionKind::Modify => {
                overwrite_all(scene, backends, &action.before_states);
            }
            ActionKind::Merge => {
                raw_delete_all(scene, backends, &action.after_states);
                apply_all(scene, backends, &action.before_states);
            }
            ActionKind::Create => {
                raw_delete_all(scene, backends, &action.after_states);
            }
            ActionKind::Delete => {
                apply_all(scene, backends, &action.before_states);
            }
        }
        self.redo_stack.push_back(action);
        Ok(())
    }

    pub fn redo(&mut self, scene: &mut Scene, backends: &mut Backends) -> Result<(), UndoError> {
        let action = self.redo_stack.pop_back().ok_or(UndoError::NothingToRedo)?;
        match action.kind {
            ActionKind::Modify => {
                overwrite_all(scene, backends, &action.after_states);
            }
            ActionKind::Merge => {
                raw_delete_all(scene, backends, &action.before_states);
                apply_all(scene, backends, &action.after_states);
            }
            ActionKind::Create => {
                apply_all(scene, backends, &action.after_states);
            }
            ActionKind::Delete => {
                raw_delete_all(scene, backends, &action.before_states);
            }
        }
        self.undo_stack.push_back(action);
        Ok(())
    }
}

impl Default for UndoEngine {
    fn default() -> Self {
        UndoEngine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Brush;

    fn box_brush(targetname: &str) -> Brush {
        let mut b = Brush::new(targetname, "func_wall");
        b.vertices = vec![
            crate::scene::BrushVertex { position: Vec3::new(-1.0, -1.0, -1.0) },
            crate::scene::BrushVertex { position: Vec3::new(1.0, 1.0, 1.0) },
        ];
        b
    }

    use crate::math::Vec3;

    #[test]
    fn delete_then_undo_restores_the_brush() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        scene.insert_brush(box_brush("b0")).unwrap();

        let snap = capture_state(&scene, EntityRef::new(EntityKind::Brush, 0)).unwrap();
        scene.delete_brush(0, &mut backends).unwrap();
        assert!(scene.brushes.is_empty());

        let mut undo = UndoEngine::new();
        undo.push_delete(vec![snap], "delete brush");
        undo.undo(&mut scene, &mut backends).unwrap();

        assert_eq!(scene.brushes.len(), 1);
        assert_eq!(scene.brushes[0].common.targetname, "b0");
    }

    #[test]
    fn create_then_undo_then_redo_round_trips() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        scene.insert_brush(box_brush("b0")).unwrap();

        let mut undo = UndoEngine::new();
        undo.push_create(&scene, &[EntityRef::new(EntityKind::Brush, 0)], "create brush");

        undo.undo(&mut scene, &mut backends).unwrap();
        assert!(scene.brushes.is_empty());

        undo.redo(&mut scene, &mut backends).unwrap();
        assert_eq!(scene.brushes.len(), 1);
        assert_eq!(scene.brushes[0].common.targetname, "b0");
    }

    #[test]
    fn modify_undo_preserves_sibling_order_in_a_compacting_container() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        for name in ["b0", "b1", "b2", "b3"] {
            scene.insert_brush(box_brush(name)).unwrap();
        }

        let before = capture_state(&scene, EntityRef::new(EntityKind::Brush, 1)).unwrap();

        let mut edited = box_brush("b1-edited");
        edited.vertices = scene.brushes[1].vertices.clone();
        scene.brushes[1] = edited;
        let after = capture_state(&scene, EntityRef::new(EntityKind::Brush, 1)).unwrap();

        let mut undo = UndoEngine::new();
        undo.push(Action {
            kind: ActionKind::Modify,
            before_states: vec![before],
            after_states: vec![after],
            description: "edit b1".to_owned(),
        });

        undo.undo(&mut scene, &mut backends).unwrap();

        let names: Vec<&str> = scene.brushes.iter().map(|b| b.common.targetname.as_str()).collect();
        assert_eq!(names, vec!["b0", "b1", "b2", "b3"]);

        undo.redo(&mut scene, &mut backends).unwrap();
        let names: Vec<&str> = scene.brushes.iter().map(|b| b.common.targetname.as_str()).collect();
        assert_eq!(names, vec!["b0", "b1-edited", "b2", "b3"]);
    }

    #[test]
    fn undo_with_empty_stack_reports_nothing_to_undo() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        let mut undo = UndoEngine::new();
        assert!(matches!(undo.undo(&mut scene, &mut backends), Err(UndoError::NothingToUndo)));
    }

    #[test]
    fn merge_undo_splits_back_into_the_original_brushes() {
        let mut scene = Scene::new();
        let mut backends = Backends::null();
        scene.insert_brush(box_brush("b0")).unwrap();
        scene.insert_brush(box_brush("b1")).unwrap();
        let before = vec![
            capture_state(&scene, EntityRef::new(EntityKind::Brush, 0)).unwrap(),
            capture_state(&scene, EntityRef::new(EntityKind::Brush, 1)).unwrap(),
        ];

        scene.delete_brush(1, &mut backends).unwrap();
        scene.delete_brush(0, &mut backends).unwrap();
        scene.insert_brush(box_brush("merged")).unwrap();
        let after = vec![capture_state(&scene, EntityRef::new(EntityKind::Brush, 0)).unwrap()];

        let mut undo = UndoEngine::new();
        undo.push_merge(before, after, "merge brushes");
        undo.undo(&mut scene, &mut backends).unwrap();

        assert_eq!(scene.brushes.len(), 2);
        assert_eq!(scene.brushes[0].common.targetname, "b0");
        assert_eq!(scene.brushes[1].common.targetname, "b1");
    }
}
