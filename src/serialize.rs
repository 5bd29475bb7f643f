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

//! Map/save text format reader and writer (§4.8, §6). An external
//! collaborator in spirit: the exact grammar isn't load-bearing for any
//! other subsystem, whose only contract is that the Scene's arrays come
//! back fully initialized and that a write-then-read round-trips.
//!
//! The format is a version line followed by a sequence of brace-delimited
//! blocks, each a flat bag of `"key" "value"` lines — the same shape as a
//! BSP entity lump, generalized with a `__kind`/`__section` tag that says
//! which array (or scene-wide setting) the block belongs to. Parsing here
//! is hand-rolled in the style of [`crate::cvar::CvarStore::load`]'s
//! `set "name" "value"` line scanner rather than a parser-combinator
//! grammar, since nothing downstream depends on the grammar's shape.

use std::collections::HashMap;
use std::fmt;
use std::fs;

use crate::math::Vec3;
use crate::scene::{
    Brush, BrushFace, BrushVertex, Decal, FaceLayer, Light, LightKind, LightStyle, Logic, Model, ParallaxRoom,
    ParticleEmitter, Scene, Sound, Sprite, VideoPlayer, VideoState,
};

pub const MAP_VERSION: u32 = 11;

#[derive(Debug)]
pub enum SerializeError {
    Io(std::io::Error),
    MissingVersionLine,
    UnsupportedVersion(u32),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::Io(e) => write!(f, "io error: {}", e),
            SerializeError::MissingVersionLine => write!(f, "map file is missing its MAPVERSION line"),
            SerializeError::UnsupportedVersion(v) => write!(f, "unsupported map version {}", v),
        }
    }
}

impl std::error::Error for SerializeError {}

impl From<std::io::Error> for SerializeError {
    fn from(e: std::io::Error) -> Self {
        SerializeError::Io(e)
    }
}

type Block = HashMap<String, String>;

fn parse_kv_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if !line.starts_with('"') {
        return None;
    }
    let mut parts = line.splitn(2, '"').skip(1);
    let key = parts.next()?;
    let key_end = key.find('"')?;
    let (key, after_key) = key.split_at(key_end);
    let remainder = &after_key[1..];
    let value_start = remainder.find('"')? + 1;
    let value_rest = &remainder[value_start..];
    let value_end = value_rest.rfind('"')?;
    Some((key.to_owned(), value_rest[..value_end].to_owned()))
}

/// Splits the body (everything after the `MAPVERSION` line) into its
/// `{ ... }` blocks.
fn split_blocks(body: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line == "{" {
            current = Some(HashMap::new());
        } else if line == "}" {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
        } else if let Some(block) = current.as_mut() {
            if let Some((k, v)) = parse_kv_line(line) {
                block.insert(k, v);
            }
        }
    }
    blocks
}

fn parse_vec3(s: &str, default: Vec3) -> Vec3 {
    let parts: Vec<f32> = s.split_whitespace().filter_map(|p| p.parse().ok()).collect();
    if parts.len() == 3 {
        Vec3::new(parts[0], parts[1], parts[2])
    } else {
        default
    }
}

fn fmt_vec3(v: Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

fn get_f32(block: &Block, key: &str, default: f32) -> f32 {
    block.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn get_bool(block: &Block, key: &str, default: bool) -> bool {
    match block.get(key).map(String::as_str) {
        Some("1") | Some("true") => true,
        Some("0") | Some("false") => false,
        _ => default,
    }
}

fn get_str<'a>(block: &'a Block, key: &str, default: &'a str) -> &'a str {
    block.get(key).map(String::as_str).unwrap_or(default)
}

const RESERVED_KEYS: &[&str] = &["__kind", "__classname", "targetname", "pos", "rot"];

fn copy_extra_properties(block: &Block, properties: &mut crate::scene::PropertyMap) {
    for (k, v) in block {
        if RESERVED_KEYS.contains(&k.as_str()) || k.starts_with("__vertex") || k.starts_with("__face") {
            continue;
        }
        let _ = properties.set(k, v);
    }
}

fn encode_face(face: &BrushFace) -> String {
    let indices = face
        .vertex_indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let layers = face
        .layers
        .iter()
        .map(|l| {
            format!(
                "{}:{}:{}:{}:{}:{}",
                l.material.clone().unwrap_or_default(),
                l.uv_offset[0],
                l.uv_offset[1],
                l.uv_scale[0],
                l.uv_scale[1],
                l.uv_rotation
            )
        })
        .collect::<Vec<_>>()
        .join(";");
    format!("{}|{}|{}", indices, layers, face.blendmap_path.clone().unwrap_or_default())
}

fn decode_face(s: &str) -> BrushFace {
    let mut parts = s.splitn(3, '|');
    let indices_s = parts.next().unwrap_or("");
    let layers_s = parts.next().unwrap_or("");
    let blendmap_s = parts.next().unwrap_or("");

    let vertex_indices = if indices_s.is_empty() {
        Vec::new()
    } else {
        indices_s.split(',').filter_map(|p| p.parse().ok()).collect()
    };

    let layers = if layers_s.is_empty() {
        Vec::new()
    } else {
        layers_s
            .split(';')
            .map(|layer_s| {
                let f: Vec<&str> = layer_s.split(':').collect();
                FaceLayer {
                    material: f.first().filter(|s| !s.is_empty()).map(|s| s.to_string()),
                    uv_offset: [
                        f.get(1).and_then(|v| v.parse().ok()).unwrap_or(0.0),
                        f.get(2).and_then(|v| v.parse().ok()).unwrap_or(0.0),
                    ],
                    uv_scale: [
                        f.get(3).and_then(|v| v.parse().ok()).unwrap_or(1.0),
                        f.get(4).and_then(|v| v.parse().ok()).unwrap_or(1.0),
                    ],
                    uv_rotation: f.get(5).and_then(|v| v.parse().ok()).unwrap_or(0.0),
                }
            })
            .collect()
    };

    BrushFace {
        vertex_indices,
        layers,
        blendmap_path: if blendmap_s.is_empty() { None } else { Some(blendmap_s.to_owned()) },
    }
}

fn write_block<W: std::fmt::Write>(out: &mut W, pairs: &[(&str, String)]) {
    let _ = writeln!(out, "{{");
    for (k, v) in pairs {
        let _ = writeln!(out, "\"{}\" \"{}\"", k, v);
    }
    let _ = writeln!(out, "}}");
}

/// Serializes the full scene to the text map/save format (§6).
pub fn write_map(scene: &Scene) -> String {
    let mut out = String::new();
    out.push_str(&format!("MAPVERSION {}\n", MAP_VERSION));

    write_block(
        &mut out,
        &[
            ("__section", "sun".to_owned()),
            ("direction", fmt_vec3(scene.sun.direction)),
            ("color", fmt_vec3(scene.sun.color)),
            ("intensity", scene.sun.intensity.to_string()),
            ("enabled", (scene.sun.enabled as u8).to_string()),
        ],
    );
    write_block(
        &mut out,
        &[
            ("__section", "fog".to_owned()),
            ("color", fmt_vec3(scene.fog.color)),
            ("density", scene.fog.density.to_string()),
            ("start", scene.fog.start.to_string()),
            ("end", scene.fog.end.to_string()),
            ("enabled", (scene.fog.enabled as u8).to_string()),
        ],
    );
    write_block(
        &mut out,
        &[
            ("__section", "post".to_owned()),
            ("vignette", scene.post.vignette.to_string()),
            ("saturation", scene.post.saturation.to_string()),
        ],
    );
    write_block(
        &mut out,
        &[
            ("__section", "skybox".to_owned()),
            ("material", scene.skybox.material.clone().unwrap_or_default()),
            ("rotation_speed", scene.skybox.rotation_speed.to_string()),
        ],
    );
    write_block(
        &mut out,
        &[
            ("__section", "player_start".to_owned()),
            ("position", fmt_vec3(scene.player_start.position)),
            ("yaw", scene.player_start.yaw.to_string()),
            ("pitch", scene.player_start.pitch.to_string()),
        ],
    );

    for m in &scene.models {
        let mut pairs = vec![
            ("__kind", "model".to_owned()),
            ("targetname", m.common.targetname.clone()),
            ("pos", fmt_vec3(m.common.pos)),
            ("rot", fmt_vec3(m.common.rot)),
            ("model_path", m.model_path.clone()),
            ("scale", fmt_vec3(m.scale)),
            ("mass", m.mass.to_string()),
            ("fade_start", m.fade_start.to_string()),
            ("fade_end", m.fade_end.to_string()),
            ("sway", (m.sway as u8).to_string()),
            ("is_physics_enabled", (m.is_physics_enabled as u8).to_string()),
        ];
        let owned: Vec<(&str, String)> = pairs.drain(..).collect();
        write_block(&mut out, &owned);
    }

    for b in &scene.brushes {
        let mut pairs = vec![
            ("__kind", "brush".to_owned()),
            ("__classname", b.classname.clone()),
            ("targetname", b.common.targetname.clone()),
            ("pos", fmt_vec3(b.common.pos)),
            ("rot", fmt_vec3(b.common.rot)),
        ];
        for (i, v) in b.vertices.iter().enumerate() {
            pairs.push((Box::leak(format!("__vertex{}", i).into_boxed_str()), fmt_vec3(v.position)));
        }
        for (i, f) in b.faces.iter().enumerate() {
            pairs.push((Box::leak(format!("__face{}", i).into_boxed_str()), encode_face(f)));
        }
        for (k, v) in b.properties.iter() {
            pairs.push((Box::leak(k.to_owned().into_boxed_str()), v.to_owned()));
        }
        write_block(&mut out, &pairs);
    }

    for l in &scene.lights {
        let kind = match l.kind {
            LightKind::Point => "point",
            LightKind::Spot => "spot",
        };
        write_block(
            &mut out,
            &[
                ("__kind", "light".to_owned()),
                ("targetname", l.common.targetname.clone()),
                ("pos", fmt_vec3(l.common.pos)),
                ("rot", fmt_vec3(l.common.rot)),
                ("light_kind", kind.to_owned()),
                ("color", fmt_vec3(l.color)),
                ("intensity", l.intensity.to_string()),
                ("base_intensity", l.base_intensity.to_string()),
                ("is_on", (l.is_on as u8).to_string()),
                ("is_static", (l.is_static as u8).to_string()),
                ("radius", l.radius.to_string()),
                ("cutoff", l.cutoff.to_string()),
                ("outer_cutoff", l.outer_cutoff.to_string()),
                ("style_preset", l.style.preset.to_string()),
                ("style_custom", l.style.custom.clone().unwrap_or_default()),
            ],
        );
    }

    for d in &scene.decals {
        write_block(
            &mut out,
            &[
                ("__kind", "decal".to_owned()),
                ("targetname", d.common.targetname.clone()),
                ("pos", fmt_vec3(d.common.pos)),
                ("rot", fmt_vec3(d.common.rot)),
                ("size", fmt_vec3(d.size)),
                ("material", d.material.clone()),
            ],
        );
    }

    for s in &scene.sounds {
        write_block(
            &mut out,
            &[
                ("__kind", "sound".to_owned()),
                ("targetname", s.common.targetname.clone()),
                ("pos", fmt_vec3(s.common.pos)),
                ("rot", fmt_vec3(s.common.rot)),
                ("buffer_path", s.buffer_path.clone()),
                ("volume", s.volume.to_string()),
                ("pitch", s.pitch.to_string()),
                ("max_distance", s.max_distance.to_string()),
                ("is_looping", (s.is_looping as u8).to_string()),
                ("play_on_start", (s.play_on_start as u8).to_string()),
            ],
        );
    }

    for p in &scene.particle_emitters {
        write_block(
            &mut out,
            &[
                ("__kind", "particle_emitter".to_owned()),
                ("targetname", p.common.targetname.clone()),
                ("pos", fmt_vec3(p.common.pos)),
                ("rot", fmt_vec3(p.common.rot)),
                ("par_path", p.par_path.clone()),
                ("on_by_default", (p.on_by_default as u8).to_string()),
                ("is_on", (p.is_on as u8).to_string()),
            ],
        );
    }

    for s in &scene.sprites {
        write_block(
            &mut out,
            &[
                ("__kind", "sprite".to_owned()),
                ("targetname", s.common.targetname.clone()),
                ("pos", fmt_vec3(s.common.pos)),
                ("rot", fmt_vec3(s.common.rot)),
                ("material", s.material.clone()),
                ("scale", s.scale.to_string()),
                ("visible", (s.visible as u8).to_string()),
            ],
        );
    }

    for v in &scene.video_players {
        let state = match v.state {
            VideoState::Stopped => "stopped",
            VideoState::Playing => "playing",
            VideoState::Paused => "paused",
        };
        write_block(
            &mut out,
            &[
                ("__kind", "video_player".to_owned()),
                ("targetname", v.common.targetname.clone()),
                ("pos", fmt_vec3(v.common.pos)),
                ("rot", fmt_vec3(v.common.rot)),
                ("path", v.path.clone()),
                ("size", format!("{} {}", v.size.x, v.size.y)),
                ("play_on_start", (v.play_on_start as u8).to_string()),
                ("looping", (v.looping as u8).to_string()),
                ("state", state.to_owned()),
            ],
        );
    }

    for p in &scene.parallax_rooms {
        write_block(
            &mut out,
            &[
                ("__kind", "parallax_room".to_owned()),
                ("targetname", p.common.targetname.clone()),
                ("pos", fmt_vec3(p.common.pos)),
                ("rot", fmt_vec3(p.common.rot)),
                ("size", format!("{} {}", p.size.x, p.size.y)),
                ("room_depth", p.room_depth.to_string()),
            ],
        );
    }

    for l in &scene.logic_entities {
        let mut pairs = vec![
            ("__kind", "logic".to_owned()),
            ("__classname", l.classname.clone()),
            ("targetname", l.common.targetname.clone()),
            ("pos", fmt_vec3(l.common.pos)),
            ("rot", fmt_vec3(l.common.rot)),
            ("active", (l.active as u8).to_string()),
        ];
        for (k, v) in l.properties.iter() {
            pairs.push((Box::leak(k.to_owned().into_boxed_str()), v.to_owned()));
        }
        write_block(&mut out, &pairs);
    }

    out
}

/// Parses `text` into a fresh [`Scene`], failing only on a missing or
/// unsupported version line — an unparseable block is simply skipped,
/// matching the engine-wide "never abort on data error" policy (§7).
pub fn read_map(text: &str) -> Result<Scene, SerializeError> {
    let mut lines = text.lines();
    let version_line = lines.next().ok_or(SerializeError::MissingVersionLine)?;
    let version: u32 = version_line
        .trim()
        .strip_prefix("MAPVERSION")
        .ok_or(SerializeError::MissingVersionLine)?
        .trim()
        .parse()
        .map_err(|_| SerializeError::MissingVersionLine)?;
    if version != MAP_VERSION {
        return Err(SerializeError::UnsupportedVersion(version));
    }

    let body = &text[version_line.len()..];
    let mut scene = Scene::new();

    for block in split_blocks(body) {
        match block.get("__section").map(String::as_str) {
            Some("sun") => {
                scene.sun.direction = parse_vec3(get_str(&block, "direction", ""), scene.sun.direction);
                scene.sun.color = parse_vec3(get_str(&block, "color", ""), scene.sun.color);
                scene.sun.intensity = get_f32(&block, "intensity", scene.sun.intensity);
                scene.sun.enabled = get_bool(&block, "enabled", scene.sun.enabled);
                continue;
            }
            Some("fog") => {
                scene.fog.color = parse_vec3(get_str(&block, "color", ""), scene.fog.color);
                scene.fog.density = get_f32(&block, "density", scene.fog.density);
                scene.fog.start = get_f32(&block, "start", scene.fog.start);
                scene.fog.end = get_f32(&block, "end", scene.fog.end);
                scene.fog.enabled = get_bool(&block, "enabled", scene.fog.enabled);
                continue;
            }
            Some("post") => {
                scene.post.vignette = get_f32(&block, "vignette", scene.post.vignette);
                scene.post.saturation = get_f32(&block, "saturation", scene.post.saturation);
                continue;
            }
            Some("skybox") => {
                let material = get_str(&block, "material", "");
                scene.skybox.material = if material.is_empty() { None } else { Some(material.to_owned()) };
                scene.skybox.rotation_speed = get_f32(&block, "rotation_speed", scene.skybox.rotation_speed);
                continue;
            }
            Some("player_start") => {
                scene.player_start.position = parse_vec3(get_str(&block, "position", ""), scene.player_start.position);
                scene.player_start.yaw = get_f32(&block, "yaw", scene.player_start.yaw);
                scene.player_start.pitch = get_f32(&block, "pitch", scene.player_start.pitch);
                continue;
            }
            _ => {}
        }

        match block.get("__kind").map(String::as_str) {
            Some("model") => {
                let targetname = get_str(&block, "targetname", "");
                let mut m = Model::new(targetname, get_str(&block, "model_path", ""));
                m.common.pos = parse_vec3(get_str(&block, "pos", ""), m.common.pos);
                m.common.rot = parse_vec3(get_str(&block, "rot", ""), m.common.rot);
                m.scale = parse_vec3(get_str(&block, "scale", ""), m.scale);
                m.mass = get_f32(&block, "mass", 0.0);
                m.fade_start = get_f32(&block, "fade_start", 0.0);
                m.fade_end = get_f32(&block, "fade_end", 0.0);
                m.sway = get_bool(&block, "sway", false);
                m.is_physics_enabled = get_bool(&block, "is_physics_enabled", false);
                let _ = scene.insert_model(m);
            }
            Some("brush") => {
                let targetname = get_str(&block, "targetname", "");
                let classname = get_str(&block, "__classname", "");
                let mut b = Brush::new(targetname, classname);
                b.common.pos = parse_vec3(get_str(&block, "pos", ""), b.common.pos);
                b.common.rot = parse_vec3(get_str(&block, "rot", ""), b.common.rot);

                let mut vertex_indices: Vec<usize> = block
                    .keys()
                    .filter_map(|k| k.strip_prefix("__vertex").and_then(|n| n.parse().ok()))
                    .collect();
                vertex_indices.sort_unstable();
                for i in vertex_indices {
                    let key = format!("__vertex{}", i);
                    let pos = parse_vec3(get_str(&block, &key, ""), Vec3::new(0.0, 0.0, 0.0));
                    b.vertices.push(BrushVertex { position: pos });
                }

                let mut face_indices: Vec<usize> =
                    block.keys().filter_map(|k| k.strip_prefix("__face").and_then(|n| n.parse().ok())).collect();
                face_indices.sort_unstable();
                for i in face_indices {
                    let key = format!("__face{}", i);
                    b.faces.push(decode_face(get_str(&block, &key, "")));
                }

                copy_extra_properties(&block, &mut b.properties);
                let _ = scene.insert_brush(b);
            }
            Some("light") => {
                let kind = match get_str(&block, "light_kind", "point") {
                    "spot" => LightKind::Spot,
                    _ => LightKind::Point,
                };
                let mut l = Light::new(get_str(&block, "targetname", ""), kind);
                l.common.pos = parse_vec3(get_str(&block, "pos", ""), l.common.pos);
                l.common.rot = parse_vec3(get_str(&block, "rot", ""), l.common.rot);
                l.color = parse_vec3(get_str(&block, "color", ""), l.color);
                l.intensity = get_f32(&block, "intensity", l.intensity);
                l.base_intensity = get_f32(&block, "base_intensity", l.base_intensity);
                l.is_on = get_bool(&block, "is_on", l.is_on);
                l.is_static = get_bool(&block, "is_static", l.is_static);
                l.radius = get_f32(&block, "radius", l.radius);
                l.cutoff = get_f32(&block, "cutoff", l.cutoff);
                l.outer_cutoff = get_f32(&block, "outer_cutoff", l.outer_cutoff);
                let preset: u8 = block.get("style_preset").and_then(|v| v.parse().ok()).unwrap_or(0);
                let custom = block.get("style_custom").filter(|s| !s.is_empty()).cloned();
                l.style = LightStyle { preset, custom, ..LightStyle::default() };
                let _ = scene.insert_light(l);
            }
            Some("decal") => {
                let mut d = Decal::new(get_str(&block, "targetname", ""), get_str(&block, "material", ""));
                d.common.pos = parse_vec3(get_str(&block, "pos", ""), d.common.pos);
                d.common.rot = parse_vec3(get_str(&block, "rot", ""), d.common.rot);
                d.size = parse_vec3(get_str(&block, "size", ""), d.size);
                let _ = scene.insert_decal(d);
            }
            Some("sound") => {
                let mut s = Sound::new(get_str(&block, "targetname", ""), get_str(&block, "buffer_path", ""));
                s.common.pos = parse_vec3(get_str(&block, "pos", ""), s.common.pos);
                s.common.rot = parse_vec3(get_str(&block, "rot", ""), s.common.rot);
                s.volume = get_f32(&block, "volume", s.volume);
                s.pitch = get_f32(&block, "pitch", s.pitch);
                s.max_distance = get_f32(&block, "max_distance", s.max_distance);
                s.is_looping = get_bool(&block, "is_looping", s.is_looping);
                s.play_on_start = get_bool(&block, "play_on_start", s.play_on_start);
                let _ = scene.insert_sound(s);
            }
            Some("particle_emitter") => {
                let mut p = ParticleEmitter::new(get_str(&block, "targetname", ""), get_str(&block, "par_path", ""));
                p.common.pos = parse_vec3(get_str(&block, "pos", ""), p.common.pos);
                p.common.rot = parse_vec3(get_str(&block, "rot", ""), p.common.rot);
                p.on_by_default = get_bool(&block, "on_by_default", p.on_by_default);
                p.is_on = get_bool(&block, "is_on", p.is_on);
                let _ = scene.insert_particle_emitter(p);
            }
            Some("sprite") => {
                let mut s = Sprite::new(get_str(&block, "targetname", ""), get_str(&block, "material", ""));
                s.common.pos = parse_vec3(get_str(&block, "pos", ""), s.common.pos);
                s.common.rot = parse_vec3(get_str(&block, "rot", ""), s.common.rot);
                s.scale = get_f32(&block, "scale", s.scale);
                s.visible = get_bool(&block, "visible", s.visible);
                let _ = scene.insert_sprite(s);
            }
            Some("video_player") => {
                let mut v = VideoPlayer::new(get_str(&block, "targetname", ""), get_str(&block, "path", ""));
                v.common.pos = parse_vec3(get_str(&block, "pos", ""), v.common.pos);
                v.common.rot = parse_vec3(get_str(&block, "rot", ""), v.common.rot);
                let size_parts: Vec<f32> =
                    get_str(&block, "size", "").split_whitespace().filter_map(|p| p.parse().ok()).collect();
                if size_parts.len() == 2 {
                    v.size = cgmath::Vector2::new(size_parts[0], size_parts[1]);
                }
                v.play_on_start = get_bool(&block, "play_on_start", v.play_on_start);
                v.looping = get_bool(&block, "looping", v.looping);
                v.state = match get_str(&block, "state", "stopped") {
                    "playing" => VideoState::Playing,
                    "paused" => VideoState::Paused,
                    _ => VideoState::Stopped,
                };
                let _ = scene.insert_video_player(v);
            }
            Some("parallax_room") => {
                let mut p = ParallaxRoom::new(get_str(&block, "targetname", ""));
                p.common.pos = parse_vec3(get_str(&block, "pos", ""), p.common.pos);
                p.common.rot = parse_vec3(get_str(&block, "rot", ""), p.common.rot);
                let size_parts: Vec<f32> =
                    get_str(&block, "size", "").split_whitespace().filter_map(|p| p.parse().ok()).collect();
                if size_parts.len() == 2 {
                    p.size = cgmath::Vector2::new(size_parts[0], size_parts[1]);
                }
                p.room_depth = get_f32(&block, "room_depth", p.room_depth);
                let _ = scene.insert_parallax_room(p);
            }
            Some("logic") => {
                let targetname = get_str(&block, "targetname", "");
                let classname = get_str(&block, "__classname", "");
                let mut l = Logic::new(targetname, classname);
                l.common.pos = parse_vec3(get_str(&block, "pos", ""), l.common.pos);
                l.common.rot = parse_vec3(get_str(&block, "rot", ""), l.common.rot);
                l.active = get_bool(&block, "active", l.active);
                copy_extra_properties(&block, &mut l.properties);
                let _ = scene.insert_logic(l);
            }
            _ => {}
        }
    }

    Ok(scene)
}

/// Loads and parses `saves/<name>.sav` or `maps/<name>.map`, depending on
/// `path`'s extension being left to the caller (`map`/`load` commands).
pub fn load_from_path(path: &str) -> Result<Scene, SerializeError> {
    let text = fs::read_to_string(path)?;
    read_map(&text)
}

/// Writes `scene` to `path` in the map/save format.
pub fn save_to_path(scene: &Scene, path: &str) -> Result<(), SerializeError> {
    fs::write(path, write_map(scene))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_sun_fog_and_a_brush() {
        let mut scene = Scene::new();
        scene.sun.enabled = true;
        scene.sun.intensity = 2.5;
        scene.fog.density = 0.1;

        let mut b = Brush::new("t1", "trigger_once");
        b.common.pos = Vec3::new(1.0, 2.0, 3.0);
        b.vertices.push(BrushVertex { position: Vec3::new(-1.0, -1.0, -1.0) });
        b.vertices.push(BrushVertex { position: Vec3::new(1.0, 1.0, 1.0) });
        b.properties.set("damage", "25").unwrap();
        scene.insert_brush(b).unwrap();

        let text = write_map(&scene);
        let restored = read_map(&text).unwrap();

        assert!(restored.sun.enabled);
        assert!((restored.sun.intensity - 2.5).abs() < 1e-5);
        assert!((restored.fog.density - 0.1).abs() < 1e-5);
        assert_eq!(restored.brushes.len(), 1);
        assert_eq!(restored.brushes[0].common.targetname, "t1");
        assert_eq!(restored.brushes[0].classname, "trigger_once");
        assert_eq!(restored.brushes[0].vertices.len(), 2);
        assert_eq!(restored.brushes[0].properties.property_f32("damage", 0.0), 25.0);
    }

    #[test]
    fn rejects_a_missing_version_line() {
        let err = read_map("not a map file").unwrap_err();
        assert!(matches!(err, SerializeError::MissingVersionLine));
    }

    #[test]
    fn rejects_an_unsupported_version() {
        let err = read_map("MAPVERSION 3\n").unwrap_err();
        assert!(matches!(err, SerializeError::UnsupportedVersion(3)));
    }

    #[test]
    fn a_model_and_a_light_round_trip_their_core_fields() {
        let mut scene = Scene::new();
        let mut m = Model::new("crate1", "models/crate.mdl");
        m.mass = 5.0;
        scene.insert_model(m).unwrap();

        let mut l = Light::new("lamp1", LightKind::Point);
        l.intensity = 3.0;
        scene.insert_light(l).unwrap();

        let restored = read_map(&write_map(&scene)).unwrap();
        assert_eq!(restored.models.len(), 1);
        assert_eq!(restored.models[0].model_path, "models/crate.mdl");
        assert!((restored.models[0].mass - 5.0).abs() < 1e-5);
        assert_eq!(restored.lights.len(), 1);
        assert!((restored.lights[0].intensity - 3.0).abs() < 1e-5);
    }
}
