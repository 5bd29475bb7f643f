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

//! Per-frame logic entity update (§4.5): timers, counters, random triggers,
//! the blackhole spin, the `env_fade` state machine, and light style
//! animation. This runs after command dispatch and before the I/O pending
//! queue is drained, matching the frame order in §2.

use rand::Rng;

use crate::io_graph::IoGraph;
use crate::scene::{EntityKind, LogicClass, Scene};

fn rand_uniform(min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rand::thread_rng().gen_range(min, max)
}

/// Advances every logic entity and light style by `dt` seconds, firing
/// outputs into `io` as timers/counters/randoms cross their thresholds.
pub fn tick(scene: &mut Scene, io: &mut IoGraph, now: f32, dt: f32) {
    for i in 0..scene.logic_entities.len() {
        let class = scene.logic_entities[i].class();
        match class {
            LogicClass::Timer => tick_timer(scene, io, i, now, dt),
            LogicClass::Random => tick_random(scene, io, i, now, dt),
            LogicClass::EnvBlackhole => tick_blackhole(scene, i, dt),
            LogicClass::EnvFade => tick_fade(scene, i, dt),
            _ => {}
        }
    }

    for light in scene.lights.iter_mut() {
        light.style.tick(dt);
        light.update_intensity();
    }
}

fn tick_timer(scene: &mut Scene, io: &mut IoGraph, i: usize, now: f32, dt: f32) {
    let ent = &mut scene.logic_entities[i];
    if !ent.active {
        return;
    }
    ent.float_a -= dt;
    if ent.float_a <= 0.0 {
        let _ = io.fire_output(EntityKind::Logic, i as i32, "OnTimer", now, None);

        let repeat = ent.properties.property_i32("repeat", 1);
        if repeat == -1 {
            ent.float_a = ent.properties.property_f32("delay", 1.0);
        } else {
            ent.active = false;
        }
    }
}

fn tick_random(scene: &mut Scene, io: &mut IoGraph, i: usize, now: f32, dt: f32) {
    let fire = {
        let ent = &mut scene.logic_entities[i];
        if !ent.active {
            return;
        }
        ent.float_a -= dt;
        if ent.float_a <= 0.0 {
            let min_t = ent.properties.property_f32("min_time", 0.0);
            let max_t = ent.properties.property_f32("max_time", 0.0);
            ent.float_a = rand_uniform(min_t, max_t);
            true
        } else {
            false
        }
    };
    if fire {
        let _ = io.fire_output(EntityKind::Logic, i as i32, "OnRandom", now, None);
    }
}

fn tick_blackhole(scene: &mut Scene, i: usize, dt: f32) {
    let ent = &mut scene.logic_entities[i];
    if !ent.active {
        return;
    }
    let speed = ent.properties.property_f32("rotationspeed", 10.0);
    ent.common.rot.y += speed * dt;
    if ent.common.rot.y > 360.0 {
        ent.common.rot.y -= 360.0;
    }
}

/// `int_a` substates, mirroring the original dispatcher:
/// 1 FadeIn, 2 FadeOut, 3 HoldIn, 4 Fade-cycle start, 5 HoldPeak.
fn tick_fade(scene: &mut Scene, i: usize, dt: f32) {
    let ent = &mut scene.logic_entities[i];
    if ent.int_a == 0 {
        return;
    }

    scene.post.fade_active = true;
    scene.post.fade_color = crate::math::Vec3::new(0.0, 0.0, 0.0);

    let duration = {
        let d = ent.properties.property_f32("duration", 2.0);
        if d <= 0.0 {
            0.01
        } else {
            d
        }
    };
    let holdtime = ent.properties.property_f32("holdtime", 1.0);
    let renderamt = ent.properties.property_i32("renderamt", 255);
    let target_alpha = renderamt as f32 / 255.0;

    ent.float_a += dt;

    match ent.int_a {
        1 => {
            scene.post.fade_alpha = (ent.float_a / duration * target_alpha).min(target_alpha);
            if ent.float_a >= duration {
                ent.int_a = 3;
                ent.float_a = 0.0;
            }
        }
        2 => {
            scene.post.fade_alpha = (target_alpha - ent.float_a / duration * target_alpha).max(0.0);
            if ent.float_a >= duration {
                ent.int_a = 0;
                scene.post.fade_active = false;
            }
        }
        3 => {
            scene.post.fade_alpha = target_alpha;
        }
        4 => {
            scene.post.fade_alpha = (ent.float_a / duration * target_alpha).min(target_alpha);
            if ent.float_a >= duration {
                ent.int_a = 5;
                ent.float_a = 0.0;
            }
        }
        5 => {
            scene.post.fade_alpha = target_alpha;
            if ent.float_a >= holdtime {
                ent.int_a = 2;
                ent.float_a = 0.0;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Logic;

    #[test]
    fn timer_fires_ontimer_and_respects_repeat() {
        let mut scene = Scene::new();
        let mut logic = Logic::new("t1", "logic_timer");
        logic.active = true;
        logic.float_a = 0.05;
        logic.properties.set("delay", "1.0").unwrap();
        logic.properties.set("repeat", "-1").unwrap();
        scene.insert_logic(logic).unwrap();

        let mut io = IoGraph::new();
        tick(&mut scene, &mut io, 0.0, 0.1);

        assert!(scene.logic_entities[0].active);
        assert!((scene.logic_entities[0].float_a - 1.0).abs() < 1e-5);
    }

    #[test]
    fn timer_deactivates_when_not_repeating() {
        let mut scene = Scene::new();
        let mut logic = Logic::new("t1", "logic_timer");
        logic.active = true;
        logic.float_a = 0.05;
        logic.properties.set("repeat", "1").unwrap();
        scene.insert_logic(logic).unwrap();

        let mut io = IoGraph::new();
        tick(&mut scene, &mut io, 0.0, 0.1);

        assert!(!scene.logic_entities[0].active);
    }

    #[test]
    fn blackhole_wraps_rotation_at_360() {
        let mut scene = Scene::new();
        let mut logic = Logic::new("bh", "env_blackhole");
        logic.active = true;
        logic.common.rot.y = 350.0;
        logic.properties.set("rotationspeed", "100.0").unwrap();
        scene.insert_logic(logic).unwrap();

        let mut io = IoGraph::new();
        tick(&mut scene, &mut io, 0.0, 1.0);

        assert!(scene.logic_entities[0].common.rot.y < 360.0);
    }

    #[test]
    fn fade_in_ramps_alpha_toward_target_then_holds() {
        let mut scene = Scene::new();
        let mut logic = Logic::new("f1", "env_fade");
        logic.int_a = 1;
        logic.properties.set("duration", "1.0").unwrap();
        scene.insert_logic(logic).unwrap();

        let mut io = IoGraph::new();
        tick(&mut scene, &mut io, 0.0, 1.5);

        assert_eq!(scene.logic_entities[0].int_a, 3);
        assert!((scene.post.fade_alpha - 1.0).abs() < 1e-4);
    }
}
