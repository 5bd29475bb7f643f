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

//! Narrow trait seams for the renderer, physics, sound, video and network
//! collaborators that live outside the engine core (§1, §6). The core only
//! ever holds opaque handles returned by these traits; it never depends on
//! a concrete GPU/audio/physics crate.

use std::cell::Cell;

macro_rules! opaque_handle {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub u64);
    };
}

opaque_handle!(ModelHandle);
opaque_handle!(RigidBodyHandle);
opaque_handle!(ShadowMapHandle);
opaque_handle!(CubemapHandle);
opaque_handle!(LightmapAtlasHandle);
opaque_handle!(SoundSourceHandle);
opaque_handle!(ParticleSystemHandle);
opaque_handle!(VideoDecoderHandle);

/// Rigid body / collider creation for dynamic models and solid brushes
/// (§3 Model, §4.6, §4.7).
pub trait PhysicsBackend {
    fn create_dynamic_convex_hull(&mut self, vertices: &[[f32; 3]], mass: f32) -> RigidBodyHandle;
    fn create_static_convex_hull(&mut self, vertices: &[[f32; 3]]) -> RigidBodyHandle;
    fn create_static_trimesh(&mut self, vertices: &[[f32; 3]], indices: &[u32]) -> RigidBodyHandle;
    fn destroy_rigid_body(&mut self, handle: RigidBodyHandle);
    fn set_gravity(&mut self, gravity: f32);
    fn set_kinematic_velocity(&mut self, handle: RigidBodyHandle, velocity: [f32; 3]);

    /// Casts a ray from `origin` along `direction` (normalized) up to
    /// `max_distance`, returning the world-space hit point if anything was
    /// struck. Backs `func_ladder`'s forward-facing-wall check and the
    /// `func_button`/`func_healthcharger` use-key interaction (§4.6).
    fn raycast(&mut self, origin: [f32; 3], direction: [f32; 3], max_distance: f32) -> Option<[f32; 3]>;

    /// Current linear velocity of a dynamic body, used by `func_conveyor`
    /// to decide which overlapping models to re-drive (§4.6).
    fn get_linear_velocity(&mut self, handle: RigidBodyHandle) -> [f32; 3];

    /// Sum of the masses of every dynamic body resting on top of `handle`,
    /// used by `func_weight_button`'s pressure-plate threshold (§4.6).
    fn total_mass_on_object(&mut self, handle: RigidBodyHandle) -> f32;

    /// Applies an upward buoyancy force to `handle` proportional to the
    /// portion of its bounding volume below `surface_y`, used by
    /// `func_water` (§4.6).
    fn apply_buoyancy(&mut self, handle: RigidBodyHandle, fluid_density: f32, surface_y: f32);
}

/// Sound source lifecycle (§3 Sound, §4.6 `trigger_dspzone`).
pub trait SoundBackend {
    fn play_source(&mut self, buffer_path: &str, looping: bool) -> SoundSourceHandle;
    fn stop_source(&mut self, handle: SoundSourceHandle);
    fn set_dsp_preset(&mut self, preset: &str);
}

/// Render-side resource lifecycle for models, shadow maps, cubemaps and
/// lightmap atlases (§4.3 scene clear, §4.7 external reconstruction).
pub trait RenderBackend {
    fn load_model(&mut self, path: &str) -> ModelHandle;
    fn free_model(&mut self, handle: ModelHandle);
    fn create_shadow_map(&mut self) -> ShadowMapHandle;
    fn free_shadow_map(&mut self, handle: ShadowMapHandle);
    fn create_cubemap(&mut self) -> CubemapHandle;
    fn free_cubemap(&mut self, handle: CubemapHandle);
    fn build_lightmap_atlas(&mut self) -> LightmapAtlasHandle;
    fn free_lightmap_atlas(&mut self, handle: LightmapAtlasHandle);
}

/// Video decoder lifecycle (§3 VideoPlayer).
pub trait VideoBackend {
    fn open(&mut self, path: &str) -> VideoDecoderHandle;
    fn seek_to_start(&mut self, handle: VideoDecoderHandle);
    fn close(&mut self, handle: VideoDecoderHandle);
}

/// Particle emitter template loading (§3 ParticleEmitter).
pub trait ParticleBackend {
    fn load_template(&mut self, par_path: &str) -> ParticleSystemHandle;
    fn free(&mut self, handle: ParticleSystemHandle);
}

/// Out-of-process network helpers for the `download`/`ping` commands (§6).
/// Genuinely out of scope for core behavior; exists only so those command
/// handlers have something to call.
pub trait NetworkIo {
    fn download(&mut self, url: &str) -> Result<(), String>;
    fn ping(&mut self, host: &str) -> Result<u32, String>;
}

/// No-op implementation of every backend trait, for headless runs and tests.
/// Hands out monotonically increasing handle ids so callers can still tell
/// distinct allocations apart.
#[derive(Default)]
pub struct NullBackends {
    next_id: Cell<u64>,
}

impl NullBackends {
    pub fn new() -> NullBackends {
        NullBackends { next_id: Cell::new(1) }
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl PhysicsBackend for NullBackends {
    fn create_dynamic_convex_hull(&mut self, _vertices: &[[f32; 3]], _mass: f32) -> RigidBodyHandle {
        RigidBodyHandle(self.next())
    }
    fn create_static_convex_hull(&mut self, _vertices: &[[f32; 3]]) -> RigidBodyHandle {
        RigidBodyHandle(self.next())
    }
    fn create_static_trimesh(&mut self, _vertices: &[[f32; 3]], _indices: &[u32]) -> RigidBodyHandle {
        RigidBodyHandle(self.next())
    }
    fn destroy_rigid_body(&mut self, _handle: RigidBodyHandle) {}
    fn set_gravity(&mut self, _gravity: f32) {}
    fn set_kinematic_velocity(&mut self, _handle: RigidBodyHandle, _velocity: [f32; 3]) {}
    fn raycast(&mut self, _origin: [f32; 3], _direction: [f32; 3], _max_distance: f32) -> Option<[f32; 3]> {
        None
    }
    fn get_linear_velocity(&mut self, _handle: RigidBodyHandle) -> [f32; 3] {
        [0.0, 0.0, 0.0]
    }
    fn total_mass_on_object(&mut self, _handle: RigidBodyHandle) -> f32 {
        0.0
    }
    fn apply_buoyancy(&mut self, _handle: RigidBodyHandle, _fluid_density: f32, _surface_y: f32) {}
}

impl SoundBackend for NullBackends {
    fn play_source(&mut self, _buffer_path: &str, _looping: bool) -> SoundSourceHandle {
        SoundSourceHandle(self.next())
    }
    fn stop_source(&mut self, _handle: SoundSourceHandle) {}
    fn set_dsp_preset(&mut self, _preset: &str) {}
}

impl RenderBackend for NullBackends {
    fn load_model(&mut self, _path: &str) -> ModelHandle {
        ModelHandle(self.next())
    }
    fn free_model(&mut self, _handle: ModelHandle) {}
    fn create_shadow_map(&mut self) -> ShadowMapHandle {
        ShadowMapHandle(self.next())
    }
    fn free_shadow_map(&mut self, _handle: ShadowMapHandle) {}
    fn create_cubemap(&mut self) -> CubemapHandle {
        CubemapHandle(self.next())
    }
    fn free_cubemap(&mut self, _handle: CubemapHandle) {}
    fn build_lightmap_atlas(&mut self) -> LightmapAtlasHandle {
        LightmapAtlasHandle(self.next())
    }
    fn free_lightmap_atlas(&mut self, _handle: LightmapAtlasHandle) {}
}

impl VideoBackend for NullBackends {
    fn open(&mut self, _path: &str) -> VideoDecoderHandle {
        VideoDecoderHandle(self.next())
    }
    fn seek_to_start(&mut self, _handle: VideoDecoderHandle) {}
    fn close(&mut self, _handle: VideoDecoderHandle) {}
}

impl ParticleBackend for NullBackends {
    fn load_template(&mut self, _par_path: &str) -> ParticleSystemHandle {
        ParticleSystemHandle(self.next())
    }
    fn free(&mut self, _handle: ParticleSystemHandle) {}
}

impl NetworkIo for NullBackends {
    fn download(&mut self, _url: &str) -> Result<(), String> {
        Ok(())
    }
    fn ping(&mut self, _host: &str) -> Result<u32, String> {
        Ok(0)
    }
}

/// Bundles the backend trait objects the engine needs. Constructed once at
/// startup; `main.rs` wires a [`NullBackends`] instance into every slot when
/// no real renderer/physics/sound/video backend is available.
pub struct Backends {
    pub physics: Box<dyn PhysicsBackend>,
    pub sound: Box<dyn SoundBackend>,
    pub render: Box<dyn RenderBackend>,
    pub video: Box<dyn VideoBackend>,
    pub particles: Box<dyn ParticleBackend>,
    pub network: Box<dyn NetworkIo>,
}

impl Backends {
    pub fn null() -> Backends {
        Backends {
            physics: Box::new(NullBackends::new()),
            sound: Box::new(NullBackends::new()),
            render: Box::new(NullBackends::new()),
            video: Box::new(NullBackends::new()),
            particles: Box::new(NullBackends::new()),
            network: Box::new(NullBackends::new()),
        }
    }
}
