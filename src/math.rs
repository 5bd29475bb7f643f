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

use cgmath::{Deg, Vector3};
use chrono::Duration;

pub type Vec3 = Vector3<f32>;

#[inline]
pub fn duration_to_f32(d: Duration) -> f32 {
    d.num_microseconds().unwrap_or(i64::MAX) as f32 / 1_000_000.0
}

#[inline]
pub fn duration_from_f32(f: f32) -> Duration {
    Duration::microseconds((f as f64 * 1_000_000.0) as i64)
}

#[inline]
pub fn deg_vector_to_f32_vector(av: Vector3<Deg<f32>>) -> Vec3 {
    Vector3::new(av.x.0, av.y.0, av.z.0)
}

#[inline]
pub fn deg_vector_from_f32_vector(v: Vec3) -> Vector3<Deg<f32>> {
    Vector3::new(Deg(v.x), Deg(v.y), Deg(v.z))
}

/// Axis-aligned bounding box, used for brush/trigger containment tests (§4.6).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Aabb> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut min = first;
        let mut max = first;
        for p in it {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some(Aabb { min, max })
    }

    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Linear interpolation, used by fades, door motion and pendulum phase.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_roundtrip() {
        let f = 0.5_f32;
        let d = duration_from_f32(f);
        assert!((duration_to_f32(d) - f).abs() < 1e-4);
    }

    #[test]
    fn aabb_contains() {
        let b = Aabb {
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(1.0, 1.0, 1.0),
        };
        assert!(b.contains_point(Vector3::new(0.5, 0.5, 0.5)));
        assert!(!b.contains_point(Vector3::new(1.5, 0.5, 0.5)));
    }
}
