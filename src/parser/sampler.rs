// Keyframe channel sampling and clip baking

use crate::animation::{AnimationClip, Transform, lerp_f32, quat_slerp};
use crate::error::SkinError;
use nalgebra_glm as glm;

/// Milliseconds between baked clip frames
pub const FRAME_DELAY_MS: f32 = 17.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    CubicSpline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTarget {
    Translation,
    Rotation,
    Scale,
}

/// One animated property of one bone
#[derive(Debug, Clone)]
pub struct Channel {
    pub bone: usize,
    pub target: ChannelTarget,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    /// One value per key; cubic-spline channels store in-tangent, value, out-tangent per key
    pub values: Vec<[f32; 4]>,
}

impl Channel {
    fn key_value(&self, key: usize) -> [f32; 4] {
        match self.interpolation {
            Interpolation::CubicSpline => self.values[key * 3 + 1],
            _ => self.values[key],
        }
    }

    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    fn is_valid(&self) -> bool {
        let per_key = if self.interpolation == Interpolation::CubicSpline { 3 } else { 1 };
        !self.times.is_empty() && self.values.len() >= self.times.len() * per_key
    }

    /// Sample the channel at `time` seconds, clamping outside the key range
    pub fn sample(&self, time: f32) -> Option<[f32; 4]> {
        if !self.is_valid() {
            return None;
        }

        // Find surrounding keyframes
        let after_idx = self.times.iter().position(|&t| t >= time);
        let after_idx = match after_idx {
            // Before (or at) the first key
            Some(0) => return Some(self.key_value(0)),
            Some(idx) => idx,
            // After the last key
            None => return Some(self.key_value(self.times.len() - 1)),
        };
        // Exact key hit
        if self.times[after_idx] == time {
            return Some(self.key_value(after_idx));
        }
        let before_idx = after_idx - 1;

        let t0 = self.times[before_idx];
        let t1 = self.times[after_idx];
        let dt = t1 - t0;
        if dt <= f32::EPSILON {
            return Some(self.key_value(after_idx));
        }
        let t = ((time - t0) / dt).clamp(0.0, 1.0);

        let before = self.key_value(before_idx);
        let after = self.key_value(after_idx);

        let value = match self.interpolation {
            Interpolation::Step => before,
            Interpolation::Linear => match self.target {
                ChannelTarget::Rotation => {
                    let q1 = glm::quat(before[0], before[1], before[2], before[3]);
                    let q2 = glm::quat(after[0], after[1], after[2], after[3]);
                    let q = quat_slerp(&q1, &q2, t);
                    [q.i, q.j, q.k, q.w]
                }
                _ => std::array::from_fn(|i| lerp_f32(before[i], after[i], t)),
            },
            Interpolation::CubicSpline => {
                let t2 = t * t;
                let t3 = t2 * t;
                let h1 = 2.0 * t3 - 3.0 * t2 + 1.0;
                let h2 = -2.0 * t3 + 3.0 * t2;
                let h3 = t3 - 2.0 * t2 + t;
                let h4 = t3 - t2;

                let out_tan = self.values[before_idx * 3 + 2];
                let in_tan = self.values[after_idx * 3];
                let mut v: [f32; 4] = std::array::from_fn(|i| {
                    h1 * before[i] + h2 * after[i] + dt * (h3 * out_tan[i] + h4 * in_tan[i])
                });
                if self.target == ChannelTarget::Rotation {
                    let q = glm::quat_normalize(&glm::quat(v[0], v[1], v[2], v[3]));
                    v = [q.i, q.j, q.k, q.w];
                }
                v
            }
        };
        Some(value)
    }

    /// Write the sampled value into the targeted component of a bone transform
    pub fn apply(&self, time: f32, transform: &mut Transform) {
        let Some(v) = self.sample(time) else {
            return;
        };
        match self.target {
            ChannelTarget::Translation => transform.translation = glm::vec3(v[0], v[1], v[2]),
            ChannelTarget::Rotation => transform.rotation = glm::quat(v[0], v[1], v[2], v[3]),
            ChannelTarget::Scale => transform.scale = glm::vec3(v[0], v[1], v[2]),
        }
    }
}

/// Number of baked frames for a clip lasting `duration` seconds
pub fn frame_count_for_duration(duration: f32) -> usize {
    (duration.max(0.0) * 1000.0 / FRAME_DELAY_MS) as usize + 1
}

/// Sample every channel on the fixed frame grid, starting each frame from the bind pose
pub fn bake_clip(
    name: impl Into<String>,
    channels: &[Channel],
    bind_pose: &[Transform],
) -> Result<AnimationClip, SkinError> {
    let duration = channels.iter().map(Channel::duration).fold(0.0_f32, f32::max);
    let frame_count = frame_count_for_duration(duration);

    let frames = (0..frame_count)
        .map(|frame| {
            let time = frame as f32 * FRAME_DELAY_MS / 1000.0;
            let mut locals = bind_pose.to_vec();
            for channel in channels {
                if let Some(local) = locals.get_mut(channel.bone) {
                    channel.apply(time, local);
                }
            }
            locals
        })
        .collect();

    AnimationClip::new(name, frames)
}
