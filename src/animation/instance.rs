// Animated model instance: clip selection, frame/blend state and the owned pose

use super::interpolation::blend_factor;
use super::pose::BonePose;
use super::types::AnimationClip;
use crate::model::Skeleton;
use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackMode {
    /// Step one frame per tick and pose exactly that frame
    Discrete,
    /// Blend between frame 0 and the clip midpoint with a time-driven factor
    Interpolated { blend: f32 },
}

impl PlaybackMode {
    pub fn interpolated() -> Self {
        PlaybackMode::Interpolated { blend: 0.0 }
    }
}

pub fn wrap_next(index: usize, count: usize) -> usize {
    (index + 1) % count
}

pub fn wrap_previous(index: usize, count: usize) -> usize {
    (index + count - 1) % count
}

#[derive(Debug, Clone)]
pub struct AnimatedInstance {
    pub position: glm::Vec3,
    clip_index: usize,
    frame: usize,
    mode: PlaybackMode,
    pose: BonePose,
}

impl AnimatedInstance {
    pub fn new(skeleton: &Skeleton, clip_index: usize, position: glm::Vec3, mode: PlaybackMode) -> Self {
        Self {
            position,
            clip_index,
            frame: 0,
            mode,
            pose: BonePose::new(skeleton),
        }
    }

    pub fn clip_index(&self) -> usize {
        self.clip_index
    }

    pub fn pose(&self) -> &BonePose {
        &self.pose
    }

    /// Current blend parameter for interpolated playback
    pub fn blend(&self) -> Option<f32> {
        match self.mode {
            PlaybackMode::Interpolated { blend } => Some(blend),
            PlaybackMode::Discrete => None,
        }
    }

    pub fn next_clip(&mut self, clip_count: usize) {
        if clip_count > 0 {
            self.clip_index = wrap_next(self.clip_index, clip_count);
        }
    }

    pub fn previous_clip(&mut self, clip_count: usize) {
        if clip_count > 0 {
            self.clip_index = wrap_previous(self.clip_index, clip_count);
        }
    }

    /// Advance the frame counter modulo the active clip length.
    /// The counter is only bounded here, so a clip switch is picked up on the next call.
    pub fn advance_frame(&mut self, frame_count: usize) -> usize {
        if frame_count > 0 {
            self.frame = (self.frame + 1) % frame_count;
        }
        self.frame
    }

    /// One update tick: move the playback state forward and recompute the pose
    pub fn tick(&mut self, skeleton: &Skeleton, clips: &[AnimationClip], time_seconds: f64) {
        if clips.is_empty() {
            return;
        }
        let clip = &clips[self.clip_index % clips.len()];

        match self.mode {
            PlaybackMode::Discrete => {
                let frame = self.advance_frame(clip.frame_count());
                self.pose.update_discrete(skeleton, clip, frame);
            }
            PlaybackMode::Interpolated { .. } => {
                let blend = blend_factor(time_seconds);
                self.mode = PlaybackMode::Interpolated { blend };
                self.pose
                    .update_interpolated(skeleton, clip, 0, clip.midpoint_frame(), blend);
            }
        }
    }
}
