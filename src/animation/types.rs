// Animation data types

use crate::error::SkinError;
use nalgebra_glm as glm;

/// Local bone transform: translation, rotation and scale relative to the parent bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn new(translation: glm::Vec3, rotation: glm::Quat, scale: glm::Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Build from glTF-style arrays (rotation is x, y, z, w)
    pub fn from_arrays(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self::new(
            glm::make_vec3(&translation),
            glm::quat(rotation[0], rotation[1], rotation[2], rotation[3]),
            glm::make_vec3(&scale),
        )
    }

    /// T * R * S
    pub fn to_matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&glm::quat_normalize(&self.rotation))
            * glm::scaling(&self.scale)
    }
}

/// Baked animation clip: one local transform per bone for every frame
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    frames: Vec<Vec<Transform>>,
}

impl AnimationClip {
    /// Every clip has at least one frame and every frame covers the same bones.
    pub fn new(name: impl Into<String>, frames: Vec<Vec<Transform>>) -> Result<Self, SkinError> {
        let name = name.into();
        let Some(first) = frames.first() else {
            return Err(SkinError::new("empty-clip").with_arg("clip", name));
        };
        let bone_count = first.len();
        if let Some(bad) = frames.iter().position(|f| f.len() != bone_count) {
            return Err(SkinError::new("ragged-clip")
                .with_arg("clip", name)
                .with_arg("frame", bad)
                .with_arg("expected", bone_count));
        }
        Ok(Self { name, frames })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn bone_count(&self) -> usize {
        self.frames[0].len()
    }

    /// Frame bone transforms; out-of-range indices clamp to the last frame
    pub fn frame(&self, index: usize) -> &[Transform] {
        &self.frames[index.min(self.frames.len() - 1)]
    }

    pub fn midpoint_frame(&self) -> usize {
        self.frames.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clip_is_rejected() {
        let err = AnimationClip::new("idle", Vec::new()).unwrap_err();
        assert_eq!(err.key, "empty-clip");
    }

    #[test]
    fn ragged_frames_are_rejected() {
        let frames = vec![vec![Transform::default(); 2], vec![Transform::default(); 3]];
        let err = AnimationClip::new("walk", frames).unwrap_err();
        assert_eq!(err.key, "ragged-clip");
    }

    #[test]
    fn midpoint_and_clamped_frame_access() {
        let frames = (0..7)
            .map(|i| {
                vec![Transform::new(
                    glm::vec3(i as f32, 0.0, 0.0),
                    glm::quat_identity(),
                    glm::vec3(1.0, 1.0, 1.0),
                )]
            })
            .collect();
        let clip = AnimationClip::new("run", frames).unwrap();
        assert_eq!(clip.frame_count(), 7);
        assert_eq!(clip.midpoint_frame(), 3);
        assert_eq!(clip.frame(99)[0].translation.x, 6.0);
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::from_arrays(
            [1.0, 2.0, 3.0],
            [0.0, 0.0, std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2],
            [2.0, 2.0, 2.0],
        );
        let p = t.to_matrix() * glm::vec4(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 4.0).abs() < 1e-5);
        assert!((p.z - 3.0).abs() < 1e-5);
    }
}
