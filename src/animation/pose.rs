// Bone pose evaluation
// Local frame transforms are composed through the hierarchy into model space,
// then multiplied by each bone's inverse bind matrix for the skinning shader.

use super::interpolation::blend_transform;
use super::types::{AnimationClip, Transform};
use crate::model::Skeleton;
use nalgebra_glm as glm;

/// Per-instance bone matrix buffer
#[derive(Debug, Clone)]
pub struct BonePose {
    locals: Vec<Transform>,
    model_space: Vec<glm::Mat4>,
    ready: Vec<bool>,
    matrices: Vec<glm::Mat4>,
}

impl BonePose {
    /// Pose buffer sized for `skeleton`, initialised to the bind pose
    pub fn new(skeleton: &Skeleton) -> Self {
        let n = skeleton.len();
        let mut pose = Self {
            locals: skeleton.bind_pose(),
            model_space: vec![glm::identity(); n],
            ready: vec![false; n],
            matrices: vec![glm::identity(); n],
        };
        pose.solve(skeleton);
        pose
    }

    /// Pose for exactly one clip frame
    pub fn update_discrete(&mut self, skeleton: &Skeleton, clip: &AnimationClip, frame: usize) {
        let bones = clip.frame(frame);
        for (local, bone) in self.locals.iter_mut().zip(bones) {
            *local = *bone;
        }
        self.solve(skeleton);
    }

    /// Pose blended between two clip frames with `t` in [0, 1]
    pub fn update_interpolated(
        &mut self,
        skeleton: &Skeleton,
        clip: &AnimationClip,
        frame_a: usize,
        frame_b: usize,
        t: f32,
    ) {
        let t = t.clamp(0.0, 1.0);
        let a = clip.frame(frame_a);
        let b = clip.frame(frame_b);
        for ((local, ta), tb) in self.locals.iter_mut().zip(a).zip(b) {
            *local = blend_transform(ta, tb, t);
        }
        self.solve(skeleton);
    }

    /// Skinning matrices (model-space pose times inverse bind), one per bone
    pub fn matrices(&self) -> &[glm::Mat4] {
        &self.matrices
    }

    /// Model-space bone transforms
    #[cfg(test)]
    pub fn model_space(&self) -> &[glm::Mat4] {
        &self.model_space
    }

    fn solve(&mut self, skeleton: &Skeleton) {
        self.ready.iter_mut().for_each(|r| *r = false);
        for i in 0..self.model_space.len() {
            calc_bone(i, skeleton, &self.locals, &mut self.model_space, &mut self.ready);
        }
        for (i, bone) in skeleton.bones.iter().enumerate().take(self.matrices.len()) {
            self.matrices[i] = self.model_space[i] * bone.inverse_bind;
        }
    }
}

/// Recursively resolve the model-space transform of a bone, parents first
fn calc_bone(
    bone_idx: usize,
    skeleton: &Skeleton,
    locals: &[Transform],
    model_space: &mut [glm::Mat4],
    ready: &mut [bool],
) {
    if ready[bone_idx] {
        return;
    }
    // Mark before recursing so a malformed cycle terminates
    ready[bone_idx] = true;

    let bone = &skeleton.bones[bone_idx];
    let local = bone.offset * locals[bone_idx].to_matrix();

    model_space[bone_idx] = match bone.parent {
        Some(parent) if parent < model_space.len() => {
            calc_bone(parent, skeleton, locals, model_space, ready);
            model_space[parent] * local
        }
        _ => local,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bone;

    fn translated(x: f32, y: f32, z: f32) -> Transform {
        Transform::new(glm::vec3(x, y, z), glm::quat_identity(), glm::vec3(1.0, 1.0, 1.0))
    }

    fn origin(m: &glm::Mat4) -> glm::Vec3 {
        glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)])
    }

    /// Child listed before its parent to exercise the recursive resolve
    fn two_bone_skeleton() -> Skeleton {
        let mut child = Bone::new("forearm", Some(1));
        child.bind = translated(0.0, 1.0, 0.0);
        child.inverse_bind = glm::translation(&glm::vec3(0.0, -2.0, 0.0));
        let mut root = Bone::new("upper", None);
        root.bind = translated(0.0, 1.0, 0.0);
        root.inverse_bind = glm::translation(&glm::vec3(0.0, -1.0, 0.0));
        Skeleton::new(vec![child, root])
    }

    fn clip() -> AnimationClip {
        AnimationClip::new(
            "reach",
            vec![
                vec![translated(0.0, 1.0, 0.0), translated(0.0, 1.0, 0.0)],
                vec![translated(0.0, 1.0, 0.0), translated(4.0, 1.0, 0.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn bind_pose_yields_identity_skinning_matrices() {
        let skeleton = two_bone_skeleton();
        let pose = BonePose::new(&skeleton);
        for m in pose.matrices() {
            assert!(glm::abs(&(m - glm::Mat4::identity())).max() < 1e-5);
        }
    }

    #[test]
    fn child_inherits_parent_translation() {
        let skeleton = two_bone_skeleton();
        let mut pose = BonePose::new(&skeleton);
        pose.update_discrete(&skeleton, &clip(), 1);
        let child = origin(&pose.model_space()[0]);
        assert!((child - glm::vec3(4.0, 2.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn interpolation_endpoints_match_discrete_frames() {
        let skeleton = two_bone_skeleton();
        let clip = clip();
        let mut discrete = BonePose::new(&skeleton);
        let mut blended = BonePose::new(&skeleton);

        for (t, frame) in [(0.0, 0), (1.0, 1)] {
            discrete.update_discrete(&skeleton, &clip, frame);
            blended.update_interpolated(&skeleton, &clip, 0, 1, t);
            for (a, b) in discrete.matrices().iter().zip(blended.matrices()) {
                assert!(glm::abs(&(a - b)).max() < 1e-5);
            }
        }

        blended.update_interpolated(&skeleton, &clip, 0, 1, 0.5);
        let root = origin(&blended.model_space()[1]);
        assert!((root - glm::vec3(2.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn root_offset_is_applied_before_local_transform() {
        let mut root = Bone::new("hips", None);
        root.offset = glm::translation(&glm::vec3(0.0, 0.0, 5.0));
        let skeleton = Skeleton::new(vec![root]);
        let pose = BonePose::new(&skeleton);
        assert!((origin(&pose.model_space()[0]) - glm::vec3(0.0, 0.0, 5.0)).norm() < 1e-5);
    }
}
