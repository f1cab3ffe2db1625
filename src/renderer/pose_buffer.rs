// Per-instance uniform: model matrix, tint and the bone matrix palette

use crate::animation::BonePose;
use crate::model::MAX_BONES;
use nalgebra_glm as glm;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub bones: [[[f32; 4]; 4]; MAX_BONES],
}

impl InstanceUniform {
    pub fn new(position: &glm::Vec3, tint: [f32; 4], pose: &BonePose) -> Self {
        let identity: [[f32; 4]; 4] = glm::Mat4::identity().into();
        let mut bones = [identity; MAX_BONES];
        for (slot, m) in bones.iter_mut().zip(pose.matrices()) {
            *slot = (*m).into();
        }
        Self {
            model: glm::translation(position).into(),
            tint,
            bones,
        }
    }
}

/// GPU buffer holding one instance's pose
pub struct GpuPose {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuPose {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Pose Buffer")),
            size: size_of::<InstanceUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Pose Bind Group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &InstanceUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bone, Skeleton};

    #[test]
    fn uniform_layout_matches_shader() {
        assert_eq!(size_of::<InstanceUniform>(), 64 + 16 + 64 * MAX_BONES);
    }

    #[test]
    fn unused_bone_slots_stay_identity() {
        let skeleton = Skeleton::new(vec![Bone::new("root", None)]);
        let pose = BonePose::new(&skeleton);
        let uniform = InstanceUniform::new(&glm::vec3(0.0, 0.0, 2.0), [1.0; 4], &pose);
        // Column-major: translation lives in the last column
        assert_eq!(uniform.model[3], [0.0, 0.0, 2.0, 1.0]);
        assert_eq!(uniform.bones[MAX_BONES - 1][0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(uniform.bones[0][3], [0.0, 0.0, 0.0, 1.0]);
    }
}
