use crate::animation::Transform;
use nalgebra_glm as glm;

/// Bone matrices the skinning shader can address per instance
pub const MAX_BONES: usize = 128;

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>, // None for root bones
    /// Static transform of non-joint nodes between the parent bone (or scene root) and this bone
    pub offset: glm::Mat4,
    pub bind: Transform,
    pub inverse_bind: glm::Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            offset: glm::identity(),
            bind: Transform::default(),
            inverse_bind: glm::identity(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Local bind transforms, used as the base every clip frame starts from
    pub fn bind_pose(&self) -> Vec<Transform> {
        self.bones.iter().map(|b| b.bind).collect()
    }
}
