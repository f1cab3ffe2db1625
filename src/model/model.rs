use crate::model::material::Material;
use crate::model::mesh::Mesh;
use crate::model::skeleton::Skeleton;

/// Rigged model: meshes, materials and the skeleton they are skinned to
#[derive(Debug, Clone, Default)]
pub struct SkinnedModel {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub skeleton: Skeleton,
}

impl SkinnedModel {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }
}
