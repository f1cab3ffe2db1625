use crate::animation::{AnimationClip, Transform};
use crate::error::SkinError;
use crate::model::{Bone, Material, Mesh, Skeleton, SkinnedModel, SkinnedVertex, TextureImage, MAX_BONES};
use crate::parser::sampler::{Channel, ChannelTarget, Interpolation, bake_clip};
use gltf::animation::util::ReadOutputs;
use log::{debug, info, warn};
use nalgebra_glm as glm;
use std::collections::HashMap;
use std::path::Path;

/// Maps glTF node index to bone index in the first skin
type JointMap = HashMap<usize, usize>;

fn check_exists(path: &Path) -> Result<(), SkinError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SkinError::new("model-not-found").with_arg("path", path.display()))
    }
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Load meshes, materials and the skeleton of a rigged glTF model
pub fn load_model(path: impl AsRef<Path>) -> Result<SkinnedModel, SkinError> {
    let path = path.as_ref();
    check_exists(path)?;
    let (document, buffers, images) = gltf::import(path)
        .map_err(|e| SkinError::new("model-load").with_arg("path", path.display()).push_std(e))?;

    let model = build_model(model_name(path), &document, &buffers, &images)
        .map_err(|e| SkinError::new("model-load").with_arg("path", path.display()).push_skin(e))?;

    info!(
        "Loaded model {}: {} meshes, {} materials, {} bones, {} vertices, {} triangles",
        model.name,
        model.meshes.len(),
        model.materials.len(),
        model.skeleton.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    for (i, bone) in model.skeleton.bones.iter().enumerate() {
        debug!("Bone {} {:?} parent {:?}", i, bone.name, bone.parent);
    }
    Ok(model)
}

/// Load and bake every animation of a rigged glTF model
pub fn load_model_animations(path: impl AsRef<Path>) -> Result<Vec<AnimationClip>, SkinError> {
    let path = path.as_ref();
    check_exists(path)?;
    let (document, buffers, _) = gltf::import(path)
        .map_err(|e| SkinError::new("animation-load").with_arg("path", path.display()).push_std(e))?;

    let clips = build_animations(&document, &buffers).map_err(|e| {
        SkinError::new("animation-load")
            .with_arg("path", path.display())
            .push_skin(e)
    })?;
    for clip in &clips {
        debug!("Clip {}: {} frames", clip.name, clip.frame_count());
    }
    info!("Loaded {} animation clips from {}", clips.len(), path.display());
    Ok(clips)
}

pub(crate) fn build_model(
    name: String,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<SkinnedModel, SkinError> {
    let (skeleton, _) = read_skeleton(document, buffers)?;

    let mut materials: Vec<Material> = document
        .materials()
        .map(|material| read_material(&material, images))
        .collect();
    let mut default_material = None;

    let mut meshes = Vec::new();
    for (node, world) in scene_nodes(document) {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let skinned = node.skin().is_some();
        for (p, primitive) in mesh.primitives().enumerate() {
            let material = match primitive.material().index() {
                Some(index) => index,
                None => *default_material.get_or_insert_with(|| {
                    materials.push(Material::default());
                    materials.len() - 1
                }),
            };
            let name = format!("{}#{}", mesh.name().unwrap_or("mesh"), p);
            let transform = if skinned { None } else { Some(world) };
            if let Some(mesh) = read_primitive(name, &primitive, buffers, transform, material, skeleton.len()) {
                meshes.push(mesh);
            }
        }
    }

    Ok(SkinnedModel {
        name,
        meshes,
        materials,
        skeleton,
    })
}

pub(crate) fn build_animations(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<AnimationClip>, SkinError> {
    let (skeleton, joints) = read_skeleton(document, buffers)?;
    let bind_pose = skeleton.bind_pose();

    let mut clips = Vec::new();
    for (index, animation) in document.animations().enumerate() {
        let mut channels = Vec::new();
        for channel in animation.channels() {
            let node = channel.target().node().index();
            let Some(&bone) = joints.get(&node) else {
                continue;
            };
            if let Some(channel) = read_channel(&channel, buffers, bone) {
                channels.push(channel);
            }
        }
        let name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation {index}"));
        clips.push(bake_clip(name, &channels, &bind_pose)?);
    }

    if clips.is_empty() {
        return Err(SkinError::new("no-animations"));
    }
    Ok(clips)
}

/// Nodes of the default scene (or the first one) with their world matrices
fn scene_nodes(document: &gltf::Document) -> Vec<(gltf::Node<'_>, glm::Mat4)> {
    fn visit<'a>(node: gltf::Node<'a>, parent: &glm::Mat4, out: &mut Vec<(gltf::Node<'a>, glm::Mat4)>) {
        let world = parent * glm::Mat4::from(node.transform().matrix());
        for child in node.children() {
            visit(child, &world, out);
        }
        out.push((node, world));
    }

    let mut out = Vec::new();
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            visit(node, &glm::identity(), &mut out);
        }
    }
    out
}

fn read_skeleton(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<(Skeleton, JointMap), SkinError> {
    let Some(skin) = document.skins().next() else {
        return Err(SkinError::new("no-skin"));
    };
    let skin_count = document.skins().count();
    if skin_count > 1 {
        warn!("Model has {} skins, only the first is used", skin_count);
    }

    let joint_nodes: Vec<gltf::Node> = skin.joints().collect();
    if joint_nodes.len() > MAX_BONES {
        return Err(SkinError::new("too-many-bones")
            .with_arg("bones", joint_nodes.len())
            .with_arg("max", MAX_BONES));
    }

    let joints: JointMap = joint_nodes
        .iter()
        .enumerate()
        .map(|(bone, node)| (node.index(), bone))
        .collect();

    let mut bones: Vec<Bone> = joint_nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let name = node.name().map(str::to_string).unwrap_or_else(|| format!("bone {i}"));
            let mut bone = Bone::new(name, None);
            let (t, r, s) = node.transform().decomposed();
            bone.bind = Transform::from_arrays(t, r, s);
            bone
        })
        .collect();

    let reader = skin.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
    if let Some(matrices) = reader.read_inverse_bind_matrices() {
        for (bone, m) in bones.iter_mut().zip(matrices) {
            bone.inverse_bind = glm::Mat4::from(m);
        }
    }

    // Resolve parents and the static offsets of non-joint nodes in between
    fn link(
        node: gltf::Node,
        parent: Option<usize>,
        offset: glm::Mat4,
        joints: &JointMap,
        bones: &mut [Bone],
    ) {
        let (parent, offset) = match joints.get(&node.index()) {
            Some(&bone) => {
                bones[bone].parent = parent;
                bones[bone].offset = offset;
                (Some(bone), glm::identity())
            }
            None => (parent, offset * glm::Mat4::from(node.transform().matrix())),
        };
        for child in node.children() {
            link(child, parent, offset, joints, bones);
        }
    }

    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            link(node, None, glm::identity(), &joints, &mut bones);
        }
    }

    Ok((Skeleton::new(bones), joints))
}

fn read_material(material: &gltf::Material, images: &[gltf::image::Data]) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let texture = pbr.base_color_texture().and_then(|info| {
        let source = info.texture().source().index();
        images.get(source).and_then(decode_image)
    });
    Material {
        name: material
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("material {}", material.index().unwrap_or(0))),
        base_color: pbr.base_color_factor(),
        texture,
    }
}

fn decode_image(data: &gltf::image::Data) -> Option<TextureImage> {
    use gltf::image::Format;
    let (w, h) = (data.width, data.height);
    let pixels = data.pixels.clone();
    let image = match data.format {
        Format::R8 => image::GrayImage::from_raw(w, h, pixels).map(image::DynamicImage::ImageLuma8),
        Format::R8G8 => image::GrayAlphaImage::from_raw(w, h, pixels).map(image::DynamicImage::ImageLumaA8),
        Format::R8G8B8 => image::RgbImage::from_raw(w, h, pixels).map(image::DynamicImage::ImageRgb8),
        Format::R8G8B8A8 => image::RgbaImage::from_raw(w, h, pixels).map(image::DynamicImage::ImageRgba8),
        other => {
            warn!("Unsupported texture format {:?}, using base colour only", other);
            return None;
        }
    };
    let Some(image) = image else {
        warn!("Texture data does not match its {}x{} size", w, h);
        return None;
    };
    let rgba = image.to_rgba8();
    Some(TextureImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

fn read_primitive(
    name: String,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    world: Option<glm::Mat4>,
    material: usize,
    bone_count: usize,
) -> Option<Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        warn!("Skipping {}: {:?} primitives are not supported", name, primitive.mode());
        return None;
    }
    let reader = primitive.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
    let Some(positions) = reader.read_positions() else {
        warn!("Skipping {}: no positions", name);
        return None;
    };

    let mut vertices: Vec<SkinnedVertex> = positions
        .map(|position| SkinnedVertex {
            position,
            normal: [0.0, 1.0, 0.0],
            ..Default::default()
        })
        .collect();

    if let Some(normals) = reader.read_normals() {
        for (v, n) in vertices.iter_mut().zip(normals) {
            v.normal = n;
        }
    }
    if let Some(uvs) = reader.read_tex_coords(0) {
        for (v, uv) in vertices.iter_mut().zip(uvs.into_f32()) {
            v.uv = uv;
        }
    }

    let mut skinned = false;
    let influences = match world {
        None => reader.read_joints(0).zip(reader.read_weights(0)),
        Some(_) => None,
    };
    if let Some((joints, weights)) = influences {
        skinned = true;
        for ((v, j), w) in vertices.iter_mut().zip(joints.into_u16()).zip(weights.into_f32()) {
            for k in 0..4 {
                // Joints outside the skeleton contribute nothing
                if (j[k] as usize) < bone_count {
                    v.joints[k] = j[k] as u32;
                    v.weights[k] = w[k];
                }
            }
        }
    }

    if let Some(world) = world {
        let normal_matrix = glm::mat4_to_mat3(&world)
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(glm::Mat3::identity);
        for v in &mut vertices {
            let p = world * glm::vec4(v.position[0], v.position[1], v.position[2], 1.0);
            v.position = [p.x, p.y, p.z];
            let n = glm::normalize(&(normal_matrix * glm::make_vec3(&v.normal)));
            v.normal = [n.x, n.y, n.z];
        }
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    Some(Mesh {
        name,
        vertices,
        indices,
        material,
        skinned,
    })
}

fn read_channel(channel: &gltf::animation::Channel, buffers: &[gltf::buffer::Data], bone: usize) -> Option<Channel> {
    let reader = channel.reader(|buffer| Some(buffers[buffer.index()].0.as_slice()));
    let times: Vec<f32> = reader.read_inputs()?.collect();

    let interpolation = match channel.sampler().interpolation() {
        gltf::animation::Interpolation::Step => Interpolation::Step,
        gltf::animation::Interpolation::Linear => Interpolation::Linear,
        gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
    };

    let (target, values): (ChannelTarget, Vec<[f32; 4]>) = match reader.read_outputs()? {
        ReadOutputs::Translations(iter) => (
            ChannelTarget::Translation,
            iter.map(|t| [t[0], t[1], t[2], 0.0]).collect(),
        ),
        ReadOutputs::Rotations(iter) => (ChannelTarget::Rotation, iter.into_f32().collect()),
        ReadOutputs::Scales(iter) => (ChannelTarget::Scale, iter.map(|s| [s[0], s[1], s[2], 0.0]).collect()),
        ReadOutputs::MorphTargetWeights(_) => return None,
    };

    Some(Channel {
        bone,
        target,
        interpolation,
        times,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkinCause;

    fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        let total = 12 + 8 + json.len() + 8 + bin.len();

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    fn floats(out: &mut Vec<u8>, values: &[f32]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn positions() -> Vec<u8> {
        let mut bin = Vec::new();
        floats(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
        bin
    }

    const RIGGED_JSON: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0, 1]}],
        "nodes": [
            {"mesh": 0, "skin": 0},
            {"name": "hip", "translation": [0, 1, 0], "children": [2]},
            {"name": "spine", "translation": [0, 1, 0]}
        ],
        "meshes": [{"name": "body", "primitives": [{"attributes": {"POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2}}]}],
        "skins": [{"joints": [1, 2], "inverseBindMatrices": 3}],
        "animations": [{
            "name": "raise",
            "channels": [{"sampler": 0, "target": {"node": 2, "path": "translation"}}],
            "samplers": [{"input": 4, "output": 5, "interpolation": "LINEAR"}]
        }],
        "buffers": [{"byteLength": 256}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36},
            {"buffer": 0, "byteOffset": 36, "byteLength": 12},
            {"buffer": 0, "byteOffset": 48, "byteLength": 48},
            {"buffer": 0, "byteOffset": 96, "byteLength": 128},
            {"buffer": 0, "byteOffset": 224, "byteLength": 8},
            {"buffer": 0, "byteOffset": 232, "byteLength": 24}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 2, 0]},
            {"bufferView": 1, "componentType": 5121, "count": 3, "type": "VEC4"},
            {"bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC4"},
            {"bufferView": 3, "componentType": 5126, "count": 2, "type": "MAT4"},
            {"bufferView": 4, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0], "max": [1]},
            {"bufferView": 5, "componentType": 5126, "count": 2, "type": "VEC3"}
        ]
    }"#;

    fn rigged_glb() -> Vec<u8> {
        let mut bin = positions();
        bin.extend_from_slice(&[0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0]);
        for _ in 0..3 {
            floats(&mut bin, &[1.0, 0.0, 0.0, 0.0]);
        }
        for y in [-1.0, -2.0] {
            floats(
                &mut bin,
                &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, y, 0.0, 1.0],
            );
        }
        floats(&mut bin, &[0.0, 1.0]);
        floats(&mut bin, &[0.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(bin.len(), 256);
        glb(RIGGED_JSON, &bin)
    }

    #[test]
    fn rigged_model_builds_skeleton_and_meshes() {
        let (document, buffers, images) = gltf::import_slice(rigged_glb()).unwrap();
        let model = build_model("rig".to_string(), &document, &buffers, &images).unwrap();

        assert_eq!(model.skeleton.len(), 2);
        assert_eq!(model.skeleton.bones[1].name, "spine");
        assert_eq!(model.skeleton.bones[1].parent, Some(0));
        assert_eq!(model.skeleton.bones[0].parent, None);

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert!(mesh.skinned);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].joints, [1, 0, 0, 0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
        // No glTF material, so a default one is appended
        assert_eq!(model.materials.len(), 1);
        assert_eq!(mesh.material, 0);

        let pose = crate::animation::BonePose::new(&model.skeleton);
        for m in pose.matrices() {
            assert!(glm::abs(&(m - glm::Mat4::identity())).max() < 1e-5);
        }
    }

    #[test]
    fn animations_are_baked_per_skin_joint() {
        let (document, buffers, _) = gltf::import_slice(rigged_glb()).unwrap();
        let clips = build_animations(&document, &buffers).unwrap();
        assert_eq!(clips.len(), 1);
        let clip = &clips[0];
        assert_eq!(clip.name, "raise");
        assert_eq!(clip.frame_count(), 59);
        assert_eq!(clip.bone_count(), 2);
        // Untouched hip keeps its bind translation
        assert_eq!(clip.frame(30)[0].translation.y, 1.0);
        assert!(clip.frame(58)[1].translation.x > 0.9);
    }

    fn flat_glb() -> Vec<u8> {
        let json = r#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"mesh": 0}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "buffers": [{"byteLength": 36}],
            "bufferViews": [{"buffer": 0, "byteOffset": 0, "byteLength": 36}],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 2, 0]}
            ]
        }"#;
        glb(json, &positions())
    }

    #[test]
    fn model_without_skin_is_rejected() {
        let (document, buffers, images) = gltf::import_slice(flat_glb()).unwrap();
        let err = build_model("flat".to_string(), &document, &buffers, &images).unwrap_err();
        assert_eq!(err.key, "no-skin");
        let err = build_animations(&document, &buffers).unwrap_err();
        assert_eq!(err.key, "no-skin");
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = load_model("does/not/exist.glb").unwrap_err();
        assert_eq!(err.key, "model-not-found");
        assert_eq!(err.args.get("path").map(String::as_str), Some("does/not/exist.glb"));
    }

    #[test]
    fn file_load_failure_keeps_validation_cause() {
        let path = std::env::temp_dir().join(format!("gpu-skinning-flat-{}.glb", std::process::id()));
        std::fs::write(&path, flat_glb()).unwrap();

        let err = load_model(&path).unwrap_err();
        assert_eq!(err.key, "model-load");
        assert!(matches!(&err.causes[..], [SkinCause::Skin(inner)] if inner.key == "no-skin"));

        let err = load_model_animations(&path).unwrap_err();
        assert_eq!(err.key, "animation-load");
        assert!(err.to_string().contains(": no-skin()"));

        std::fs::remove_file(&path).unwrap();
    }
}
