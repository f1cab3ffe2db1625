// Skinning shader sources: loaded from the shader directory, with built-in copies as fallback

use log::{info, warn};
use std::path::{Path, PathBuf};

/// Shading-language tag used as the shader subdirectory name
pub const SHADER_DIALECT: &str = "wgsl";

const BUILTIN_VERTEX: &str = include_str!("../../resources/shaders/wgsl/skinning.vs.wgsl");
const BUILTIN_FRAGMENT: &str = include_str!("../../resources/shaders/wgsl/skinning.fs.wgsl");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderOrigin {
    File(PathBuf),
    Builtin,
}

#[derive(Debug, Clone)]
pub struct ShaderStage {
    pub source: String,
    pub origin: ShaderOrigin,
}

#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: ShaderStage,
    pub fragment: ShaderStage,
}

impl ShaderSources {
    /// Vertex and fragment file paths under `dir`
    pub fn paths(dir: impl AsRef<Path>) -> (PathBuf, PathBuf) {
        let base = dir.as_ref().join(SHADER_DIALECT);
        (base.join("skinning.vs.wgsl"), base.join("skinning.fs.wgsl"))
    }

    pub fn load(dir: impl AsRef<Path>) -> Self {
        let (vs_path, fs_path) = Self::paths(dir);
        Self {
            vertex: load_stage(vs_path, BUILTIN_VERTEX),
            fragment: load_stage(fs_path, BUILTIN_FRAGMENT),
        }
    }
}

fn load_stage(path: PathBuf, builtin: &str) -> ShaderStage {
    match std::fs::read_to_string(&path) {
        Ok(source) => {
            info!("Loaded shader {}", path.display());
            ShaderStage {
                source,
                origin: ShaderOrigin::File(path),
            }
        }
        Err(e) => {
            warn!("Cannot read shader {} ({}), using built-in copy", path.display(), e);
            ShaderStage {
                source: builtin.to_string(),
                origin: ShaderOrigin::Builtin,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_include_dialect_directory() {
        let (vs, fs) = ShaderSources::paths("resources/shaders");
        assert_eq!(vs, Path::new("resources/shaders/wgsl/skinning.vs.wgsl"));
        assert_eq!(fs, Path::new("resources/shaders/wgsl/skinning.fs.wgsl"));
    }

    #[test]
    fn missing_directory_falls_back_to_builtin() {
        let sources = ShaderSources::load("no/such/shader/dir");
        assert_eq!(sources.vertex.origin, ShaderOrigin::Builtin);
        assert_eq!(sources.fragment.origin, ShaderOrigin::Builtin);
        assert!(sources.vertex.source.contains("fn vs_main"));
        assert!(sources.fragment.source.contains("fn fs_main"));
    }

    #[test]
    fn shipped_directory_is_read_from_disk() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/shaders");
        let sources = ShaderSources::load(&dir);
        assert!(matches!(sources.vertex.origin, ShaderOrigin::File(_)));
        assert_eq!(sources.vertex.source, BUILTIN_VERTEX);
    }
}
