use serde::{Deserialize, Serialize};

pub const CONFY_APP_NAME: &str = "gpu-skinning";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub target_fps: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            title: "gpu-skinning - GPU skinning".to_string(),
            target_fps: 60,
        }
    }
}

impl WindowSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "window").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSettings {
    pub model_path: String,
    pub shader_dir: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            model_path: "resources/models/gltf/greenman.glb".to_string(),
            shader_dir: "resources/shaders".to_string(),
        }
    }
}

impl AssetSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "assets").unwrap_or_default()
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub window: WindowSettings,
    pub assets: AssetSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            window: WindowSettings::load(),
            assets: AssetSettings::load(),
        }
    }

    /// Command line overrides: the first positional argument replaces the model path.
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(path) = args.get(1) {
            self.assets.model_path = path.clone();
        }
        self
    }
}
