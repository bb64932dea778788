//! Engine configuration loaded from TOML.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs to
//! list the values it wants to change:
//!
//! ```toml
//! log_filter = "warn,vkframe=info"
//!
//! [window]
//! width = 1280
//! height = 720
//!
//! [renderer]
//! present_mode = "fifo"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::DEFAULT_FILTER;

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "vkframe".to_string(),
        }
    }
}

/// Paths to the compiled SPIR-V shader stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/simple_shader.vert.spv"),
            fragment: PathBuf::from("shaders/simple_shader.frag.spv"),
        }
    }
}

/// Presentation mode the swap chain should try first.
///
/// FIFO is always available and is used whenever the preference is not.
/// Where [`EngineConfig::load_or_default`] got its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// The file did not exist.
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentModePreference {
    Fifo,
    #[default]
    Mailbox,
    Immediate,
}

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub present_mode: PresentModePreference,
    /// `None` enables validation layers in debug builds only.
    pub validation: Option<bool>,
    pub clear_color: [f32; 4],
}

impl RendererConfig {
    /// Whether the Vulkan validation layers should be requested.
    pub fn validation_enabled(&self) -> bool {
        self.validation.unwrap_or(cfg!(debug_assertions))
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            present_mode: PresentModePreference::default(),
            validation: None,
            clear_color: [0.01, 0.01, 0.01, 1.0],
        }
    }
}

/// Camera projection and movement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub move_speed: f32,
    pub look_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 100.0,
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

/// Contents of the demo scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub sierpinski_depth: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sierpinski_depth: 5,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub log_filter: String,
    pub window: WindowConfig,
    pub shaders: ShaderConfig,
    pub renderer: RendererConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_FILTER.to_string(),
            window: WindowConfig::default(),
            shaders: ShaderConfig::default(),
            renderer: RendererConfig::default(),
            camera: CameraConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    ///
    /// `origin` is only used in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| Error::Config {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// Nothing is logged here; configuration is read before the subscriber
    /// that would record it exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it is not valid TOML for this schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, path)
    }

    /// Load a configuration file, using defaults if it does not exist.
    ///
    /// The returned [`ConfigSource`] says which happened so the caller can
    /// report it once logging is up. A file that exists but fails to parse
    /// is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<(Self, ConfigSource)> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }
        Ok((Self::load(path)?, ConfigSource::File))
    }

    /// Reject values that would make the engine misbehave later.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(Error::InvalidConfig(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(Error::InvalidConfig(format!(
                "camera fov must be in (0, 180), got {}",
                camera.fov_degrees
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<EngineConfig> {
        EngineConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.log_filter, DEFAULT_FILTER);
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config = parse(
            r#"
            [window]
            width = 1280

            [renderer]
            present_mode = "fifo"
            validation = false
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.renderer.present_mode, PresentModePreference::Fifo);
        assert!(!config.renderer.validation_enabled());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_shader_paths_parse() {
        let config = parse(
            r#"
            [shaders]
            vertex = "a.vert.spv"
            fragment = "b.frag.spv"
            "#,
        )
        .unwrap();
        assert_eq!(config.shaders.vertex, PathBuf::from("a.vert.spv"));
        assert_eq!(config.shaders.fragment, PathBuf::from("b.frag.spv"));
    }

    #[test]
    fn test_unknown_present_mode_is_config_error() {
        let err = parse("[renderer]\npresent_mode = \"vsync-ish\"").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = parse("[window]\nheight = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_inverted_clip_planes_rejected() {
        let err = parse("[camera]\nnear = 10.0\nfar = 1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = std::env::temp_dir().join("vkframe-config-that-does-not-exist.toml");
        let (config, source) = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[test]
    fn test_load_or_default_reports_file_source() {
        let path = std::env::temp_dir().join(format!(
            "vkframe-config-source-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[window]
width = 1024
").unwrap();
        let result = EngineConfig::load_or_default(&path);
        std::fs::remove_file(&path).ok();

        let (config, source) = result.unwrap();
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.window.width, 1024);
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "vkframe-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[scene]\nsierpinski_depth = 2\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.scene.sierpinski_depth, 2);
    }
}
