//! SPIR-V loading and shader modules.
//!
//! Shader bytecode is read in full at startup. A missing or unreadable file
//! is [`RhiError::ShaderLoad`]; a file that is not SPIR-V is
//! [`RhiError::InvalidShaderCode`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::path::Path;
//! use vkframe_rhi::device::Device;
//! use vkframe_rhi::shader::{Shader, ShaderStage};
//!
//! # fn example(device: Arc<Device>) -> vkframe_rhi::RhiResult<()> {
//! let vertex = Shader::from_spirv_file(
//!     device,
//!     Path::new("shaders/simple_shader.vert.spv"),
//!     ShaderStage::Vertex,
//! )?;
//! let stage_info = vertex.stage_create_info();
//! # Ok(())
//! # }
//! ```

use std::ffi::CStr;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// First word of every SPIR-V module.
const SPIRV_MAGIC: u32 = 0x0723_0203;

const ENTRY_POINT: &CStr = c"main";

/// Programmable stage a shader module is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn to_vk_stage(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Reads a SPIR-V file into 32-bit words.
///
/// # Errors
///
/// [`RhiError::ShaderLoad`] if the file cannot be read and
/// [`RhiError::InvalidShaderCode`] if its contents are not SPIR-V.
pub fn read_spirv(path: &Path) -> RhiResult<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|source| RhiError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    })?;
    parse_spirv(&bytes).map_err(|reason| RhiError::InvalidShaderCode {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_spirv(bytes: &[u8]) -> Result<Vec<u32>, String> {
    let words = ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|e| e.to_string())?;
    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        Some(&word) => Err(format!("bad magic number {:#010x}", word)),
        None => Err("file is empty".to_string()),
    }
}

/// Vulkan shader module wrapper.
pub struct Shader {
    device: Arc<Device>,
    module: vk::ShaderModule,
    stage: ShaderStage,
}

impl Shader {
    /// Loads a SPIR-V file and creates a shader module from it.
    pub fn from_spirv_file(device: Arc<Device>, path: &Path, stage: ShaderStage) -> RhiResult<Self> {
        debug!("Loading {} shader from {}", stage, path.display());
        let code = read_spirv(path)?;
        Self::from_words(device, &code, stage)
    }

    /// Creates a shader module from SPIR-V words.
    pub fn from_words(device: Arc<Device>, code: &[u32], stage: ShaderStage) -> RhiResult<Self> {
        let create_info = vk::ShaderModuleCreateInfo::default().code(code);
        let module = unsafe { device.handle().create_shader_module(&create_info, None)? };

        debug!("Created {} shader module ({} words)", stage, code.len());

        Ok(Self {
            device,
            module,
            stage,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Stage description for pipeline creation, entry point `main`.
    pub fn stage_create_info(&self) -> vk::PipelineShaderStageCreateInfo<'_> {
        vk::PipelineShaderStageCreateInfo::default()
            .stage(self.stage.to_vk_stage())
            .module(self.module)
            .name(ENTRY_POINT)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_shader_module(self.module, None);
        }
        debug!("Destroyed {} shader module", self.stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("vkframe-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_shader_stage_to_vk_stage() {
        assert_eq!(
            ShaderStage::Vertex.to_vk_stage(),
            vk::ShaderStageFlags::VERTEX
        );
        assert_eq!(
            ShaderStage::Fragment.to_vk_stage(),
            vk::ShaderStageFlags::FRAGMENT
        );
    }

    #[test]
    fn test_missing_file_is_shader_load_error() {
        let path = std::env::temp_dir().join("vkframe-no-such-shader.spv");
        let err = read_spirv(&path).unwrap_err();
        match err {
            RhiError::ShaderLoad { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_valid_spirv_is_read_as_words() {
        let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());
        let path = temp_file("ok.spv", &bytes);
        let words = read_spirv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn test_misaligned_file_is_invalid_code() {
        let path = temp_file("odd.spv", &[3, 2, 35, 7, 0]);
        let err = read_spirv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, RhiError::InvalidShaderCode { .. }));
    }

    #[test]
    fn test_wrong_magic_is_invalid_code() {
        assert!(parse_spirv(&[0, 0, 0, 0]).is_err());
        assert!(parse_spirv(&[]).is_err());
    }
}
