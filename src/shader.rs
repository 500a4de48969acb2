use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur when loading shader text.
#[derive(Debug, Error)]
pub enum ShaderLoadError {
    #[error("failed to read shader '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader '{}' is not valid UTF-8: {source}", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("shader '{}' is empty", path.display())]
    Empty { path: PathBuf },
}

/// WGSL program text handed to pipeline creation.
///
/// The text is opaque to the renderer: it is validated as UTF-8 and passed
/// through unmodified. The program must provide `vs_main`, `fs_main` and
/// `edges_fs_main` entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    label: String,
    text: Cow<'static, str>,
}

impl ShaderSource {
    /// The program compiled into the crate.
    pub fn embedded() -> Self {
        Self {
            label: "Default Shader".to_string(),
            text: Cow::Borrowed(include_str!("shaders/default.wgsl")),
        }
    }

    /// Wraps program text that is already in memory.
    pub fn from_text(label: impl Into<String>, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Loads a program from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ShaderLoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ShaderLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, bytes)
    }

    fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, ShaderLoadError> {
        if bytes.is_empty() {
            return Err(ShaderLoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        let text = String::from_utf8(bytes).map_err(|source| ShaderLoadError::InvalidUtf8 {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("loaded shader '{}' ({} bytes)", path.display(), text.len());

        Ok(Self {
            label: path.display().to_string(),
            text: Cow::Owned(text),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte length of the program text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn to_wgsl(&self) -> wgpu::ShaderSource<'_> {
        wgpu::ShaderSource::Wgsl(Cow::Borrowed(self.text()))
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::embedded()
    }
}
