//! Shader sources read from a directory, for editing passes without rebuilding.

use std::path::{Path, PathBuf};

use vhsdepth_render::{
    EmbeddedShaders, PassName, ProgramSource, ShaderError, ShaderSource, ShaderStage,
};

/// Reads `<vertex stem>.vert.wgsl` and `<pass>.frag.wgsl` from a directory.
///
/// A file that does not exist falls back to the embedded source, so the
/// directory only needs the passes being edited.
#[derive(Debug, Clone)]
pub struct DirectoryShaders {
    dir: PathBuf,
}

impl DirectoryShaders {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the vertex source for `pass`.
    #[must_use]
    pub fn vertex_path(&self, pass: PassName) -> PathBuf {
        self.dir.join(format!("{}.vert.wgsl", pass.vertex_stem()))
    }

    /// Path of the fragment source for `pass`.
    #[must_use]
    pub fn fragment_path(&self, pass: PassName) -> PathBuf {
        self.dir.join(format!("{}.frag.wgsl", pass.as_str()))
    }

    fn read(pass: PassName, path: &Path) -> Result<Option<String>, ShaderError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::debug!("shader '{pass}': using {}", path.display());
                Ok(Some(text))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShaderError::new(
                pass.as_str(),
                ShaderStage::Load,
                format!("{}: {e}", path.display()),
            )),
        }
    }
}

impl ShaderSource for DirectoryShaders {
    fn load(&self, pass: PassName) -> Result<ProgramSource, ShaderError> {
        let embedded = EmbeddedShaders.load(pass)?;
        let vertex = Self::read(pass, &self.vertex_path(pass))?.unwrap_or(embedded.vertex);
        let fragment = Self::read(pass, &self.fragment_path(pass))?.unwrap_or(embedded.fragment);
        Ok(ProgramSource { vertex, fragment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vhsdepth-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_paths() {
        let shaders = DirectoryShaders::new("/shaders");
        assert_eq!(
            shaders.vertex_path(PassName::Contour),
            PathBuf::from("/shaders/quad.vert.wgsl")
        );
        assert_eq!(
            shaders.fragment_path(PassName::Splat),
            PathBuf::from("/shaders/splat.frag.wgsl")
        );
    }

    #[test]
    fn test_missing_files_fall_back_to_embedded() {
        let dir = scratch_dir("empty");
        let loaded = DirectoryShaders::new(&dir).load(PassName::Vhs).unwrap();
        assert_eq!(loaded, EmbeddedShaders.load(PassName::Vhs).unwrap());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_override_fragment() {
        let dir = scratch_dir("override");
        let custom = "// custom blit\n";
        std::fs::write(dir.join("blit.frag.wgsl"), custom).unwrap();
        let loaded = DirectoryShaders::new(&dir).load(PassName::Blit).unwrap();
        assert_eq!(loaded.fragment, custom);
        assert_eq!(
            loaded.vertex,
            EmbeddedShaders.load(PassName::Blit).unwrap().vertex
        );
        std::fs::remove_dir_all(dir).unwrap();
    }
}
