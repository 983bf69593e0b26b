// File-level build: read shader sources, preprocess GLSL, run the packer,
// write the three artifacts.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::corpus::{Corpus, CorpusError};
use crate::glsl::{self, AliasMaps};
use crate::pack::PackError;
use crate::packer::{self, PackOutput, PackerOptions};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: non-ASCII byte 0x{:02X} at position {}", .path.display(), .byte, .position)]
    NonAscii {
        path: PathBuf,
        position: usize,
        byte: u8,
    },
    #[error("{}: {}", .path.display(), .source)]
    Corpus {
        path: PathBuf,
        source: CorpusError,
    },
    #[error("{}: GLSL version {} exceeds the configured maximum {}", .path.display(), .found, .max)]
    VersionTooHigh {
        path: PathBuf,
        found: u32,
        max: u32,
    },
    #[error(transparent)]
    Pack(#[from] PackError),
}

// ---------------------------------------------------------------------------
// Options and paths
// ---------------------------------------------------------------------------

/// Options for a file-level build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub min_token_size: usize,
    /// 0 disables the bound.
    pub max_token_size: usize,
    /// Target GLSL version; 0 selects the highest `#version` found.
    pub glsl_version: u32,
    /// Append ` core` to the emitted version directive.
    pub core_profile: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            min_token_size: 3,
            max_token_size: 0,
            glsl_version: 0,
            core_profile: true,
        }
    }
}

/// Artifact paths for `build_files`.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub pack: PathBuf,
    pub header: PathBuf,
    pub source: PathBuf,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read a shader source and enforce the ASCII restriction.
pub fn read_shader_source(path: &Path) -> Result<String, BuildError> {
    let raw = std::fs::read(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some((position, &byte)) = raw.iter().enumerate().find(|&(_, &b)| b > 0x7F) {
        return Err(BuildError::NonAscii {
            path: path.to_path_buf(),
            position,
            byte,
        });
    }
    // All bytes are 7-bit, so this is lossless.
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Read and preprocess every input shader, compress, and write the packed
/// blob plus the generated header and source.
pub fn build_files(
    inputs: &[PathBuf],
    outputs: &OutputPaths,
    opts: &BuildOptions,
) -> Result<PackOutput, BuildError> {
    let mut corpus = Corpus::new();
    let mut aliases = AliasMaps::default();
    let mut highest_version = 0u32;

    for path in inputs {
        let raw = read_shader_source(path)?;
        debug!("processing {}", path.display());

        let version = glsl::extract_version(&raw);
        if version > 0 {
            highest_version = highest_version.max(version);
            if opts.glsl_version > 0 && version > opts.glsl_version {
                return Err(BuildError::VersionTooHigh {
                    path: path.clone(),
                    found: version,
                    max: opts.glsl_version,
                });
            }
        }

        let stripped = glsl::strip_version_directive(&raw);
        glsl::extract_externals(&stripped, &mut aliases);
        let renamed = glsl::rename_identifiers(&stripped, &aliases.combined());

        let name = path.to_string_lossy().into_owned();
        corpus
            .insert(&name, &renamed)
            .map_err(|source| BuildError::Corpus {
                path: path.clone(),
                source,
            })?;
    }

    let version = if opts.glsl_version > 0 {
        opts.glsl_version
    } else {
        highest_version
    };
    if version == 0 && !inputs.is_empty() {
        warn!("no #version directive found in any input");
    }
    let version_directive = if opts.core_profile {
        format!("#version {version} core")
    } else {
        format!("#version {version}")
    };
    info!("using version directive \"{version_directive}\"");

    let packer_opts = PackerOptions {
        min_token_size: opts.min_token_size,
        max_token_size: opts.max_token_size,
        version_directive,
    };
    let output = packer::pack_corpus(corpus, &aliases.combined(), &packer_opts)?;

    write_artifact(&outputs.pack, &output.pack)?;
    write_artifact(&outputs.header, output.header.as_bytes())?;
    write_artifact(&outputs.source, output.source.as_bytes())?;
    info!(
        "wrote {} ({} bytes), {} and {}",
        outputs.pack.display(),
        output.pack.len(),
        outputs.header.display(),
        outputs.source.display()
    );

    Ok(output)
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    std::fs::write(path, bytes).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::Expander;

    fn outputs_in(dir: &Path) -> OutputPaths {
        OutputPaths {
            pack: dir.join("shaders.pack"),
            header: dir.join("unpacker.h"),
            source: dir.join("unpacker.c"),
        }
    }

    #[test]
    fn build_writes_all_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("scene.frag");
        std::fs::write(
            &shader,
            "#version 330 core\nuniform vec2 resolution;\nvoid main(){gl_FragColor=vec4(resolution,0.,1.);}\n",
        )
        .unwrap();
        let outputs = outputs_in(dir.path());

        let output = build_files(
            &[shader],
            &outputs,
            &BuildOptions::default(),
        )
        .unwrap();

        let pack = std::fs::read(&outputs.pack).unwrap();
        assert_eq!(pack, output.pack);
        let header = std::fs::read_to_string(&outputs.header).unwrap();
        assert!(header.contains("shader_scene"));
        assert!(header.contains("extern const char* uniform_resolution;"));
        let source = std::fs::read_to_string(&outputs.source).unwrap();
        assert!(source.contains("static const char* const version = \"#version 330 core\\n\";"));
        assert!(source.contains("const char* uniform_resolution = \"u0\";"));
    }

    #[test]
    fn renamed_shader_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("demo.frag");
        std::fs::write(
            &shader,
            "#version 100\nuniform float time;\nvoid main(){gl_FragColor=vec4(time,time,time,1.);}\n",
        )
        .unwrap();
        let outputs = outputs_in(dir.path());

        let output = build_files(&[shader], &outputs, &BuildOptions::default()).unwrap();
        let (_, offset) = &output.offsets[0];
        let expander = Expander::new(&output.pack, &output.tables.byte_tokens);
        let expanded = expander.expand(*offset).unwrap();
        assert_eq!(
            expanded,
            b"uniform float u0;\nvoid main(){gl_FragColor=vec4(u0,u0,u0,1.);}\n"
        );
    }

    #[test]
    fn version_above_configured_maximum_fails() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("new.frag");
        std::fs::write(&shader, "#version 460\nvoid main(){}\n").unwrap();
        let outputs = outputs_in(dir.path());

        let err = build_files(
            &[shader],
            &outputs,
            &BuildOptions {
                glsl_version: 330,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::VersionTooHigh {
                found: 460,
                max: 330,
                ..
            }
        ));
        assert!(!outputs.pack.exists());
    }

    #[test]
    fn highest_version_wins_when_auto_detecting() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.vert");
        let b = dir.path().join("b.frag");
        std::fs::write(&a, "#version 330\nvoid main(){}\n").unwrap();
        std::fs::write(&b, "#version 450\nvoid main(){}\n").unwrap();
        let outputs = outputs_in(dir.path());

        let output = build_files(
            &[a, b],
            &outputs,
            &BuildOptions {
                core_profile: false,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(output.source.contains("\"#version 450\\n\""));
    }

    #[test]
    fn non_ascii_input_is_rejected_with_position() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("bad.frag");
        std::fs::write(&shader, b"void main(){}\xC3\xA9\n").unwrap();
        let outputs = outputs_in(dir.path());

        let err = build_files(&[shader], &outputs, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, BuildError::NonAscii { position: 13, .. }));
    }
}
