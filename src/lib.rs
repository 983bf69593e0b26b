//! Glslpack: build-time GLSL shader packing.
//!
//! The crate compresses a set of shader sources into one packed blob and
//! generates the C code that expands them back at runtime:
//! - A grammar-based text compressor over the shader corpus (`grammar`)
//! - Packed-blob assembly and reference expansion (`pack`)
//! - C header/source generation for the runtime unpacker (`codegen`)
//! - GLSL preprocessing helpers (`glsl`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use glslpack::corpus::Corpus;
//! use glslpack::packer::{self, PackerOptions};
//! use std::collections::BTreeMap;
//!
//! let mut corpus = Corpus::new();
//! corpus.insert("demo.frag", "void main(){gl_FragColor=vec4(1.);}").unwrap();
//!
//! let opts = PackerOptions {
//!     version_directive: "#version 330 core".to_string(),
//!     ..Default::default()
//! };
//! let output = packer::pack_corpus(corpus, &BTreeMap::new(), &opts).unwrap();
//! assert!(!output.pack.is_empty());
//! ```

pub mod codegen;
pub mod corpus;
pub mod glsl;
pub mod grammar;
pub mod io;
pub mod pack;
pub mod packer;

#[cfg(feature = "cli")]
pub mod cli;
