//! Texture loading for block materials.
//!
//! Each [`BlockTexture`] is backed by a PNG named after its file stem. The
//! loader looks in the primary directory first and falls back to the same
//! file name in the fallback directory. Decoding happens on the render
//! thread, once per texture; GPU creation is left to the upload backend.

use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::engine_state::voxels::block::BlockTexture;

/// Errors produced while loading block textures.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Neither the primary nor the fallback image could be decoded.
    #[error(
        "texture `{}` could not be loaded from {} or {}",
        .texture.file_stem(),
        .primary.display(),
        .fallback.display()
    )]
    Missing {
        texture: BlockTexture,
        primary: PathBuf,
        fallback: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// An RGBA8 image ready for GPU upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTexture {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA rows, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

/// Resolves and decodes block textures from disk.
#[derive(Clone, Debug)]
pub struct TextureLibrary {
    primary_directory: PathBuf,
    fallback_directory: PathBuf,
}

impl TextureLibrary {
    /// Creates a library reading from `primary_directory`, falling back to
    /// `fallback_directory`.
    pub fn new(primary_directory: impl Into<PathBuf>, fallback_directory: impl Into<PathBuf>) -> Self {
        TextureLibrary {
            primary_directory: primary_directory.into(),
            fallback_directory: fallback_directory.into(),
        }
    }

    fn path_in(directory: &Path, texture: BlockTexture) -> PathBuf {
        directory.join(format!("{}.png", texture.file_stem()))
    }

    /// Path of the primary image for `texture`.
    pub fn primary_path(&self, texture: BlockTexture) -> PathBuf {
        Self::path_in(&self.primary_directory, texture)
    }

    /// Path of the fallback image for `texture`.
    pub fn fallback_path(&self, texture: BlockTexture) -> PathBuf {
        Self::path_in(&self.fallback_directory, texture)
    }

    /// Loads `texture`, trying the fallback directory if the primary image
    /// is missing or unreadable.
    pub fn load(&self, texture: BlockTexture) -> Result<DecodedTexture, TextureError> {
        let primary = self.primary_path(texture);
        let primary_error = match decode(&primary) {
            Ok(decoded) => return Ok(decoded),
            Err(err) => err,
        };

        let fallback = self.fallback_path(texture);
        warn!(
            "Texture {} unavailable ({primary_error}), trying {}",
            primary.display(),
            fallback.display()
        );

        decode(&fallback).map_err(|source| TextureError::Missing {
            texture,
            primary,
            fallback,
            source,
        })
    }
}

fn decode(path: &Path) -> Result<DecodedTexture, image::ImageError> {
    let image = image::open(path)?.to_rgba8();
    Ok(DecodedTexture {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(directory: &Path, texture: BlockTexture, color: [u8; 4]) {
        RgbaImage::from_pixel(2, 2, Rgba(color))
            .save(directory.join(format!("{}.png", texture.file_stem())))
            .expect("write png");
    }

    #[test]
    fn prefers_primary_then_fallback() {
        let primary = tempfile::tempdir().expect("tempdir");
        let fallback = tempfile::tempdir().expect("tempdir");
        write_png(primary.path(), BlockTexture::Stone, [10, 10, 10, 255]);
        write_png(fallback.path(), BlockTexture::Stone, [99, 99, 99, 255]);
        write_png(fallback.path(), BlockTexture::Sand, [200, 180, 90, 255]);

        let library = TextureLibrary::new(primary.path(), fallback.path());

        let stone = library.load(BlockTexture::Stone).expect("stone");
        assert_eq!((stone.width, stone.height), (2, 2));
        assert_eq!(&stone.rgba[..4], &[10, 10, 10, 255]);

        let sand = library.load(BlockTexture::Sand).expect("sand from fallback");
        assert_eq!(&sand.rgba[..4], &[200, 180, 90, 255]);
        assert_eq!(sand.rgba.len(), 16);
    }

    #[test]
    fn reports_both_paths_when_missing() {
        let primary = tempfile::tempdir().expect("tempdir");
        let fallback = tempfile::tempdir().expect("tempdir");
        let library = TextureLibrary::new(primary.path(), fallback.path());

        let err = library.load(BlockTexture::GrassTop).expect_err("missing");
        let message = err.to_string();
        assert!(message.contains("grass_top"));
        assert!(message.contains(&primary.path().display().to_string()));
        assert!(message.contains(&fallback.path().display().to_string()));
    }
}
