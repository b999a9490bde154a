//! Intermediate mesh data produced off the render thread.
//!
//! Geometry is bucketed by [`BlockTexture`] so each texture can be drawn as
//! one batch. Every bucket is an independent indexed stream: indices are
//! local to the stream and derived from that stream's own vertex count.

use std::collections::BTreeMap;

use super::face::Face;
use crate::engine_state::{rendering::Vertex, voxels::block::BlockTexture};

/// Vertices and triangle indices for one texture of one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshStream {
    /// Four vertices per face.
    pub vertices: Vec<Vertex>,
    /// Six indices (two triangles) per face.
    pub indices: Vec<u32>,
}

impl MeshStream {
    /// Appends one quad to the stream.
    pub fn push_face(&mut self, face: &Face) {
        let faces_generated = self.face_count() as u32;
        self.vertices.extend_from_slice(&face.vertices());
        self.indices
            .extend_from_slice(&Self::generate_face_indices(faces_generated));
    }

    /// Index data for a face, adjusted by the number of previously generated faces.
    ///
    /// # Returns
    /// Two triangles, `ll, lr, ur` and `ll, ur, ul`.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    /// Number of quads in the stream.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns `true` if the stream holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// All geometry produced for one chunk, keyed by texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMeshData {
    streams: BTreeMap<BlockTexture, MeshStream>,
}

impl ChunkMeshData {
    /// The stream for `texture`, created empty on first use.
    pub fn stream_mut(&mut self, texture: BlockTexture) -> &mut MeshStream {
        self.streams.entry(texture).or_default()
    }

    /// The stream for `texture`, if any face used it.
    pub fn stream(&self, texture: BlockTexture) -> Option<&MeshStream> {
        self.streams.get(&texture)
    }

    /// Iterates the non-empty streams in texture order.
    pub fn streams(&self) -> impl Iterator<Item = (BlockTexture, &MeshStream)> {
        self.streams
            .iter()
            .filter(|(_, stream)| !stream.is_empty())
            .map(|(texture, stream)| (*texture, stream))
    }

    /// Consumes the data, yielding each non-empty stream.
    pub fn into_streams(self) -> impl Iterator<Item = (BlockTexture, MeshStream)> {
        self.streams.into_iter().filter(|(_, stream)| !stream.is_empty())
    }

    /// Total number of quads across all streams.
    pub fn face_count(&self) -> usize {
        self.streams.values().map(MeshStream::face_count).sum()
    }

    /// Returns `true` if no stream holds geometry.
    pub fn is_empty(&self) -> bool {
        self.streams.values().all(MeshStream::is_empty)
    }
}
