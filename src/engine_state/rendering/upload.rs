//! Render-thread upload of worker-produced geometry.
//!
//! Workers leave raw [`ChunkMeshData`] in each chunk's pending slot. Once per
//! frame the render thread takes it, turns every texture stream into a
//! backend mesh bound to that texture, and swaps the result in as the
//! chunk's ready set, releasing whatever was there before. This is the only
//! place graphics resources are created.
//!
//! Textures are loaded lazily on first use and cached, failures included: a
//! texture that cannot be loaded is logged once and its streams are skipped
//! from then on.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::{debug, error};

use super::{
    meshing::{ChunkMeshData, MeshStream},
    texture::{DecodedTexture, TextureLibrary},
};
use crate::engine_state::voxels::{block::BlockTexture, chunk::ChunkCoordinate, chunk_store::ChunkStore};

/// Creates and destroys GPU-side objects. Only ever called on the render
/// thread.
pub trait GpuBackend {
    /// A texture bound for drawing.
    type Texture;
    /// Drawable geometry for one texture of one chunk.
    type Mesh;

    /// Uploads a decoded block texture.
    fn create_texture(&mut self, texture: BlockTexture, image: &DecodedTexture) -> Self::Texture;

    /// Uploads one texture stream of a chunk.
    fn create_mesh(
        &mut self,
        coordinate: ChunkCoordinate,
        stream: &MeshStream,
        texture: Rc<Self::Texture>,
    ) -> Self::Mesh;

    /// Frees a mesh created by this backend.
    fn release_mesh(&mut self, mesh: Self::Mesh);
}

/// Ready meshes of one chunk, keyed by texture.
pub type ReadyMeshes<M> = BTreeMap<BlockTexture, M>;

/// Owns every GPU mesh and the texture cache.
pub struct UploadPipeline<B: GpuBackend> {
    backend: B,
    textures: TextureLibrary,
    texture_cache: HashMap<BlockTexture, Option<Rc<B::Texture>>>,
    ready: HashMap<ChunkCoordinate, ReadyMeshes<B::Mesh>>,
}

impl<B: GpuBackend> UploadPipeline<B> {
    /// Creates a pipeline uploading through `backend`.
    pub fn new(backend: B, textures: TextureLibrary) -> Self {
        UploadPipeline {
            backend,
            textures,
            texture_cache: HashMap::new(),
            ready: HashMap::new(),
        }
    }

    /// Uploads every pending chunk mesh in `store`.
    ///
    /// # Returns
    /// The number of chunks whose ready set was replaced.
    pub fn upload_pending(&mut self, store: &ChunkStore) -> usize {
        let pending = store.take_pending_meshes();
        let uploaded = pending.len();
        for (coordinate, mesh) in pending {
            self.install(coordinate, mesh);
        }
        uploaded
    }

    /// Replaces the ready set of `coordinate` with meshes built from `data`.
    pub fn install(&mut self, coordinate: ChunkCoordinate, data: ChunkMeshData) {
        let mut meshes = ReadyMeshes::new();
        for (texture, stream) in data.into_streams() {
            let Some(bound) = self.texture(texture) else {
                continue;
            };
            let mesh = self.backend.create_mesh(coordinate, &stream, bound);
            meshes.insert(texture, mesh);
        }

        debug!("Uploaded {} meshes for chunk {:?}", meshes.len(), coordinate);
        if let Some(previous) = self.ready.insert(coordinate, meshes) {
            self.release(previous);
        }
    }

    fn texture(&mut self, texture: BlockTexture) -> Option<Rc<B::Texture>> {
        if let Some(cached) = self.texture_cache.get(&texture) {
            return cached.clone();
        }

        let loaded = match self.textures.load(texture) {
            Ok(image) => Some(Rc::new(self.backend.create_texture(texture, &image))),
            Err(err) => {
                error!("{err}; {texture:?} faces will not be drawn");
                None
            }
        };
        self.texture_cache.insert(texture, loaded.clone());
        loaded
    }

    fn release(&mut self, meshes: ReadyMeshes<B::Mesh>) {
        for mesh in meshes.into_values() {
            self.backend.release_mesh(mesh);
        }
    }

    /// Releases the ready meshes of an evicted chunk.
    pub fn release_chunk(&mut self, coordinate: ChunkCoordinate) {
        if let Some(meshes) = self.ready.remove(&coordinate) {
            self.release(meshes);
        }
    }

    /// Releases every ready mesh.
    pub fn release_all(&mut self) {
        let ready = std::mem::take(&mut self.ready);
        for meshes in ready.into_values() {
            self.release(meshes);
        }
    }

    /// Every drawable `(chunk, texture, mesh)` triple.
    pub fn ready_meshes(&self) -> impl Iterator<Item = (ChunkCoordinate, BlockTexture, &B::Mesh)> {
        self.ready.iter().flat_map(|(coordinate, meshes)| {
            meshes
                .iter()
                .map(move |(texture, mesh)| (*coordinate, *texture, mesh))
        })
    }

    /// The ready meshes of one chunk.
    pub fn ready_meshes_for(&self, coordinate: ChunkCoordinate) -> Option<&ReadyMeshes<B::Mesh>> {
        self.ready.get(&coordinate)
    }

    /// Number of chunks with a ready set (possibly empty).
    pub fn ready_chunk_count(&self) -> usize {
        self.ready.len()
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// CPU-only backend that keeps geometry sizes instead of GPU buffers.
///
/// Used when no graphics adapter is available.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub textures_created: usize,
    pub meshes_created: usize,
    pub meshes_released: usize,
}

impl HeadlessBackend {
    /// Meshes created and not yet released.
    pub fn live_meshes(&self) -> usize {
        self.meshes_created - self.meshes_released
    }
}

/// Texture record of [`HeadlessBackend`].
#[derive(Debug)]
pub struct HeadlessTexture {
    pub texture: BlockTexture,
    pub width: u32,
    pub height: u32,
}

/// Mesh record of [`HeadlessBackend`].
#[derive(Debug)]
pub struct HeadlessMesh {
    pub coordinate: ChunkCoordinate,
    pub vertex_count: usize,
    pub index_count: usize,
    pub texture: Rc<HeadlessTexture>,
}

impl GpuBackend for HeadlessBackend {
    type Texture = HeadlessTexture;
    type Mesh = HeadlessMesh;

    fn create_texture(&mut self, texture: BlockTexture, image: &DecodedTexture) -> HeadlessTexture {
        self.textures_created += 1;
        HeadlessTexture {
            texture,
            width: image.width,
            height: image.height,
        }
    }

    fn create_mesh(
        &mut self,
        coordinate: ChunkCoordinate,
        stream: &MeshStream,
        texture: Rc<HeadlessTexture>,
    ) -> HeadlessMesh {
        self.meshes_created += 1;
        HeadlessMesh {
            coordinate,
            vertex_count: stream.vertices.len(),
            index_count: stream.indices.len(),
            texture,
        }
    }

    fn release_mesh(&mut self, _mesh: HeadlessMesh) {
        self.meshes_released += 1;
    }
}
