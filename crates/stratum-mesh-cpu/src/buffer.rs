use stratum_geom::Vec3;

pub const FACES_PER_VOXEL: usize = 6;
pub const VERTS_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

/// Fixed-size scratch geometry for one chunk build. Arrays are sized once for the worst
/// case and written in place; only the first `quad_count` quads are meaningful.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryBuffer {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub quad_count: usize,
}

impl GeometryBuffer {
    pub fn with_quad_capacity(max_quads: usize) -> Self {
        Self {
            vertices: vec![Vec3::ZERO; max_quads * VERTS_PER_QUAD],
            indices: vec![0; max_quads * INDICES_PER_QUAD],
            uvs: vec![[0.0; 2]; max_quads * VERTS_PER_QUAD],
            colors: vec![[0.0; 4]; max_quads * VERTS_PER_QUAD],
            quad_count: 0,
        }
    }

    /// Worst case for a `chunk_size x height x chunk_size` chunk: every face of every voxel.
    pub fn for_chunk(chunk_size: usize, height: usize) -> Self {
        Self::with_quad_capacity(chunk_size * chunk_size * height * FACES_PER_VOXEL)
    }

    #[inline]
    pub fn max_quads(&self) -> usize {
        self.vertices.len() / VERTS_PER_QUAD
    }

    #[inline]
    pub fn reset(&mut self) {
        self.quad_count = 0;
    }

    #[inline]
    pub fn written_vertices(&self) -> &[Vec3] {
        &self.vertices[..self.quad_count * VERTS_PER_QUAD]
    }

    #[inline]
    pub fn written_indices(&self) -> &[u32] {
        &self.indices[..self.quad_count * INDICES_PER_QUAD]
    }

    #[inline]
    pub fn written_uvs(&self) -> &[[f32; 2]] {
        &self.uvs[..self.quad_count * VERTS_PER_QUAD]
    }

    #[inline]
    pub fn written_colors(&self) -> &[[f32; 4]] {
        &self.colors[..self.quad_count * VERTS_PER_QUAD]
    }

    /// Writes one quad at slot `quad_count` and advances it. Corners must be in
    /// counter-clockwise order as seen from the front.
    #[inline]
    pub(crate) fn push_quad(&mut self, corners: [Vec3; 4], uvs: [[f32; 2]; 4], color: [f32; 4]) {
        let q = self.quad_count;
        assert!(q < self.max_quads(), "geometry buffer overflow at quad {q}");
        let v0 = q * VERTS_PER_QUAD;
        let i0 = q * INDICES_PER_QUAD;
        for k in 0..VERTS_PER_QUAD {
            self.vertices[v0 + k] = corners[k];
            self.uvs[v0 + k] = uvs[k];
            self.colors[v0 + k] = color;
        }
        let base = v0 as u32;
        self.indices[i0..i0 + INDICES_PER_QUAD]
            .copy_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.quad_count = q + 1;
    }
}
