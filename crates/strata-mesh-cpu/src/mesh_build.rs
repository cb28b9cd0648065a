use strata_geom::Vec3;

use crate::face::Face;

/// Flat vertex buffers for one chunk mesh.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a quad given its corners in loop order with matching UVs.
    /// Flips the loop if needed so the triangles wind counter-clockwise
    /// around `n`.
    pub fn add_quad(&mut self, corners: [Vec3; 4], n: Vec3, uvs: [[f32; 2]; 4]) {
        let base = self.vertex_count() as u32;
        let mut vs = corners;
        let mut uvs = uvs;
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        if e1.cross(e2).dot(n) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
        }
        for i in 0..4 {
            self.pos.extend_from_slice(&[vs[i].x, vs[i].y, vs[i].z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(&uvs[i]);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Emits one unit face of the cell whose minimum render-space corner is
    /// `origin`. `atlas_uvs` come from `TextureAtlas::uvs_for`, ordered
    /// `(u0,v0) (u0,v1) (u1,v0) (u1,v1)`.
    pub fn add_face(&mut self, face: Face, origin: Vec3, atlas_uvs: [[f32; 2]; 4]) {
        let (base, u, v) = face.frame();
        let p00 = origin + base;
        let p01 = p00 + v;
        let p11 = p01 + u;
        let p10 = p00 + u;
        let [uv00, uv01, uv10, uv11] = atlas_uvs;
        self.add_quad([p00, p01, p11, p10], face.normal(), [uv00, uv01, uv11, uv10]);
    }
}
