use crate::types::AtlasCell;

/// Uniform grid texture atlas; maps a cell to normalized UV corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureAtlas {
    pub cols: u16,
    pub rows: u16,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self { cols: 1, rows: 1 }
    }
}

impl TextureAtlas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Corner UVs of `cell` in the order `(u0,v0) (u0,v1) (u1,v0) (u1,v1)`.
    pub fn uvs_for(&self, cell: AtlasCell) -> [[f32; 2]; 4] {
        let w = f32::from(self.cols);
        let h = f32::from(self.rows);
        let u0 = f32::from(cell.col) / w;
        let u1 = (f32::from(cell.col) + 1.0) / w;
        let v0 = f32::from(cell.row) / h;
        let v1 = (f32::from(cell.row) + 1.0) / h;
        [[u0, v0], [u0, v1], [u1, v0], [u1, v1]]
    }

    #[inline]
    pub fn contains(&self, cell: AtlasCell) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }
}
