/*!
Resource tables read by the physics core.

Loading these tables from game data files happens elsewhere; the core only
needs the handful of fields below. Lookups return `None` for unknown ids.
*/

use crate::bitmask_flags::BitmaskFlags;
use crate::collision::geometry::Tri;
use crate::collision::types::{Vec2, Vec3};
use crate::define_bitmask_flags;
use crate::hooks::SoundId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelTexId(pub u16);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u16);

define_bitmask_flags!(TextureFlag, u8, {
    /// Lava. Damages objects scraping along it.
    Volatile,
    Water,
    ForceField,
    /// Bitmap has see-through texels.
    Transparent,
});

pub type TextureFlags = BitmaskFlags<u8>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelTexture {
    pub flags: TextureFlags,
    /// Damage per second while scraping a volatile surface.
    pub damage: f32,
    /// Overlay swapped in when this overlay is shot.
    pub destroyed_texture: Option<LevelTexId>,
    pub destroyed_sound: Option<SoundId>,
}

impl LevelTexture {
    pub fn is_liquid(&self) -> bool {
        self.flags.has_any(&[TextureFlag::Volatile, TextureFlag::Water])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TexelMask {
    #[default]
    Opaque,
    Transparent,
    /// Overlay texel that also cuts a hole in the base texture.
    SuperTransparent,
}

impl TexelMask {
    pub fn is_transparent(self) -> bool {
        self != TexelMask::Opaque
    }
}

/// Per-texel transparency of a texture. Color data is not needed for physics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` entries.
    pub mask: Vec<TexelMask>,
}

impl Bitmap {
    pub fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mask: vec![TexelMask::Opaque; (width * height) as usize],
        }
    }

    /// Texel under a wrapped UV coordinate, after `rotation` quarter turns.
    pub fn texel(&self, uv: Vec2, rotation: u8) -> TexelMask {
        if self.width == 0 || self.height == 0 {
            return TexelMask::Opaque;
        }

        let wrap = |v: f32, size: u32| ((v.rem_euclid(1.0) * size as f32) as u32).min(size - 1);
        let (x, y) = rotate_texel(
            wrap(uv.x, self.width),
            wrap(uv.y, self.height),
            self.width,
            self.height,
            rotation,
        );

        self.mask
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or_default()
    }
}

/// Map overlay texel coordinates through a quarter-turn rotation.
fn rotate_texel(x: u32, y: u32, width: u32, height: u32, rotation: u8) -> (u32, u32) {
    let (w, h) = (width - 1, height - 1);
    match rotation % 4 {
        1 => (y.min(w), w.saturating_sub(x).min(h)),
        2 => (w - x, h - y),
        3 => (h.saturating_sub(y).min(w), x.min(h)),
        _ => (x, y),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotInfo {
    /// Guide-bot style ally. Player weapons pass through it.
    pub is_companion: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeaponInfo {
    pub is_mine: bool,
    pub splash_radius: f32,
    pub splash_damage: f32,
    pub splash_force: f32,
    /// Oscillations per second of sine-moving weapons.
    pub sine_speed: f32,
    pub sine_amplitude: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelTriangle {
    pub indices: [u16; 3],
    /// Normal in model data space (before the handedness flip).
    pub normal: Vec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Submodel {
    pub parent: Option<usize>,
    /// Pivot relative to the parent submodel.
    pub offset: Vec3,
    pub triangles: Vec<ModelTriangle>,
}

/// Polygon model in model data space. Z is flipped when brought into physics space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub vertices: Vec<Vec3>,
    pub submodels: Vec<Submodel>,
}

impl Model {
    /// Accumulated pivot offset of a submodel, following parent links.
    pub fn submodel_offset(&self, index: usize) -> Vec3 {
        let mut offset = Vec3::zeros();
        let mut current = Some(index);
        // Bounded by the submodel count so a bad parent cycle cannot hang.
        for _ in 0..self.submodels.len() {
            let Some(sm) = current.and_then(|i| self.submodels.get(i)) else {
                break;
            };
            offset += sm.offset;
            current = sm.parent;
        }
        offset
    }

    /// Triangles of every submodel in physics model space with their normals.
    ///
    /// Triangles referencing missing vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = (Tri, Vec3)> + '_ {
        self.submodels.iter().enumerate().flat_map(move |(index, sm)| {
            let offset = self.submodel_offset(index);
            sm.triangles.iter().filter_map(move |t| {
                let mut tri = [Vec3::zeros(); 3];
                for (corner, &vi) in tri.iter_mut().zip(&t.indices) {
                    *corner = flip_z(&(self.vertices.get(vi as usize)? + offset));
                }
                Some((tri, flip_z(&t.normal)))
            })
        })
    }
}

#[inline]
fn flip_z(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

/// Every table the physics core reads.
#[derive(Clone, Debug, Default)]
pub struct Resources {
    pub robots: Vec<RobotInfo>,
    pub weapons: Vec<WeaponInfo>,
    pub level_textures: Vec<LevelTexture>,
    /// Indexed by `LevelTexId`.
    pub bitmaps: Vec<Bitmap>,
    pub models: Vec<Model>,
}

impl Resources {
    pub fn robot_info(&self, id: u8) -> Option<&RobotInfo> {
        self.robots.get(id as usize)
    }

    pub fn weapon_info(&self, id: u8) -> Option<&WeaponInfo> {
        self.weapons.get(id as usize)
    }

    pub fn weapon_is_mine(&self, id: u8) -> bool {
        self.weapon_info(id).is_some_and(|w| w.is_mine)
    }

    pub fn level_texture(&self, id: LevelTexId) -> Option<&LevelTexture> {
        self.level_textures.get(id.0 as usize)
    }

    pub fn bitmap(&self, id: LevelTexId) -> Option<&Bitmap> {
        self.bitmaps.get(id.0 as usize)
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_texel_lookup_wraps_uvs() {
        let mut bitmap = Bitmap::opaque(4, 4);
        bitmap.mask[1 * 4 + 2] = TexelMask::Transparent;

        assert!(bitmap.texel(Vec2::new(0.6, 0.3), 0).is_transparent());
        assert!(bitmap.texel(Vec2::new(1.6, -0.7), 0).is_transparent());
        assert!(!bitmap.texel(Vec2::new(0.1, 0.1), 0).is_transparent());
    }

    #[test]
    fn half_turn_rotation_mirrors_both_axes() {
        assert_eq!(rotate_texel(0, 1, 4, 4, 2), (3, 2));
        assert_eq!(rotate_texel(0, 1, 4, 4, 4), (0, 1));
    }

    #[test]
    fn empty_bitmap_is_opaque() {
        assert_eq!(Bitmap::default().texel(Vec2::new(0.5, 0.5), 0), TexelMask::Opaque);
    }

    #[test]
    fn submodel_offsets_accumulate_through_parents() {
        let model = Model {
            vertices: vec![],
            submodels: vec![
                Submodel {
                    parent: None,
                    offset: Vec3::new(1.0, 0.0, 0.0),
                    triangles: vec![],
                },
                Submodel {
                    parent: Some(0),
                    offset: Vec3::new(0.0, 2.0, 0.0),
                    triangles: vec![],
                },
            ],
        };
        assert_eq!(model.submodel_offset(1), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn model_triangles_flip_z_and_skip_bad_indices() {
        let model = Model {
            vertices: vec![Vec3::new(0.0, 0.0, 1.0), Vec3::x(), Vec3::y()],
            submodels: vec![Submodel {
                parent: None,
                offset: Vec3::new(0.0, 0.0, 1.0),
                triangles: vec![
                    ModelTriangle {
                        indices: [0, 1, 2],
                        normal: Vec3::z(),
                    },
                    ModelTriangle {
                        indices: [0, 1, 9],
                        normal: Vec3::z(),
                    },
                ],
            }],
        };

        let tris: Vec<_> = model.triangles().collect();
        assert_eq!(tris.len(), 1);
        let (tri, normal) = tris[0];
        assert_eq!(tri[0], Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(normal, -Vec3::z());
    }

    #[test]
    fn liquid_textures() {
        let lava = LevelTexture {
            flags: TextureFlags::from_flags(&[TextureFlag::Volatile]),
            ..LevelTexture::default()
        };
        assert!(lava.is_liquid());
        assert!(!LevelTexture::default().is_liquid());
    }
}
