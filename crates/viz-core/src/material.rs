use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

/// Decoded RGBA8 image ready for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct MaterialDesc {
    pub label: &'static str,
    pub color: Vec3,
    pub opacity: f32,
    pub blend: BlendMode,
    pub transparent: bool,
    /// Use the geometry's per-vertex colors instead of `color`.
    pub vertex_colors: bool,
    /// Point size in world units; only meaningful for point geometry.
    pub point_size: f32,
    /// Scene lights modulate the color.
    pub lit: bool,
    pub texture: Option<TextureData>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            label: "material",
            color: Vec3::ONE,
            opacity: 1.0,
            blend: BlendMode::Normal,
            transparent: false,
            vertex_colors: false,
            point_size: 1.0,
            lit: false,
            texture: None,
        }
    }
}

impl MaterialDesc {
    pub fn points(size: f32, opacity: f32) -> Self {
        Self {
            label: "points",
            opacity,
            blend: BlendMode::Additive,
            transparent: true,
            vertex_colors: true,
            point_size: size,
            ..Default::default()
        }
    }

    pub fn line(color: Vec3, opacity: f32) -> Self {
        Self {
            label: "line",
            color,
            opacity,
            transparent: opacity < 1.0,
            ..Default::default()
        }
    }

    pub fn basic(color: Vec3, opacity: f32) -> Self {
        Self {
            label: "basic",
            color,
            opacity,
            transparent: opacity < 1.0,
            ..Default::default()
        }
    }

    pub fn textured(texture: TextureData) -> Self {
        Self {
            label: "textured",
            lit: true,
            texture: Some(texture),
            ..Default::default()
        }
    }
}
