use crate::constants::MAX_TEXTURE_DIMENSION;
use crate::error::TextureError;
use crate::material::TextureData;
use crate::registry::HandleId;

/// Identifies one in-flight texture load and the scene resources it targets.
///
/// A ticket outlives nothing: applying it after its scene has stopped is a
/// no-op (see `SceneInstance::apply_texture`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureTicket {
    pub(crate) handle: HandleId,
    pub url: String,
}

/// Decode encoded image bytes (png/jpeg/webp) into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<TextureData, TextureError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
        return Err(TextureError::TooLarge { width, height });
    }
    let img = img.to_rgba8();
    Ok(TextureData {
        width,
        height,
        rgba: img.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn png_decodes_to_rgba() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let tex = decode(&bytes).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.rgba.len(), 3 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn image_wider_than_the_texture_limit_is_rejected() {
        let img = image::RgbaImage::new(MAX_TEXTURE_DIMENSION + 1, 1);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            TextureError::TooLarge {
                width,
                height: 1
            } if width == MAX_TEXTURE_DIMENSION + 1
        ));
    }
}
