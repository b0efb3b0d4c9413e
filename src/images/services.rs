use bytes::Bytes;
use image::imageops::FilterType;

/// An uploaded photo, as received from the client.
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Normalized model input: `size`×`size` RGB pixels, HWC layout, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub size: u32,
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub const CHANNELS: usize = 3;

    /// Rows of pixels of channels, the shape TF-Serving expects for one instance.
    pub fn to_nested(&self) -> Vec<Vec<[f32; 3]>> {
        let side = self.size as usize;
        self.data
            .chunks_exact(side * Self::CHANNELS)
            .map(|row| {
                row.chunks_exact(Self::CHANNELS)
                    .map(|px| [px[0], px[1], px[2]])
                    .collect()
            })
            .collect()
    }
}

pub fn is_supported_mime(ct: &str) -> bool {
    ext_from_mime(ct).is_some()
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

/// Decode, convert to RGB, resize to the model's square input and scale to `[0, 1]`.
pub fn preprocess(item: &UploadItem, size: u32) -> Result<ImageTensor, image::ImageError> {
    let decoded = image::load_from_memory(&item.body)?;
    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, size, size, FilterType::CatmullRom);

    let data = resized
        .pixels()
        .flat_map(|p| p.0)
        .map(|c| f32::from(c) / 255.0)
        .collect();

    Ok(ImageTensor { size, data })
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}
