use anyhow::{anyhow, Context, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, GenericImageView, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Lossless,
    Jpeg(u8),
}

pub fn parse_quality(s: &str) -> Result<Quality> {
    match s {
        "lossless" => Ok(Quality::Lossless),
        _ => match s.parse::<u8>() {
            Ok(q @ 1..=100) => Ok(Quality::Jpeg(q)),
            _ => Err(anyhow!(
                "quality must be 'lossless' or a JPEG quality from 1 to 100, got '{s}'"
            )),
        },
    }
}

/// The stamp image, decoded once and pre-encoded as PDF image XObject
/// streams. Cloned into every document it is stamped onto.
#[derive(Debug, Clone)]
pub struct StampImage {
    width: u32,
    height: u32,
    samples: Stream,
    smask: Option<Stream>,
}

pub fn load(path: &Path, quality: Quality) -> Result<StampImage> {
    let img = image::open(path)
        .with_context(|| format!("cannot decode image {}", path.display()))?;
    StampImage::from_image(&img, quality)
}

impl StampImage {
    pub fn from_image(img: &DynamicImage, quality: Quality) -> Result<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(anyhow!("image has no pixels"));
        }

        let smask = if img.color().has_alpha() {
            let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p[3]).collect();
            Some(image_xobject(
                (width, height),
                "DeviceGray",
                "FlateDecode",
                deflate(&alpha)?,
            ))
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            samples: encode_image_stream(img.to_rgb8(), quality)?,
            smask,
        })
    }

    /// Natural size in PDF user-space units (one pixel per unit).
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    pub fn has_alpha(&self) -> bool {
        self.smask.is_some()
    }

    /// Adds the image (and its soft mask) to `doc`, returning the id of the
    /// image XObject.
    pub fn embed(&self, doc: &mut Document) -> ObjectId {
        let mut samples = self.samples.clone();
        if let Some(smask) = &self.smask {
            let smask_id = doc.add_object(smask.clone());
            samples.dict.set("SMask", Object::Reference(smask_id));
        }
        doc.add_object(samples)
    }
}

fn encode_image_stream(rgb: RgbImage, quality: Quality) -> Result<Stream> {
    let size = rgb.dimensions();
    let (filter, data) = match quality {
        Quality::Lossless => ("FlateDecode", deflate(rgb.as_raw())?),
        Quality::Jpeg(q) => {
            let mut buf: Vec<u8> = Vec::new();
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, q);
            DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;
            ("DCTDecode", buf)
        }
    };
    Ok(image_xobject(size, "DeviceRGB", filter, data))
}

/// An 8-bit image XObject stream whose samples are already encoded with
/// `filter`.
fn image_xobject((w, h): (u32, u32), color_space: &str, filter: &str, data: Vec<u8>) -> Stream {
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => w as i64,
        "Height" => h as i64,
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8_i64,
        "Filter" => Object::Name(filter.as_bytes().to_vec()),
    };
    Stream::new(dict, data)
}

pub(crate) fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
