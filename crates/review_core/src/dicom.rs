//! Per-frame DICOM reader for native (uncompressed) little-endian pixel data.

use crate::frame::{IntensityImage, Window};
use crate::reader::{FrameReader, RawFrame, has_extension};
use anyhow::{Context, Result, bail};
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{InMemDicomObject, open_file};
use std::path::Path;

const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

/// Reads one DICOM file per frame.
#[derive(Debug, Clone)]
pub struct DicomFrameReader {
    extension: String,
}

impl DicomFrameReader {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Default for DicomFrameReader {
    fn default() -> Self {
        Self::new("dcm")
    }
}

impl FrameReader for DicomFrameReader {
    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &self.extension)
    }

    fn read_frame(&self, path: &Path) -> Result<RawFrame> {
        let file = open_file(path)
            .with_context(|| format!("cannot open DICOM file {}", path.display()))?;

        let ts = file.meta().transfer_syntax().trim_end_matches('\0');
        if ts == EXPLICIT_VR_BIG_ENDIAN {
            bail!("big endian transfer syntax is not supported");
        }

        let obj: &InMemDicomObject = &file;
        let samples = optional_u32(obj, tags::SAMPLES_PER_PIXEL).unwrap_or(1);
        if samples != 1 {
            bail!("expected grayscale data, found {samples} samples per pixel");
        }
        let rows = required_u32(obj, tags::ROWS, "Rows")?;
        let cols = required_u32(obj, tags::COLUMNS, "Columns")?;
        let layout = SampleLayout {
            bits_allocated: required_u32(obj, tags::BITS_ALLOCATED, "BitsAllocated")?,
            bits_stored: optional_u32(obj, tags::BITS_STORED),
            signed: optional_u32(obj, tags::PIXEL_REPRESENTATION).unwrap_or(0) == 1,
        };

        let data = obj
            .element(tags::PIXEL_DATA)
            .context("missing PixelData")?
            .to_bytes()
            .context("pixel data is encapsulated or unreadable")?;
        let pixels = decode_native_pixels(&data, cols, rows, layout)?;

        let window = match (
            first_float(obj, tags::WINDOW_CENTER),
            first_float(obj, tags::WINDOW_WIDTH),
        ) {
            (Some(center), Some(width)) => Some(Window::new(center, width)),
            _ => None,
        };

        Ok(RawFrame {
            pixels,
            window,
            series_id: optional_str(obj, tags::SERIES_INSTANCE_UID),
            description: optional_str(obj, tags::SERIES_DESCRIPTION).unwrap_or_default(),
            pulse_sequence: optional_str(obj, tags::SCANNING_SEQUENCE).unwrap_or_default(),
        })
    }
}

/// How one sample sits in the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    pub bits_allocated: u32,
    /// Defaults to `bits_allocated` when absent.
    pub bits_stored: Option<u32>,
    pub signed: bool,
}

impl SampleLayout {
    pub fn new(bits_allocated: u32, signed: bool) -> Self {
        Self {
            bits_allocated,
            bits_stored: None,
            signed,
        }
    }

    /// Turn the raw little-endian word into an intensity, dropping bits
    /// above the stored range and sign-extending from the stored high bit.
    fn sample(&self, raw: u32, stored: u32) -> f32 {
        let mask = if stored >= 32 { u32::MAX } else { (1 << stored) - 1 };
        let value = raw & mask;
        if self.signed && (value >> (stored - 1)) & 1 == 1 {
            (i64::from(value) - (1_i64 << stored)) as f32
        } else {
            value as f32
        }
    }
}

/// Decode the first frame of little-endian native pixel data.
pub fn decode_native_pixels(
    data: &[u8],
    width: u32,
    height: u32,
    layout: SampleLayout,
) -> Result<IntensityImage> {
    let bits_allocated = layout.bits_allocated;
    let bytes_per_sample = match bits_allocated {
        8 | 16 | 32 => bits_allocated as usize / 8,
        other => bail!("unsupported BitsAllocated: {other}"),
    };
    let stored = layout.bits_stored.unwrap_or(bits_allocated);
    if stored == 0 || stored > bits_allocated {
        bail!("BitsStored {stored} does not fit BitsAllocated {bits_allocated}");
    }

    let count = width as usize * height as usize;
    let needed = count * bytes_per_sample;
    if data.len() < needed {
        bail!(
            "pixel data too short: {} bytes for {width}x{height} at {bits_allocated} bits",
            data.len()
        );
    }

    let values: Vec<f32> = data[..needed]
        .chunks_exact(bytes_per_sample)
        .map(|c| {
            let raw = c
                .iter()
                .rev()
                .fold(0_u32, |acc, &b| (acc << 8) | u32::from(b));
            layout.sample(raw, stored)
        })
        .collect();

    IntensityImage::from_raw(width, height, values).context("pixel buffer size mismatch")
}

fn required_u32(obj: &InMemDicomObject, tag: Tag, name: &str) -> Result<u32> {
    obj.element(tag)
        .with_context(|| format!("missing {name}"))?
        .to_int::<u32>()
        .with_context(|| format!("invalid {name}"))
}

fn optional_u32(obj: &InMemDicomObject, tag: Tag) -> Option<u32> {
    obj.element_opt(tag).ok()??.to_int::<u32>().ok()
}

fn optional_str(obj: &InMemDicomObject, tag: Tag) -> Option<String> {
    let value = obj.element_opt(tag).ok()??.to_str().ok()?;
    let value = value.trim_end_matches('\0').trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn first_float(obj: &InMemDicomObject, tag: Tag) -> Option<f64> {
    obj.element_opt(tag)
        .ok()??
        .to_multi_float64()
        .ok()?
        .first()
        .copied()
}
