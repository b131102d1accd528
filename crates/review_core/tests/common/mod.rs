use anyhow::Result;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use std::fs;
use std::path::Path;

const MR_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.4";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

pub struct FrameSpec<'a> {
    pub series_uid: &'a str,
    pub description: &'a str,
    pub rows: u16,
    pub cols: u16,
    pub pixels: Vec<u16>,
    /// (center, width) as decimal strings.
    pub window: Option<(&'a str, &'a str)>,
}

/// Write a single-frame 16-bit MR object in explicit VR little endian.
pub fn write_dicom(path: &Path, instance: u32, fixture: &FrameSpec<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let sop_instance = format!("{}.{instance}", fixture.series_uid);
    let mut elements = vec![
        DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(MR_IMAGE_STORAGE)),
        DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from(sop_instance.as_str())),
        DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from(fixture.series_uid)),
        DataElement::new(tags::SERIES_DESCRIPTION, VR::LO, PrimitiveValue::from(fixture.description)),
        DataElement::new(tags::SCANNING_SEQUENCE, VR::CS, PrimitiveValue::from("GR")),
        DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(fixture.rows)),
        DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(fixture.cols)),
        DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16_u16)),
        DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
    ];
    if let Some((center, width)) = fixture.window {
        elements.push(DataElement::new(tags::WINDOW_CENTER, VR::DS, PrimitiveValue::from(center)));
        elements.push(DataElement::new(tags::WINDOW_WIDTH, VR::DS, PrimitiveValue::from(width)));
    }
    elements.push(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(fixture.pixels.iter().copied().collect()),
    ));

    let obj = InMemDicomObject::from_element_iter(elements);
    let file = obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(EXPLICIT_VR_LE)
            .media_storage_sop_class_uid(MR_IMAGE_STORAGE)
            .media_storage_sop_instance_uid(sop_instance.as_str()),
    )?;
    file.write_to_file(path)?;
    Ok(())
}
