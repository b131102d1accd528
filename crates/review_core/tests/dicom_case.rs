mod common;

use anyhow::Result;
use common::{FrameSpec, write_dicom};
use review_core::{DicomFrameReader, FrameReader, ReviewConfig, ReviewSession, ViewLabel};
use std::fs;
use tempfile::tempdir;

fn flat<'a>(series_uid: &'a str, description: &'static str, value: u16) -> FrameSpec<'a> {
    FrameSpec {
        series_uid,
        description,
        rows: 2,
        cols: 3,
        pixels: vec![value; 6],
        window: Some(("60", "80")),
    }
}

#[test]
fn reader_extracts_pixels_window_and_metadata() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("IM0001.dcm");
    let fixture = FrameSpec {
        pixels: vec![0, 20, 50, 100, 150, 200],
        ..flat("1.2.826.0.1.3", "CINE 4CH", 0)
    };
    write_dicom(&path, 1, &fixture)?;

    let reader = DicomFrameReader::default();
    assert!(reader.accepts(&path));
    let raw = reader.read_frame(&path)?;
    assert_eq!(raw.pixels.dimensions(), (3, 2));
    assert_eq!(raw.pixels.as_raw(), &vec![0.0, 20.0, 50.0, 100.0, 150.0, 200.0]);
    let window = raw.window.expect("window tags present");
    assert_eq!((window.center, window.width), (60.0, 80.0));
    assert_eq!(raw.series_id.as_deref(), Some("1.2.826.0.1.3"));
    assert_eq!(raw.description, "CINE 4CH");
    assert_eq!(raw.pulse_sequence, "GR");
    Ok(())
}

#[test]
fn reader_falls_back_without_window_tags() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("IM0001.dcm");
    let fixture = FrameSpec {
        window: None,
        ..flat("1.2.3.4", "SAX", 10)
    };
    write_dicom(&path, 1, &fixture)?;
    let raw = DicomFrameReader::default().read_frame(&path)?;
    assert!(raw.window.is_none());
    Ok(())
}

#[test]
fn session_over_dicom_case() -> Result<()> {
    let dir = tempdir()?;
    let case_dir = dir.path().join("CAP_017");
    let s1 = case_dir.join("001_cine");
    let s2 = case_dir.join("002_sax");
    write_dicom(&s1.join("IM0001.dcm"), 1, &flat("1.2.40.1", "CINE 4CH", 150))?;
    write_dicom(&s1.join("IM0002.dcm"), 2, &flat("1.2.40.1", "CINE 4CH", 150))?;
    fs::write(s1.join("IM0003.dcm"), b"not dicom")?;
    fs::write(s1.join("notes.txt"), "ignored")?;
    write_dicom(&s2.join("IM0001.dcm"), 1, &flat("1.2.40.2", "SAX STACK", 90))?;

    let config = ReviewConfig {
        output_dir: dir.path().join("output"),
        display_size: 8,
        ..ReviewConfig::default()
    };
    let mut session = ReviewSession::open(&case_dir, config)?;
    assert_eq!(session.patient_id(), "CAP_017");

    let display = session.display();
    assert_eq!(display.series_id, "1.2.40.1");
    assert_eq!(display.frame_count, 2);
    assert_eq!(display.description, "CINE 4CH");
    assert_eq!(display.pulse_sequence, "GR");

    // 3x2 content scaled to 8x5 with one padding row on top.
    let frame = session.displayed_frame().expect("first frame");
    assert_eq!(frame.image.dimensions(), (8, 8));
    assert_eq!(frame.image.get_pixel(4, 0).0[0], 0);
    assert_eq!(frame.image.get_pixel(4, 3).0[0], 255);

    let step = session.assign_and_advance(ViewLabel::FourChamber.key())?;
    assert!(step.advanced);
    assert_eq!(session.current_series_id(), "1.2.40.2");

    let saved = session.save()?;
    let mut rdr = csv::Reader::from_path(&saved)?;
    let rows: Vec<(String, String)> = rdr
        .records()
        .map(|r| r.map(|r| (r[0].to_string(), r[1].to_string())))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        rows,
        vec![
            ("001_cine/IM0001.dcm".to_string(), "4CH".to_string()),
            ("001_cine/IM0002.dcm".to_string(), "4CH".to_string()),
        ]
    );
    Ok(())
}
