use crate::frame::{IntensityImage, Window};
use anyhow::Result;
use std::path::Path;

/// One decoded per-frame file before windowing.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub pixels: IntensityImage,
    /// `None` when the file carries no window tags.
    pub window: Option<Window>,
    pub series_id: Option<String>,
    pub description: String,
    pub pulse_sequence: String,
}

/// Decodes a single per-frame file of a series.
pub trait FrameReader {
    /// Whether `path` looks like a frame file this reader understands.
    fn accepts(&self, path: &Path) -> bool;

    fn read_frame(&self, path: &Path) -> Result<RawFrame>;
}

/// Case-insensitive extension match.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case(extension),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("IM_0001.dcm", true)]
    #[case("IM_0001.DCM", true)]
    #[case("notes.txt", false)]
    #[case("DICOMDIR", false)]
    #[case("archive.dcm.bak", false)]
    fn extension_match_ignores_case(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(has_extension(Path::new(name), "dcm"), expected);
    }
}
