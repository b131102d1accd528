use std::fmt;

/// Fixed view-label vocabulary offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewLabel {
    FourChamber,
    ThreeChamber,
    Lvot,
    Rvot,
    TwoChamberLeft,
    TwoChamberRight,
    ShortAxis,
    Other,
}

impl ViewLabel {
    pub const ALL: [ViewLabel; 8] = [
        ViewLabel::FourChamber,
        ViewLabel::ThreeChamber,
        ViewLabel::Lvot,
        ViewLabel::Rvot,
        ViewLabel::TwoChamberLeft,
        ViewLabel::TwoChamberRight,
        ViewLabel::ShortAxis,
        ViewLabel::Other,
    ];

    /// Key passed to the annotation store.
    pub fn key(self) -> &'static str {
        match self {
            ViewLabel::FourChamber => "4ch",
            ViewLabel::ThreeChamber => "3ch",
            ViewLabel::Lvot => "lvot",
            ViewLabel::Rvot => "rvot",
            ViewLabel::TwoChamberLeft => "2ch lt",
            ViewLabel::TwoChamberRight => "2ch rt",
            ViewLabel::ShortAxis => "sa",
            ViewLabel::Other => "other",
        }
    }

    /// Case-insensitive lookup by key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for ViewLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_uppercase())
    }
}
