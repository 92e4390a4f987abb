/// 8-bit sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(rgb: u32) -> Self {
        Self((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// CSS form, e.g. `#43a047`.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub const GREEN: Rgb = Rgb::from_hex(0x43a047);
pub const AMBER: Rgb = Rgb::from_hex(0xff9800);
pub const RED: Rgb = Rgb::from_hex(0xe53935);
pub const NEUTRAL_GREY: Rgb = Rgb::from_hex(0x9e9e9e);

/// Qualitative reliability band shared by markers, gauges and tags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tone {
    Good,
    Warning,
    Bad,
    /// Not enough information to classify.
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Good, Tone::Warning, Tone::Bad, Tone::Neutral];

    pub fn color(self) -> Rgb {
        match self {
            Tone::Good => GREEN,
            Tone::Warning => AMBER,
            Tone::Bad => RED,
            Tone::Neutral => NEUTRAL_GREY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tone::Good => "good",
            Tone::Warning => "warning",
            Tone::Bad => "bad",
            Tone::Neutral => "neutral",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Marker icon geometry, in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub size_px: [u32; 2],
    /// Icon pixel that sits on the point's position.
    pub anchor_px: [i32; 2],
    pub popup_anchor_px: [i32; 2],
    pub stroke: Rgb,
    pub stroke_width: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size_px: [32, 32],
            anchor_px: [16, 32],
            popup_anchor_px: [0, -32],
            stroke: Rgb(0, 0, 0),
            stroke_width: 1.5,
        }
    }
}
