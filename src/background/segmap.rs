use serde::{Deserialize, Serialize};

use crate::foundation::error::FxError;

const BLACK: [u8; 3] = [0, 0, 0];
const WHITE: [u8; 3] = [255, 255, 255];
const MAGENTA: [u8; 3] = [255, 0, 255];

/// What a classified pixel is painted as in the segmentation map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmapMode {
    /// Black background, white foreground.
    #[default]
    OnlySegmap,
    /// Background pixels keep their color; foreground becomes a magenta/black checkerboard.
    Background,
    /// Foreground pixels keep their color; background becomes black.
    Foreground,
}

impl SegmapMode {
    pub const ALL: [SegmapMode; 3] = [Self::OnlySegmap, Self::Background, Self::Foreground];

    /// Human-readable name for pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::OnlySegmap => "Segmentation mask",
            Self::Background => "Background image",
            Self::Foreground => "Foreground overlay",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnlySegmap => "only-segmap",
            Self::Background => "background",
            Self::Foreground => "foreground",
        }
    }

    #[inline]
    pub(crate) fn background_px(self, src: [u8; 3]) -> [u8; 3] {
        match self {
            Self::Background => src,
            Self::OnlySegmap | Self::Foreground => BLACK,
        }
    }

    #[inline]
    pub(crate) fn foreground_px(self, src: [u8; 3], x: u32, y: u32) -> [u8; 3] {
        match self {
            Self::Foreground => src,
            Self::Background => {
                if (x + y) % 2 == 0 {
                    MAGENTA
                } else {
                    BLACK
                }
            }
            Self::OnlySegmap => WHITE,
        }
    }
}

impl std::fmt::Display for SegmapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SegmapMode {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "only-segmap" | "onlysegmap" | "segmap" | "mask" => Ok(Self::OnlySegmap),
            "background" | "bg" => Ok(Self::Background),
            "foreground" | "fg" => Ok(Self::Foreground),
            other => Err(FxError::validation(format!(
                "unknown segmap mode '{other}'"
            ))),
        }
    }
}
