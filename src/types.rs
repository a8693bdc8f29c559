use core::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

/// Contains the resolution of a display
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Creates a new resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Color depth of a display mode in bits per pixel
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ColorDepth(pub u32);

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpp", self.0)
    }
}

/// Refresh rate of a display mode in Hz.
///
/// Drivers report `0` for "hardware default", which never counts as a selectable frequency.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RefreshRate(pub u32);

impl RefreshRate {
    /// Whether the driver reported an actual frequency
    pub fn is_specified(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Errors that occur while parsing a refresh rate from a string
#[derive(Error, Debug)]
pub enum ParseRefreshRateError {
    #[error("Error parsing integer")]
    IntError(#[from] std::num::ParseIntError),
    #[error("Refresh rate must be greater than zero")]
    Zero,
}

impl FromStr for RefreshRate {
    type Err = ParseRefreshRateError;

    /// Accepts `144`, `144hz` and `144 Hz`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix("Hz")
            .or_else(|| trimmed.strip_suffix("hz"))
            .or_else(|| trimmed.strip_suffix("HZ"))
            .unwrap_or(trimmed)
            .trim_end();
        match digits.parse()? {
            0 => Err(ParseRefreshRateError::Zero),
            hz => Ok(RefreshRate(hz)),
        }
    }
}

bitflags! {
    /// Which fields of a display mode the OS should look at when changing modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct ModeFields: u32 {
        const POSITION = 0x0000_0020;
        const DISPLAY_ORIENTATION = 0x0000_0080;
        const DISPLAY_FIXED_OUTPUT = 0x2000_0000;
        const BITS_PER_PEL = 0x0004_0000;
        const PELS_WIDTH = 0x0008_0000;
        const PELS_HEIGHT = 0x0010_0000;
        const DISPLAY_FREQUENCY = 0x0040_0000;
    }
}

impl ModeFields {
    /// The mask used for a refresh rate change. Width, height and depth have to be
    /// flagged too, otherwise the OS treats them as unspecified and may pick another mode.
    pub const REFRESH_CHANGE: ModeFields = ModeFields::PELS_WIDTH
        .union(ModeFields::PELS_HEIGHT)
        .union(ModeFields::BITS_PER_PEL)
        .union(ModeFields::DISPLAY_FREQUENCY);
}

/// Driver specific part of a display mode, carried around as raw bytes.
///
/// Never interpreted outside of the platform backend that produced it.
#[derive(Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DriverFields(Vec<u8>);

impl DriverFields {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DriverFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DriverFields({} bytes)", self.0.len())
    }
}

/// A single configuration a display adapter can run in
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DisplayMode {
    pub resolution: Resolution,
    pub color_depth: ColorDepth,
    pub refresh_rate: RefreshRate,
    pub fields: ModeFields,
    #[serde(skip)]
    pub driver: DriverFields,
}

impl DisplayMode {
    /// Creates a mode without any driver specific data
    pub fn new(resolution: Resolution, color_depth: ColorDepth, refresh_rate: RefreshRate) -> Self {
        Self {
            resolution,
            color_depth,
            refresh_rate,
            fields: ModeFields::REFRESH_CHANGE,
            driver: DriverFields::default(),
        }
    }

    /// Whether this mode runs at exactly the given resolution and color depth
    pub fn same_geometry(&self, resolution: Resolution, color_depth: ColorDepth) -> bool {
        self.resolution == resolution && self.color_depth == color_depth
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}, {}", self.resolution, self.refresh_rate, self.color_depth)
    }
}
