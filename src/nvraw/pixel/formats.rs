//! Pixel encoding tags carried by the capture chunk.

use std::fmt;

/// Sensor output data format, as stored in capture chunk revision 6+.
///
/// Raw values follow the native enum's declaration order. Values outside the
/// table are kept as [`OutputDataFormat::Unknown`] and resolved best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputDataFormat {
    #[default]
    Linear10,
    Packed2x11,
    Packed3x12,
    Linear12,
    CombinedCompressed12,
    CombinedCompressed12Extended,
    Linear16,
    LogDomain16,
    LogDomain16Extended,
    Linear20,
    Linear20Extended,
    Compressed12,
    Fp16,
    CombinedCompressed16,
    Unknown(u32),
}

impl OutputDataFormat {
    const TABLE: [OutputDataFormat; 14] = [
        Self::Linear10,
        Self::Packed2x11,
        Self::Packed3x12,
        Self::Linear12,
        Self::CombinedCompressed12,
        Self::CombinedCompressed12Extended,
        Self::Linear16,
        Self::LogDomain16,
        Self::LogDomain16Extended,
        Self::Linear20,
        Self::Linear20Extended,
        Self::Compressed12,
        Self::Fp16,
        Self::CombinedCompressed16,
    ];

    pub fn from_raw(raw: u32) -> Self {
        Self::TABLE
            .get(raw as usize)
            .copied()
            .unwrap_or(Self::Unknown(raw))
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Unknown(raw) => raw,
            known => Self::TABLE
                .iter()
                .position(|&f| f == known)
                .map_or(u32::MAX, |i| i as u32),
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Encodings the native codec has to expand before samples are linear.
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            Self::CombinedCompressed12
                | Self::CombinedCompressed12Extended
                | Self::Compressed12
                | Self::CombinedCompressed16
        )
    }

    /// Bits of precision once decoded, for formats that define one.
    pub fn precision_bits(self) -> Option<u32> {
        match self {
            Self::CombinedCompressed12 | Self::CombinedCompressed12Extended | Self::Compressed12 => {
                Some(16)
            }
            Self::CombinedCompressed16 => Some(20),
            _ => self.linear_bits(),
        }
    }

    /// Bit depth of the explicit N-bit linear tags.
    pub fn linear_bits(self) -> Option<u32> {
        match self {
            Self::Linear10 => Some(10),
            Self::Linear12 => Some(12),
            Self::Linear16 => Some(16),
            Self::Linear20 | Self::Linear20Extended => Some(20),
            _ => None,
        }
    }
}

/// In-memory sample representation of the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Int16,
    S114,
    U16,
    IspFp16,
    Other(String),
}

impl PixelFormat {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "int16" => Self::Int16,
            "s114" | "s1.14" => Self::S114,
            "u16" => Self::U16,
            "ispfp" | "ispfp16" | "isp_fp16" => Self::IspFp16,
            _ => Self::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Int16 => "int16",
            Self::S114 => "s114",
            Self::U16 => "u16",
            Self::IspFp16 => "ispfp16",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values_round_trip() {
        for raw in 0..14 {
            let format = OutputDataFormat::from_raw(raw);
            assert!(format.is_known());
            assert_eq!(format.raw(), raw);
        }
        assert_eq!(OutputDataFormat::from_raw(14), OutputDataFormat::Unknown(14));
        assert_eq!(OutputDataFormat::Unknown(99).raw(), 99);
    }

    #[test]
    fn test_precision_table() {
        assert_eq!(OutputDataFormat::Linear10.precision_bits(), Some(10));
        assert_eq!(OutputDataFormat::Linear16.precision_bits(), Some(16));
        assert_eq!(OutputDataFormat::CombinedCompressed12.precision_bits(), Some(16));
        assert_eq!(OutputDataFormat::CombinedCompressed16.precision_bits(), Some(20));
        assert_eq!(OutputDataFormat::Linear20Extended.precision_bits(), Some(20));
        assert_eq!(OutputDataFormat::Packed2x11.precision_bits(), None);
        assert_eq!(OutputDataFormat::Unknown(77).precision_bits(), None);
    }

    #[test]
    fn test_pixel_format_names() {
        assert_eq!(PixelFormat::from_name("INT16"), PixelFormat::Int16);
        assert_eq!(PixelFormat::from_name("s1.14"), PixelFormat::S114);
        assert_eq!(PixelFormat::from_name("yuv"), PixelFormat::Other("yuv".into()));
        assert_eq!(PixelFormat::Other("yuv".into()).as_str(), "yuv");
    }
}
