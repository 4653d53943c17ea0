use crate::nvraw::pixel::PixelFormat;

/// Converts a stored sample to a linear `bits`-deep value.
///
/// S1.14 samples sit below bit 14, U16 samples are MSB-aligned; both special
/// case 14-bit data. ISP FP16 and unnamed formats have no integer conversion.
pub fn convert_sample(value: u32, format: &PixelFormat, bits: u32) -> Option<u32> {
    let bits = bits.clamp(1, 16);
    let mask = (1u32 << bits) - 1;
    match format {
        PixelFormat::S114 => {
            let shift = if bits == 14 { 1 } else { 14u32.saturating_sub(bits) };
            Some((value >> shift) & mask)
        }
        PixelFormat::Int16 => Some(value & mask),
        PixelFormat::U16 => {
            let shift = if bits == 14 { 16 - 13 } else { 16 - bits };
            Some((value >> shift) & mask)
        }
        PixelFormat::IspFp16 | PixelFormat::Other(_) => None,
    }
}
