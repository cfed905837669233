//!
//! Contains a number of tools that are useful when working with EBML encoded files.
//!

use std::io::{Read, Seek, SeekFrom, ErrorKind};

use super::errors::tool::ToolError;

///
/// Trait to enable easy serialization to a vint.
///
/// This is only available for types that can be cast as `u64`.  The produced vint always carries its length marker, which makes it suitable for element sizes.
///
pub trait Vint: Into<u64> + Copy {
    ///
    /// Returns a representation of the current value as a vint array.
    ///
    /// # Errors
    ///
    /// This can return an error if the value is too large to be representable as a vint.
    ///
    fn as_vint(&self) -> Result<Vec<u8>, ToolError> {
        let val: u64 = (*self).into();
        check_size_u64(val, 8)?;
        let mut length = 1;
        while length <= 8 {
            if val < (1 << (7 * length)) {
                break;
            }
            length += 1;
        }

        Ok(as_vint_no_check_u64(val, length))
    }

    ///
    /// Returns a representation of the current value as a vint array with a specified length.
    ///
    /// # Errors
    ///
    /// This can return an error if the value is too large to be representable as a vint of that length, or if the length is not between 1 and 8.
    ///
    fn as_vint_with_length(&self, length: usize) -> Result<Vec<u8>, ToolError> {
        let val: u64 = (*self).into();
        if length == 0 || length > 8 {
            return Err(ToolError::WriteVintOverflow(val));
        }
        check_size_u64(val, length)?;
        Ok(as_vint_no_check_u64(val, length))
    }
}

impl Vint for u64 { }
impl Vint for u32 { }
impl Vint for u16 { }
impl Vint for u8 { }

#[inline]
fn check_size_u64(val: u64, max_length: usize) -> Result<(), ToolError> {
    if val >= (1 << max_length * 7) {
        Err(ToolError::WriteVintOverflow(val))
    } else {
        Ok(())
    }
}

#[inline]
fn as_vint_no_check_u64(val: u64, length: usize) -> Vec<u8> {
    let bytes: [u8; 8] = val.to_be_bytes();
    let mut result: Vec<u8> = Vec::from(&bytes[(8-length)..]);
    result[0] |= 1 << (8 - length);
    result
}

#[inline]
fn minimal_length(val: u64) -> usize {
    let significant_bits = 64 - val.leading_zeros() as usize;
    ((significant_bits + 7) / 8).max(1)
}

///
/// Returns the total length of a vint given its first byte, or `None` if the byte carries no length marker.
///
#[inline]
pub fn vint_length(first_byte: u8) -> Option<usize> {
    if first_byte == 0 {
        None
    } else {
        Some(8 - first_byte.ilog2() as usize)
    }
}

///
/// Encodes a value as a vint.
///
/// With `shortest_form` the result uses as few bytes as possible; otherwise the full 8 byte big-endian form is produced. With `include_marker` the length marker is merged into the leading byte (the convention for element sizes). Without it the bytes are returned as-is, which is how element ids are written since they already carry their own marker.
///
/// # Errors
///
/// This returns an error if the value collides with the length marker, i.e. it is too large to be represented with a marker.
///
/// ## Example
///
/// ```
/// # use ebml_tree::tools::encode_vint;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(vec![0x81], encode_vint(1, true, true)?);
/// assert_eq!(vec![0x1a, 0x45, 0xdf, 0xa3], encode_vint(0x1a45dfa3, false, true)?);
/// assert_eq!(vec![0x01, 0, 0, 0, 0, 0, 0, 0x05], encode_vint(5, true, false)?);
/// # Ok(())
/// # }
/// ```
///
pub fn encode_vint(value: u64, include_marker: bool, shortest_form: bool) -> Result<Vec<u8>, ToolError> {
    if !shortest_form {
        let mut bytes = value.to_be_bytes().to_vec();
        if include_marker {
            if bytes[0] != 0 {
                return Err(ToolError::WriteVintOverflow(value));
            }
            bytes[0] |= 0x01;
        }
        return Ok(bytes);
    }

    if include_marker {
        value.as_vint()
    } else {
        let length = minimal_length(value);
        Ok(Vec::from(&value.to_be_bytes()[(8 - length)..]))
    }
}

///
/// Reads a vint from the beginning of the input array slice.
///
/// This method returns an option with the `None` variant used to indicate there was not enough data in the buffer to completely read a vint.
///
/// The returned tuple contains the value of the vint (`u64`) and the length of the vint (`usize`).  The length will be less than or equal to the length of the input slice.  If `strip_marker` is false the length marker stays part of the value, which is how element ids are interpreted.
///
/// # Errors
///
/// This method can return a `ToolError` if the input array cannot be read as a vint.
///
pub fn read_vint(buffer: &[u8], strip_marker: bool) -> Result<Option<(u64, usize)>, ToolError> {
    if buffer.is_empty() {
        return Ok(None);
    }

    let length = vint_length(buffer[0]).ok_or(ToolError::ReadVintOverflow)?;

    if length > buffer.len() {
        // Not enough data in the buffer to read out the vint value
        return Ok(None);
    }

    let mut value = buffer[0] as u64;
    if strip_marker {
        value -= 1 << (8 - length);
    }

    for item in buffer.iter().take(length).skip(1) {
        value <<= 8;
        value += *item as u64;
    }

    Ok(Some((value, length)))
}

fn read_up_to<R: Read>(source: &mut R, buffer: &mut [u8]) -> Result<usize, ToolError> {
    let mut filled = 0;
    while filled < buffer.len() {
        match source.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(ToolError::ReadError { source }),
        }
    }
    Ok(filled)
}

///
/// Reads a vint located at an absolute `position` of a seekable source.
///
/// Returns the decoded value and the position immediately following the vint.  As with [`read_vint`], `strip_marker` controls whether the length marker is removed from the value.
///
/// # Errors
///
/// Returns [`ToolError::ReadVintOverflow`] if the first byte carries no length marker and [`ToolError::ReadVintTruncated`] if the source ends before the vint does.
///
pub fn read_vint_from<R: Read + Seek>(source: &mut R, position: u64, strip_marker: bool) -> Result<(u64, u64), ToolError> {
    source.seek(SeekFrom::Start(position)).map_err(|source| ToolError::ReadError { source })?;

    let mut buffer = [0u8; 8];
    if read_up_to(source, &mut buffer[..1])? == 0 {
        return Err(ToolError::ReadVintTruncated { position, expected: 1, available: 0 });
    }

    let length = vint_length(buffer[0]).ok_or(ToolError::ReadVintOverflow)?;
    let available = 1 + read_up_to(source, &mut buffer[1..length])?;
    if available < length {
        return Err(ToolError::ReadVintTruncated { position, expected: length, available });
    }

    match read_vint(&buffer[..length], strip_marker)? {
        Some((value, length)) => Ok((value, position + length as u64)),
        None => Err(ToolError::ReadVintTruncated { position, expected: length, available }),
    }
}

///
/// Returns the encoded width of an element id.
///
/// Element ids carry their own length marker, so the width is implied by the value.  This checks that the marker in the leading byte agrees with the number of significant bytes.
///
/// # Errors
///
/// Returns [`ToolError::InvalidElementId`] for `0` and for values whose marker does not match their width.
///
pub fn id_width(id: u64) -> Result<usize, ToolError> {
    if id == 0 {
        return Err(ToolError::InvalidElementId(id));
    }

    let length = minimal_length(id);
    let leading_byte = id.to_be_bytes()[8 - length];
    match vint_length(leading_byte) {
        Some(marker_length) if marker_length == length => Ok(length),
        _ => Err(ToolError::InvalidElementId(id)),
    }
}

///
/// Builds an element header (id followed by the size in its shortest form).
///
pub fn encode_header(id: u64, size: u64) -> Result<Vec<u8>, ToolError> {
    id_width(id)?;
    let mut header = encode_vint(id, false, true)?;
    header.extend(size.as_vint()?);
    Ok(header)
}

///
/// Builds a header for `id` such that the header and the payload size it declares add up to exactly `footprint` bytes.
///
/// The narrowest size field that can describe the remaining payload is used, which is not always the shortest encoding of that payload size.
///
/// # Errors
///
/// Returns [`ToolError::HeaderDoesNotFit`] if the footprint is smaller than the smallest possible header.
///
pub fn make_header(id: u64, footprint: u64) -> Result<Vec<u8>, ToolError> {
    let id_length = id_width(id)? as u64;
    for size_length in 1..=8u64 {
        if footprint < id_length + size_length {
            break;
        }
        let size = footprint - id_length - size_length;
        if let Ok(size_vint) = size.as_vint_with_length(size_length as usize) {
            let mut header = encode_vint(id, false, true)?;
            header.extend(size_vint);
            return Ok(header);
        }
    }
    Err(ToolError::HeaderDoesNotFit { id, footprint })
}

///
/// Reads a `u64` value from any length array slice.
///
/// Rather than forcing the input to be a `[u8; 8]` like standard library methods, this can interpret a `u64` from a slice of any length < 8.  Bytes are assumed to be least significant when reading the value - i.e. an array of `[4, 0]` would return a value of `1024`.
///
/// # Errors
///
/// This method will return an error if the input slice has a length > 8.
///
/// ## Example
///
/// ```
/// # use ebml_tree::tools::arr_to_u64;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = arr_to_u64(&[16,0])?;
/// assert_eq!(result, 4096);
/// # Ok(())
/// # }
/// ```
///
pub fn arr_to_u64(arr: &[u8]) -> Result<u64, ToolError> {
    if arr.len() > 8 {
        return Err(ToolError::ReadU64Overflow(Vec::from(arr)));
    }

    let mut val = 0u64;
    for byte in arr {
        val <<= 8;
        val += *byte as u64;
    }
    Ok(val)
}

///
/// Reads an `i64` value from any length array slice.
///
/// Rather than forcing the input to be a `[u8; 8]` like standard library methods, this can interpret an `i64` from a slice of any length < 8.  The most significant bit of the first byte is treated as the sign bit.  An empty slice reads as `0`.
///
/// # Errors
///
/// This method will return an error if the input slice has a length > 8.
///
/// ## Example
///
/// ```
/// # use ebml_tree::tools::arr_to_i64;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(arr_to_i64(&[4,0])?, 1024);
/// assert_eq!(arr_to_i64(&[0xff, 0xfe])?, -2);
/// # Ok(())
/// # }
/// ```
///
pub fn arr_to_i64(arr: &[u8]) -> Result<i64, ToolError> {
    if arr.len() > 8 {
        return Err(ToolError::ReadI64Overflow(Vec::from(arr)));
    }
    if arr.is_empty() {
        return Ok(0);
    }

    let shift = 64 - 8 * arr.len() as u32;
    let unsigned = arr_to_u64(arr)?;
    Ok(((unsigned << shift) as i64) >> shift)
}

///
/// Reads an `f64` value from an array slice of length 4, 8 or 10.
///
/// This method wraps `f32` and `f64` conversions from big endian byte arrays and casts the result as an `f64`.  Ten byte values are interpreted as x87 extended precision floats (see [`f80_to_f64`]).
///
/// # Errors
///
/// This method will return an error if the input slice length is not 4, 8 or 10.
///
pub fn arr_to_f64(arr: &[u8]) -> Result<f64, ToolError> {
    match arr.len() {
        4 => {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(arr);
            Ok(f32::from_be_bytes(bytes) as f64)
        },
        8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(arr);
            Ok(f64::from_be_bytes(bytes))
        },
        10 => {
            let mut bytes = [0u8; 10];
            bytes.copy_from_slice(arr);
            Ok(f80_to_f64(&bytes))
        },
        _ => Err(ToolError::ReadF64Mismatch(Vec::from(arr))),
    }
}

///
/// Converts a big endian x87 extended precision float (1 sign bit, 15 exponent bits, 64 bit mantissa with an explicit integer bit) to the nearest `f64`.
///
pub fn f80_to_f64(arr: &[u8; 10]) -> f64 {
    let negative = arr[0] & 0x80 != 0;
    let exponent = (((arr[0] & 0x7f) as i32) << 8) | arr[1] as i32;
    let mut mantissa_bytes = [0u8; 8];
    mantissa_bytes.copy_from_slice(&arr[2..]);
    let mantissa = u64::from_be_bytes(mantissa_bytes);

    let magnitude = if exponent == 0 && mantissa == 0 {
        0.0
    } else if exponent == 0x7fff {
        if mantissa << 1 == 0 { f64::INFINITY } else { f64::NAN }
    } else {
        // The mantissa holds the integer bit, so scale it into [0, 2) first.
        (mantissa as f64) * 2f64.powi(-63) * 2f64.powi(exponent.max(1) - 16383)
    };

    if negative { -magnitude } else { magnitude }
}
