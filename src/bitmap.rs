//! Minimal BMP container handling
//!
//! Only the fields needed to locate the pixel array and to stamp a shadow
//! number are interpreted; everything else in the header is carried through
//! unchanged. All multi-byte fields are little-endian.
//!
//! ```text
//! offset  size  field
//!      0     2  "BM"
//!      2     4  file size
//!      6     2  reserved1 (shadow number)
//!      8     2  reserved2
//!     10     4  pixel array offset
//!     18     4  width
//!     22     4  height
//!     28     2  bits per pixel
//!     34     4  image size in bytes
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, ShadowError};

const MAGIC: &[u8; 2] = b"BM";
/// File header plus BITMAPINFOHEADER
pub const MIN_HEADER_SIZE: usize = 54;

const FILE_SIZE_OFFSET: usize = 2;
const RESERVED1_OFFSET: usize = 6;
const PIXEL_OFFSET_OFFSET: usize = 10;
const WIDTH_OFFSET: usize = 18;
const HEIGHT_OFFSET: usize = 22;
const BITS_PER_PIXEL_OFFSET: usize = 28;
const IMAGE_SIZE_OFFSET: usize = 34;

#[inline]
fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// A bitmap split into its opaque header and its pixel array
///
/// # Example
/// ```
/// use shadow_share::Bitmap;
///
/// let mut bitmap = Bitmap::blank(4, 2, 8).unwrap();
/// assert_eq!(bitmap.pixels().len(), 8);
///
/// bitmap.set_shadow_number(3);
/// let parsed = Bitmap::from_bytes(&bitmap.to_bytes()).unwrap();
/// assert_eq!(parsed.shadow_number(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    header: Vec<u8>,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Parses a complete BMP file image
    ///
    /// # Errors
    /// [`ShadowError::InvalidBitmap`] if the magic is missing, the header is
    /// truncated, or the declared sizes do not fit the data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_HEADER_SIZE {
            return Err(ShadowError::InvalidBitmap(format!(
                "{} bytes is shorter than the {MIN_HEADER_SIZE}-byte header",
                bytes.len()
            )));
        }
        if &bytes[..2] != MAGIC {
            return Err(ShadowError::InvalidBitmap("missing BM signature".into()));
        }

        let file_size = read_u32(bytes, FILE_SIZE_OFFSET) as usize;
        let pixel_offset = read_u32(bytes, PIXEL_OFFSET_OFFSET) as usize;
        if file_size > bytes.len() {
            return Err(ShadowError::InvalidBitmap(format!(
                "declared size {file_size} exceeds actual size {}",
                bytes.len()
            )));
        }
        if pixel_offset < MIN_HEADER_SIZE || pixel_offset > file_size {
            return Err(ShadowError::InvalidBitmap(format!(
                "pixel offset {pixel_offset} outside file of {file_size} bytes"
            )));
        }

        // Uncompressed bitmaps may leave the image size as zero
        let image_size = match read_u32(bytes, IMAGE_SIZE_OFFSET) as usize {
            0 => file_size - pixel_offset,
            size => size,
        };
        let header_size = file_size.checked_sub(image_size).ok_or_else(|| {
            ShadowError::InvalidBitmap(format!(
                "image size {image_size} exceeds file size {file_size}"
            ))
        })?;
        if header_size != pixel_offset {
            return Err(ShadowError::InvalidBitmap(format!(
                "pixel array at {pixel_offset} does not follow the {header_size}-byte header"
            )));
        }

        Ok(Self {
            header: bytes[..header_size].to_vec(),
            pixels: bytes[header_size..file_size].to_vec(),
        })
    }

    /// Reads and parses a BMP file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Builds an all-black bitmap with a minimal header.
    ///
    /// Rows are sized `width * bits_per_pixel / 8` bytes without padding,
    /// which matches real files whenever that width is a multiple of four.
    pub fn blank(width: u32, height: u32, bits_per_pixel: u16) -> Result<Self> {
        let row = (width as usize * bits_per_pixel as usize).div_ceil(8);
        let image_size = row * height as usize;
        let file_size = u32::try_from(MIN_HEADER_SIZE + image_size)
            .map_err(|_| ShadowError::InvalidBitmap("dimensions too large".into()))?;

        let mut header = vec![0u8; MIN_HEADER_SIZE];
        header[..2].copy_from_slice(MAGIC);
        header[FILE_SIZE_OFFSET..FILE_SIZE_OFFSET + 4]
            .copy_from_slice(&file_size.to_le_bytes());
        header[PIXEL_OFFSET_OFFSET..PIXEL_OFFSET_OFFSET + 4]
            .copy_from_slice(&(MIN_HEADER_SIZE as u32).to_le_bytes());
        // BITMAPINFOHEADER size
        header[14..18].copy_from_slice(&40u32.to_le_bytes());
        header[WIDTH_OFFSET..WIDTH_OFFSET + 4]
            .copy_from_slice(&width.to_le_bytes());
        header[HEIGHT_OFFSET..HEIGHT_OFFSET + 4]
            .copy_from_slice(&height.to_le_bytes());
        // planes
        header[26..28].copy_from_slice(&1u16.to_le_bytes());
        header[BITS_PER_PIXEL_OFFSET..BITS_PER_PIXEL_OFFSET + 2]
            .copy_from_slice(&bits_per_pixel.to_le_bytes());
        header[IMAGE_SIZE_OFFSET..IMAGE_SIZE_OFFSET + 4]
            .copy_from_slice(&(image_size as u32).to_le_bytes());

        Ok(Self {
            header,
            pixels: vec![0u8; image_size],
        })
    }

    /// Replaces the pixel array, keeping its length
    pub fn with_pixels(mut self, pixels: &[u8]) -> Result<Self> {
        if pixels.len() != self.pixels.len() {
            return Err(ShadowError::InvalidBitmap(format!(
                "expected {} pixel bytes, got {}",
                self.pixels.len(),
                pixels.len()
            )));
        }
        self.pixels.copy_from_slice(pixels);
        Ok(self)
    }

    /// Opaque header bytes preceding the pixel array
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn header_size(&self) -> usize {
        self.header.len()
    }

    pub fn file_size(&self) -> usize {
        self.header.len() + self.pixels.len()
    }

    pub fn image_size_bytes(&self) -> usize {
        self.pixels.len()
    }

    pub fn width(&self) -> i32 {
        read_u32(&self.header, WIDTH_OFFSET) as i32
    }

    /// Negative for top-down bitmaps
    pub fn height(&self) -> i32 {
        read_u32(&self.header, HEIGHT_OFFSET) as i32
    }

    pub fn bits_per_pixel(&self) -> u16 {
        read_u16(&self.header, BITS_PER_PIXEL_OFFSET)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Shadow number stored in the reserved header field
    pub fn shadow_number(&self) -> u16 {
        read_u16(&self.header, RESERVED1_OFFSET)
    }

    /// Stamps the shadow number into the reserved header field.
    ///
    /// Readers ignore this field, so pixel interpretation is unaffected.
    pub fn set_shadow_number(&mut self, number: u16) {
        self.header[RESERVED1_OFFSET..RESERVED1_OFFSET + 2]
            .copy_from_slice(&number.to_le_bytes());
    }

    /// Writes the header followed by the pixel array, exactly
    /// `header_size + image_size_bytes` bytes
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.header)?;
        writer.write_all(&self.pixels)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.file_size());
        bytes.extend_from_slice(&self.header);
        bytes.extend_from_slice(&self.pixels);
        bytes
    }
}
