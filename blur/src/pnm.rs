//! Grayscale PGM (netpbm P2/P5) reading and writing.
//!
//! Reading accepts both the plain (P2) and raw (P5) variants with `#`
//! comments in the header. Writing always produces P5, one byte per sample
//! when `max_value < 256` and two big-endian bytes otherwise.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Largest sample value the format allows.
pub const PGM_MAX_VALUE: u32 = 65535;

#[derive(Debug, PartialEq)]
pub struct PgmImage {
    pub pixels: Grid<u32>,
    pub max_value: u32,
}

#[derive(Clone, Copy, PartialEq)]
enum Encoding {
    Plain,
    Raw,
}

/// Parse a PGM image from `reader`.
pub fn read_pgm<R: BufRead>(mut reader: R) -> Result<PgmImage> {
    let mut header = HeaderReader::new(&mut reader);
    let encoding = match header.token()?.as_str() {
        "P2" => Encoding::Plain,
        "P5" => Encoding::Raw,
        other => return Err(Error::Pgm(format!("unsupported magic number {:?}", other))),
    };
    let width = header.number("width")? as usize;
    let height = header.number("height")? as usize;
    let max_value = header.number("max value")?;

    if width == 0 || height == 0 {
        return Err(Error::Pgm(format!("empty image {}x{}", width, height)));
    }
    if !(1..=PGM_MAX_VALUE).contains(&max_value) {
        return Err(Error::Pgm(format!("max value {} out of range", max_value)));
    }

    let count = width
        .checked_mul(height)
        .ok_or_else(|| Error::Pgm(format!("image size {}x{} overflows", width, height)))?;

    // Samples are collected before the grid is allocated, so buffers only grow
    // as far as the input actually goes.
    let samples: Vec<u32> = match encoding {
        Encoding::Plain => {
            let mut samples = Vec::new();
            for i in 0..count {
                let sample = header
                    .number("sample")
                    .map_err(|_| Error::Pgm(format!("missing sample {}", i)))?;
                samples.push(sample);
            }
            samples
        }
        Encoding::Raw => {
            // Exactly one whitespace byte separates the header from the data;
            // HeaderReader consumed it with the max value.
            let bytes_per_sample = if max_value < 256 { 1 } else { 2 };
            let expected = count
                .checked_mul(bytes_per_sample)
                .ok_or_else(|| Error::Pgm(format!("image size {}x{} overflows", width, height)))?;

            let mut data = Vec::new();
            reader.by_ref().take(expected as u64).read_to_end(&mut data)?;
            if data.len() < expected {
                return Err(Error::Pgm(format!(
                    "truncated pixel data: {} of {} bytes",
                    data.len(),
                    expected
                )));
            }

            if bytes_per_sample == 1 {
                data.iter().map(|&b| b as u32).collect()
            } else {
                data.chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]) as u32)
                    .collect()
            }
        }
    };

    if let Some((i, &v)) = samples
        .iter()
        .enumerate()
        .find(|&(_, &v)| v > max_value)
    {
        return Err(Error::Pgm(format!(
            "sample {} at index {} exceeds max value {}",
            v, i, max_value
        )));
    }

    let pixels = Grid::try_from_slice(width, height, &samples)?;
    tracing::debug!(width, height, max_value, "read pgm");
    Ok(PgmImage { pixels, max_value })
}

pub fn load_pgm<P: AsRef<Path>>(path: P) -> Result<PgmImage> {
    let file = File::open(path)?;
    read_pgm(BufReader::new(file))
}

/// Write `pixels` as a raw P5 image.
pub fn write_pgm<W: Write>(mut writer: W, pixels: &Grid<u32>, max_value: u32) -> Result<()> {
    if !(1..=PGM_MAX_VALUE).contains(&max_value) {
        return Err(Error::Pgm(format!("max value {} out of range", max_value)));
    }
    if pixels.is_empty() {
        return Err(Error::EmptyImage);
    }

    write!(writer, "P5\n{} {}\n{}\n", pixels.width(), pixels.height(), max_value)?;

    let wide = max_value >= 256;
    let mut data = Vec::with_capacity(pixels.len() * if wide { 2 } else { 1 });
    for &v in pixels.as_slice() {
        let v = v.min(max_value);
        if wide {
            data.extend_from_slice(&(v as u16).to_be_bytes());
        } else {
            data.push(v as u8);
        }
    }
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

pub fn save_pgm<P: AsRef<Path>>(path: P, pixels: &Grid<u32>, max_value: u32) -> Result<()> {
    let file = File::create(path)?;
    write_pgm(BufWriter::new(file), pixels, max_value)
}

/// Whitespace-separated header tokens with `#` comments skipped.
struct HeaderReader<'a, R: BufRead> {
    reader: &'a mut R,
}

impl<'a, R: BufRead> HeaderReader<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self { reader }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        Ok(Some(b))
    }

    /// Read one token and the single whitespace byte that ends it.
    fn token(&mut self) -> Result<String> {
        let mut token = String::new();
        loop {
            match self.next_byte()? {
                None if token.is_empty() => {
                    return Err(Error::Pgm("unexpected end of header".into()));
                }
                None => return Ok(token),
                Some(b'#') if token.is_empty() => self.skip_comment()?,
                Some(b) if b.is_ascii_whitespace() => {
                    if !token.is_empty() {
                        return Ok(token);
                    }
                }
                Some(b) => token.push(b as char),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        while let Some(b) = self.next_byte()? {
            if b == b'\n' || b == b'\r' {
                break;
            }
        }
        Ok(())
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        let token = self.token()?;
        token
            .parse()
            .map_err(|_| Error::Pgm(format!("invalid {} {:?}", what, token)))
    }
}
