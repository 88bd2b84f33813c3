//! compress(1) LZW stream decoder.
//!
//! The archive publishes its legacy products as single file `.Z` streams:
//! 2 magic bytes, 1 flag byte (code width bound, block mode bit), then
//! LSB-first LZW codes growing from 9 to at most 16 bits. The historical
//! encoder emits codes in groups of 8 and pads each group to `n_bits`
//! bytes whenever the code width changes, which is why input is consumed
//! chunk-wise here.
use crate::error::Error;

const MAGIC: [u8; 2] = [0x1F, 0x9D];
const WIDTH_MASK: u8 = 0x1F;
const BLOCK_MODE: u8 = 0x80;

const INIT_BITS: usize = 9;
const MAX_BITS: usize = 16;

/// Table reset request, only meaningful in block mode
const CLEAR: usize = 256;
/// First free table entry in block mode
const FIRST: usize = 257;

struct Decoder<'a> {
    data: &'a [u8],
    /// read position past the current chunk
    pos: usize,
    chunk_start: usize,
    chunk_len: usize,
    /// bit offset inside the chunk
    offset: usize,
    /// usable bits in the chunk
    size: usize,
    n_bits: usize,
    maxcode: usize,
    maxmaxcode: usize,
    max_bits: usize,
    block_mode: bool,
    clear_flg: bool,
    free_ent: usize,
    prefix: Vec<u16>,
    suffix: Vec<u8>,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], max_bits: usize, block_mode: bool) -> Self {
        let maxmaxcode = 1 << max_bits;
        let mut suffix = vec![0u8; maxmaxcode];
        for (i, slot) in suffix.iter_mut().enumerate().take(256) {
            *slot = i as u8;
        }
        Self {
            data,
            pos: 3,
            chunk_start: 3,
            chunk_len: 0,
            offset: 0,
            size: 0,
            n_bits: INIT_BITS,
            maxcode: (1 << INIT_BITS) - 1,
            maxmaxcode,
            max_bits,
            block_mode,
            clear_flg: false,
            free_ent: if block_mode { FIRST } else { 256 },
            prefix: vec![0u16; maxmaxcode],
            suffix,
        }
    }

    /// Next code, or None at end of stream.
    fn code(&mut self) -> Option<usize> {
        if self.clear_flg || self.offset >= self.size || self.free_ent > self.maxcode {
            if self.free_ent > self.maxcode {
                self.n_bits += 1;
                self.maxcode = if self.n_bits == self.max_bits {
                    self.maxmaxcode
                } else {
                    (1 << self.n_bits) - 1
                };
            }
            if self.clear_flg {
                self.n_bits = INIT_BITS;
                self.maxcode = (1 << INIT_BITS) - 1;
                self.clear_flg = false;
            }
            let take = self.n_bits.min(self.data.len() - self.pos);
            if take == 0 {
                return None;
            }
            self.chunk_start = self.pos;
            self.chunk_len = take;
            self.pos += take;
            self.offset = 0;
            self.size = (take << 3).saturating_sub(self.n_bits - 1);
        }
        let chunk = &self.data[self.chunk_start..self.chunk_start + self.chunk_len];
        let mut byte = self.offset >> 3;
        let r_off = self.offset & 7;
        let mut code = (chunk[byte] as usize) >> r_off;
        let mut got = 8 - r_off;
        byte += 1;
        while got < self.n_bits {
            code |= (chunk.get(byte).copied().unwrap_or(0) as usize) << got;
            got += 8;
            byte += 1;
        }
        code &= (1 << self.n_bits) - 1;
        self.offset += self.n_bits;
        Some(code)
    }
}

/// Decodes a whole `.Z` stream held in memory.
pub(crate) fn decompress(data: &[u8]) -> Result<Vec<u8>, Error> {
    if data.len() < 3 || data[0..2] != MAGIC {
        return Err(Error::BadMagic);
    }
    let max_bits = (data[2] & WIDTH_MASK) as usize;
    let block_mode = data[2] & BLOCK_MODE != 0;
    if !(INIT_BITS..=MAX_BITS).contains(&max_bits) {
        return Err(Error::CorruptLzw("unsupported code width"));
    }

    let mut d = Decoder::new(data, max_bits, block_mode);
    let mut out = Vec::with_capacity(data.len() * 3);

    let first = match d.code() {
        Some(code) => code,
        None => return Ok(out),
    };
    if first > 255 {
        return Err(Error::CorruptLzw("first code is not a literal"));
    }
    let mut finchar = first as u8;
    let mut oldcode = first;
    out.push(finchar);

    let mut stack = Vec::<u8>::new();
    while let Some(raw) = d.code() {
        let mut code = raw;
        if d.block_mode && code == CLEAR {
            for slot in d.prefix.iter_mut().take(256) {
                *slot = 0;
            }
            d.clear_flg = true;
            d.free_ent = FIRST - 1;
            code = match d.code() {
                Some(code) => code,
                None => break,
            };
        }
        let incode = code;
        if code >= d.free_ent {
            if code > d.free_ent {
                return Err(Error::CorruptLzw("code out of table range"));
            }
            // KwKwK: the string for this code is still being defined
            stack.push(finchar);
            code = oldcode;
        }
        while code >= 256 {
            stack.push(d.suffix[code]);
            code = d.prefix[code] as usize;
        }
        finchar = d.suffix[code];
        stack.push(finchar);
        while let Some(byte) = stack.pop() {
            out.push(byte);
        }
        if d.free_ent < d.maxmaxcode {
            d.prefix[d.free_ent] = oldcode as u16;
            d.suffix[d.free_ent] = finchar;
            d.free_ent += 1;
        }
        oldcode = incode;
    }
    Ok(out)
}
