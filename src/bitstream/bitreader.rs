//! BitReader: reads the packed bitstream of one block payload.
//!
//! The payload is already fully buffered by the stream framer, so the reader works over a
//! borrowed slice and never performs I/O. Every read returns None once the slice is exhausted.
//!

const BIT_MASK: u8 = 0xff;

/// Reads MSB first bits from a block payload.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader over the payload.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// Check if there is at least one more bit to read.
    fn have_data(&self) -> bool {
        self.cursor < self.buffer.len()
    }

    /// Return bit as Option<usize> (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> Option<usize> {
        if !self.have_data() {
            return None;
        }
        let bit =
            (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Some(bit as usize)
    }

    /// Return Option<Bool> *true* if the next bit is 1, *false* if 0, consuming the bit,
    /// or None if there is no more data to read
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return Option<usize> of the next n bits (n <= 32), or None if there is not enough
    /// data left.
    pub fn bint(&mut self, mut n: usize) -> Option<usize> {
        /*
        Read as many bits as possible for each step. First finish any partial byte,
        then take whole bytes, then take the leading bits of one more byte.
        */
        if self.remaining_bits() < n {
            // Leave the reader at the end so later reads fail too.
            self.cursor = self.buffer.len();
            self.bit_index = 0;
            return None;
        }
        let mut result = 0_usize;

        if self.bit_index > 0 && n > 0 {
            let needed = n.min(8 - self.bit_index);
            let byte = (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) as usize;
            result = byte >> (8 - self.bit_index - needed);
            self.bit_index += needed;
            if self.bit_index == 8 {
                self.bit_index = 0;
                self.cursor += 1;
            }
            n -= needed;
        }
        while n >= 8 {
            result = result << 8 | self.buffer[self.cursor] as usize;
            self.cursor += 1;
            n -= 8;
        }
        if n > 0 {
            result = result << n | (self.buffer[self.cursor] >> (8 - n)) as usize;
            self.bit_index = n;
        }
        Some(result)
    }

    /// Number of unread bits left in the payload.
    pub fn remaining_bits(&self) -> usize {
        (self.buffer.len() - self.cursor) * 8 - self.bit_index
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}
