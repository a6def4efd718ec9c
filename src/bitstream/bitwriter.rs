use log::error;

/// Packs variable width codes MSB first into a byte buffer.
pub struct BitWriter {
    output: Vec<u8>,
    queue: u64,
    q_bits: u8,
}

impl BitWriter {
    /// Create a new BitWriter with an output buffer of the size specified. Suggest the
    /// size be set to the block size. Call flush() to push the bit queue to the buffer
    /// before taking the output.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all out.XX functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /*
    NOTE: out24 takes a u32.  The 8 most significant bits of the word indicate how
    many of the least significant bits will be written. Those bits must be aligned to
    the least signficant bit. (The middle bits are masked out.)

    Eg 00000100_00000000_00000000_00000010 writes out 0010.
    */
    /// Writes 1-24 bits encoded with the number of bits to write in the most
    /// significant byte of a 32 bit word.
    pub fn out24(&mut self, data: u32) {
        let depth = (data >> 24) as u8;
        if depth == 0 || depth > 24 {
            error!("out24 called with a depth of {}", depth);
            return;
        }
        self.queue <<= depth;
        self.queue |= (data & (0xffff_ffff >> (32 - depth))) as u64;
        self.q_bits += depth;
        self.write_stream();
    }

    /// Puts a 16 bit word of pre-packed binary encoded data on the stream.
    pub fn out16(&mut self, data: u16) {
        self.queue <<= 16;
        self.queue |= data as u64;
        self.q_bits += 16;
        self.write_stream();
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits.
    pub fn flush(&mut self) {
        if self.q_bits > 0 {
            self.queue <<= 8 - self.q_bits; //pad the queue with zeros
            self.q_bits = 8;
            self.write_stream();
        }
    }

    /// Flush and hand back the packed bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }

    /// Number of bits written so far, not counting flush padding.
    pub fn bit_len(&self) -> usize {
        (self.output.len() * 8) + self.q_bits as usize
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = self.bit_len();
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}

#[cfg(test)]
mod test {
    use super::BitWriter;

    #[test]
    fn out16_test() {
        let mut bw = BitWriter::new(100);
        let data = 0b00100001_00100000;
        bw.out16(data);
        assert_eq!(bw.into_bytes(), "! ".as_bytes());
    }

    #[test]
    fn out24_and_loc_test() {
        let mut bw = BitWriter::new(100);
        let data = 0b00001000_00000000_00000000_00100001;
        bw.out24(data);
        assert_eq!("[1.0]", &bw.loc());
        let data = 0b00011000_00000000_00000000_00000011;
        bw.out24(data);
        assert_eq!("[4.0]", &bw.loc());
        assert_eq!(bw.into_bytes(), vec![33, 0, 0, 3]);
    }

    #[allow(clippy::unusual_byte_groupings)]
    #[test]
    fn partial_byte_is_padded() {
        let mut bw = BitWriter::new(4);
        bw.out24(0x03_000005);
        assert_eq!("[0.3]", &bw.loc());
        bw.out24(0x01_000001);
        assert_eq!(bw.bit_len(), 4);
        assert_eq!(bw.into_bytes(), vec![0b1011_0000]);
    }
}
