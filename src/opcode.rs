use std::fmt;

/// # Instruction Words
///
/// Every instruction is 16 bits, stored big-endian in two consecutive bytes.
/// Instructions are conventionally written as four hex nibbles:
/// - `[f___]` the family; selects a broad category of operation
/// - `[_x__]` the register Vx, or the last register of a range V0..Vx
/// - `[__y_]` the register Vy
/// - `[___n]` a 4-bit immediate; also a discriminator in the 0x5, 0x8 and 0x9 families
/// - `[__kk]` an 8-bit immediate; also a discriminator in the 0x0, 0xE and 0xF families
/// - `[_nnn]` a 12-bit address
///
/// Which fields carry data depends on the family, so the accessors never fail;
/// it's up to the decoder to read the ones that matter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InstructionWord(pub u16);

impl InstructionWord {
    /// Combines two bytes, high byte first.
    pub fn from_bytes(high: u8, low: u8) -> Self {
        InstructionWord(u16::from_be_bytes([high, low]))
    }

    /// `[f___]`
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// `[_x__]`
    pub fn x(self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    /// `[__y_]`
    pub fn y(self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// `[_nnn]`
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl From<u16> for InstructionWord {
    fn from(word: u16) -> Self {
        InstructionWord(word)
    }
}

impl fmt::Display for InstructionWord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    const WORD: InstructionWord = InstructionWord(0xABCD);

    #[test]
    fn test_from_bytes_is_big_endian() {
        assert_eq!(InstructionWord::from_bytes(0xAB, 0xCD), WORD);
    }

    #[test]
    fn test_family() {
        assert_eq!(WORD.family(), 0xA);
    }

    #[test]
    fn test_x() {
        assert_eq!(WORD.x(), 0xB);
    }

    #[test]
    fn test_y() {
        assert_eq!(WORD.y(), 0xC);
    }

    #[test]
    fn test_n() {
        assert_eq!(WORD.n(), 0xD);
    }

    #[test]
    fn test_kk() {
        assert_eq!(WORD.kk(), 0xCD);
    }

    #[test]
    fn test_nnn() {
        assert_eq!(WORD.nnn(), 0x0BCD);
    }

    #[test]
    fn test_display_is_zero_padded_hex() {
        assert_eq!(InstructionWord(0x00E0).to_string(), "00E0");
    }
}
