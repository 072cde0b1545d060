use std::fmt;

use memory::FrameNumber;

const PRESENT: u32 = 1 << 0;
const REFERENCED: u32 = 1 << 1;
const MODIFIED: u32 = 1 << 2;
const RIGHTS_SHIFT: u32 = 3;
const RIGHTS_MASK: u32 = 0b111 << RIGHTS_SHIFT;
const FRAME_SHIFT: u32 = 8;

/// 3-bit access code: read = 4, write = 2, execute = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessRights(u8);

impl AccessRights {
    pub const NONE: AccessRights = AccessRights(0);
    pub const READ: AccessRights = AccessRights(0b100);
    pub const WRITE: AccessRights = AccessRights(0b010);
    pub const EXECUTE: AccessRights = AccessRights(0b001);
    pub const ALL: AccessRights = AccessRights(0b111);

    pub fn from_code(code: u8) -> Option<Self> {
        if code > 0b111 {
            None
        } else {
            Some(AccessRights(code))
        }
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: AccessRights) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for AccessRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of the table, packed into a word.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    /// | frame number: 24 | unused: 2 | rights: 3 | modified | referenced | present |
    pub(super) entry: u32,
}

impl PageTableEntry {
    pub(super) fn zero() -> Self {
        PageTableEntry { entry: 0 }
    }

    pub(super) fn with_rights(rights: AccessRights) -> Self {
        let mut entry = Self::zero();
        entry.set_rights(rights);
        entry
    }

    pub fn is_present(&self) -> bool {
        self.entry & PRESENT != 0
    }

    pub fn is_referenced(&self) -> bool {
        self.entry & REFERENCED != 0
    }

    pub fn is_modified(&self) -> bool {
        self.entry & MODIFIED != 0
    }

    pub fn rights(&self) -> AccessRights {
        AccessRights(((self.entry & RIGHTS_MASK) >> RIGHTS_SHIFT) as u8)
    }

    /// Only meaningful while the page is present
    pub fn frame(&self) -> Option<FrameNumber> {
        if self.is_present() {
            Some(self.entry >> FRAME_SHIFT)
        } else {
            None
        }
    }

    /// The raw frame field, zero for a page that is not present
    pub fn frame_bits(&self) -> FrameNumber {
        self.entry >> FRAME_SHIFT
    }

    pub(super) fn set_rights(&mut self, rights: AccessRights) {
        self.entry = (self.entry & !RIGHTS_MASK) | ((rights.code() as u32) << RIGHTS_SHIFT);
    }

    /// Keeps only the rights, everything else is cleared
    pub(super) fn map(&mut self, frame: FrameNumber) {
        self.entry = (self.entry & RIGHTS_MASK) | (frame << FRAME_SHIFT) | PRESENT;
    }

    pub(super) fn unmap(&mut self) {
        self.entry &= RIGHTS_MASK;
    }

    pub(super) fn set_referenced(&mut self) {
        self.entry |= REFERENCED;
    }

    pub(super) fn set_modified(&mut self) {
        self.entry |= MODIFIED;
    }
}

impl fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTableEntry")
            .field("present", &self.is_present())
            .field("referenced", &self.is_referenced())
            .field("modified", &self.is_modified())
            .field("rights", &self.rights())
            .field("frame", &self.frame())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_rights_and_clears_bits() {
        let mut entry = PageTableEntry::with_rights(AccessRights::READ);
        entry.map(0x7FF);
        entry.set_referenced();
        entry.set_modified();
        entry.map(0x12);
        assert!(entry.is_present());
        assert!(!entry.is_referenced());
        assert!(!entry.is_modified());
        assert_eq!(entry.frame(), Some(0x12));
        assert_eq!(entry.rights(), AccessRights::READ);
    }

    #[test]
    fn unmap_zeroes_frame() {
        let mut entry = PageTableEntry::with_rights(AccessRights::ALL);
        entry.map(5);
        entry.set_modified();
        entry.unmap();
        assert!(!entry.is_present());
        assert!(!entry.is_modified());
        assert_eq!(entry.frame(), None);
        assert_eq!(entry.frame_bits(), 0);
        assert_eq!(entry.rights(), AccessRights::ALL);
    }

    #[test]
    fn rights_codes() {
        assert_eq!(AccessRights::from_code(8), None);
        let rw = AccessRights::from_code(6).unwrap();
        assert!(rw.contains(AccessRights::READ));
        assert!(rw.contains(AccessRights::WRITE));
        assert!(!rw.contains(AccessRights::EXECUTE));
        assert_eq!(rw.to_string(), "6");
    }
}
