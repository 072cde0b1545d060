use memory::FrameNumber;

pub type VirtualAddress = u32;
pub type PhysicalAddress = u32;

pub const PAGE_BITS: u32 = 3;
pub const OFFSET_BITS: u32 = 13;
pub const FRAME_BITS: u32 = 11;

/// Bit widths of the simulated architecture.
///
/// A virtual address is `page | offset`, a physical address is
/// `frame | offset`. The page table has `2^page_bits` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressLayout {
    pub page_bits: u32,
    pub offset_bits: u32,
    pub frame_bits: u32,
}

impl Default for AddressLayout {
    fn default() -> Self {
        Self {
            page_bits: PAGE_BITS,
            offset_bits: OFFSET_BITS,
            frame_bits: FRAME_BITS,
        }
    }
}

impl AddressLayout {
    pub fn page_count(&self) -> usize {
        1 << self.page_bits
    }

    pub fn frame_count(&self) -> usize {
        1 << self.frame_bits
    }

    fn offset_mask(&self) -> u32 {
        (1 << self.offset_bits) - 1
    }

    /// Split a virtual address into `(page, offset)`.
    ///
    /// Every bit above the offset belongs to the page index, so an address
    /// wider than the architecture yields a page the table does not have.
    /// Callers check the page against the table before using it.
    pub fn decompose(&self, address: VirtualAddress) -> (usize, u32) {
        let page = (address >> self.offset_bits) as usize;
        (page, address & self.offset_mask())
    }

    pub fn compose(&self, frame: FrameNumber, offset: u32) -> PhysicalAddress {
        (frame << self.offset_bits) | (offset & self.offset_mask())
    }
}
