use super::PageTableEntry;

/// Walks the table in page order, yielding `(page, entry)`
pub struct PageTableIterator<'a> {
    current: usize,
    entries: &'a [PageTableEntry],
}

impl<'a> PageTableIterator<'a> {
    pub(super) fn new(entries: &'a [PageTableEntry]) -> Self {
        Self {
            current: 0,
            entries,
        }
    }
}

impl<'a> Iterator for PageTableIterator<'a> {
    type Item = (usize, PageTableEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = *self.entries.get(self.current)?;
        let page = self.current;
        self.current += 1;
        Some((page, entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.entries.len().saturating_sub(self.current);
        (left, Some(left))
    }
}

impl<'a> ExactSizeIterator for PageTableIterator<'a> {}
