//! Result pages appended below the server-rendered listing

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Error, Result};

/// One fetched batch of result markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPage {
    pub page_number: u32,
    pub html: String,
    pub is_revealed: bool,
}

impl ResultPage {
    pub fn new(page_number: u32, html: impl Into<String>) -> Self {
        Self {
            page_number,
            html: html.into(),
            is_revealed: false,
        }
    }
}

/// Pages in strictly increasing order, starting right after the server page.
///
/// A page whose predecessor has not arrived yet is held back and appended as
/// soon as the gap closes. Pages are never removed.
#[derive(Debug, Clone)]
pub struct PageSequence {
    server_page: u32,
    pages: Vec<ResultPage>,
    pending: BTreeMap<u32, ResultPage>,
}

impl PageSequence {
    pub fn new(server_page: u32) -> Self {
        Self {
            server_page,
            pages: Vec::new(),
            pending: BTreeMap::new(),
        }
    }

    /// Highest page number appended so far (the server page when none).
    pub fn last_page(&self) -> u32 {
        self.pages
            .last()
            .map(|p| p.page_number)
            .unwrap_or(self.server_page)
    }

    pub fn next_page(&self) -> u32 {
        self.last_page() + 1
    }

    /// Offer a fetched page and return how many pages got appended.
    ///
    /// Zero means the page was buffered behind a missing predecessor.
    pub fn offer(&mut self, page: ResultPage) -> Result<usize> {
        let number = page.page_number;
        if number <= self.last_page() || self.pending.contains_key(&number) {
            return Err(Error::InvalidInput(format!(
                "Page {} was already received",
                number
            )));
        }
        self.pending.insert(number, page);

        let mut appended = 0;
        while let Some(page) = self.pending.remove(&self.next_page()) {
            self.pages.push(page);
            appended += 1;
        }
        Ok(appended)
    }

    /// Reveal every hidden page, returning how many changed.
    pub fn reveal_all(&mut self) -> usize {
        let mut revealed = 0;
        for page in self.pages.iter_mut().filter(|p| !p.is_revealed) {
            page.is_revealed = true;
            revealed += 1;
        }
        revealed
    }

    pub fn pages(&self) -> &[ResultPage] {
        &self.pages
    }

    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(seq: &PageSequence) -> Vec<u32> {
        seq.pages().iter().map(|p| p.page_number).collect()
    }

    #[test]
    fn test_in_order_append() {
        let mut seq = PageSequence::new(1);
        assert_eq!(seq.offer(ResultPage::new(2, "<li>a</li>")).unwrap(), 1);
        assert_eq!(seq.offer(ResultPage::new(3, "<li>b</li>")).unwrap(), 1);
        assert_eq!(numbers(&seq), vec![2, 3]);
        assert_eq!(seq.next_page(), 4);
    }

    #[test]
    fn test_out_of_order_arrival_is_buffered() {
        let mut seq = PageSequence::new(1);
        assert_eq!(seq.offer(ResultPage::new(4, "d")).unwrap(), 0);
        assert_eq!(seq.offer(ResultPage::new(3, "c")).unwrap(), 0);
        assert_eq!(seq.buffered(), 2);
        assert!(seq.is_empty());

        assert_eq!(seq.offer(ResultPage::new(2, "b")).unwrap(), 3);
        assert_eq!(numbers(&seq), vec![2, 3, 4]);
        assert_eq!(seq.buffered(), 0);
    }

    #[test]
    fn test_duplicate_page_rejected() {
        let mut seq = PageSequence::new(1);
        seq.offer(ResultPage::new(2, "b")).unwrap();
        assert!(seq.offer(ResultPage::new(2, "again")).is_err());
        assert!(seq.offer(ResultPage::new(1, "server")).is_err());
        assert_eq!(seq.pages()[0].html, "b");
    }

    #[test]
    fn test_reveal_all() {
        let mut seq = PageSequence::new(1);
        let mut shown = ResultPage::new(2, "b");
        shown.is_revealed = true;
        seq.offer(shown).unwrap();
        seq.offer(ResultPage::new(3, "c")).unwrap();
        assert_eq!(seq.reveal_all(), 1);
        assert_eq!(seq.reveal_all(), 0);
        assert!(seq.pages().iter().all(|p| p.is_revealed));
    }
}
