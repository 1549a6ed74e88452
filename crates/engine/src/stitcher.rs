use std::io::{self, Write};

use matcher::Matcher;

/// Reassembles paragraphs that may straddle chunk boundaries and tests each
/// complete one against the matcher as soon as it closes.
///
/// Chunks are fed in strict file order (the reorder buffer's job); this type
/// only ever appends to a carry-over tail and looks for the next delimiter.
pub struct Stitcher {
    carry: Vec<u8>,
}

impl Stitcher {
    pub fn new() -> Self {
        Self { carry: Vec::new() }
    }

    /// Feeds the next chunk's bytes in and writes every complete matching
    /// paragraph found to `out`. Returns whether any paragraph in this feed
    /// matched.
    pub fn feed(&mut self, chunk: &[u8], matcher: &Matcher, out: &mut impl Write) -> io::Result<bool> {
        self.carry.extend_from_slice(chunk);
        let mut found_any = false;
        while let Some(delim_start) = find_delimiter(&self.carry) {
            let paragraph_end = delim_start;
            if matcher.is_match(&self.carry[..paragraph_end]) {
                found_any = true;
                out.write_all(&self.carry[..paragraph_end])?;
                out.write_all(b"\n\n")?;
                out.flush()?;
            }
            let rest_start = delim_start + common::PARAGRAPH_DELIMITER.len();
            self.carry.drain(..rest_start);
        }
        Ok(found_any)
    }

    /// Tests whatever is left in the carry buffer once no more chunks are
    /// coming, for a final paragraph not terminated by a trailing blank
    /// line.
    pub fn flush(&mut self, matcher: &Matcher, out: &mut impl Write) -> io::Result<bool> {
        if self.carry.is_empty() {
            return Ok(false);
        }
        let matched = matcher.is_match(&self.carry);
        if matched {
            out.write_all(&self.carry)?;
            if self.carry.last() != Some(&b'\n') {
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
        self.carry.clear();
        Ok(matched)
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(common::PARAGRAPH_DELIMITER.len())
        .position(|w| w == common::PARAGRAPH_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> Vec<u8> {
        Vec::new()
    }

    #[test]
    fn matches_a_paragraph_entirely_within_one_chunk() {
        let matcher = Matcher::compile("cat").unwrap();
        let mut stitcher = Stitcher::new();
        let mut out = sink();
        let found = stitcher
            .feed(b"the cat sat\n\nthe dog ran\n\n", &matcher, &mut out)
            .unwrap();
        assert!(found);
        assert_eq!(out, b"the cat sat\n\n");
    }

    #[test]
    fn stitches_a_paragraph_split_across_two_chunks() {
        let matcher = Matcher::compile("cat").unwrap();
        let mut stitcher = Stitcher::new();
        let mut out = sink();
        let found_first = stitcher.feed(b"the ca", &matcher, &mut out).unwrap();
        assert!(!found_first);
        let found_second = stitcher.feed(b"t sat\n\nnext\n\n", &matcher, &mut out).unwrap();
        assert!(found_second);
        assert_eq!(out, b"the cat sat\n\n");
    }

    #[test]
    fn stitches_a_split_delimiter_itself() {
        let matcher = Matcher::compile("cat").unwrap();
        let mut stitcher = Stitcher::new();
        let mut out = sink();
        stitcher.feed(b"the cat sat\n", &matcher, &mut out).unwrap();
        let found = stitcher.feed(b"\nnext\n\n", &matcher, &mut out).unwrap();
        assert!(found);
        assert_eq!(out, b"the cat sat\n\n");
    }

    #[test]
    fn flush_reports_a_trailing_paragraph_with_no_closing_blank_line() {
        let matcher = Matcher::compile("cat").unwrap();
        let mut stitcher = Stitcher::new();
        let mut out = sink();
        stitcher.feed(b"the cat sat", &matcher, &mut out).unwrap();
        let found = stitcher.flush(&matcher, &mut out).unwrap();
        assert!(found);
        assert_eq!(out, b"the cat sat\n");
    }

    #[test]
    fn flush_on_empty_carry_reports_no_match() {
        let matcher = Matcher::compile("cat").unwrap();
        let mut stitcher = Stitcher::new();
        let mut out = sink();
        stitcher.feed(b"the cat sat\n\n", &matcher, &mut out).unwrap();
        assert!(!stitcher.flush(&matcher, &mut out).unwrap());
    }
}
