//! Non-destructive tokenizer and number parsers for report lines
//!
//! Works over borrowed byte slices and yields `(start, len)` spans, so the
//! received line is never modified. Number parsing accepts a numeric prefix
//! and ignores what follows it, the way grbl's own reports are read.

/// A token position within the scanned input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    /// The bytes this span covers in `input`
    pub fn of<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.start..self.start + self.len]
    }
}

/// Splits a byte slice on a single delimiter, skipping empty tokens
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a [u8],
    cursor: usize,
    delimiter: u8,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8], delimiter: u8) -> Self {
        Self {
            input,
            cursor: 0,
            delimiter,
        }
    }

    /// Next non-empty token
    pub fn next_span(&mut self) -> Option<Span> {
        while self.cursor < self.input.len() && self.input[self.cursor] == self.delimiter {
            self.cursor += 1;
        }
        if self.cursor >= self.input.len() {
            return None;
        }

        let start = self.cursor;
        let len = self.input[start..]
            .iter()
            .position(|&b| b == self.delimiter)
            .unwrap_or(self.input.len() - start);
        self.cursor = start + len;
        Some(Span { start, len })
    }

    /// Everything not yet consumed
    pub fn rest(&self) -> &'a [u8] {
        &self.input[self.cursor..]
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input;
        self.next_span().map(|span| span.of(input))
    }
}

/// Split at the first occurrence of `delimiter`
pub fn split_once(bytes: &[u8], delimiter: u8) -> Option<(&[u8], &[u8])> {
    let at = bytes.iter().position(|&b| b == delimiter)?;
    Some((&bytes[..at], &bytes[at + 1..]))
}

/// Parse a leading decimal number such as `-12.500`
///
/// Leading spaces are skipped and anything after the number is ignored.
/// Returns `None` if no digit is found.
pub fn parse_f32(bytes: &[u8]) -> Option<f32> {
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }

    let mut negative = false;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        negative = bytes[i] == b'-';
        i += 1;
    }

    let mut value: f64 = 0.0;
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value * 10.0 + f64::from(bytes[i] - b'0');
        digits += 1;
        i += 1;
    }

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let mut scale: f64 = 1.0;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            scale *= 10.0;
            value += f64::from(bytes[i] - b'0') / scale;
            digits += 1;
            i += 1;
        }
    }

    if digits == 0 {
        return None;
    }
    let value = value as f32;
    Some(if negative { -value } else { value })
}

/// Parse a leading unsigned integer, saturating on overflow
pub fn parse_u32(bytes: &[u8]) -> Option<u32> {
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    Some(bytes[..digits].iter().fold(0u32, |acc, &b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    }))
}

/// Parse a leading integer into a code byte, saturating at 255
pub fn parse_code(bytes: &[u8]) -> Option<u8> {
    parse_u32(bytes).map(|v| v.min(u32::from(u8::MAX)) as u8)
}

/// Parse a comma separated list of numbers into `out`, left to right
///
/// Stops at the first component that is not a number or when `out` is
/// full. Returns how many values were stored.
pub fn parse_list(bytes: &[u8], out: &mut [f32]) -> usize {
    let mut count = 0;
    for (slot, part) in out.iter_mut().zip(bytes.split(|&b| b == b',')) {
        match parse_f32(part) {
            Some(value) => {
                *slot = value;
                count += 1;
            }
            None => break,
        }
    }
    count
}

/// Longest valid UTF-8 prefix of `bytes`
pub fn text(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    #[test]
    fn test_scanner_skips_empty_tokens() {
        let tokens: Vec<&[u8]> = Scanner::new(b"|Idle||MPos:1,2,3|", b'|').collect();
        assert_eq!(tokens, [&b"Idle"[..], &b"MPos:1,2,3"[..]]);
    }

    #[test]
    fn test_scanner_spans() {
        let input = b"a|bc";
        let mut scanner = Scanner::new(input, b'|');
        assert_eq!(scanner.next_span(), Some(Span { start: 0, len: 1 }));
        assert_eq!(scanner.rest(), b"|bc");
        assert_eq!(scanner.next_span(), Some(Span { start: 2, len: 2 }));
        assert_eq!(scanner.next_span(), None);
    }

    #[test]
    fn test_parse_f32_prefix() {
        assert_eq!(parse_f32(b"12.500"), Some(12.5));
        assert_eq!(parse_f32(b"-0.250,"), Some(-0.25));
        assert_eq!(parse_f32(b"3>"), Some(3.0));
        assert_eq!(parse_f32(b" 7"), Some(7.0));
        assert_eq!(parse_f32(b".5"), Some(0.5));
        assert_eq!(parse_f32(b"-"), None);
        assert_eq!(parse_f32(b"abc"), None);
        assert_eq!(parse_f32(b""), None);
    }

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32(b"20"), Some(20));
        assert_eq!(parse_u32(b"9 more"), Some(9));
        assert_eq!(parse_u32(b"x"), None);
        assert_eq!(parse_u32(b"99999999999"), Some(u32::MAX));
        assert_eq!(parse_code(b"300"), Some(255));
    }

    #[test]
    fn test_parse_list() {
        let mut out = [0.0f32; 3];
        assert_eq!(parse_list(b"1.000,-2.000,3.500", &mut out), 3);
        assert_eq!(out, [1.0, -2.0, 3.5]);

        let mut out = [0.0f32; 3];
        assert_eq!(parse_list(b"100,500", &mut out), 2);
        assert_eq!(out, [100.0, 500.0, 0.0]);

        let mut out = [0.0f32; 2];
        assert_eq!(parse_list(b"1,2,3", &mut out), 2);
        assert_eq!(parse_list(b"1,,3", &mut out), 1);
    }

    #[test]
    fn test_split_once_and_text() {
        assert_eq!(split_once(b"WCO:1,2", b':'), Some((&b"WCO"[..], &b"1,2"[..])));
        assert_eq!(split_once(b"Idle", b':'), None);
        assert_eq!(text(b"ok"), "ok");
        assert_eq!(text(b"ab\xffcd"), "ab");
    }

    proptest! {
        #[test]
        fn prop_scanner_tokens_are_clean(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
            let mut scanner = Scanner::new(&bytes, b'|');
            while let Some(span) = scanner.next_span() {
                prop_assert!(span.len > 0);
                prop_assert!(span.start + span.len <= bytes.len());
                prop_assert!(!span.of(&bytes).contains(&b'|'));
            }
        }

        #[test]
        fn prop_number_parsers_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = parse_f32(&bytes);
            let _ = parse_u32(&bytes);
            let mut out = [0.0f32; 3];
            prop_assert!(parse_list(&bytes, &mut out) <= 3);
            let _ = text(&bytes);
        }
    }
}
