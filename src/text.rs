//! Text/binary heuristic for archive and directory entries.
//!
//! This is an approximation, not a contract: highly symbolic or non-UTF-8
//! text can be misclassified. The thresholds below are fixed.

/// Characters scanned for a NUL before the content is declared binary.
pub const NUL_SCAN_WINDOW: usize = 1000;

/// Minimum share of text-like characters for the content to count as text.
pub const TEXT_RATIO_THRESHOLD: f64 = 0.9;

/// Decodes `bytes` lossily as UTF-8 and returns the text if it passes [`is_text`].
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let content = String::from_utf8_lossy(bytes).into_owned();
    is_text(&content).then_some(content)
}

/// Returns true when `content` looks like text.
///
/// A NUL within the first [`NUL_SCAN_WINDOW`] characters forces rejection.
/// Otherwise the share of printable ASCII, tab, CR, LF, and non-ASCII
/// characters must exceed [`TEXT_RATIO_THRESHOLD`]. Empty content is not text.
pub fn is_text(content: &str) -> bool {
    if content.chars().take(NUL_SCAN_WINDOW).any(|c| c == '\0') {
        return false;
    }

    let mut total = 0usize;
    let mut text_like = 0usize;
    for c in content.chars() {
        total += 1;
        if is_text_char(c) {
            text_like += 1;
        }
    }

    if total == 0 {
        return false;
    }
    text_like as f64 / total as f64 > TEXT_RATIO_THRESHOLD
}

fn is_text_char(c: char) -> bool {
    let code = c as u32;
    (32..=126).contains(&code) || c == '\t' || c == '\n' || c == '\r' || code > 127
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_source_is_text() {
        assert!(is_text("fn main() {\n\tprintln!(\"hi\");\r\n}\n"));
    }

    #[test]
    fn early_nul_is_binary() {
        let mut bytes = vec![b'a'; 50];
        bytes.extend_from_slice(&[b'b'; 10]);
        bytes.push(0);
        bytes.extend_from_slice(&[b'c'; 500]);
        assert_eq!(bytes[60], 0);
        assert!(decode_text(&bytes).is_none());
    }

    #[test]
    fn late_nul_falls_through_to_ratio() {
        let mut content = "x".repeat(NUL_SCAN_WINDOW);
        content.push('\0');
        content.push_str(&"y".repeat(100));
        assert!(is_text(&content));
    }

    #[test]
    fn ninety_five_percent_printable_is_text() {
        let mut content = "a".repeat(95);
        content.push_str(&"\u{1}".repeat(5));
        assert!(is_text(&content));
    }

    #[test]
    fn eighty_five_percent_printable_is_binary() {
        let mut content = "a".repeat(85);
        content.push_str(&"\u{7}".repeat(15));
        assert!(!is_text(&content));
    }

    #[test]
    fn exactly_ninety_percent_is_not_enough() {
        let mut content = "a".repeat(90);
        content.push_str(&"\u{2}".repeat(10));
        assert!(!is_text(&content));
    }

    #[test]
    fn non_ascii_counts_as_text() {
        assert!(is_text("// комментарий на русском\nlet x = 1;"));
    }

    #[test]
    fn invalid_utf8_decodes_lossily() {
        let bytes = [b'o', b'k', 0xff, b'!', b'\n'];
        assert_eq!(decode_text(&bytes).as_deref(), Some("ok\u{fffd}!\n"));
    }

    #[test]
    fn empty_is_not_text() {
        assert!(!is_text(""));
        assert!(decode_text(b"").is_none());
    }
}
