use docsift_core::{FeatureVector, RawLine};

/// Keywords whose presence marks structural front-matter lines.
const STRUCTURAL_KEYWORDS: [&str; 2] = ["introduction", "chapter"];

/// Derive the fixed-order feature vector for one line.
///
/// Pure function of the line's text and layout metadata. Lines shorter than
/// the configured minimum are filtered before this point and never reach it.
pub fn extract_features(line: &RawLine) -> FeatureVector {
    let text = &line.text;
    let char_count = text.chars().count();
    let lower = text.to_lowercase();
    let uppercase_count = text.chars().filter(|c| c.is_uppercase()).count();

    FeatureVector([
        line.font_size,
        flag(line.is_bold),
        flag(line.is_centered),
        flag(line.is_italic),
        line.page as f32,
        line.x_offset,
        char_count as f32,
        text.trim().chars().count() as f32,
        text.split_whitespace().count() as f32,
        flag(text.chars().any(|c| c.is_numeric())),
        flag(text.contains(':')),
        uppercase_count as f32 / char_count.max(1) as f32,
        flag(STRUCTURAL_KEYWORDS.iter().any(|k| lower.contains(k))),
        flag(is_fully_uppercase(text)),
        font_size_bucket(line.font_size),
    ])
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// True when the text has at least one cased character and no lowercase ones.
fn is_fully_uppercase(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Coarse ordinal for the line's font size: display sizes map to 3/2/1,
/// body text to 0.
fn font_size_bucket(size: f32) -> f32 {
    if size >= 22.0 {
        3.0
    } else if size >= 18.0 {
        2.0
    } else if size >= 14.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_line(text: &str, font_size: f32) -> RawLine {
        RawLine {
            text: text.to_string(),
            page: 2,
            font_size,
            is_bold: true,
            is_italic: false,
            is_centered: true,
            x_offset: 72.5,
        }
    }

    #[test]
    fn feature_order_is_fixed() {
        let features = extract_features(&raw_line("Chapter 1: Intro", 16.0));
        let f = features.as_slice();
        assert_eq!(f.len(), 15);
        assert_eq!(f[0], 16.0); // font size
        assert_eq!(f[1], 1.0); // bold
        assert_eq!(f[2], 1.0); // centered
        assert_eq!(f[3], 0.0); // italic
        assert_eq!(f[4], 2.0); // page
        assert_eq!(f[5], 72.5); // x-offset
        assert_eq!(f[6], 16.0); // raw length
        assert_eq!(f[7], 16.0); // trimmed length
        assert_eq!(f[8], 3.0); // word count
        assert_eq!(f[9], 1.0); // contains digit
        assert_eq!(f[10], 1.0); // contains colon
        assert_eq!(f[12], 1.0); // structural keyword ("chapter")
        assert_eq!(f[13], 0.0); // not fully uppercase
        assert_eq!(f[14], 1.0); // bucket for 16pt
    }

    #[test]
    fn trimmed_length_differs_from_raw() {
        let features = extract_features(&raw_line("  padded  ", 10.0));
        let f = features.as_slice();
        assert_eq!(f[6], 10.0);
        assert_eq!(f[7], 6.0);
    }

    #[test]
    fn uppercase_fraction() {
        let features = extract_features(&raw_line("ABcd", 10.0));
        assert!((features.as_slice()[11] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn uppercase_fraction_of_uncased_text_is_zero() {
        let features = extract_features(&raw_line("1234", 10.0));
        assert_eq!(features.as_slice()[11], 0.0);
    }

    #[test]
    fn fully_uppercase_needs_a_cased_character() {
        assert!(is_fully_uppercase("HEADING 3"));
        assert!(!is_fully_uppercase("Heading"));
        assert!(!is_fully_uppercase("1234"));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let features = extract_features(&raw_line("INTRODUCTION", 10.0));
        assert_eq!(features.as_slice()[12], 1.0);
        let features = extract_features(&raw_line("Results", 10.0));
        assert_eq!(features.as_slice()[12], 0.0);
    }

    #[test]
    fn font_size_buckets() {
        assert_eq!(font_size_bucket(24.0), 3.0);
        assert_eq!(font_size_bucket(22.0), 3.0);
        assert_eq!(font_size_bucket(18.0), 2.0);
        assert_eq!(font_size_bucket(14.0), 1.0);
        assert_eq!(font_size_bucket(13.9), 0.0);
        assert_eq!(font_size_bucket(10.0), 0.0);
    }
}
