//! Pairtree-style identifier escaping, after
//! <https://datatracker.ietf.org/doc/html/draft-kunze-pairtree-01#section-3>.

const CHARS_TO_HEX: &str = "\"*+,<=>?\\^|";

/// Escape an identifier into its filesystem-safe form.
///
/// Printable ASCII (33..=126) is kept lowercased, the pairtree special set
/// is hex-escaped with a `^` prefix, everything else is dropped. The
/// remaining separators are substituted: `/`->`=`, `:`->`+`, `.`->`,`.
pub fn clean_identifier(identifier: &str) -> String {
    let mut cleaned = String::with_capacity(identifier.len());
    for c in identifier.chars() {
        if CHARS_TO_HEX.contains(c) {
            cleaned.push('^');
            cleaned.push_str(&format!("{:x}", c as u32));
        } else if (33..=126).contains(&(c as u32)) {
            match c {
                '/' => cleaned.push('='),
                ':' => cleaned.push('+'),
                '.' => cleaned.push(','),
                _ => cleaned.push(c.to_ascii_lowercase()),
            }
        }
    }
    cleaned
}

/// Convert an identifier to a pairtree path of 2-character segments, with a
/// trailing slash. Keeps any single directory from holding too many entries.
pub fn pairtree_path(identifier: &str) -> String {
    let cleaned = clean_identifier(identifier);
    let chars: Vec<char> = cleaned.chars().collect();
    let segments: Vec<String> = chars.chunks(2).map(|pair| pair.iter().collect()).collect();
    format!("{}/", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("test:/identifier"), "test+=identifier");
    }

    #[test]
    fn test_pairtree_path() {
        assert_eq!(
            pairtree_path("test:/identifier"),
            "te/st/+=/id/en/ti/fi/er/"
        );
    }

    #[test]
    fn test_pairtree_path_short_identifier() {
        assert_eq!(pairtree_path("container"), "co/nt/ai/ne/r/");
    }

    #[test]
    fn test_clean_identifier_lowercases() {
        assert_eq!(clean_identifier("ABC-Def"), "abc-def");
    }

    #[test]
    fn test_clean_identifier_hex_escapes_special_set() {
        assert_eq!(clean_identifier("a*b"), "a^2ab");
        assert_eq!(clean_identifier("a+b"), "a^2bb");
        assert_eq!(clean_identifier("a^b"), "a^5eb");
        assert_eq!(clean_identifier("a|b"), "a^7cb");
    }

    #[test]
    fn test_clean_identifier_drops_out_of_range() {
        assert_eq!(clean_identifier("a b\tc\u{e9}"), "abc");
    }

    #[test]
    fn test_clean_identifier_separator_substitution() {
        assert_eq!(clean_identifier("a/b:c.d"), "a=b+c,d");
    }

    #[test]
    fn test_clean_identifier_is_deterministic() {
        let input = "Some:/Mixed.Id*42";
        assert_eq!(clean_identifier(input), clean_identifier(input));
    }
}
