//! Word tokens and phonetic codes for fuzzy chunk comparison.

/// Splits text into word tokens.
///
/// A word is a maximal run of ASCII letters, digits and underscores;
/// everything else separates words.
///
/// # Example
///
/// ```
/// use chunkdelta::tokenize;
///
/// assert_eq!(tokenize("fn main() -> i32 {"), vec!["fn", "main", "i32"]);
/// ```
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .collect()
}

fn digit(letter: u8) -> Option<u8> {
    match letter {
        b'B' | b'F' | b'P' | b'V' => Some(b'1'),
        b'C' | b'G' | b'J' | b'K' | b'Q' | b'S' | b'X' | b'Z' => Some(b'2'),
        b'D' | b'T' => Some(b'3'),
        b'L' => Some(b'4'),
        b'M' | b'N' => Some(b'5'),
        b'R' => Some(b'6'),
        _ => None,
    }
}

/// Returns the phonetic code of a word token.
///
/// The code is the first letter followed by three digits, one per consonant
/// class, with repeated classes collapsed and vowels dropped, padded with
/// `0`. Digits and underscores are ignored. A token without letters is
/// returned unchanged, so numbers still compare by value.
///
/// # Example
///
/// ```
/// use chunkdelta::phonetic_code;
///
/// assert_eq!(phonetic_code("Robert"), "R163");
/// assert_eq!(phonetic_code("rupert"), "R163");
/// assert_eq!(phonetic_code("x"), "X000");
/// assert_eq!(phonetic_code("42"), "42");
/// ```
pub fn phonetic_code(word: &str) -> String {
    let mut letters = word
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_uppercase());

    let Some(first) = letters.next() else {
        return word.to_string();
    };

    let mut code = String::with_capacity(4);
    code.push(first as char);

    let mut last = None;
    for letter in letters {
        let Some(d) = digit(letter) else {
            continue;
        };
        if last == Some(d) {
            continue;
        }
        last = Some(d);
        code.push(d as char);
        if code.len() == 4 {
            break;
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_non_word_runs() {
        assert_eq!(
            tokenize("let x_1 = foo.bar(42);\n// héllo"),
            vec!["let", "x_1", "foo", "bar", "42", "h", "llo"]
        );
        assert!(tokenize("  \n\t--  ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_codes_collapse_spelling_variants() {
        assert_eq!(phonetic_code("color"), phonetic_code("colour"));
        assert_eq!(phonetic_code("Ashcraft"), "A261");
        // Vowels do not separate repeated classes
        assert_eq!(phonetic_code("Tymczak"), "T520");
    }

    #[test]
    fn test_codes_scenario_words() {
        assert_eq!(phonetic_code("alpha"), "A410");
        assert_eq!(phonetic_code("beta"), "B300");
        assert_eq!(phonetic_code("gamma"), "G500");
    }

    #[test]
    fn test_code_is_truncated() {
        assert_eq!(phonetic_code("Washington"), "W252");
    }

    #[test]
    fn test_non_letters_ignored() {
        assert_eq!(phonetic_code("_tmp2"), phonetic_code("tmp"));
        assert_eq!(phonetic_code("123"), "123");
    }
}
