//! Phonetic encoders.
//!
//! Both encoders work on the NFKD form of their input so that accented
//! Latin letters fold onto their base letter. Characters outside the Latin
//! alphabet carry no sound class and are skipped.

use crate::error::PhoneticError;
use unicode_normalization::UnicodeNormalization;

const SOUNDEX_LEN: usize = 4;

fn soundex_class(c: char) -> Option<char> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

/// American Soundex code.
///
/// The first character is kept as-is (upper-cased); following consonants
/// map to digit classes. Repeated classes collapse, `H` and `W` do not
/// break a run, every other uncoded character does. Short codes are padded
/// with `0`.
///
/// # Example
/// ```
/// use crm_search::soundex;
///
/// assert_eq!(soundex("Robert").unwrap(), "R163");
/// assert_eq!(soundex("Rupert").unwrap(), "R163");
/// ```
pub fn soundex(s: &str) -> Result<String, PhoneticError> {
    let normalized: String = s.nfkd().collect::<String>().to_uppercase();
    let mut chars = normalized.chars();
    let first = chars.next().ok_or(PhoneticError::EmptyInput)?;

    let mut code = String::with_capacity(SOUNDEX_LEN);
    code.push(first);
    let mut count = 1;
    let mut last = soundex_class(first);

    for c in chars {
        if count == SOUNDEX_LEN {
            break;
        }
        match soundex_class(c) {
            Some(digit) => {
                if Some(digit) != last {
                    code.push(digit);
                    count += 1;
                }
                last = Some(digit);
            }
            None if c != 'H' && c != 'W' => last = None,
            None => {}
        }
    }

    code.extend(std::iter::repeat_n('0', SOUNDEX_LEN - count));
    Ok(code)
}

#[inline]
fn is_vowel(c: Option<char>) -> bool {
    matches!(c, Some('a' | 'e' | 'i' | 'o' | 'u'))
}

#[inline]
fn is_one_of(c: Option<char>, set: &str) -> bool {
    c.is_some_and(|c| set.contains(c))
}

/// Metaphone code.
///
/// Words are kept apart by a single space. Letters outside `a..z` produce
/// nothing, so text with no Latin letters encodes to an empty code.
///
/// # Example
/// ```
/// use crm_search::metaphone;
///
/// assert_eq!(metaphone("Thompson").unwrap(), "0MPSN");
/// ```
pub fn metaphone(s: &str) -> Result<String, PhoneticError> {
    if s.is_empty() {
        return Err(PhoneticError::EmptyInput);
    }

    let lowered: String = s.to_lowercase().nfkd().collect();
    let mut chars: Vec<char> = lowered.chars().collect();

    const SILENT_FIRST: [&str; 5] = ["kn", "gn", "pn", "wr", "ae"];
    if SILENT_FIRST.iter().any(|p| lowered.starts_with(p)) {
        chars.remove(0);
    }

    let mut code = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let after = chars.get(i + 2).copied();
        let prev = i.checked_sub(1).map(|p| chars[p]);

        // Doubled letters sound once, except "cc"
        if Some(c) == next && c != 'c' {
            i += 1;
            continue;
        }

        match c {
            'a' | 'e' | 'i' | 'o' | 'u' => {
                if i == 0 || prev == Some(' ') {
                    code.push(c);
                }
            }
            'b' => code.push('b'),
            'c' => {
                if (next == Some('i') && after == Some('a')) || next == Some('h') {
                    code.push('x');
                    i += 1;
                } else if is_one_of(next, "iey") {
                    code.push('s');
                    i += 1;
                } else {
                    code.push('k');
                }
            }
            'd' => {
                if next == Some('g') && is_one_of(after, "iey") {
                    code.push('j');
                    i += 2;
                } else {
                    code.push('t');
                }
            }
            'f' | 'j' | 'l' | 'm' | 'n' | 'r' => code.push(c),
            'g' => {
                if is_one_of(next, "iey") {
                    code.push('j');
                } else if next == Some('h') && !is_vowel(after) {
                    i += 1;
                } else {
                    code.push('k');
                }
            }
            'h' => {
                if i == 0 || is_vowel(next) || !is_vowel(prev) {
                    code.push('h');
                }
            }
            'k' => {
                if i == 0 || prev != Some('c') {
                    code.push('k');
                }
            }
            'p' => {
                if next == Some('h') {
                    code.push('f');
                    i += 1;
                } else {
                    code.push('p');
                }
            }
            'q' => code.push('k'),
            's' => {
                if next == Some('h') {
                    code.push('x');
                    i += 1;
                } else if next == Some('i') && is_one_of(after, "oa") {
                    code.push('x');
                    i += 2;
                } else {
                    code.push('s');
                }
            }
            't' => {
                if next == Some('i') && is_one_of(after, "oa") {
                    code.push('x');
                } else if next == Some('h') {
                    code.push('0');
                    i += 1;
                } else if next != Some('c') || after != Some('h') {
                    code.push('t');
                }
            }
            'v' => code.push('f'),
            'w' => {
                if i == 0 && next == Some('h') {
                    code.push('w');
                    i += 1;
                } else if is_vowel(next) {
                    code.push('w');
                }
            }
            'x' => {
                if i == 0 {
                    if next == Some('h') || (next == Some('i') && is_one_of(after, "oa")) {
                        code.push('x');
                    } else {
                        code.push('s');
                    }
                } else {
                    code.push_str("ks");
                }
            }
            'y' => {
                if is_vowel(next) {
                    code.push('y');
                }
            }
            'z' => code.push('s'),
            ' ' => {
                if !code.is_empty() && !code.ends_with(' ') {
                    code.push(' ');
                }
            }
            _ => {}
        }
        i += 1;
    }

    Ok(code.to_uppercase())
}
