//! Accent stripping for archive and file names.

/// Replace accented Latin letters with their plain ASCII base letter.
///
/// Covers the Hungarian alphabet plus the Slovak and Czech letters that show up
/// in club and venue names on the upstream site. Anything else passes through.
pub fn transliterate(text: &str) -> String {
    text.chars().map(plain_letter).collect()
}

fn plain_letter(c: char) -> char {
    match c {
        'á' | 'ä' => 'a',
        'Á' | 'Ä' => 'A',
        'č' => 'c',
        'Č' => 'C',
        'ď' => 'd',
        'Ď' => 'D',
        'é' | 'ě' => 'e',
        'É' | 'Ě' => 'E',
        'í' => 'i',
        'Í' => 'I',
        'ĺ' | 'ľ' => 'l',
        'Ĺ' | 'Ľ' => 'L',
        'ň' => 'n',
        'Ň' => 'N',
        'ó' | 'ö' | 'ő' | 'ô' => 'o',
        'Ó' | 'Ö' | 'Ő' | 'Ô' => 'O',
        'ŕ' | 'ř' => 'r',
        'Ŕ' | 'Ř' => 'R',
        'š' => 's',
        'Š' => 'S',
        'ť' => 't',
        'Ť' => 'T',
        'ú' | 'ü' | 'ű' | 'ů' => 'u',
        'Ú' | 'Ü' | 'Ű' | 'Ů' => 'U',
        'ý' => 'y',
        'Ý' => 'Y',
        'ž' => 'z',
        'Ž' => 'Z',
        other => other,
    }
}

/// Turn a title into a lower-case ASCII file name stem.
///
/// Runs of anything that is not an ASCII letter or digit become a single `_`.
pub fn safe_file_name(title: &str) -> String {
    let mut name = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in transliterate(title).chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator {
                name.push('_');
                pending_separator = false;
            }
            name.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if pending_separator {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transliterate_hungarian() {
        assert_eq!(transliterate("Őszi Kupa"), "Oszi Kupa");
        assert_eq!(transliterate("Árvíztűrő tükörfúrógép"), "Arvizturo tukorfurogep");
    }

    #[test]
    fn test_transliterate_passes_other_characters() {
        assert_eq!(transliterate("Kupa 2024 (B)"), "Kupa 2024 (B)");
        assert_eq!(transliterate("Žilina, Košice"), "Zilina, Kosice");
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("Döntő"), "donto");
        assert_eq!(safe_file_name("Felnőtt Standard - Elődöntő"), "felnott_standard_elodonto");
        assert_eq!(safe_file_name("(1. forduló)"), "_1_fordulo_");
        assert_eq!(safe_file_name(""), "");
    }
}
