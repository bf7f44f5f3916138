//! Devanāgarī → ITRANS transliteration.
//!
//! [`normalize`] folds Devanāgarī source text into its ASCII ITRANS form
//! before lexing: keywords like `चरः` become `charaH` and `कृते` becomes
//! `kRRite`. The mapping is table-driven over the Devanāgarī block.
//! Characters outside the tables (including everything already ASCII) pass
//! through untouched, which makes the function idempotent.

use std::collections::HashMap;

use once_cell::sync::Lazy;

const VIRAMA: char = '\u{094D}';

/// Consonants map to their bare ITRANS form; the inherent `a` is appended
/// unless a virāma or a vowel sign follows.
static CONSONANTS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('क', "k"),
        ('ख', "kh"),
        ('ग', "g"),
        ('घ', "gh"),
        ('ङ', "~N"),
        ('च', "ch"),
        ('छ', "Ch"),
        ('ज', "j"),
        ('झ', "jh"),
        ('ञ', "~n"),
        ('ट', "T"),
        ('ठ', "Th"),
        ('ड', "D"),
        ('ढ', "Dh"),
        ('ण', "N"),
        ('त', "t"),
        ('थ', "th"),
        ('द', "d"),
        ('ध', "dh"),
        ('न', "n"),
        ('प', "p"),
        ('फ', "ph"),
        ('ब', "b"),
        ('भ', "bh"),
        ('म', "m"),
        ('य', "y"),
        ('र', "r"),
        ('ल', "l"),
        ('व', "v"),
        ('श', "sh"),
        ('ष', "Sh"),
        ('स', "s"),
        ('ह', "h"),
        ('ळ', "L"),
    ])
});

/// Dependent vowel signs (mātrās), replacing the inherent `a`.
static MATRAS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('\u{093E}', "A"),
        ('\u{093F}', "i"),
        ('\u{0940}', "I"),
        ('\u{0941}', "u"),
        ('\u{0942}', "U"),
        ('\u{0943}', "RRi"),
        ('\u{0944}', "RRI"),
        ('\u{0962}', "LLi"),
        ('\u{0963}', "LLI"),
        ('\u{0947}', "e"),
        ('\u{0948}', "ai"),
        ('\u{094B}', "o"),
        ('\u{094C}', "au"),
        ('\u{0946}', "e"),
        ('\u{094A}', "o"),
    ])
});

/// Independent vowels, signs, and digits.
static STANDALONE: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('अ', "a"),
        ('आ', "A"),
        ('इ', "i"),
        ('ई', "I"),
        ('उ', "u"),
        ('ऊ', "U"),
        ('ऋ', "RRi"),
        ('ॠ', "RRI"),
        ('ऌ', "LLi"),
        ('ॡ', "LLI"),
        ('ए', "e"),
        ('ऐ', "ai"),
        ('ओ', "o"),
        ('औ', "au"),
        ('ऎ', "e"),
        ('ऒ', "o"),
        ('ं', "M"),
        ('ः', "H"),
        ('ँ', ".N"),
        ('ऽ', ".a"),
        ('ॐ', "OM"),
        ('।', "|"),
        ('॥', "||"),
        ('०', "0"),
        ('१', "1"),
        ('२', "2"),
        ('३', "3"),
        ('४', "4"),
        ('५', "5"),
        ('६', "6"),
        ('७', "7"),
        ('८', "8"),
        ('९', "9"),
    ])
});

pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(base) = CONSONANTS.get(&c) {
            out.push_str(base);
            match chars.get(i + 1).copied() {
                Some(VIRAMA) => i += 2,
                Some(next) => match MATRAS.get(&next) {
                    Some(matra) => {
                        out.push_str(matra);
                        i += 2;
                    }
                    None => {
                        out.push('a');
                        i += 1;
                    }
                },
                None => {
                    out.push('a');
                    i += 1;
                }
            }
        } else if let Some(mapped) = STANDALONE.get(&c) {
            out.push_str(mapped);
            i += 1;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let text = "charah x = 10 # comment";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("चरः अ = ५");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_keyword_spellings() {
        assert_eq!(normalize("चरः"), "charaH");
        assert_eq!(normalize("तथा"), "tathA");
        assert_eq!(normalize("वा"), "vA");
        assert_eq!(normalize("नहि"), "nahi");
        assert_eq!(normalize("यदि"), "yadi");
        assert_eq!(normalize("अन्यदि"), "anyadi");
        assert_eq!(normalize("उत"), "uta");
        assert_eq!(normalize("अंत"), "aMta");
        assert_eq!(normalize("अन्त"), "anta");
        assert_eq!(normalize("कृते"), "kRRite");
        assert_eq!(normalize("इत्यस्मै"), "ityasmai");
        assert_eq!(normalize("चरण"), "charaNa");
        assert_eq!(normalize("सोपानः"), "sopAnaH");
        assert_eq!(normalize("नियोग"), "niyoga");
        assert_eq!(normalize("प्रत्यावर्तनम्"), "pratyAvartanam");
        assert_eq!(normalize("विरामः"), "virAmaH");
        assert_eq!(normalize("अनुवर्तनम्"), "anuvartanam");
    }

    #[test]
    fn test_builtin_spellings() {
        assert_eq!(normalize("मुद्रयति"), "mudrayati");
        assert_eq!(normalize("शुद्ध"), "shuddha");
        assert_eq!(normalize("संयोजयति"), "saMyojayati");
        assert_eq!(normalize("परिमाणम्"), "parimANam");
        assert_eq!(normalize("धावयति"), "dhAvayati");
        assert_eq!(normalize("सूचिः_वा"), "sUchiH_vA");
    }

    #[test]
    fn test_digits() {
        assert_eq!(normalize("०१२३४५६७८९"), "0123456789");
    }

    #[test]
    fn test_mixed_script_line() {
        assert_eq!(normalize("चरः x = ४२"), "charaH x = 42");
    }
}
