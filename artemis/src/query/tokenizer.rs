use smallvec::SmallVec;

pub(crate) type Words = SmallVec<[String; 4]>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_uppercase() {
        CharClass::Upper
    } else {
        CharClass::Lower
    }
}

/// Splits a method or field name into lower-case words.
///
/// Handles camelCase (`findByFirstName`), snake_case (`find_by_first_name`),
/// acronyms (`findByURLPath` gives `url`, `path`) and digit runs
/// (`findTop10By` gives `top`, `10`, `by`).
pub fn split_words(name: &str) -> Words {
    let mut words = Words::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            flush(&mut words, &mut current);
            continue;
        }

        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let (prev_class, class) = (classify(prev), classify(c));
            let next_is_lower = chars
                .get(i + 1)
                .is_some_and(|&n| classify(n) == CharClass::Lower);

            let boundary = match (prev_class, class) {
                (CharClass::Lower, CharClass::Upper) => true,
                (CharClass::Digit, CharClass::Upper | CharClass::Lower) => true,
                (CharClass::Upper | CharClass::Lower, CharClass::Digit) => true,
                // end of an acronym: "URLPath" splits before the 'P'
                (CharClass::Upper, CharClass::Upper) => next_is_lower,
                _ => false,
            };
            if boundary {
                flush(&mut words, &mut current);
            }
        }
        current.extend(c.to_lowercase());
    }
    flush(&mut words, &mut current);
    words
}

fn flush(words: &mut Words, current: &mut String) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}
