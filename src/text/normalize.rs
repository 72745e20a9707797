/// Punctuation the reader pronounces, paired with the words used in its place.
const SPOKEN_PUNCTUATION: &[(char, &str)] = &[
    ('.', "full stop"),
    (',', "comma"),
    ('!', "exclamation mark"),
    ('?', "question mark"),
    (':', "colon"),
    (';', "semicolon"),
    ('(', "open parenthesis"),
    (')', "close parenthesis"),
    ('\'', "apostrophe"),
];

fn spoken_word(ch: char) -> Option<&'static str> {
    SPOKEN_PUNCTUATION
        .iter()
        .find(|(mark, _)| *mark == ch)
        .map(|(_, word)| *word)
}

/// Replace every spoken punctuation mark with a space followed by its word.
///
/// Each character is handled on its own, so the inserted words are never
/// rewritten again.
pub fn normalize(input: &str) -> String {
    let mut output = String::with_capacity(input.len() + input.len() / 4);
    for ch in input.chars() {
        match spoken_word(ch) {
            Some(word) => {
                output.push(' ');
                output.push_str(word);
            }
            None => output.push(ch),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_each_mark_with_its_word() {
        assert_eq!(
            normalize("Hello, world. Goodbye!"),
            "Hello comma world full stop Goodbye exclamation mark"
        );
    }

    #[test]
    fn covers_the_full_table() {
        assert_eq!(
            normalize(".,!?:;()'"),
            " full stop comma exclamation mark question mark colon semicolon \
             open parenthesis close parenthesis apostrophe"
        );
    }

    #[test]
    fn apostrophe_is_spelled_out_inside_a_word() {
        assert_eq!(normalize("don't"), "don apostrophet");
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let once = normalize("Wait (really)? Yes: it's done; ok.");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn leaves_other_characters_alone() {
        let text = "quotes \"stay\" and dashes - too\nnew line";
        assert_eq!(normalize(text), text);
    }
}
