/// Capitalizes the first letter of each space-separated word and lowercases
/// the rest.
///
/// Runs of spaces are kept as-is. Apostrophes, hyphens and embedded capitals
/// get no special treatment, so `"mccarthy"` becomes `"Mccarthy"`.
pub fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
