/// Capitalize the first letter of every whitespace-separated word and
/// lowercase the rest, e.g. "water SUPPLY" -> "Water Supply". Used for
/// the free-text fields the chatbot stores (department, name, location).
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if `input` consists of exactly `len` ASCII digits.
pub fn is_digits(input: &str, len: usize) -> bool {
    input.len() == len && input.bytes().all(|b| b.is_ascii_digit())
}
