//! Local normalization of grade and semester replies.
//!
//! Grade and semester never go to the assistant during collection; a
//! cheap pattern check is enough to pull out the number.

/// Extracts the first run of ASCII digits as a grade number.
pub fn grade_number(input: &str) -> Option<i16> {
    let start = input.find(|c: char| c.is_ascii_digit())?;
    let digits: String = input[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Normalizes `"7"`, `"grade 7"` or `"Grade 7"` to `"Grade 7"`.
pub fn normalize_grade(input: &str) -> Option<String> {
    grade_number(input).map(|n| format!("Grade {}", n))
}

/// Normalizes a semester reply to `"Semester 1"` or `"Semester 2"`.
///
/// The first `1` or `2` character anywhere in the reply wins.
pub fn normalize_semester(input: &str) -> Option<String> {
    input
        .chars()
        .find(|c| *c == '1' || *c == '2')
        .map(|c| format!("Semester {}", c))
}

/// Numeric semester for storage: all digits of the stored value.
pub fn semester_number(stored: &str) -> Option<i16> {
    let digits: String = stored.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
