//! Odd-length palindrome recognition with a pushdown stack.

/// Accepts `input` iff it has odd length and reads the same reversed.
///
/// The first half is pushed, the middle symbol skipped, and the second
/// half is matched against pops.
pub fn is_odd_palindrome(input: &str) -> bool {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() % 2 == 0 {
        return false;
    }

    let mid = chars.len() / 2;
    let mut stack: Vec<char> = chars[..mid].to_vec();
    for &c in &chars[mid + 1..] {
        match stack.pop() {
            Some(top) if top == c => {}
            _ => return false,
        }
    }
    stack.is_empty()
}

#[test]
fn odd_palindromes() {
    assert!(is_odd_palindrome("madam"));
    assert!(is_odd_palindrome("racecar"));
    assert!(is_odd_palindrome("abcba"));
    assert!(is_odd_palindrome("a"));
    assert!(is_odd_palindrome("aba"));
}

#[test]
fn not_odd_palindromes() {
    assert!(!is_odd_palindrome(""));
    assert!(!is_odd_palindrome("abccba"));
    assert!(!is_odd_palindrome("hello"));
    assert!(!is_odd_palindrome("abb"));
}

#[test]
fn no_state_between_calls() {
    assert!(!is_odd_palindrome("abcbd"));
    assert!(is_odd_palindrome("abcba"));
}
