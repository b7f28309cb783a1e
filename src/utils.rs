/// Compares by `char`, so multi-byte code points count as one unit.
/// Case and whitespace are significant.
pub fn is_palindrome(text: &str) -> bool {
    text.chars().eq(text.chars().rev())
}
