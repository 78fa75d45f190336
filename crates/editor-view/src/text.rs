/// Split document text into the line array the view core works on.
///
/// `N` newlines give `N + 1` lines, so a trailing newline yields a trailing empty line. A `\r`
/// before the newline is dropped.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b", ""]);
    }
}
