//! A module implementing lexical analysis (tokenization) of interpreter input lines.
//!
//! The grammar is deliberately flat: a line is a sequence of words separated by
//! delimiter characters. There is no quoting and no escaping, so a word can never
//! contain a delimiter.

/// Characters that separate words. Runs of delimiters count as a single separator.
pub const DELIMITERS: [char; 2] = [' ', '\n'];

/// Splits a raw input line into its argument vector.
///
/// Element 0 of the result is the command name and the remaining elements are its
/// arguments. Empty words are never produced, so an empty or delimiter-only line
/// yields an empty vector and the caller must skip execution for it.
///
/// # Arguments
/// * `line` - The line as read from input, trailing newline included or not.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    line.split(DELIMITERS)
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command_with_args() {
        let tokens = split_into_tokens("ls -l /tmp\n");
        assert_eq!(tokens, vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn test_consecutive_delimiters_collapse() {
        let tokens = split_into_tokens("  echo   hello \n\n world  ");
        assert_eq!(tokens, vec!["echo", "hello", "world"]);
    }

    #[test]
    fn test_empty_and_delimiter_only_lines() {
        assert!(split_into_tokens("").is_empty());
        assert!(split_into_tokens("\n").is_empty());
        assert!(split_into_tokens("   \n  ").is_empty());
    }

    #[test]
    fn test_quotes_are_not_special() {
        // "a b" cannot be expressed as a single word
        let tokens = split_into_tokens("echo \"a b\"");
        assert_eq!(tokens, vec!["echo", "\"a", "b\""]);
    }

    #[test]
    fn test_tabs_are_part_of_words() {
        let tokens = split_into_tokens("a\tb c");
        assert_eq!(tokens, vec!["a\tb", "c"]);
    }
}
