use argh::FromArgs;

/// Prompt printed before each line unless overridden.
pub const DEFAULT_PROMPT: &str = "$ ";

#[derive(FromArgs, Debug, Clone, PartialEq, Eq)]
/// tsh: read command lines from standard input and run them one at a time.
///
/// Builtins are `exit`, `env` and `cp SRC DST`; every other name is looked up on PATH.
#[argh(note = "Repeat count: when the first argument of an external command is a positive \
integer, it is not passed to the program; the command runs that many times in a row \
instead (`ls 3` lists the directory three times). Use --no-repeat to turn this off. \
With PATH unset nothing resolves; with PATH empty only executables in the current \
directory resolve.")]
pub struct Config {
    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// text printed before reading each line
    pub prompt: String,

    #[argh(switch)]
    /// always pass the first argument through to external commands
    pub no_repeat: bool,

    #[argh(switch)]
    /// report cp failures and keep going instead of ending the session
    pub lenient_copy: bool,
}

impl Config {
    /// Whether a numeric first argument is read as a repeat count.
    pub fn repeat_count(&self) -> bool {
        !self.no_repeat
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            no_repeat: false,
            lenient_copy: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parsed_empty_command_line() {
        let parsed =
            Config::from_args(&["tsh"], &[]).unwrap_or_else(|early| panic!("{}", early.output));
        assert_eq!(parsed, Config::default());
        assert!(parsed.repeat_count());
    }

    #[test]
    fn test_flags() {
        let parsed =
            Config::from_args(&["tsh"], &["--prompt", "> ", "--no-repeat", "--lenient-copy"])
                .unwrap_or_else(|early| panic!("{}", early.output));
        assert_eq!(parsed.prompt, "> ");
        assert!(!parsed.repeat_count());
        assert!(parsed.lenient_copy);
    }

    #[test]
    fn test_help_mentions_repeat_count() {
        let early = Config::from_args(&["tsh"], &["--help"]).err().expect("help exits early");
        assert!(early.status.is_ok());
        assert!(early.output.contains("Repeat count"));
    }
}
