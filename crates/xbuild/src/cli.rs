//! Hand-rolled argument processor, grounded verbatim in the original's
//! `process_arguments` (`build_common.c`): positional-command detection,
//! boolean/integer/string option tables, base-prefixed integer parsing, and
//! a pluggable hook for anything else. No `clap` — the exact error strings
//! and base-prefixed parsing here are bespoke to this contract.

use thiserror::Error;

const BOOL_FLAGS: &[&str] = &[
    "optimize",
    "fuzz",
    "ci",
    "has-debug-information",
    "unity-build",
    "just-preprocessor",
    "self-hosted",
    "sanitize",
    "main-branch",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Build,
    Test,
    Debug,
    TestAll,
}

impl Command {
    fn parse(token: &str) -> Option<Command> {
        match token {
            "build" => Some(Command::Build),
            "test" => Some(Command::Test),
            "debug" => Some(Command::Debug),
            "test_all" => Some(Command::TestAll),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Command not recognized: '{0}'")]
    CommandNotRecognized(String),
    #[error("Unrecognized argument: '{0}'")]
    UnrecognizedArgument(String),
    #[error("Invalid boolean value for '--{name}': '{value}'")]
    InvalidBoolean { name: String, value: String },
    #[error("Invalid integer value for '--{name}': '{value}'")]
    InvalidInteger { name: String, value: String },
    #[error("Negative value is too low for '--{name}'")]
    NegativeValueTooLow { name: String },
}

/// Parsed argument state. `has_debug_information`/`unity_build` are `None`
/// until [`parse`]'s post-parse defaulting step runs, so the defaulting
/// order (`unity-build` reads `optimize`'s *final* value) is observable.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub command: Option<Command>,
    pub optimize: bool,
    pub fuzz: bool,
    pub ci: bool,
    pub has_debug_information: Option<bool>,
    pub unity_build: Option<bool>,
    pub just_preprocessor: bool,
    pub self_hosted: bool,
    pub sanitize: bool,
    pub main_branch: bool,
    pub fuzz_duration: u64,
    pub xc_sdk_path: Option<String>,
    pub verbose: bool,
}

impl BuildOptions {
    fn empty() -> BuildOptions {
        BuildOptions {
            command: None,
            optimize: false,
            fuzz: false,
            ci: false,
            has_debug_information: None,
            unity_build: None,
            just_preprocessor: false,
            self_hosted: false,
            sanitize: false,
            main_branch: false,
            fuzz_duration: 0,
            xc_sdk_path: None,
            verbose: false,
        }
    }
}

/// Parses `args` (not including argv\[0\]). `hook` is the pluggable
/// `buster_argument_process` surface: called for any token not recognized
/// as a command/boolean/integer/string option, returning whether it
/// consumed the token. The bootstrap driver's own hook always returns
/// `false`.
pub fn parse(args: &[String], hook: impl Fn(&[String], usize, &str) -> bool) -> Result<BuildOptions, ArgumentError> {
    let mut opts = BuildOptions::empty();
    let mut index = 0;

    if let Some(first) = args.first() {
        if !first.starts_with("--") {
            match Command::parse(first) {
                Some(command) => {
                    opts.command = Some(command);
                    opts.verbose = true;
                    index = 1;
                }
                None => return Err(ArgumentError::CommandNotRecognized(first.clone())),
            }
        }
    }

    while index < args.len() {
        let arg = &args[index];
        let mut consumed = false;

        if let Some(rest) = arg.strip_prefix("--") {
            if let Some((name, value)) = rest.split_once('=') {
                if try_bool(&mut opts, name, value)?.is_some() {
                    consumed = true;
                } else if try_integer(&mut opts, name, value)?.is_some() {
                    consumed = true;
                } else if try_string(&mut opts, name, value).is_some() {
                    consumed = true;
                }
            }
        }

        if !consumed && !hook(args, index, arg) {
            return Err(ArgumentError::UnrecognizedArgument(arg.clone()));
        }
        index += 1;
    }

    if opts.has_debug_information.is_none() {
        opts.has_debug_information = Some(true);
    }
    if opts.unity_build.is_none() {
        opts.unity_build = Some(opts.optimize);
    }

    Ok(opts)
}

fn try_bool(opts: &mut BuildOptions, name: &str, value: &str) -> Result<Option<()>, ArgumentError> {
    if !BOOL_FLAGS.contains(&name) {
        return Ok(None);
    }
    let parsed = match value {
        "0" => false,
        "1" => true,
        _ => {
            return Err(ArgumentError::InvalidBoolean {
                name: name.to_string(),
                value: value.to_string(),
            })
        }
    };
    match name {
        "optimize" => opts.optimize = parsed,
        "fuzz" => opts.fuzz = parsed,
        "ci" => opts.ci = parsed,
        "has-debug-information" => opts.has_debug_information = Some(parsed),
        "unity-build" => opts.unity_build = Some(parsed),
        "just-preprocessor" => opts.just_preprocessor = parsed,
        "self-hosted" => opts.self_hosted = parsed,
        "sanitize" => opts.sanitize = parsed,
        "main-branch" => opts.main_branch = parsed,
        _ => unreachable!("name already checked against BOOL_FLAGS"),
    }
    Ok(Some(()))
}

fn try_integer(opts: &mut BuildOptions, name: &str, value: &str) -> Result<Option<()>, ArgumentError> {
    if name != "fuzz-duration" {
        return Ok(None);
    }
    opts.fuzz_duration = parse_integer_value(name, value)?;
    Ok(Some(()))
}

/// Base-prefixed (`0x`/`0d`/`0o`/`0b`) or bare-decimal unsigned parse, with a
/// leading `-` parsed as decimal and negated with an overflow check.
fn parse_integer_value(name: &str, value: &str) -> Result<u64, ArgumentError> {
    let invalid = || ArgumentError::InvalidInteger {
        name: name.to_string(),
        value: value.to_string(),
    };

    if let Some(digits) = value.strip_prefix('-') {
        let parsed = substrate::bytes::parse_u64_dec(digits.as_bytes());
        if parsed.consumed_length != digits.len() {
            return Err(invalid());
        }
        if parsed.value > i64::MIN.unsigned_abs() {
            return Err(ArgumentError::NegativeValueTooLow { name: name.to_string() });
        }
        return Ok(parsed.value.wrapping_neg());
    }

    let (digits, parse_fn): (&str, fn(&[u8]) -> substrate::bytes::ParsedInt) = if let Some(d) = value.strip_prefix("0x")
    {
        (d, substrate::bytes::parse_u64_hex)
    } else if let Some(d) = value.strip_prefix("0d") {
        (d, substrate::bytes::parse_u64_dec)
    } else if let Some(d) = value.strip_prefix("0o") {
        (d, substrate::bytes::parse_u64_oct)
    } else if let Some(d) = value.strip_prefix("0b") {
        (d, substrate::bytes::parse_u64_bin)
    } else {
        (value, substrate::bytes::parse_u64_dec)
    };

    let parsed = parse_fn(digits.as_bytes());
    if parsed.consumed_length != digits.len() {
        return Err(invalid());
    }
    Ok(parsed.value)
}

fn try_string(opts: &mut BuildOptions, name: &str, value: &str) -> Option<()> {
    if name != "xc-sdk-path" {
        return None;
    }
    opts.xc_sdk_path = Some(value.to_string());
    Some(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn reject_all(_args: &[String], _index: usize, _arg: &str) -> bool {
        false
    }

    #[test]
    fn unrecognized_argument_reports_literal_error_string() {
        let err = parse(&args(&["--nonsense=1"]), reject_all).unwrap_err();
        assert_eq!(err, ArgumentError::UnrecognizedArgument("--nonsense=1".to_string()));
        assert_eq!(err.to_string(), "Unrecognized argument: '--nonsense=1'");
    }

    #[test]
    fn hex_fuzz_duration_parses_to_255() {
        let opts = parse(&args(&["test", "--fuzz-duration=0xff"]), reject_all).unwrap();
        assert_eq!(opts.fuzz_duration, 255);
        assert_eq!(opts.command, Some(Command::Test));
        assert!(opts.verbose);
    }

    #[test]
    fn unity_build_defaults_to_optimizes_final_value() {
        let opts = parse(&args(&["build", "--optimize=1"]), reject_all).unwrap();
        assert_eq!(opts.unity_build, Some(true));
    }

    #[test]
    fn has_debug_information_defaults_true_when_unset() {
        let opts = parse(&args(&["build"]), reject_all).unwrap();
        assert_eq!(opts.has_debug_information, Some(true));
    }

    #[test]
    fn invalid_boolean_value_is_a_usage_error() {
        let err = parse(&args(&["build", "--optimize=2"]), reject_all).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::InvalidBoolean {
                name: "optimize".to_string(),
                value: "2".to_string()
            }
        );
    }

    #[test]
    fn unrecognized_first_positional_is_a_command_error() {
        let err = parse(&args(&["frobnicate"]), reject_all).unwrap_err();
        assert_eq!(err, ArgumentError::CommandNotRecognized("frobnicate".to_string()));
    }

    #[test]
    fn no_positional_command_leaves_verbose_false() {
        let opts = parse(&args(&["--optimize=1"]), reject_all).unwrap();
        assert!(opts.command.is_none());
        assert!(!opts.verbose);
    }
}
