use clap::Parser;
use std::env;
use std::ffi::OsString;

/// Minimal CLI surface (JVMS has nothing to say about launcher flags; this mirrors
/// what the teacher's `java` launcher accepts, trimmed to what this VM implements):
/// a repeatable class path flag, a verbosity toggle, `--version`, and everything else
/// passed straight through as the main class plus its own arguments.
#[derive(Debug, Parser)]
#[command(name = "cobalt", about = "Cobalt JVM", trailing_var_arg = true)]
pub struct Arguments {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "raise the logging filter to debug"
    )]
    pub verbose: bool,

    #[arg(long = "version", help = "print the version and exit")]
    pub version: bool,

    #[arg(
        long = "classpath",
        visible_aliases = ["cp", "class-path"],
        help = "class search path of directories and jar files (repeatable)"
    )]
    pub classpath: Vec<String>,

    #[arg(help = "the main class to run")]
    pub mainclass: Option<String>,

    #[arg(help = "arguments passed verbatim to main(String[])")]
    pub parameters: Vec<String>,
}

impl Arguments {
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(Self::preprocess_args(env::args_os().collect()))
    }

    /// clap only recognizes `--cp`/`--classpath`, not the single-dash forms the real
    /// `java` launcher accepts; rewrite those before clap ever sees them.
    fn preprocess_args(arguments: Vec<OsString>) -> Vec<OsString> {
        arguments
            .into_iter()
            .map(|argument| match argument.to_str() {
                Some("-cp") | Some("-classpath") | Some("-class-path") => {
                    OsString::from("--classpath")
                }
                Some("-v") => OsString::from("--verbose"),
                _ => argument,
            })
            .collect()
    }

    /// Join every `-cp`/`--classpath` occurrence into one platform-separated spec,
    /// since [`cjvm_runtime::ConfigurationBuilder::class_path`] takes a single string.
    #[must_use]
    pub fn class_path(&self) -> String {
        let separator = if cfg!(windows) { ';' } else { ':' };
        self.classpath.join(&separator.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_repeated_classpath() {
        let arguments = Arguments::parse_from(["cobalt", "-cp", "a", "-cp", "b", "Main"]);
        assert_eq!(vec!["a", "b"], arguments.classpath);
        assert_eq!(Some("Main".to_string()), arguments.mainclass);
    }

    #[test]
    fn test_class_path_joins_with_platform_separator() {
        let arguments = Arguments::parse_from(["cobalt", "--classpath", "a", "--classpath", "b"]);
        let expected = if cfg!(windows) { "a;b" } else { "a:b" };
        assert_eq!(expected, arguments.class_path());
    }

    #[test]
    fn test_trailing_parameters_pass_through() {
        let arguments = Arguments::parse_from(["cobalt", "Main", "one", "two"]);
        assert_eq!(Some("Main".to_string()), arguments.mainclass);
        assert_eq!(vec!["one", "two"], arguments.parameters);
    }
}
