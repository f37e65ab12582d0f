/// Settings needed to construct and run a [`crate::VM`]: where to find classes, what
/// to run, and what to hand it as `String[] args`.
///
/// Holds the class path as an unparsed `:`-separated spec rather than a built
/// `cjvm_classloader::ClassPath`, since the loader owns its `ClassPath` outright once
/// booted (it caches parsed class files behind it) and a `Configuration` should stay
/// cheap to construct and inspect before that happens.
#[derive(Debug)]
pub struct Configuration {
    class_path: String,
    main_class: Option<String>,
    arguments: Vec<String>,
    startup_trace: bool,
}

impl Configuration {
    /// The `:`-separated class path spec searched by the bootstrap loader.
    #[must_use]
    pub fn class_path(&self) -> &str {
        &self.class_path
    }

    /// The class carrying the `main` method to invoke, in either dotted or slash form.
    #[must_use]
    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    /// The arguments passed verbatim to `main(String[])`.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Whether to emit a `tracing` span around each boot phase.
    #[must_use]
    pub fn startup_trace(&self) -> bool {
        self.startup_trace
    }
}

/// Builder for [`Configuration`] with a fluent interface, mirroring the teacher's
/// `ConfigurationBuilder`.
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    class_path: Option<String>,
    main_class: Option<String>,
    arguments: Vec<String>,
    startup_trace: bool,
}

impl ConfigurationBuilder {
    #[must_use]
    pub fn new() -> Self {
        ConfigurationBuilder::default()
    }

    #[must_use]
    pub fn class_path<S: Into<String>>(mut self, class_path: S) -> Self {
        self.class_path = Some(class_path.into());
        self
    }

    #[must_use]
    pub fn main_class<S: Into<String>>(mut self, main_class: S) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    #[must_use]
    pub fn arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn startup_trace(mut self, enabled: bool) -> Self {
        self.startup_trace = enabled;
        self
    }

    /// # Errors
    ///
    /// if no class path was ever set.
    pub fn build(self) -> crate::Result<Configuration> {
        let class_path = self
            .class_path
            .ok_or_else(|| crate::Error::ConfigurationError("class path is required".to_string()))?;
        Ok(Configuration {
            class_path,
            main_class: self.main_class,
            arguments: self.arguments,
            startup_trace: self.startup_trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_class_path() {
        let result = ConfigurationBuilder::new().main_class("Main").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_carries_fields() -> crate::Result<()> {
        let configuration = ConfigurationBuilder::new()
            .class_path(".")
            .main_class("Main")
            .arguments(vec!["a".to_string()])
            .build()?;
        assert_eq!(Some("Main"), configuration.main_class());
        assert_eq!(["a"], configuration.arguments());
        assert_eq!(".", configuration.class_path());
        Ok(())
    }
}
