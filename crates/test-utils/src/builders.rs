use std::collections::BTreeMap;

use extparse::config::{
    CheckConfig, ConfigFile, DefaultSection, ParserConfig, PatternConfig, RawConfigFile,
};
use extparse::{CompletionPolicy, StderrMode};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                default: DefaultSection::default(),
                parser: BTreeMap::new(),
            },
        }
    }

    pub fn with_parser(mut self, name: &str, parser: ParserConfig) -> Self {
        self.config.parser.insert(name.to_string(), parser);
        self
    }

    pub fn with_default_completion(mut self, policy: CompletionPolicy) -> Self {
        self.config.default.completion = policy;
        self
    }

    pub fn with_temp_dir(mut self, dir: &std::path::Path) -> Self {
        self.config.default.temp_dir = Some(dir.to_path_buf());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ParserConfig`.
pub struct ParserConfigBuilder {
    parser: ParserConfig,
}

impl ParserConfigBuilder {
    pub fn new(command: &[&str]) -> Self {
        Self {
            parser: ParserConfig {
                command: command.iter().map(|s| s.to_string()).collect(),
                mime_types: vec![],
                completion: None,
                stderr: None,
                timeout: None,
                working_dir: None,
                env: BTreeMap::new(),
                check: None,
                metadata: vec![],
            },
        }
    }

    pub fn pattern(mut self, pattern: &str, field: &str) -> Self {
        self.parser.metadata.push(PatternConfig {
            pattern: pattern.to_string(),
            field: field.to_string(),
        });
        self
    }

    pub fn completion(mut self, policy: CompletionPolicy) -> Self {
        self.parser.completion = Some(policy);
        self
    }

    pub fn stderr(mut self, mode: StderrMode) -> Self {
        self.parser.stderr = Some(mode);
        self
    }

    pub fn timeout(mut self, duration: &str) -> Self {
        self.parser.timeout = Some(duration.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.parser.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn mime_type(mut self, mime: &str) -> Self {
        self.parser.mime_types.push(mime.to_string());
        self
    }

    pub fn check(mut self, command: &[&str], error_codes: &[i32]) -> Self {
        self.parser.check = Some(CheckConfig {
            command: command.iter().map(|s| s.to_string()).collect(),
            error_codes: error_codes.to_vec(),
        });
        self
    }

    pub fn build(self) -> ParserConfig {
        self.parser
    }
}
