/*  Copyright (C) 2012-2023 by László Nagy
    This file is part of edflags.

    edflags is a tool to serve compiler flags for editor tooling.

    edflags is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    edflags is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

// Represents the application configuration.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Configuration {
    pub flags: Option<Flags>,
    pub output: Option<Output>,
}

// Represents the flag related configuration.
//
// Every field is optional. The defaults reproduce the flags the tool
// emits with no configuration file present: C++ parsing, the c++14
// standard, and the `include`, `serial/include`, `serial/mstd/include`
// directories under the project root.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Flags {
    pub language: Option<Language>,
    pub standard: Option<Standard>,
    pub include_subpaths: Option<Vec<PathBuf>>,
    pub compiler: Option<PathBuf>,
    pub flags_file: Option<PathBuf>,
    #[serde(default)]
    pub flags_to_add: Vec<String>,
    pub do_cache: Option<bool>,
}

// Groups together the output related configurations.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Output {
    pub content: Option<Content>,
}

// Controls the content of the batch output.
//
// This will act as a filter on the emitted compilation database entries.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Content {
    // will default to false
    pub include_only_existing_source: Option<bool>,
    pub duplicate_filter_fields: Option<DuplicateFilterFields>,
}

/// Represents the language the host shall parse the queried files as.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(try_from = "String")]
pub enum Language {
    C,
    Cpp,
    ObjectiveC,
    ObjectiveCpp,
}

impl Language {
    /// The token the language selector flag takes as value.
    pub fn as_token(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "c++",
            Language::ObjectiveC => "objective-c",
            Language::ObjectiveCpp => "objective-c++",
        }
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "c" =>
                Ok(Language::C),
            "c++" =>
                Ok(Language::Cpp),
            "objective-c" =>
                Ok(Language::ObjectiveC),
            "objective-c++" =>
                Ok(Language::ObjectiveCpp),
            _ =>
                Err(format!(r#"Unknown value "{value}" for language"#)),
        }
    }
}

/// Represents the language standard the host shall parse with.
///
/// The value is kept as written in the configuration, it only has to
/// name a standard the compiler would accept (like `c11` or `gnu++17`).
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "String")]
pub struct Standard(String);

impl Standard {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for Standard {
    fn default() -> Self {
        Standard(String::from("c++14"))
    }
}

impl TryFrom<String> for Standard {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if STANDARD.is_match(value.as_str()) {
            Ok(Standard(value))
        } else {
            Err(format!(r#"Unknown value "{value}" for standard"#))
        }
    }
}

lazy_static! {
    static ref STANDARD: Regex =
        Regex::new(r"^(c|gnu)(\+\+)?(\d{2}|1z|2a|2b)$").unwrap();
}

/// Represents how the duplicate filtering detects duplicate entries.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(try_from = "String")]
pub enum DuplicateFilterFields {
    FileOnly,
    FileAndOutputOnly,
    All,
}

impl TryFrom<String> for DuplicateFilterFields {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "file" =>
                Ok(DuplicateFilterFields::FileOnly),
            "file_output" =>
                Ok(DuplicateFilterFields::FileAndOutputOnly),
            "all" =>
                Ok(DuplicateFilterFields::All),
            _ =>
                Err(format!(r#"Unknown value "{value}" for duplicate filter"#)),
        }
    }
}

pub mod io {
    use std::io::stdin;

    use thiserror::Error;

    use super::*;

    /// This error type encompasses any error that can be returned by this module.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("IO error")]
        IoError(#[from] std::io::Error),
        #[error("Syntax error")]
        SyntaxError(#[from] serde_json::Error),
    }

    /// Load the content of the given file and parse it as Configuration.
    pub fn from_file(file: &std::path::Path) -> Result<Configuration, Error> {
        let reader = std::fs::OpenOptions::new().read(true).open(file)?;
        let result = from_reader(reader)?;

        Ok(result)
    }

    pub fn from_stdin() -> Result<Configuration, Error> {
        let reader = stdin();
        let result = from_reader(reader)?;

        Ok(result)
    }

    /// Load the content of the given stream and parse it as Configuration.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Configuration, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_full_config() {
            let content: &[u8] = br#"{
            "flags": {
                "language": "c++",
                "standard": "gnu++17",
                "include_subpaths": ["include", "vendor/include"],
                "compiler": "/usr/local/bin/clang++",
                "flags_file": ".flags",
                "flags_to_add": ["-DNDEBUG"],
                "do_cache": false
            },
            "output": {
                "content": {
                    "include_only_existing_source": true,
                    "duplicate_filter_fields": "all"
                }
            }
        }"#;

            let result = from_reader(content).unwrap();

            let expected = Configuration {
                flags: Some(
                    Flags {
                        language: Some(Language::Cpp),
                        standard: Some(Standard(String::from("gnu++17"))),
                        include_subpaths: Some(vec![
                            PathBuf::from("include"),
                            PathBuf::from("vendor/include"),
                        ]),
                        compiler: Some(PathBuf::from("/usr/local/bin/clang++")),
                        flags_file: Some(PathBuf::from(".flags")),
                        flags_to_add: vec![String::from("-DNDEBUG")],
                        do_cache: Some(false),
                    }
                ),
                output: Some(
                    Output {
                        content: Some(
                            Content {
                                include_only_existing_source: Some(true),
                                duplicate_filter_fields: Some(DuplicateFilterFields::All),
                            }
                        ),
                    }
                ),
            };

            assert_eq!(expected, result);
        }

        #[test]
        fn test_flags_only_config() {
            let content: &[u8] = br#"{
            "flags": {
                "standard": "c++20",
                "flags_to_add": ["-DFOO=bar"]
            }
        }"#;

            let result = from_reader(content).unwrap();

            let expected = Configuration {
                flags: Some(
                    Flags {
                        language: None,
                        standard: Some(Standard(String::from("c++20"))),
                        include_subpaths: None,
                        compiler: None,
                        flags_file: None,
                        flags_to_add: vec![String::from("-DFOO=bar")],
                        do_cache: None,
                    }
                ),
                output: None,
            };

            assert_eq!(expected, result);
        }

        #[test]
        fn test_output_only_config() {
            let content: &[u8] = br#"{
            "output": {
                "content": {
                    "duplicate_filter_fields": "file"
                }
            }
        }"#;

            let result = from_reader(content).unwrap();

            let expected = Configuration {
                flags: None,
                output: Some(
                    Output {
                        content: Some(
                            Content {
                                include_only_existing_source: None,
                                duplicate_filter_fields: Some(DuplicateFilterFields::FileOnly),
                            }
                        ),
                    }
                ),
            };

            assert_eq!(expected, result);
        }

        #[test]
        fn test_empty_config() {
            let content: &[u8] = br#"{}"#;

            let result = from_reader(content).unwrap();

            assert_eq!(Configuration::default(), result);
        }

        #[test]
        fn test_failing_config() {
            let content: &[u8] = br#"{
                "flags": {
                    "standard": "c+14"
                }
            }"#;

            let result = from_reader(content);

            assert!(result.is_err());

            let message = result.unwrap_err().to_string();
            assert!(message.contains(r#"Unknown value "c+14" for standard"#));
        }
    }
}
