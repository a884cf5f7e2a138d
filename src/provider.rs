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

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::configuration::{Flags, Language, Standard};
use crate::flags::FlagSet;
use crate::matchers::source::looks_like_a_source_file;
use crate::parser;
use crate::query::Query;

/// This abstraction is representing a source of compiler flags for the
/// completion host. Providers travel into worker threads in batch mode.
pub(crate) trait Provider: Send {
    /// Answer a host query with the flags the parser shall use on the file.
    fn provide(&self, _: &Query) -> FlagSet;
}

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("flags file error")]
    FlagsFile(#[from] parser::Error),
    #[error("encode error")]
    OsString,
}

/// Represents the resolved flag settings.
///
/// All path resolution and file reading happened when this value was
/// created; the project root is expected to be absolute already.
/// Building a flag set out of it can not fail.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub directory: PathBuf,
    pub compiler: PathBuf,
    pub language: Language,
    pub standard: Standard,
    pub include_dirs: Vec<String>,
    pub extra_flags: Vec<String>,
    pub do_cache: bool,
}

impl Settings {
    /// Resolve the configured values against the project root directory.
    pub fn from_configuration(root: &Path, config: Flags) -> Result<Self, Error> {
        let subpaths = config.include_subpaths
            .unwrap_or_else(default_include_subpaths);
        let include_dirs = subpaths.iter()
            .map(|subpath| into_string(root.join(subpath)))
            .collect::<Result<Vec<_>, _>>()?;

        // A relative flags file lives under the project root.
        let mut extra_flags = match &config.flags_file {
            Some(file) if file.is_absolute() =>
                parser::load(file)?,
            Some(file) =>
                parser::load(root.join(file).as_path())?,
            None =>
                vec![],
        };
        extra_flags.extend(config.flags_to_add);

        Ok(
            Settings {
                directory: root.to_path_buf(),
                compiler: config.compiler
                    .unwrap_or_else(|| PathBuf::from("clang++")),
                language: config.language
                    .unwrap_or(Language::Cpp),
                standard: config.standard
                    .unwrap_or_default(),
                include_dirs,
                extra_flags,
                do_cache: config.do_cache
                    .unwrap_or(true),
            }
        )
    }

    /// Assemble the flag list in its fixed order: language selector,
    /// standard, include directories, then the extra flags.
    pub fn flag_set(&self) -> FlagSet {
        let mut flags = vec![
            String::from("-x"),
            String::from(self.language.as_token()),
            format!("-std={}", self.standard.as_str()),
        ];
        for dir in &self.include_dirs {
            flags.push(String::from("-I"));
            flags.push(dir.clone());
        }
        for flag in &self.extra_flags {
            flags.push(flag.clone());
        }

        FlagSet { flags, do_cache: self.do_cache }
    }
}

fn default_include_subpaths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("include"),
        PathBuf::from("serial/include"),
        PathBuf::from("serial/mstd/include"),
    ]
}

fn into_string(path: PathBuf) -> Result<String, Error> {
    path.into_os_string().into_string().map_err(|_| Error::OsString)
}

/// Serves the same pre-computed flags for every query.
pub(crate) struct Static {
    flag_set: FlagSet,
}

impl Static {
    pub fn new(settings: &Settings) -> Self {
        Static { flag_set: settings.flag_set() }
    }
}

impl Provider for Static {
    /// The answer is independent of the query. A query for a file the
    /// parser would not accept is still answered, only logged.
    fn provide(&self, query: &Query) -> FlagSet {
        let name = query.file.to_string_lossy();
        if !looks_like_a_source_file(name.as_ref()) {
            log::warn!("query for a non source file: {}", name);
        }
        self.flag_set.clone()
    }
}

impl From<&Settings> for Box<dyn Provider> {
    fn from(value: &Settings) -> Self {
        Box::new(Static::new(value))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use lazy_static::lazy_static;

    use super::*;

    #[test]
    fn test_default_flags() {
        let sut = Static::new(&SETTINGS);

        let result = sut.provide(&Query::from_file("/home/user/project/src/foo.cpp"));

        let expected = FlagSet {
            flags: vec![
                "-x", "c++",
                "-std=c++14",
                "-I", "/home/user/project/include",
                "-I", "/home/user/project/serial/include",
                "-I", "/home/user/project/serial/mstd/include",
            ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            do_cache: true,
        };

        assert_eq!(expected, result);
    }

    #[test]
    fn test_answer_is_query_independent() {
        let sut = Static::new(&SETTINGS);

        let one = sut.provide(&Query::from_file("/home/user/project/src/foo.cpp"));
        let other = sut.provide(
            &Query {
                file: PathBuf::from("/somewhere/else/bar.c"),
                working_dir: Some(PathBuf::from("/tmp")),
                client_data: HashMap::from([(String::from("version"), String::from("2"))]),
            }
        );
        let odd = sut.provide(&Query::from_file("README.md"));

        assert_eq!(one, other);
        assert_eq!(one, odd);
    }

    #[test]
    fn test_configured_flags() {
        let config = Flags {
            language: Some(Language::C),
            standard: Standard::try_from(String::from("c11")).ok(),
            include_subpaths: Some(vec![PathBuf::from("src")]),
            compiler: None,
            flags_file: None,
            flags_to_add: vec![String::from("-DNDEBUG")],
            do_cache: Some(false),
        };

        let settings = Settings::from_configuration(Path::new("/project"), config).unwrap();
        let result = settings.flag_set();

        let expected = FlagSet {
            flags: vec!["-x", "c", "-std=c11", "-I", "/project/src", "-DNDEBUG"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            do_cache: false,
        };

        assert_eq!(expected, result);
    }

    #[test]
    fn test_resolution_defaults() {
        let result = Settings::from_configuration(
            Path::new("/home/user/project"),
            Flags::default(),
        ).unwrap();

        assert_eq!(*SETTINGS, result);
    }

    lazy_static! {
        static ref SETTINGS: Settings = Settings {
            directory: PathBuf::from("/home/user/project"),
            compiler: PathBuf::from("clang++"),
            language: Language::Cpp,
            standard: Standard::default(),
            include_dirs: vec![
                String::from("/home/user/project/include"),
                String::from("/home/user/project/serial/include"),
                String::from("/home/user/project/serial/mstd/include"),
            ],
            extra_flags: vec![],
            do_cache: true,
        };
    }
}
