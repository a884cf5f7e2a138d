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

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Represents a single request from the completion host.
///
/// Only the file is required. The remaining fields are recognized for
/// the sake of the host protocol, but the flag computation ignores
/// them, as it ignores any unknown field the host may send.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Query {
    pub file: PathBuf,
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub client_data: HashMap<String, String>,
}

impl Query {
    pub fn from_file(file: impl Into<PathBuf>) -> Self {
        Query {
            file: file.into(),
            ..Default::default()
        }
    }
}

/// Read a stream of queries from the given source.
///
/// Queries are JSON objects, concatenated or separated by white space.
/// Reading stops at the first malformed value, reported as the last
/// element of the iterator.
pub fn from_reader(reader: impl std::io::Read) -> impl Iterator<Item = Result<Query, serde_json::Error>> {
    serde_json::Deserializer::from_reader(reader).into_iter::<Query>()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reading_a_stream() {
        let content: &[u8] = br#"
            {"file": "src/modbus.cpp"}
            {"file": "src/serial_rtu.cpp", "working_dir": "/home/user/project"}
            {"file": "tool/tool.cpp", "client_data": {"version": "1"}}
        "#;

        let result: Vec<Query> = from_reader(content)
            .collect::<Result<_, _>>()
            .unwrap();

        let expected = vec![
            Query::from_file("src/modbus.cpp"),
            Query {
                file: PathBuf::from("src/serial_rtu.cpp"),
                working_dir: Some(PathBuf::from("/home/user/project")),
                client_data: HashMap::new(),
            },
            Query {
                file: PathBuf::from("tool/tool.cpp"),
                working_dir: None,
                client_data: HashMap::from([(String::from("version"), String::from("1"))]),
            },
        ];

        assert_eq!(expected, result);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let content: &[u8] = br#"{"file": "main.cpp", "force_semantic": true}"#;

        let result: Vec<Query> = from_reader(content)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(vec![Query::from_file("main.cpp")], result);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let content: &[u8] = br#"{"working_dir": "/home/user"}"#;

        let result: Result<Vec<Query>, _> = from_reader(content).collect();

        assert!(result.is_err());
    }
}
