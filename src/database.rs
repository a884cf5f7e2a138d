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

use json_compilation_db::Entry;
use path_absolutize::Absolutize;
use thiserror::Error;

/// Represents a compiler invocation the completion host could run on a
/// single source file.
#[derive(Debug, PartialEq)]
pub struct Command {
    pub directory: PathBuf,
    pub compiler: PathBuf,
    pub flags: Vec<String>,
    pub file: PathBuf,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("encode error")]
    OsString,
}

impl TryFrom<Command> for Entry {
    type Error = Error;

    fn try_from(value: Command) -> Result<Self, Self::Error> {
        // Assemble the arguments as the host would invoke the compiler.
        let mut arguments: Vec<String> = vec![];
        arguments.push(into_string(&value.compiler)?);
        for flag in &value.flags {
            arguments.push(flag.clone());
        }
        arguments.push(into_string(&value.file)?);

        Ok(
            Entry {
                file: into_abspath(value.file, value.directory.as_path())?,
                directory: value.directory,
                output: None,
                arguments,
            }
        )
    }
}

fn into_abspath(path: PathBuf, root: &Path) -> Result<PathBuf, std::io::Error> {
    let candidate = if path.is_absolute() {
        path.absolutize()
    } else {
        path.absolutize_from(root)
    };
    candidate.map(|x| x.to_path_buf())
}

fn into_string(path: &Path) -> Result<String, Error> {
    path.to_path_buf().into_os_string().into_string().map_err(|_| Error::OsString)
}
