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

use serde::Serialize;

/// Represents the answer to a completion host query.
///
/// The `flags` are the compiler arguments the host shall parse the
/// queried file with. `do_cache` grants the host to reuse the answer
/// for the same file without asking again.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlagSet {
    pub flags: Vec<String>,
    pub do_cache: bool,
}

/// Write the answer record on the given stream as JSON.
pub fn write(writer: impl std::io::Write, value: &FlagSet) -> Result<(), serde_json::Error> {
    serde_json::to_writer(writer, value)
}
