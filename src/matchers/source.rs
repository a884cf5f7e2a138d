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

use std::collections::HashSet;
use lazy_static::lazy_static;

/// Check if the path names a file a C family parser would accept.
///
/// The decision is made on the file extension alone, the file itself
/// is not touched.
pub fn looks_like_a_source_file(path: &str) -> bool {
    if let Some((_, extension)) = path.rsplit_once('.') {
        return EXTENSIONS.contains(extension);
    }
    false
}

lazy_static! {
    static ref EXTENSIONS: HashSet<&'static str> = {
        let mut set = HashSet::new();

        // header files
        set.insert("h");
        set.insert("hh");
        set.insert("H");
        set.insert("hp");
        set.insert("hxx");
        set.insert("hpp");
        set.insert("HPP");
        set.insert("h++");
        set.insert("tcc");
        // C
        set.insert("c");
        set.insert("C");
        // C++
        set.insert("cc");
        set.insert("CC");
        set.insert("c++");
        set.insert("C++");
        set.insert("cxx");
        set.insert("cpp");
        set.insert("cp");
        // ObjectiveC
        set.insert("m");
        set.insert("mi");
        set.insert("mm");
        set.insert("M");
        set.insert("mii");
        // Preprocessed
        set.insert("i");
        set.insert("ii");
        // Assembly
        set.insert("s");
        set.insert("S");
        set.insert("sx");
        set.insert("asm");

        set.shrink_to_fit();
        set
    };
}
