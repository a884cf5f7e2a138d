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

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use json_compilation_db::Entry;

use crate::configuration::{Content, DuplicateFilterFields};

pub(crate) type EntryPredicate = Box<dyn FnMut(&Entry) -> bool>;

impl DuplicateFilterFields {
    fn hash_source(entry: &Entry) -> u64 {
        let mut s = DefaultHasher::default();
        entry.file.hash(&mut s);
        s.finish()
    }

    fn hash_source_and_output(entry: &Entry) -> u64 {
        let mut s = DefaultHasher::default();
        entry.file.hash(&mut s);
        entry.output.hash(&mut s);
        s.finish()
    }

    fn hash_all(entry: &Entry) -> u64 {
        let mut s = DefaultHasher::default();
        entry.file.hash(&mut s);
        entry.directory.hash(&mut s);
        entry.arguments.hash(&mut s);
        s.finish()
    }

    fn hash(&self) -> fn(&Entry) -> u64 {
        match self {
            DuplicateFilterFields::FileOnly =>
                DuplicateFilterFields::hash_source,
            DuplicateFilterFields::FileAndOutputOnly =>
                DuplicateFilterFields::hash_source_and_output,
            DuplicateFilterFields::All =>
                DuplicateFilterFields::hash_all,
        }
    }
}

impl Into<EntryPredicate> for DuplicateFilterFields {
    /// The first entry with a given hash passes, any later one is dropped.
    fn into(self) -> EntryPredicate {
        let mut have_seen = HashSet::new();
        let hash_calculation = DuplicateFilterFields::hash(&self);

        Box::new(move |entry| {
            let hash = hash_calculation(entry);
            if !have_seen.contains(&hash) {
                have_seen.insert(hash);
                true
            } else {
                false
            }
        })
    }
}

impl Into<EntryPredicate> for Content {
    /// The existing source check runs first, the duplicate check only
    /// sees entries which passed it.
    fn into(self) -> EntryPredicate {
        let existing_check = self.include_only_existing_source.unwrap_or(false);
        let mut duplicates: EntryPredicate = self.duplicate_filter_fields
            .unwrap_or(DuplicateFilterFields::All)
            .into();

        Box::new(move |entry| {
            if existing_check && !entry.file.is_file() {
                return false;
            }
            duplicates(entry)
        })
    }
}
