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

use std::io::{BufRead, BufReader};
use std::path::Path;

use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{all_consuming, map};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, terminated};
use nom::IResult;
use thiserror::Error;

/// This error type encompasses any error that can be returned by this module.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Syntax error in line: {0}")]
    SyntaxError(String),
}

/// Load the flag tokens of the given flags file.
///
/// The file holds white space separated flag tokens, any number of them
/// per line. Quoting (single or double) protects white space inside a
/// token; a line starting with `#` is a comment.
pub fn load(file: &Path) -> Result<Vec<String>, Error> {
    let reader = std::fs::OpenOptions::new().read(true).open(file)?;
    from_reader(reader)
}

pub fn from_reader(reader: impl std::io::Read) -> Result<Vec<String>, Error> {
    let mut result = vec![];
    for line in BufReader::new(reader).lines() {
        result.extend(parse_line(line?.as_str())?);
    }
    Ok(result)
}

/// Split a single line into flag tokens.
pub fn parse_line(line: &str) -> Result<Vec<String>, Error> {
    if line.trim_start().starts_with('#') {
        return Ok(vec![]);
    }
    match all_consuming(tokens)(line) {
        Ok((_, tokens)) =>
            Ok(tokens),
        Err(_) =>
            Err(Error::SyntaxError(line.to_string())),
    }
}

fn tokens(input: &str) -> IResult<&str, Vec<String>> {
    preceded(space, many0(terminated(token, space)))(input)
}

fn token(input: &str) -> IResult<&str, String> {
    alt((quoted('"'), quoted('\''), bare))(input)
}

fn quoted(mark: char) -> impl Fn(&str) -> IResult<&str, String> {
    move |input| {
        map(
            delimited(char(mark), take_while(move |c| c != mark), char(mark)),
            String::from,
        )(input)
    }
}

fn bare(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && c != '"' && c != '\''),
        String::from,
    )(input)
}

fn space(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace())(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_line() {
        assert_eq!(Vec::<String>::new(), parse_line("").unwrap());
        assert_eq!(Vec::<String>::new(), parse_line("   \t").unwrap());
    }

    #[test]
    fn test_comment_line() {
        assert_eq!(Vec::<String>::new(), parse_line("# local build flags").unwrap());
        assert_eq!(Vec::<String>::new(), parse_line("   # indented comment").unwrap());
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(
            vec!["-DNDEBUG", "-Wall"],
            parse_line("-DNDEBUG -Wall").unwrap()
        );
        assert_eq!(
            vec!["-isystem", "/usr/lib/llvm/include"],
            parse_line("  -isystem\t/usr/lib/llvm/include  ").unwrap()
        );
    }

    #[test]
    fn test_quoted_tokens() {
        assert_eq!(
            vec!["-DVERSION=1.2", "a b c"],
            parse_line(r#"-DVERSION=1.2 "a b c""#).unwrap()
        );
        assert_eq!(
            vec!["with space"],
            parse_line("'with space'").unwrap()
        );
        assert_eq!(
            vec![""],
            parse_line(r#""""#).unwrap()
        );
    }

    #[test]
    fn test_unterminated_quote() {
        let result = parse_line(r#"-Wall "unterminated"#);

        assert!(result.is_err());

        let message = result.unwrap_err().to_string();
        assert!(message.contains("unterminated"));
    }

    #[test]
    fn test_multi_line_stream() {
        let content: &[u8] = br#"# project flags
            -DNDEBUG

            -isystem /opt/include
            "-DGREETING=hello world"
        "#;

        let result = from_reader(content).unwrap();

        assert_eq!(
            vec![
                "-DNDEBUG",
                "-isystem",
                "/opt/include",
                "-DGREETING=hello world",
            ],
            result
        );
    }
}
