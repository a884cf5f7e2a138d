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

use std::fs::{File, OpenOptions};
use std::io::{stdin, stdout, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::{arg, command, ArgAction};
use crossbeam_channel::{bounded, Sender};
use json_compilation_db::Entry;
use log::LevelFilter;
use path_absolutize::Absolutize;
use simple_logger::SimpleLogger;

use crate::configuration::{Configuration, Content};
use crate::filter::EntryPredicate;
use crate::provider::{Provider, Settings};
use crate::query::Query;

mod configuration;
mod database;
mod filter;
mod flags;
mod matchers;
mod parser;
mod provider;
mod query;

fn main() -> Result<()> {
    let arguments = Arguments::parse().validate()?;
    let application = Application::configure(arguments)?;
    application.run()?;

    Ok(())
}

#[derive(Debug, PartialEq)]
struct Arguments {
    file: Option<String>,
    input: Option<String>,
    output: Option<String>,
    root: Option<String>,
    config: Option<String>,
    append: bool,
    verbose: u8,
}

impl Arguments {
    fn parse() -> Self {
        let matches = command!()
            .args(&[
                arg!(-f --file <FILE> "Path of the source file to answer a single query for"),
                arg!(-i --input <FILE> "Path of the query stream"),
                arg!(-o --output <FILE> "Path of the result file"),
                arg!(-r --root <DIR> "Path of the project root directory"),
                arg!(-c --config <FILE> "Path of the config file"),
                arg!(-a --append "Append result to an existing output file")
                    .action(ArgAction::SetTrue),
                arg!(-v --verbose ... "Sets the level of verbosity")
                    .action(ArgAction::Count),
            ])
            .get_matches();

        Arguments {
            file: matches.get_one::<String>("file")
                .map(String::to_string),
            input: matches.get_one::<String>("input")
                .map(String::to_string),
            output: matches.get_one::<String>("output")
                .map(String::to_string),
            root: matches.get_one::<String>("root")
                .map(String::to_string),
            config: matches.get_one::<String>("config")
                .map(String::to_string),
            append: matches.get_one::<bool>("append")
                .unwrap_or(&false)
                .clone(),
            verbose: matches.get_count("verbose"),
        }
    }

    fn validate(self) -> Result<Self> {
        match (&self.file, &self.input) {
            (None, None) =>
                return Err(anyhow!("Either a file or an input stream has to be given.")),
            (Some(_), Some(_)) =>
                return Err(anyhow!("A file and an input stream can't be given together.")),
            _ => {}
        }
        if self.input.as_deref() == Some("-") && self.config.as_deref() == Some("-") {
            return Err(anyhow!("Both input and config reading the standard input."));
        }
        if self.append && self.file.is_some() {
            return Err(anyhow!("Append can be used only with an input stream."));
        }
        if self.append && self.output() == "-" {
            return Err(anyhow!("Append can't applied to the standard output."));
        }
        if matches!(self.config.as_deref(), Some("-") | Some("/dev/stdin")) && self.root.is_none() {
            return Err(anyhow!("Project root has to be given when the config comes from the standard input."));
        }

        Ok(self)
    }

    /// Single queries are answered on the standard output, the batch
    /// mode writes a compilation database into the current directory.
    fn output(&self) -> String {
        match &self.output {
            Some(output) =>
                output.clone(),
            None if self.file.is_some() =>
                String::from("-"),
            None =>
                String::from("compile_commands.json"),
        }
    }

    fn prepare_logging(&self) -> Result<()> {
        let level = match &self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        let mut logger = SimpleLogger::new()
            .with_level(level);
        if level <= LevelFilter::Debug {
            logger = logger.with_local_timestamps()
        }
        logger.init()?;

        Ok(())
    }

    fn configuration(&self) -> Result<Configuration> {
        match self.config.as_deref() {
            Some("-") | Some("/dev/stdin") =>
                configuration::io::from_stdin()
                    .context("Failed to read configuration from stdin"),
            Some(file) =>
                configuration::io::from_file(Path::new(file))
                    .with_context(|| format!("Failed to read configuration from file: {}", file)),
            None =>
                Ok(Configuration::default()),
        }
    }

    /// The project root is the directory every include subpath hangs off.
    ///
    /// It is the directory given on the command line, or the directory
    /// the configuration file lives in. Resolved to an absolute path
    /// once, here; any failure of that resolution ends the run.
    fn root(&self) -> Result<PathBuf> {
        let candidate = match (&self.root, &self.config) {
            (Some(dir), _) =>
                PathBuf::from(dir),
            (None, Some(file)) => {
                let config = Path::new(file).absolutize()
                    .with_context(|| format!("Failed to resolve path: {}", file))?;
                config.parent()
                    .map(Path::to_path_buf)
                    .ok_or_else(|| anyhow!("Config file has no parent directory: {}", file))?
            }
            (None, None) =>
                PathBuf::from("."),
        };
        let root = candidate.absolutize()
            .with_context(|| format!("Failed to resolve directory: {:?}", candidate))?;

        Ok(root.to_path_buf())
    }
}

#[derive(Debug, PartialEq)]
struct Application {
    arguments: Arguments,
    settings: Settings,
    content: Option<Content>,
}

impl Application {
    fn configure(arguments: Arguments) -> Result<Self> {
        arguments.prepare_logging()?;

        let configuration = arguments.configuration()?;
        let root = arguments.root()?;
        log::debug!("project root: {:?}", root);

        let settings = Settings::from_configuration(root.as_path(), configuration.flags.unwrap_or_default())
            .context("Failed to resolve the configured flags")?;
        let content = configuration.output.and_then(|output| output.content);

        Ok(Application { arguments, settings, content })
    }

    fn run(self) -> Result<()> {
        match (self.arguments.file.clone(), self.arguments.input.clone()) {
            (Some(file), _) =>
                self.run_query(file),
            (None, Some(input)) =>
                self.run_batch(input),
            (None, None) =>
                Err(anyhow!("Either a file or an input stream has to be given.")),
        }
    }

    /// Answer a single query: write the flag record for the given file.
    fn run_query(self, file: String) -> Result<()> {
        let provider: Box<dyn Provider> = (&self.settings).into();
        let answer = provider.provide(&Query::from_file(file));

        match self.arguments.output().as_str() {
            "-" | "/dev/stdout" =>
                flags::write(stdout(), &answer)?,
            output => {
                let file = File::create(output)
                    .with_context(|| format!("Failed to create file: {}", output))?;
                flags::write(BufWriter::new(file), &answer)?;
            }
        };

        Ok(())
    }

    /// Answer a query stream: write a compilation database.
    fn run_batch(self, input: String) -> Result<()> {
        let (snd, rcv) = bounded::<Entry>(32);

        // Start reading queries (in a new thread), and send the answers across the channel.
        let settings = self.settings.clone();
        let output = PathBuf::from(self.arguments.output());
        let append = self.arguments.append;
        thread::spawn(move || {
            process_queries(input.as_str(), &settings, &snd)
                .expect("Failed to process queries.");

            if append {
                copy_entries(output.as_path(), &snd)
                    .expect("Failed to process existing compilation database");
            }
            drop(snd);
        });

        // Start writing the entries (from the channel) to the output.
        let filter: EntryPredicate = self.content.unwrap_or_default().into();
        let entries = rcv.iter()
            .inspect(|entry| log::debug!("{:?}", entry))
            .filter(filter);
        match self.arguments.output().as_str() {
            "-" | "/dev/stdout" =>
                json_compilation_db::write(stdout(), entries)?,
            output => {
                let temp = format!("{}.tmp", output);
                // Create scope for the file, so it will be closed when the scope is over.
                {
                    let file = File::create(&temp)
                        .with_context(|| format!("Failed to create file: {}", temp))?;
                    let buffer = BufWriter::new(file);
                    json_compilation_db::write(buffer, entries)?;
                }
                std::fs::rename(&temp, output)
                    .with_context(|| format!("Failed to rename file from '{}' to '{}'.", temp, output))?;
            }
        };

        Ok(())
    }
}

fn copy_entries(source: &Path, destination: &Sender<Entry>) -> Result<()> {
    let mut count: u32 = 0;

    let file = OpenOptions::new().read(true).open(source)
        .with_context(|| format!("Failed to open file: {:?}", source))?;
    let buffer = BufReader::new(file);

    for entry in json_compilation_db::read(buffer) {
        match entry {
            Ok(value) => {
                destination.send(value)?;
                count += 1;
            }
            Err(error) =>
                log::error!("Failed to read entry: {}", error),
        }
    }

    log::debug!("Found {count} entries from previous run.");
    Ok(())
}

fn process_queries(source: &str, settings: &Settings, destination: &Sender<Entry>) -> Result<()> {
    let (snd, rcv) = bounded::<Query>(128);

    // Start worker threads, which will answer queries and create compilation database entries.
    for _ in 0..num_cpus::get() {
        let provider: Box<dyn Provider> = settings.into();
        let directory = settings.directory.clone();
        let compiler = settings.compiler.clone();
        let captured_sink = destination.clone();
        let captured_source = rcv.clone();
        thread::spawn(move || {
            for query in captured_source.into_iter() {
                let answer = provider.provide(&query);
                log::debug!("query answered, {:?} : {:?}", answer, query);
                let command = database::Command {
                    directory: directory.clone(),
                    compiler: compiler.clone(),
                    flags: answer.flags,
                    file: query.file,
                };
                let entry: Result<Entry, database::Error> = command.try_into();
                match entry {
                    Ok(entry) =>
                        captured_sink.send(entry).expect("Failed to send entry."),
                    Err(error) =>
                        log::debug!("can't convert into compilation entry: {}", error),
                }
            }
        });
    }

    // Start sending the queries from the given stream.
    let buffer: BufReader<Box<dyn std::io::Read>> = match source {
        "-" | "/dev/stdin" =>
            BufReader::new(Box::new(stdin())),
        _ => {
            let file = OpenOptions::new().read(true).open(source)
                .with_context(|| format!("Failed to open file: {}", source))?;
            BufReader::new(Box::new(file))
        }
    };

    for query in query::from_reader(buffer) {
        match query {
            Ok(value) => {
                snd.send(value)?;
            }
            Err(error) =>
                log::error!("Failed to read query: {}", error),
        }
    }
    drop(snd);

    Ok(())
}
