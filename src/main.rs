/*
   Copyright 2021 Rustam Kulenov

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use sha2::{Digest, Sha256};
use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kdbx_header::{
    FileSignature, KdbxHeader, KdbxReader, KdbxWriter, ReaderConfig, Result, UnknownFieldPolicy,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "kdbx-header", about = "Inspect and create KDBX 3.x header blocks")]
enum Command {
    /// Print the file signature and header fields of a .kdbx file
    Inspect {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
        /// Fail on unknown header fields instead of skipping them
        #[structopt(long)]
        strict: bool,
        /// Give up if the header block grows past this many bytes
        #[structopt(long, default_value = "1048576")]
        max_header_size: usize,
    },
    /// Write a file signature followed by a freshly generated header block
    Generate {
        #[structopt(parse(from_os_str))]
        out: PathBuf,
        #[structopt(long)]
        comment: Option<String>,
        /// Key transformation rounds (default 6000)
        #[structopt(long)]
        rounds: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Command::from_args()) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Inspect {
            file,
            strict,
            max_header_size,
        } => {
            let config = ReaderConfig {
                max_header_size,
                unknown_fields: if strict {
                    UnknownFieldPolicy::Reject
                } else {
                    UnknownFieldPolicy::Skip
                },
            };

            let data = fs::read(&file)?;
            let mut stream = &data[..];
            let signature = FileSignature::read_from(&mut stream)?;
            let header = KdbxReader::read_header(&mut stream, &config)?;
            let consumed = data.len() - stream.len();

            println!(
                "File version: {}.{}",
                signature.version_major, signature.version_minor
            );
            print!("{}", header);
            // Hash of the bytes as stored, which is what Meta/HeaderHash refers to.
            println!("Header hash: {}", hex::encode(Sha256::digest(&data[..consumed])));
        }
        Command::Generate {
            out,
            comment,
            rounds,
        } => {
            let mut header = KdbxHeader::generate()?;
            if let Some(comment) = comment {
                header.comment = comment.into_bytes();
            }
            if let Some(rounds) = rounds {
                header.transform_rounds = rounds;
            }

            let mut stream = BufWriter::new(File::create(&out)?);
            FileSignature::default().write_to(&mut stream)?;
            KdbxWriter::write_header(&mut stream, &header)?;
            stream.flush()?;

            info!(path = %out.display(), "wrote header");
        }
    }

    Ok(())
}
