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

use std::io;

use thiserror::Error;

use super::consts::HeaderFieldId;

#[derive(Debug, Error)]
pub enum Error {
    /// Stream ended inside a record.
    #[error("header truncated: stream ended in the middle of a field")]
    TruncatedRead,

    #[error("field {field:?} must be {expected} bytes, got {actual}")]
    MalformedInteger {
        field: HeaderFieldId,
        expected: usize,
        actual: usize,
    },

    #[error("field {field:?} is {len} bytes, longer than the 65535 bytes a u16 length can describe")]
    ValueTooLarge { field: HeaderFieldId, len: usize },

    #[error("header exceeds the {limit} byte limit")]
    HeaderTooLarge { limit: usize },

    #[error("unknown header field id {id}")]
    UnknownField { id: u8 },

    #[error("random source failed to supply key material: {0}")]
    EntropyFailure(#[source] rand::Error),

    #[error("unexpected file signature {found:#010X}")]
    InvalidSignature { found: u32 },

    #[error("unsupported file version: signature {secondary:#010X}, version {major}.{minor}")]
    UnsupportedVersion {
        secondary: u32,
        major: u16,
        minor: u16,
    },

    #[error("i/o error: {0}")]
    Io(#[source] io::Error),
}

// UnexpectedEof from read_exact and friends means the header was cut short.
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedRead,
            _ => Error::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
