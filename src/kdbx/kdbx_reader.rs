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

use std::convert::TryFrom;
use std::io;
use std::io::prelude::*;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

use super::consts::*;
use super::kdbx_header::KdbxHeader;
use super::result::{Error, Result};

pub const DEFAULT_MAX_HEADER_SIZE: usize = 1024 * 1024;

/// What to do with field IDs outside 0..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Read past the record and carry on.
    Skip,
    /// Fail with [`Error::UnknownField`].
    Reject,
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Upper bound on bytes consumed before the EndOfHeader record.
    pub max_header_size: usize,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            unknown_fields: UnknownFieldPolicy::Skip,
        }
    }
}

pub struct KdbxReader {}

impl KdbxReader {
    // KDBX 3.x header block:
    //  | 1b      | 2b LE | size  |
    //  [field_id | size  | data  ]*  field_id 0 ends the block
    pub fn read_header<T: Read>(stream: &mut T, config: &ReaderConfig) -> Result<KdbxHeader> {
        let mut header = KdbxHeader::default();
        let mut consumed: usize = 0;
        let mut seen = [false; 11];

        loop {
            let (field_id, data_len) = KdbxReader::read_field_prefix(stream)?;

            consumed += FIELD_PREFIX_SIZE + data_len;
            if consumed > config.max_header_size {
                return Err(Error::HeaderTooLarge {
                    limit: config.max_header_size,
                });
            }

            match HeaderFieldId::try_from(field_id) {
                Ok(HeaderFieldId::EndOfHeader) => {
                    let trailer = KdbxReader::read_field_data(stream, data_len)?;
                    if trailer[..] != END_OF_HEADER[..] {
                        warn!(len = data_len, "non-standard end of header marker");
                    }
                    break;
                }
                Ok(id) => {
                    let data = KdbxReader::read_field_data(stream, data_len)?;
                    if seen[id as usize] {
                        debug!(field = id.name(), "repeated header field, keeping the last value");
                    }
                    seen[id as usize] = true;

                    header.set_field(id, &data)?;
                    debug!(field = id.name(), len = data_len, "read header field");
                }
                Err(unknown) => match config.unknown_fields {
                    UnknownFieldPolicy::Reject => return Err(Error::UnknownField { id: unknown }),
                    UnknownFieldPolicy::Skip => {
                        KdbxReader::skip_field_data(stream, data_len)?;
                        warn!(id = unknown, len = data_len, "skipped unknown header field");
                    }
                },
            }
        }

        debug!(bytes = consumed, "header block read");
        Ok(header)
    }

    // Each field starts with field_id (1 byte) and data size (2 bytes LE).
    pub fn read_field_prefix<T: Read>(stream: &mut T) -> Result<(u8, usize)> {
        let field_id = stream.read_u8()?;
        let data_len = stream.read_u16::<LittleEndian>()? as usize;
        Ok((field_id, data_len))
    }

    fn read_field_data<T: Read>(stream: &mut T, len: usize) -> Result<Vec<u8>> {
        let mut data = vec![0u8; len];
        stream.read_exact(&mut data)?;
        Ok(data)
    }

    fn skip_field_data<T: Read>(stream: &mut T, len: usize) -> Result<()> {
        let skipped = io::copy(&mut stream.by_ref().take(len as u64), &mut io::sink())?;
        if skipped != len as u64 {
            return Err(Error::TruncatedRead);
        }
        Ok(())
    }
}
