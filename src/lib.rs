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

//! Reader and writer for the outer header block of KeePass 2 (KDBX 3.x) database files.
//!
//! The header is a stream of `[field_id: u8][length: u16 LE][value]` records ending
//! with field 0. [`KdbxHeader`] holds the decoded fields, [`KdbxReader`] and
//! [`KdbxWriter`] move it to and from byte streams, and [`KdbxHeader::generate`]
//! creates the parameters for a new database.

pub mod kdbx;

pub use kdbx::consts::HeaderFieldId;
pub use kdbx::kdbx_header::KdbxHeader;
pub use kdbx::kdbx_reader::{KdbxReader, ReaderConfig, UnknownFieldPolicy};
pub use kdbx::kdbx_writer::KdbxWriter;
pub use kdbx::result::{Error, Result};
pub use kdbx::signature::FileSignature;
