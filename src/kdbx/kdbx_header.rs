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

use std::borrow::Cow;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use super::consts::*;
use super::kdbx_reader::{KdbxReader, ReaderConfig};
use super::kdbx_writer::KdbxWriter;
use super::result::{Error, Result};
use super::signature::FileSignature;

/// Outer header of a KDBX 3.x database: the cryptographic parameters needed
/// to decrypt the payload that follows it.
///
/// Byte fields are kept exactly as read. An empty byte field means "not
/// present" and is left out when the header is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KdbxHeader {
    pub comment: Vec<u8>,
    pub cipher_id: Vec<u8>,
    pub compression_flags: u32,
    pub master_seed: Vec<u8>,
    pub transform_seed: Vec<u8>,
    pub transform_rounds: u64,
    pub encryption_iv: Vec<u8>,
    pub protected_stream_key: Vec<u8>,
    pub stream_start_bytes: Vec<u8>,
    pub inner_random_stream_id: Vec<u8>,
}

impl KdbxHeader {
    /// Creates a header for a new database, drawing seeds and keys from the OS random source.
    pub fn generate() -> Result<KdbxHeader> {
        KdbxHeader::generate_with(&mut OsRng)
    }

    /// Same as [`KdbxHeader::generate`] with a caller supplied random source.
    ///
    /// A source that cannot deliver bytes fails the whole call with
    /// [`Error::EntropyFailure`]; no field is ever left zero-filled.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<KdbxHeader> {
        Ok(KdbxHeader {
            comment: Vec::new(),
            cipher_id: CIPHERSUITE_AES256.to_vec(),
            compression_flags: GZIP_COMPRESSION_FLAG,
            master_seed: random_bytes(rng, SEED_LEN)?,
            transform_seed: random_bytes(rng, SEED_LEN)?,
            transform_rounds: DEFAULT_TRANSFORM_ROUNDS,
            encryption_iv: random_bytes(rng, IV_LEN)?,
            protected_stream_key: random_bytes(rng, SEED_LEN)?,
            stream_start_bytes: random_bytes(rng, SEED_LEN)?,
            inner_random_stream_id: INNER_STREAM_SALSA20.to_vec(),
        })
    }

    /// Raw wire value of a field. Integers come back little-endian.
    pub fn field(&self, id: HeaderFieldId) -> Cow<'_, [u8]> {
        match id {
            HeaderFieldId::EndOfHeader => Cow::Borrowed(&END_OF_HEADER[..]),
            HeaderFieldId::Comment => Cow::Borrowed(&self.comment[..]),
            HeaderFieldId::CipherID => Cow::Borrowed(&self.cipher_id[..]),
            HeaderFieldId::CompressionFlags => {
                let mut buf = [0u8; 4];
                LittleEndian::write_u32(&mut buf, self.compression_flags);
                Cow::Owned(buf.to_vec())
            }
            HeaderFieldId::MasterSeed => Cow::Borrowed(&self.master_seed[..]),
            HeaderFieldId::TransformSeed => Cow::Borrowed(&self.transform_seed[..]),
            HeaderFieldId::TransformRounds => {
                let mut buf = [0u8; 8];
                LittleEndian::write_u64(&mut buf, self.transform_rounds);
                Cow::Owned(buf.to_vec())
            }
            HeaderFieldId::EncryptionIV => Cow::Borrowed(&self.encryption_iv[..]),
            HeaderFieldId::ProtectedStreamKey => Cow::Borrowed(&self.protected_stream_key[..]),
            HeaderFieldId::StreamStartBytes => Cow::Borrowed(&self.stream_start_bytes[..]),
            HeaderFieldId::InnerRandomStreamID => Cow::Borrowed(&self.inner_random_stream_id[..]),
        }
    }

    /// Stores a raw wire value. Integer fields must have their exact width.
    /// EndOfHeader carries nothing and is ignored.
    pub fn set_field(&mut self, id: HeaderFieldId, value: &[u8]) -> Result<()> {
        if id == HeaderFieldId::EndOfHeader {
            return Ok(());
        }

        if let FieldWidth::Fixed(expected) = id.width() {
            if value.len() != expected {
                return Err(Error::MalformedInteger {
                    field: id,
                    expected,
                    actual: value.len(),
                });
            }
        }

        match id {
            HeaderFieldId::EndOfHeader => {}
            HeaderFieldId::Comment => self.comment = value.to_vec(),
            HeaderFieldId::CipherID => self.cipher_id = value.to_vec(),
            HeaderFieldId::CompressionFlags => {
                self.compression_flags = LittleEndian::read_u32(value)
            }
            HeaderFieldId::MasterSeed => self.master_seed = value.to_vec(),
            HeaderFieldId::TransformSeed => self.transform_seed = value.to_vec(),
            HeaderFieldId::TransformRounds => self.transform_rounds = LittleEndian::read_u64(value),
            HeaderFieldId::EncryptionIV => self.encryption_iv = value.to_vec(),
            HeaderFieldId::ProtectedStreamKey => self.protected_stream_key = value.to_vec(),
            HeaderFieldId::StreamStartBytes => self.stream_start_bytes = value.to_vec(),
            HeaderFieldId::InnerRandomStreamID => self.inner_random_stream_id = value.to_vec(),
        }

        Ok(())
    }

    pub fn cipher_suite(&self) -> Option<OuterCipherSuite> {
        OuterCipherSuite::from_id(&self.cipher_id)
    }

    pub fn inner_stream(&self) -> Option<InnerStreamCipher> {
        InnerStreamCipher::from_id(&self.inner_random_stream_id)
    }

    pub fn is_compressed(&self) -> bool {
        self.compression_flags == GZIP_COMPRESSION_FLAG
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(256);
        KdbxWriter::write_header(&mut buf, self)?;
        Ok(buf)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<KdbxHeader> {
        KdbxReader::read_header(&mut &buf[..], &ReaderConfig::default())
    }

    /// SHA-256 of the canonical header block.
    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(sha256(&self.to_bytes()?))
    }

    // KDBX 3.1 stores this digest in Meta/HeaderHash: it covers the file
    // signature as well as the header block.
    pub fn hash_with_signature(&self, signature: &FileSignature) -> Result<[u8; 32]> {
        let mut buf = Vec::with_capacity(256);
        signature.write_to(&mut buf)?;
        KdbxWriter::write_header(&mut buf, self)?;
        Ok(sha256(&buf))
    }
}

impl fmt::Display for KdbxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in HeaderFieldId::FIELDS.iter() {
            match id {
                HeaderFieldId::TransformRounds => writeln!(
                    f,
                    "({}) {}: {}",
                    *id as u8,
                    id.name(),
                    self.transform_rounds
                )?,
                _ => writeln!(
                    f,
                    "({}) {}: {}",
                    *id as u8,
                    id.name(),
                    hex::encode(self.field(*id))
                )?,
            }
        }
        Ok(())
    }
}

fn random_bytes<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    rng.try_fill_bytes(&mut buf).map_err(Error::EntropyFailure)?;
    Ok(buf)
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut res = [0u8; 32];
    res.copy_from_slice(&hash);
    res
}
