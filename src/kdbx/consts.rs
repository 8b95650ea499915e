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

use hex_literal::hex;
use std::convert::TryFrom;

pub const KDBX_PREFIX: u32 = 0x9AA2D903;
pub const VER_SIGNATURE_1X: u32 = 0xB54BFB65;
pub const VER_SIGNATURE_2XPRE: u32 = 0xB54BFB66;
pub const VER_SIGNATURE_2XPOST: u32 = 0xB54BFB67;
pub const FILE_VERSION_MAJOR_3: u16 = 3;
pub const FILE_VERSION_MINOR_3_1: u16 = 1;

pub const CIPHERSUITE_AES256: [u8; 16] = hex!("31c1f2e6bf714350be5805216afc5aff");
pub const CIPHERSUITE_TWOFISH: [u8; 16] = hex!("ad68f29f576f4bb9a36ad47af965346c");
pub const CIPHERSUITE_CHACHA20: [u8; 16] = hex!("d6038a2b8b6f4cb5a524339a31dbb59a");

// Inner random stream IDs, u32 LE on the wire
pub const INNER_STREAM_NONE: [u8; 4] = hex!("00000000");
pub const INNER_STREAM_ARC4: [u8; 4] = hex!("01000000");
pub const INNER_STREAM_SALSA20: [u8; 4] = hex!("02000000");
pub const INNER_STREAM_CHACHA20: [u8; 4] = hex!("03000000");

pub const GZIP_COMPRESSION_FLAG: u32 = 1;
pub const DEFAULT_TRANSFORM_ROUNDS: u64 = 6000;
pub const SEED_LEN: usize = 32;
pub const IV_LEN: usize = 16;

/// Payload of the EndOfHeader record.
pub const END_OF_HEADER: [u8; 4] = [0x0d, 0x0a, 0x0d, 0x0a];

/// Field lengths are u16 on the wire.
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// field_id (1 byte) + length (2 bytes)
pub const FIELD_PREFIX_SIZE: usize = 3;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Hash)]
pub enum HeaderFieldId {
    EndOfHeader = 0,
    Comment = 1,
    CipherID = 2,         // 16 bytes
    CompressionFlags = 3, // 4 bytes
    MasterSeed = 4,       // 32 bytes
    TransformSeed = 5,    // 32 bytes
    TransformRounds = 6,  // 8 bytes
    EncryptionIV = 7,     // 16 bytes
    ProtectedStreamKey = 8,
    StreamStartBytes = 9,
    InnerRandomStreamID = 10, // 4 bytes
}

/// How a field's value is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// Little-endian integer of exactly this many bytes.
    Fixed(usize),
    Variable,
}

impl HeaderFieldId {
    /// Every payload-carrying field, in the order the writer emits them.
    pub const FIELDS: [HeaderFieldId; 10] = [
        HeaderFieldId::Comment,
        HeaderFieldId::CipherID,
        HeaderFieldId::CompressionFlags,
        HeaderFieldId::MasterSeed,
        HeaderFieldId::TransformSeed,
        HeaderFieldId::TransformRounds,
        HeaderFieldId::EncryptionIV,
        HeaderFieldId::ProtectedStreamKey,
        HeaderFieldId::StreamStartBytes,
        HeaderFieldId::InnerRandomStreamID,
    ];

    pub fn width(self) -> FieldWidth {
        match self {
            HeaderFieldId::EndOfHeader => FieldWidth::Fixed(END_OF_HEADER.len()),
            HeaderFieldId::CompressionFlags => FieldWidth::Fixed(4),
            HeaderFieldId::TransformRounds => FieldWidth::Fixed(8),
            _ => FieldWidth::Variable,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeaderFieldId::EndOfHeader => "EndOfHeader",
            HeaderFieldId::Comment => "Comment",
            HeaderFieldId::CipherID => "CipherID",
            HeaderFieldId::CompressionFlags => "CompressionFlags",
            HeaderFieldId::MasterSeed => "MasterSeed",
            HeaderFieldId::TransformSeed => "TransformSeed",
            HeaderFieldId::TransformRounds => "TransformRounds",
            HeaderFieldId::EncryptionIV => "EncryptionIV",
            HeaderFieldId::ProtectedStreamKey => "ProtectedStreamKey",
            HeaderFieldId::StreamStartBytes => "StreamStartBytes",
            HeaderFieldId::InnerRandomStreamID => "InnerRandomStreamID",
        }
    }
}

impl TryFrom<u8> for HeaderFieldId {
    // Unknown IDs are handed back so the reader can decide what to do with them.
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HeaderFieldId::EndOfHeader),
            1 => Ok(HeaderFieldId::Comment),
            2 => Ok(HeaderFieldId::CipherID),
            3 => Ok(HeaderFieldId::CompressionFlags),
            4 => Ok(HeaderFieldId::MasterSeed),
            5 => Ok(HeaderFieldId::TransformSeed),
            6 => Ok(HeaderFieldId::TransformRounds),
            7 => Ok(HeaderFieldId::EncryptionIV),
            8 => Ok(HeaderFieldId::ProtectedStreamKey),
            9 => Ok(HeaderFieldId::StreamStartBytes),
            10 => Ok(HeaderFieldId::InnerRandomStreamID),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuterCipherSuite {
    AES256,
    Twofish,
    ChaCha20,
}

impl OuterCipherSuite {
    pub fn from_id(id: &[u8]) -> Option<Self> {
        if id == CIPHERSUITE_AES256 {
            Some(OuterCipherSuite::AES256)
        } else if id == CIPHERSUITE_TWOFISH {
            Some(OuterCipherSuite::Twofish)
        } else if id == CIPHERSUITE_CHACHA20 {
            Some(OuterCipherSuite::ChaCha20)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerStreamCipher {
    None,
    Arc4Variant,
    Salsa20,
    ChaCha20,
}

impl InnerStreamCipher {
    pub fn from_id(id: &[u8]) -> Option<Self> {
        if id == INNER_STREAM_NONE {
            Some(InnerStreamCipher::None)
        } else if id == INNER_STREAM_ARC4 {
            Some(InnerStreamCipher::Arc4Variant)
        } else if id == INNER_STREAM_SALSA20 {
            Some(InnerStreamCipher::Salsa20)
        } else if id == INNER_STREAM_CHACHA20 {
            Some(InnerStreamCipher::ChaCha20)
        } else {
            None
        }
    }
}
