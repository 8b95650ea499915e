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

use std::io::prelude::*;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use super::consts::*;
use super::result::{Error, Result};

/// The 12 bytes in front of the header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    pub secondary: u32,
    pub version_minor: u16,
    pub version_major: u16,
}

impl Default for FileSignature {
    fn default() -> Self {
        FileSignature {
            secondary: VER_SIGNATURE_2XPOST,
            version_minor: FILE_VERSION_MINOR_3_1,
            version_major: FILE_VERSION_MAJOR_3,
        }
    }
}

impl FileSignature {
    // Bytes 0-3: Primary identifier, common across all kdbx versions
    // Bytes 4-7: Secondary identifier (0x67 is latest, 0x66 is the KeePass 2 pre-release format and 0x65 is KeePass 1)
    // Bytes 8-9: LE WORD, file version (minor)
    // Bytes 10-11: LE WORD, file version (major)
    pub fn read_from<T: Read>(stream: &mut T) -> Result<FileSignature> {
        let prefix = stream.read_u32::<LittleEndian>()?;
        if prefix != KDBX_PREFIX {
            return Err(Error::InvalidSignature { found: prefix });
        }

        let signature = FileSignature {
            secondary: stream.read_u32::<LittleEndian>()?,
            version_minor: stream.read_u16::<LittleEndian>()?,
            version_major: stream.read_u16::<LittleEndian>()?,
        };
        debug!(
            major = signature.version_major,
            minor = signature.version_minor,
            "read file signature"
        );

        signature.check()?;
        Ok(signature)
    }

    pub fn write_to<S: Write>(&self, stream: &mut S) -> Result<()> {
        stream.write_u32::<LittleEndian>(KDBX_PREFIX)?;
        stream.write_u32::<LittleEndian>(self.secondary)?;
        stream.write_u16::<LittleEndian>(self.version_minor)?;
        stream.write_u16::<LittleEndian>(self.version_major)?;
        Ok(())
    }

    // Version 4 widens field lengths to 4 bytes, so only 3.x headers can follow.
    fn check(&self) -> Result<()> {
        match self.secondary {
            VER_SIGNATURE_2XPRE | VER_SIGNATURE_2XPOST
                if self.version_major == FILE_VERSION_MAJOR_3 =>
            {
                Ok(())
            }
            _ => Err(Error::UnsupportedVersion {
                secondary: self.secondary,
                major: self.version_major,
                minor: self.version_minor,
            }),
        }
    }
}
