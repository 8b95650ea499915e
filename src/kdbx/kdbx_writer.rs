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
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::consts::*;
use super::kdbx_header::KdbxHeader;
use super::result::{Error, Result};

pub struct KdbxWriter {}

impl KdbxWriter {
    /// Writes the non-empty fields of `header` in ascending ID order, then EndOfHeader.
    ///
    /// Lengths are checked up front, so [`Error::ValueTooLarge`] is returned
    /// before anything reaches `stream`. An I/O error can leave a partial header behind.
    pub fn write_header<S: Write>(stream: &mut S, header: &KdbxHeader) -> Result<()> {
        let mut fields: Vec<(HeaderFieldId, u16, Cow<'_, [u8]>)> =
            Vec::with_capacity(HeaderFieldId::FIELDS.len());

        for id in HeaderFieldId::FIELDS.iter() {
            let data = header.field(*id);
            if data.is_empty() {
                continue;
            }
            if data.len() > MAX_FIELD_LEN {
                return Err(Error::ValueTooLarge {
                    field: *id,
                    len: data.len(),
                });
            }
            fields.push((*id, data.len() as u16, data));
        }

        for (id, size, data) in fields.iter() {
            KdbxWriter::write_header_field_prefix(stream, *id, *size)?;
            stream.write_all(data)?;
            debug!(field = id.name(), len = *size, "wrote header field");
        }

        // End of header [0xD 0xA 0xD 0xA]
        KdbxWriter::write_header_field_prefix(
            stream,
            HeaderFieldId::EndOfHeader,
            END_OF_HEADER.len() as u16,
        )?;
        stream.write_all(&END_OF_HEADER)?;

        Ok(())
    }

    fn write_header_field_prefix<S: Write>(
        stream: &mut S,
        header_id: HeaderFieldId,
        size: u16,
    ) -> Result<()> {
        stream.write_u8(header_id as u8)?;
        stream.write_u16::<LittleEndian>(size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use hex_literal::hex;
    use proptest::collection::vec;
    use proptest::prelude::*;

    use crate::kdbx::consts::*;
    use crate::kdbx::kdbx_header::KdbxHeader;
    use crate::kdbx::result::Error;

    use super::KdbxWriter;

    /// Accepts `budget` bytes, then fails.
    struct FailingWriter {
        budget: usize,
        written: Vec<u8>,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sample_header() -> KdbxHeader {
        KdbxHeader {
            comment: Vec::new(),
            cipher_id: CIPHERSUITE_AES256.to_vec(),
            compression_flags: GZIP_COMPRESSION_FLAG,
            master_seed: vec![0x11; 32],
            transform_seed: vec![0x22; 32],
            transform_rounds: DEFAULT_TRANSFORM_ROUNDS,
            encryption_iv: vec![0x33; 16],
            protected_stream_key: vec![0x44; 32],
            stream_start_bytes: vec![0x55; 32],
            inner_random_stream_id: INNER_STREAM_SALSA20.to_vec(),
        }
    }

    #[test]
    fn canonical_layout_test() {
        let bytes = sample_header().to_bytes().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&hex!("02 1000 31c1f2e6bf714350be5805216afc5aff"));
        expected.extend_from_slice(&hex!("03 0400 01000000"));
        expected.extend_from_slice(&hex!("04 2000"));
        expected.extend_from_slice(&[0x11; 32]);
        expected.extend_from_slice(&hex!("05 2000"));
        expected.extend_from_slice(&[0x22; 32]);
        expected.extend_from_slice(&hex!("06 0800 7017000000000000"));
        expected.extend_from_slice(&hex!("07 1000"));
        expected.extend_from_slice(&[0x33; 16]);
        expected.extend_from_slice(&hex!("08 2000"));
        expected.extend_from_slice(&[0x44; 32]);
        expected.extend_from_slice(&hex!("09 2000"));
        expected.extend_from_slice(&[0x55; 32]);
        expected.extend_from_slice(&hex!("0a 0400 02000000"));
        expected.extend_from_slice(&hex!("00 0400 0d0a0d0a"));

        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_header_is_integers_and_terminator_test() {
        // Integer fields always have a 4/8 byte value, so they are always written.
        let bytes = KdbxHeader::default().to_bytes().unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&hex!("03 0400 00000000"));
        expected.extend_from_slice(&hex!("06 0800 0000000000000000"));
        expected.extend_from_slice(&hex!("00 0400 0d0a0d0a"));
        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_comment_is_omitted_test() {
        let header = sample_header();
        let bytes = header.to_bytes().unwrap();

        assert_eq!(bytes[0], HeaderFieldId::CipherID as u8);
        let decoded = KdbxHeader::from_bytes(&bytes).unwrap();
        assert!(decoded.comment.is_empty());
        assert_eq!(decoded, header);
    }

    #[test]
    fn comment_is_written_first_test() {
        let mut header = sample_header();
        header.comment = b"personal".to_vec();
        let bytes = header.to_bytes().unwrap();

        assert_eq!(&bytes[..11], &hex!("01 0800 706572736f6e616c")[..]);
    }

    #[test]
    fn integer_fidelity_test() {
        let header = sample_header();
        let bytes = header.to_bytes().unwrap();
        let decoded = KdbxHeader::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.transform_rounds, 6000);
        assert_eq!(decoded.compression_flags, 1);
    }

    #[test]
    fn canonicalizes_field_order_test() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&hex!("0a 0400 02000000"));
        buf.extend_from_slice(&hex!("06 0800 7017000000000000"));
        buf.extend_from_slice(&hex!("01 0100 78"));
        buf.extend_from_slice(&hex!("03 0400 01000000"));
        buf.extend_from_slice(&hex!("00 0400 0d0a0d0a"));

        let bytes = KdbxHeader::from_bytes(&buf).unwrap().to_bytes().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&hex!("01 0100 78"));
        expected.extend_from_slice(&hex!("03 0400 01000000"));
        expected.extend_from_slice(&hex!("06 0800 7017000000000000"));
        expected.extend_from_slice(&hex!("0a 0400 02000000"));
        expected.extend_from_slice(&hex!("00 0400 0d0a0d0a"));
        assert_eq!(bytes, expected);
    }

    #[test]
    fn largest_field_fits_test() {
        let mut header = sample_header();
        header.comment = vec![0x41; MAX_FIELD_LEN];
        let bytes = header.to_bytes().unwrap();

        assert_eq!(&bytes[..3], &[0x01, 0xff, 0xff]);
        assert_eq!(KdbxHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn value_too_large_writes_nothing_test() {
        let mut header = sample_header();
        header.stream_start_bytes = vec![0u8; MAX_FIELD_LEN + 1];

        let mut out = Vec::new();
        match KdbxWriter::write_header(&mut out, &header) {
            Err(Error::ValueTooLarge { field, len }) => {
                assert_eq!(field, HeaderFieldId::StreamStartBytes);
                assert_eq!(len, MAX_FIELD_LEN + 1);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn write_failure_aborts_test() {
        let header = sample_header();
        let mut out = FailingWriter {
            budget: 40,
            written: Vec::new(),
        };

        match KdbxWriter::write_header(&mut out, &header) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::Other),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(out.written.len(), 40);
    }

    fn arb_bytes() -> impl Strategy<Value = Vec<u8>> {
        vec(any::<u8>(), 1..64)
    }

    fn arb_header() -> impl Strategy<Value = KdbxHeader> {
        (
            (arb_bytes(), arb_bytes(), any::<u32>(), arb_bytes(), arb_bytes()),
            (any::<u64>(), arb_bytes(), arb_bytes(), arb_bytes(), arb_bytes()),
        )
            .prop_map(
                |(
                    (comment, cipher_id, compression_flags, master_seed, transform_seed),
                    (
                        transform_rounds,
                        encryption_iv,
                        protected_stream_key,
                        stream_start_bytes,
                        inner_random_stream_id,
                    ),
                )| KdbxHeader {
                    comment,
                    cipher_id,
                    compression_flags,
                    master_seed,
                    transform_seed,
                    transform_rounds,
                    encryption_iv,
                    protected_stream_key,
                    stream_start_bytes,
                    inner_random_stream_id,
                },
            )
    }

    proptest! {
        #[test]
        fn prop_write_read_roundtrip(h in arb_header()) {
            let bytes = h.to_bytes().unwrap();
            let decoded = KdbxHeader::from_bytes(&bytes).unwrap();

            prop_assert_eq!(&decoded, &h);
            prop_assert_eq!(decoded.to_bytes().unwrap(), bytes);
        }

        #[test]
        fn prop_terminator_is_last(h in arb_header()) {
            let bytes = h.to_bytes().unwrap();
            prop_assert_eq!(&bytes[bytes.len() - 7..], &hex!("00 0400 0d0a0d0a")[..]);
        }

        #[test]
        fn prop_garbage_never_panics(buf in vec(any::<u8>(), 0..512)) {
            let _ = KdbxHeader::from_bytes(&buf);
        }
    }
}
