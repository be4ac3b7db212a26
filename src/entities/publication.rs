//! Publication data: what an altchain asks VeriBlock to endorse

use serde::Serialize;

use super::constants::{
    MAX_CONTEXT_SIZE_PUBLICATION_DATA, MAX_HEADER_SIZE_PUBLICATION_DATA,
    MAX_PAYOUT_SIZE_PUBLICATION_DATA,
};
use super::hash::as_hex;
use crate::codec::{
    read_single_i64_be_value, read_var_len_value, write_single_be_value, write_var_len_value,
    ByteSink, CodecError, Decode, Encode, ReadStream,
};

/// Wire order is identifier, header, context info, payout info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationData {
    pub identifier: i64,
    #[serde(serialize_with = "as_hex")]
    pub header: Vec<u8>,
    #[serde(serialize_with = "as_hex")]
    pub payout_info: Vec<u8>,
    #[serde(serialize_with = "as_hex")]
    pub context_info: Vec<u8>,
}

impl Encode for PublicationData {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_single_be_value(out, self.identifier)?;
        write_var_len_value(out, &self.header)?;
        write_var_len_value(out, &self.context_info)?;
        write_var_len_value(out, &self.payout_info)
    }
}

impl Decode for PublicationData {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        let identifier = read_single_i64_be_value(stream)?;
        let header = read_var_len_value(stream, 0, MAX_HEADER_SIZE_PUBLICATION_DATA)?;
        let context_info = read_var_len_value(stream, 0, MAX_CONTEXT_SIZE_PUBLICATION_DATA)?;
        let payout_info = read_var_len_value(stream, 0, MAX_PAYOUT_SIZE_PUBLICATION_DATA)?;

        Ok(Self {
            identifier,
            header: header.to_vec(),
            payout_info: payout_info.to_vec(),
            context_info: context_info.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLICATION_DATA: &str = "0100010C6865616465722062797465730112636F6E7465787420696E666F20627974657301117061796F757420696E666F206279746573";

    #[test]
    fn test_publication_data_read() {
        let data = PublicationData::from_hex(PUBLICATION_DATA).unwrap();
        assert_eq!(data.identifier, 0);
        assert_eq!(data.header, b"header bytes");
        assert_eq!(data.context_info, b"context info bytes");
        assert_eq!(data.payout_info, b"payout info bytes");
        assert_eq!(data.to_hex().unwrap(), PUBLICATION_DATA);
    }

    #[test]
    fn test_payout_ceiling() {
        let data = PublicationData {
            identifier: 1,
            header: vec![],
            payout_info: vec![0; MAX_PAYOUT_SIZE_PUBLICATION_DATA + 1],
            context_info: vec![],
        };
        let bytes = data.to_bytes().unwrap();
        assert!(matches!(
            PublicationData::from_bytes(&bytes),
            Err(CodecError::LengthOutOfRange { length: 101, max: 100, .. })
        ));
    }
}
