//! Merkle path proving a transaction inside a VeriBlock block

use serde::Serialize;

use super::constants::MAX_LAYER_COUNT_MERKLE;
use super::hash::Sha256Hash;
use crate::codec::{
    read_array_of, read_single_i32_be_value, write_single_fixed_be_value, ByteSink, CodecError,
    Decode, Encode, ReadStream,
};

/// Unlike the Bitcoin path, the subject travels on the wire, and `tree_index`
/// picks which of the block's transaction trees the path belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VbkMerklePath {
    pub tree_index: i32,
    pub index: i32,
    pub subject: Sha256Hash,
    pub layers: Vec<Sha256Hash>,
}

impl Encode for VbkMerklePath {
    fn encode<S: ByteSink>(&self, out: &mut S) -> Result<(), CodecError> {
        write_single_fixed_be_value(out, self.tree_index)?;
        write_single_fixed_be_value(out, self.index)?;
        self.subject.encode(out)?;

        // layer count always uses the full four length bytes
        out.write_u8(4)?;
        out.write_i32_be(self.layers.len() as i32)?;
        for layer in &self.layers {
            layer.encode(out)?;
        }
        Ok(())
    }
}

impl Decode for VbkMerklePath {
    fn decode(stream: &mut ReadStream<'_>) -> Result<Self, CodecError> {
        let tree_index = read_single_i32_be_value(stream)?;
        let index = read_single_i32_be_value(stream)?;
        let subject = Sha256Hash::decode(stream)?;
        let layers = read_array_of(stream, MAX_LAYER_COUNT_MERKLE, Sha256Hash::decode)?;

        Ok(Self {
            tree_index,
            index,
            subject,
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "04000000010400000000201FEC8AA4983D69395010E4D18CD8B943749D5B4F575E88A375DEBDC5ED22531C0400000002200000000000000000000000000000000000000000000000000000000000000000200000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_vbk_merkle_path_read() {
        let path = VbkMerklePath::from_hex(PATH).unwrap();
        assert_eq!(path.tree_index, 1);
        assert_eq!(path.index, 0);
        assert_eq!(
            path.subject.to_hex(),
            "1FEC8AA4983D69395010E4D18CD8B943749D5B4F575E88A375DEBDC5ED22531C"
        );
        assert_eq!(path.layers, vec![Sha256Hash::default(); 2]);
        assert_eq!(path.to_hex().unwrap(), PATH);
    }

    #[test]
    fn test_layer_ceiling() {
        // same path declaring 41 layers
        let wire = PATH.replace("0400000002", "0400000029");
        assert_eq!(
            VbkMerklePath::from_hex(&wire).unwrap_err(),
            CodecError::ArraySizeExceeded { count: 41, max: 40 }
        );
    }

    #[test]
    fn test_subject_must_be_32_bytes() {
        let wire = PATH.replacen("20", "1F", 1);
        assert!(matches!(
            VbkMerklePath::from_hex(&wire),
            Err(CodecError::LengthOutOfRange { length: 31, .. })
        ));
    }
}
