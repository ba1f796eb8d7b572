//! Script chunk parsing and push-data encoding.
//!
//! A chunk is either a bare opcode or a data push together with its bytes.

use fbx_primitives::util::WireReader;
use fbx_primitives::PrimitivesError;

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The pushed bytes, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Render the chunk as an ASM token: pushes as hex, opcodes by name.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) => hex::encode(data),
            _ => opcode_to_string(self.op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// # Returns
/// The parsed chunks, or `ScriptError::DataTooSmall` if a push runs past
/// the end of the script.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut reader = WireReader::new(bytes);
    let mut chunks = Vec::new();

    while reader.remaining() > 0 {
        let op = reader.read_u8().map_err(truncated)?;
        let len = match op {
            OP_DATA_1..=OP_DATA_75 => Some(op as usize),
            OP_PUSHDATA1 => Some(reader.read_u8().map_err(truncated)? as usize),
            OP_PUSHDATA2 => Some(reader.read_u16_le().map_err(truncated)? as usize),
            OP_PUSHDATA4 => Some(reader.read_u32_le().map_err(truncated)? as usize),
            _ => None,
        };
        let data = match len {
            Some(n) => Some(reader.read_bytes(n).map_err(truncated)?.to_vec()),
            None => None,
        };
        chunks.push(ScriptChunk { op, data });
    }

    Ok(chunks)
}

fn truncated(_: PrimitivesError) -> ScriptError {
    ScriptError::DataTooSmall
}

/// Compute the minimal push prefix for a payload of `data_len` bytes.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_p2pkh_unlocking_shape() {
        let mut bytes = vec![0x02, 0xaa, 0xbb, OP_PUSHDATA1, 0x01, 0xcc, OP_CHECKSIG];
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data.as_deref(), Some(&[0xaa, 0xbb][..]));
        assert_eq!(chunks[1].op, OP_PUSHDATA1);
        assert_eq!(chunks[1].data.as_deref(), Some(&[0xcc][..]));
        assert_eq!(chunks[2], ScriptChunk { op: OP_CHECKSIG, data: None });

        bytes.truncate(2);
        assert!(matches!(decode_script(&bytes), Err(ScriptError::DataTooSmall)));
    }

    #[test]
    fn test_truncated_pushdata_length() {
        assert!(decode_script(&[OP_PUSHDATA2, 0x01]).is_err());
        assert!(decode_script(&[OP_PUSHDATA4, 0x05, 0x00, 0x00, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(0).unwrap(), vec![0x00]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![75]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 255]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(
            push_data_prefix(0x1_0000).unwrap(),
            vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]
        );
    }
}
