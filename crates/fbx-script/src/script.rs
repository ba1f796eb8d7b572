/// Script type - a sequence of opcodes and data pushes.
///
/// Locking scripts live in transaction outputs and unlocking scripts in
/// inputs. The engine only ever builds pay-to-key-hash and pay-to-script-hash
/// locks and `<sig> <pubkey>` unlocks, so construction helpers for those
/// shapes live here next to the classifiers that recognise them.

use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Build a pay-to-key-hash locking script:
    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn p2pkh_lock(pub_key_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(25);
        b.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(pub_key_hash);
        b.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(b)
    }

    /// Build a pay-to-script-hash locking script: `OP_HASH160 <hash> OP_EQUAL`.
    pub fn p2sh_lock(script_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(23);
        b.extend_from_slice(&[OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(script_hash);
        b.push(OP_EQUAL);
        Script(b)
    }

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Convert the script to its ASM representation.
    ///
    /// # Returns
    /// A space-separated ASM string, or an empty string for empty or
    /// malformed scripts.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Return a reference to the underlying bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty (zero bytes).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if this is a pay-to-key-hash output script.
    ///
    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Check if this is a pay-to-script-hash output script.
    ///
    /// Pattern: OP_HASH160 <20 bytes> OP_EQUAL
    pub fn is_p2sh(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    /// Extract the 20-byte key hash from a pay-to-key-hash script.
    ///
    /// # Returns
    /// `None` when the script is not exactly the standard P2PKH pattern.
    pub fn public_key_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2pkh() {
            return None;
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[3..23]);
        Some(out)
    }

    /// Parse the script into decoded chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Return a copy with every `OP_CODESEPARATOR` removed.
    ///
    /// Legacy signature hashing commits to the previous output script in
    /// this form. Push payloads that happen to contain the byte are kept.
    pub fn without_code_separators(&self) -> Result<Self, ScriptError> {
        let mut out = Script::new();
        for chunk in self.chunks()? {
            match chunk.data {
                Some(data) => {
                    out.0.push(chunk.op);
                    match chunk.op {
                        OP_PUSHDATA1 => out.0.push(data.len() as u8),
                        OP_PUSHDATA2 => out.0.extend_from_slice(&(data.len() as u16).to_le_bytes()),
                        OP_PUSHDATA4 => out.0.extend_from_slice(&(data.len() as u32).to_le_bytes()),
                        _ => {}
                    }
                    out.0.extend_from_slice(&data);
                }
                None if chunk.op == OP_CODESEPARATOR => {}
                None => out.0.push(chunk.op),
            }
        }
        Ok(out)
    }

    /// Append data bytes with the minimal push prefix.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if the data is too large.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append raw opcodes.
    ///
    /// Rejects push opcodes (OP_DATA_1..OP_PUSHDATA4); use
    /// `append_push_data` for those.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(&op) = opcodes
            .iter()
            .find(|&&op| (OP_DATA_1..=OP_PUSHDATA4).contains(&op))
        {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH_HEX: &str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";

    #[test]
    fn test_p2pkh_lock_matches_known_script() {
        let hash: [u8; 20] = hex::decode("e2a623699e81b291c0327f408fea765d534baa2a")
            .unwrap()
            .try_into()
            .unwrap();
        let script = Script::p2pkh_lock(&hash);
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert!(script.is_p2pkh());
        assert!(!script.is_p2sh());
        assert_eq!(script.public_key_hash(), Some(hash));
    }

    #[test]
    fn test_p2sh_lock() {
        let script = Script::p2sh_lock(&[0x11; 20]);
        assert_eq!(script.len(), 23);
        assert!(script.is_p2sh());
        assert!(!script.is_p2pkh());
        assert_eq!(script.public_key_hash(), None);
    }

    #[test]
    fn test_to_asm_p2pkh() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(
            script.to_asm(),
            "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG"
        );
        assert_eq!(Script::new().to_asm(), "");
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(Script::from_hex("ZZZZ").is_err());
        assert!(Script::from_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_append_push_data_and_opcodes() {
        let mut script = Script::new();
        script.append_push_data(&[0xab; 72]).unwrap();
        script.append_push_data(&[0xcd; 33]).unwrap();
        assert_eq!(script.len(), 1 + 72 + 1 + 33);
        let chunks = script.chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].data.as_deref(), Some(&[0xcd; 33][..]));

        assert!(script.append_opcodes(&[OP_PUSHDATA1]).is_err());
        script.append_opcodes(&[OP_CHECKSIG]).unwrap();
        assert_eq!(*script.to_bytes().last().unwrap(), OP_CHECKSIG);
    }

    #[test]
    fn test_without_code_separators() {
        let script = Script::from_bytes(&[OP_CODESEPARATOR, OP_DUP, 0x01, OP_CODESEPARATOR, OP_CODESEPARATOR, OP_CHECKSIG]);
        let stripped = script.without_code_separators().unwrap();
        // the pushed 0xab byte survives
        assert_eq!(stripped.to_bytes(), &[OP_DUP, 0x01, OP_CODESEPARATOR, OP_CHECKSIG]);

        let p2pkh = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(p2pkh.without_code_separators().unwrap(), p2pkh);
    }
}
