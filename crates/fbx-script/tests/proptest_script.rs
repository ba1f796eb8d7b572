use proptest::prelude::*;

use fbx_script::{Address, AddressKind, NetworkParams, Script};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn pushed_data_comes_back_as_one_chunk(data in prop::collection::vec(any::<u8>(), 1..600)) {
        let mut script = Script::new();
        script.append_push_data(&data).unwrap();
        let chunks = script.chunks().unwrap();
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks[0].data.as_deref(), Some(&data[..]));
        prop_assert_eq!(script.without_code_separators().unwrap(), script);
    }

    #[test]
    fn key_hash_addresses_parse_back(hash in prop::array::uniform20(any::<u8>()), pkh in any::<u8>()) {
        let params = NetworkParams { pub_key_hash: pkh, ..NetworkParams::default() };
        let addr = Address::from_public_key_hash(&hash, &params);
        let parsed = Address::from_string(&addr.address_string, &params).unwrap();
        prop_assert_eq!(parsed.hash, hash);
        prop_assert_eq!(parsed.kind, AddressKind::PubKeyHash);
        prop_assert_eq!(parsed.locking_script().public_key_hash(), Some(hash));
    }

    #[test]
    fn script_hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let script = Script::from_bytes(&data);
        let script2 = Script::from_hex(&script.to_hex()).unwrap();
        prop_assert_eq!(script, script2);
    }
}
