#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Valid strings must decode back exactly; anything else must be rejected
    match basetrie::encode(data) {
        Ok(packed) => {
            assert_eq!(basetrie::decode(&packed), data);
            assert_eq!(packed.len(), data.len());
        }
        Err(_) => assert!(data.chars().any(|c| !"NATCG".contains(c))),
    }
});
