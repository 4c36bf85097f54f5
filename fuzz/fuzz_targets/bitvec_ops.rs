#![no_main]
use libfuzzer_sys::fuzz_target;
use sdict::{NaiveBitVector, RankSelect, SuccinctBitVector};

fuzz_target!(|data: (Vec<u8>, usize)| {
    let (bytes, len_raw) = data;
    if bytes.is_empty() {
        return;
    }

    let len = len_raw % (bytes.len() * 8 + 1);
    let bv = SuccinctBitVector::from_packed(bytes.clone(), len);
    let oracle = NaiveBitVector::from_packed(bytes, len);

    // Check total rank
    let expected_total = oracle.rank1(len);
    assert_eq!(bv.rank1(len), expected_total);
    assert_eq!(bv.rank1(len / 2), oracle.rank1(len / 2));

    // Check select1 for a derived rank
    if expected_total > 0 {
        let k = 1 + (len_raw / 13) % expected_total;
        let pos = bv.select1(k);
        assert_eq!(pos, oracle.select1(k));
        assert!(pos <= len);
        assert!(bv.access(pos - 1));
        assert_eq!(bv.rank1(pos), k);
        assert_eq!(bv.rank1(pos - 1), k - 1);
    }
    assert!(bv.try_select1(expected_total + 1).is_err());
});
