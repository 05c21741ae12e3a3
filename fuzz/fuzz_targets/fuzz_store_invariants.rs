#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    words: Vec<Vec<u8>>,
}

fuzz_target!(|input: Input| {
    // Map arbitrary bytes onto the alphabet so most inserts succeed
    let words: Vec<String> = input
        .words
        .iter()
        .map(|w| w.iter().map(|b| ['N', 'A', 'T', 'C', 'G'][*b as usize % 5]).collect())
        .collect();

    let mut radix = basetrie::RadixTree::new();
    let mut suffix = basetrie::SuffixTree::new();
    for word in &words {
        let _ = radix.store_word(word);
        let _ = suffix.store_word(word);
    }

    // Prefix-free siblings, compressed chains, root count 0
    radix.verify().unwrap();
    suffix.as_radix().verify().unwrap();

    for word in words.iter().filter(|w| !w.is_empty()) {
        assert!(radix.find_word(word).unwrap().is_some());
        assert!(suffix.count_occurrence(word).unwrap() >= 1);
    }
});
