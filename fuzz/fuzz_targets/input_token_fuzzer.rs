//! Fuzz target for inbound token decode tables
//!
//! Exercises the pure lookup tables the terminal input loop dispatches on:
//! function-key codes, protocol acknowledgement classes, and accent
//! composition.
//!
//! # Invariants
//!
//! - from_sep accepts exactly 0x41..=0x49 and round-trips through code()
//! - proto_ack_length only ever announces 1 to 3 trailing bytes
//! - An accent follow-up byte is a special or a diacritic class, never both
//! - Composition succeeds only for lowercase vowel bases and never yields
//!   ASCII

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use teletel_proto::accent::{Diacritic, special};
use teletel_proto::codes::proto_ack_length;
use teletel_proto::FunctionKey;

#[derive(Debug, Clone, Arbitrary)]
enum Token {
    SepKey(u8),
    AckClass(u8),
    AccentCode(u8),
    Compose { class: u8, base: char },
}

fuzz_target!(|tokens: Vec<Token>| {
    for token in tokens {
        match token {
            Token::SepKey(code) => match FunctionKey::from_sep(code) {
                Some(key) => {
                    assert!((0x41..=0x49).contains(&code));
                    assert_eq!(0x40 | key.code(), code);
                }
                None => assert!(!(0x41..=0x49).contains(&code)),
            },
            Token::AckClass(class) => {
                if let Some(len) = proto_ack_length(class) {
                    assert!((1..=3).contains(&len), "ack absorbs {len} bytes");
                }
            }
            Token::AccentCode(code) => {
                assert!(
                    !(special(code).is_some() && Diacritic::from_code(code).is_some()),
                    "code {code:#04x} is both a special and a diacritic class"
                );
            }
            Token::Compose { class, base } => {
                if let Some(diacritic) = Diacritic::from_code(class) {
                    match diacritic.compose(base) {
                        Some(composed) => {
                            assert!(matches!(base, 'a' | 'e' | 'i' | 'o' | 'u'));
                            assert!(!composed.is_ascii());
                        }
                        None => assert!(!matches!(base, 'a' | 'e' | 'i' | 'o' | 'u')),
                    }
                }
            }
        }
    }
});
