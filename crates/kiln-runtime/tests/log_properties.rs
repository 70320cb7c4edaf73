//! Property tests for the diagnostic log and its escaping

use kiln_runtime::{escape_for_render, Arg, Log, Rng};
use proptest::prelude::*;

fn chunks() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..24), 0..12)
}

proptest! {
    #[test]
    fn writes_within_capacity_concatenate(parts in chunks()) {
        let total: usize = parts.iter().map(Vec::len).sum();
        let log = Log::new(total.max(1));
        for part in &parts {
            prop_assert_eq!(log.write(part), part.len());
        }
        prop_assert_eq!(log.contents(log.active_index()), parts.concat());
    }

    #[test]
    fn writes_never_exceed_capacity(parts in chunks(), capacity in 0usize..64) {
        let log = Log::new(capacity);
        let written: usize = parts.iter().map(|p| log.write(p)).sum();
        prop_assert!(written <= capacity);
        let contents = log.contents(log.active_index());
        prop_assert_eq!(contents.len(), written);
        prop_assert!(parts.concat().starts_with(&contents));
    }

    #[test]
    fn formatted_write_matches_measure(text in ".{0,20}", number in any::<i64>(), bits in any::<u32>()) {
        let args = [Arg::Str(&text), Arg::Int(number), Arg::Uint(u64::from(bits))];
        let measured = kiln_runtime::render::measure("<%s|%lld|%x>", &args).unwrap();
        let log = Log::new(256);
        prop_assert_eq!(log.formatted_write("<%s|%lld|%x>", &args), measured);
        prop_assert_eq!(log.contents(log.active_index()).len(), measured);
    }

    #[test]
    fn escape_is_identity_on_plain_printable(text in "[ !#-~]{0,40}") {
        let once = escape_for_render(text.as_bytes());
        prop_assert_eq!(&once, &text);
        prop_assert_eq!(escape_for_render(once.as_bytes()), once);
    }

    #[test]
    fn escape_output_is_printable(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let escaped = escape_for_render(&bytes);
        prop_assert!(escaped.bytes().all(|b| b == b' ' || b.is_ascii_graphic()));
    }

    #[test]
    fn random_sequence_is_reproducible(seed in any::<u32>(), count in 0usize..64) {
        let rng = Rng::new(seed);
        let first: Vec<u32> = (0..count).map(|_| rng.next_u32()).collect();
        rng.seed(seed);
        let second: Vec<u32> = (0..count).map(|_| rng.next_u32()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn fill_respects_length(seed in any::<u32>(), len in 0usize..40) {
        let rng = Rng::new(seed);
        let mut buffer = vec![0x5a_u8; len + 8];
        rng.fill(&mut buffer[..len]);
        prop_assert!(buffer[len..].iter().all(|&b| b == 0x5a));
    }
}
