use chainring::{
    avec::{self, EncodeOptions},
    sans::check::{Crc, compute_crc},
    text::{self, token},
    workout::{Bounds, Target},
};
use proptest::prelude::*;

fn unit() -> impl Strategy<Value = (&'static str, u32)> {
    prop_oneof![
        Just(("s", 1)),
        Just(("sec", 1)),
        Just(("min", 60)),
        Just(("m", 60)),
        Just(("", 60)),
        Just(("h", 3600)),
        Just(("hr", 3600)),
    ]
}

proptest! {
    #[test]
    fn durations_scale_by_unit(n in 1..1000_u32, (unit, seconds) in unit()) {
        let parsed = token::duration(&format!("{n}{unit}")).unwrap();
        prop_assert_eq!(token::whole_seconds(parsed), n * seconds);
    }

    #[test]
    fn incremental_check_value(bytes in prop::collection::vec(any::<u8>(), 0..256), split in 0..256_usize) {
        let split = split.min(bytes.len());
        let (head, tail) = bytes.split_at(split);

        let mut crc = Crc::new();
        crc.update(head);
        crc.update(tail);

        prop_assert_eq!(crc.value(), compute_crc(0, &bytes));
    }

    #[test]
    fn check_value_detects_bit_flips(
        bytes in prop::collection::vec(any::<u8>(), 1..256),
        index in any::<prop::sample::Index>(),
        bit in 0..8_u8,
    ) {
        let mut flipped = bytes.clone();
        flipped[index.index(bytes.len())] ^= 1 << bit;

        prop_assert_ne!(compute_crc(0, &flipped), compute_crc(0, &bytes));
    }

    #[test]
    fn documents_check_to_zero(seconds in 1..36_000_u32, low in 1..300_u16, span in 0..100_u16) {
        let high = low + span;
        let workout = text::parse(&format!("{seconds}s {low}-{high}%")).workout.unwrap();

        let bytes = avec::encode_with(&workout, &EncodeOptions::default());
        prop_assert_eq!(compute_crc(0, &bytes), 0);
    }

    #[test]
    fn parsed_steps_survive_encoding(seconds in 1..36_000_u32, low in 1..300_u16, span in 0..100_u16) {
        let high = low + span;
        let workout = text::parse(&format!("{seconds}s {low}-{high}%")).workout.unwrap();

        let step = &workout.steps[0];
        prop_assert_eq!(step.duration_seconds, seconds);
        prop_assert_eq!(step.target, Target::Power(Bounds::new(low, high)));

        let bytes = avec::encode_with(&workout, &EncodeOptions::default());
        let decoded = avec::decode_workout(&bytes).unwrap();

        prop_assert_eq!(decoded.steps.len(), 1);
        prop_assert_eq!(decoded.steps[0].duration_seconds, seconds);
        prop_assert_eq!(decoded.steps[0].target, step.target);
        prop_assert_eq!(decoded.steps[0].intensity, step.intensity);
    }
}
