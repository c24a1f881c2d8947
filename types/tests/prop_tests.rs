use proptest::prelude::*;

use dfund_types::{mul_div, Address, Timestamp, Wei};

proptest! {
    /// mul_div agrees with plain u128 arithmetic whenever the product fits.
    #[test]
    fn mul_div_matches_checked_product(
        a in 0u128..u64::MAX as u128,
        b in 0u128..u64::MAX as u128,
        d in 1u128..u64::MAX as u128,
    ) {
        prop_assert_eq!(mul_div(a, b, d), Some(a * b / d));
    }

    /// A pro-rata share never exceeds the holder's own amount when b <= d.
    #[test]
    fn mul_div_share_bounded(
        a in 0u128..u128::MAX / 2,
        d in 1u128..u128::MAX,
        frac in 0u128..=10_000,
    ) {
        let b = d / 10_000 * frac;
        let share = mul_div(a, b, d).unwrap();
        prop_assert!(share <= a, "share {} exceeds amount {}", share, a);
    }

    /// Address text form round-trips.
    #[test]
    fn address_text_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Derived campaign identities are distinct across nonces.
    #[test]
    fn derived_addresses_distinct(seed in 0u8.., n1 in 0u64..1_000_000, n2 in 0u64..1_000_000) {
        prop_assume!(n1 != n2);
        let deployer = Address::repeat(seed);
        prop_assert_ne!(Address::derive(&deployer, n1), Address::derive(&deployer, n2));
    }

    /// Wei checked_add agrees with u128 checked_add.
    #[test]
    fn wei_checked_add(a in 0u128.., b in 0u128..) {
        prop_assert_eq!(Wei::new(a).checked_add(Wei::new(b)).map(|w| w.raw()), a.checked_add(b));
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(tb.is_after(ta), b > a);
    }
}
