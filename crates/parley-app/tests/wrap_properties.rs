//! Property-based tests for line wrapping.

use parley_app::{
    Side,
    wrap::{max_width, wrap},
};
use proptest::prelude::*;

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Left), Just(Side::Right)]
}

proptest! {
    /// Rows concatenate back to the original text, with no row wider than
    /// half the terminal.
    #[test]
    fn prop_wrap_round_trips(
        text in "\\PC{0,200}",
        columns in 1u16..300,
        side in side_strategy(),
        indicator in prop_oneof![Just(""), Just("> ")],
    ) {
        let rows = wrap(&text, columns, side, indicator);

        prop_assert!(!rows.is_empty());
        let joined: String = rows.iter().map(|r| r.text).collect();
        prop_assert_eq!(&joined, &text);

        for row in &rows {
            prop_assert!(row.text.chars().count() <= max_width(columns));
        }
    }

    /// Only the first row carries the indicator, and all rows of a message
    /// share one column.
    #[test]
    fn prop_rows_share_column_and_prefix_once(
        text in "[a-z ]{0,120}",
        columns in 1u16..120,
        side in side_strategy(),
    ) {
        let rows = wrap(&text, columns, side, "> ");

        prop_assert_eq!(rows[0].prefix, Some("> "));
        prop_assert!(rows[1..].iter().all(|r| r.prefix.is_none()));
        prop_assert!(rows.iter().all(|r| r.column == rows[0].column));
    }

    /// Right-anchored rows never run past the edge when the message fits.
    #[test]
    fn prop_right_rows_stay_on_screen(text in "[a-z]{0,120}", columns in 4u16..200) {
        let rows = wrap(&text, columns, Side::Right, "> ");

        for row in &rows {
            prop_assert!(usize::from(row.column) + row.width() <= usize::from(columns));
        }
    }
}
