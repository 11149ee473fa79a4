use lead_forms::{
    dialog::{
        chrome::{BACKDROP_CLASS, DialogChrome},
        presenter::{CloseTrigger, DialogPresenter},
    },
    page::document::{Document, Element},
    phone::formatter::{CANONICAL_LEN, digits, format, is_complete},
};
use proptest::prelude::*;
use proptest::test_runner::Config;

/// Digits sprinkled with the noise visitors actually type or paste.
fn raw_phone() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9 ()\\-+.a-z]{0,30}",
        "\\+?[0-9]{0,16}",
        " *\\+[0-9]{1,3}[ (]*[0-9 )\\-]{0,20}",
    ]
}

/// Digits the rendering must carry, in order: an explicit country digit is
/// kept as typed, shorter input sits behind the implied `7`.
fn expected_digits(raw: &str) -> String {
    let d = digits(raw);
    if raw.trim_start().starts_with('+') || d.len() >= 11 {
        d.chars().take(11).collect()
    } else if d.is_empty() {
        String::new()
    } else {
        std::iter::once('7').chain(d.chars().take(10)).collect()
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn format_keeps_digit_order(raw in raw_phone()) {
        prop_assert_eq!(digits(&format(&raw)), expected_digits(&raw));
    }

    #[test]
    fn complete_iff_all_eleven_digits_present(raw in raw_phone()) {
        let formatted = format(&raw);
        prop_assert_eq!(is_complete(&formatted), expected_digits(&raw).len() == 11);
        prop_assert!(formatted.chars().count() <= CANONICAL_LEN);
    }

    #[test]
    fn format_is_idempotent(raw in raw_phone()) {
        let once = format(&raw);
        prop_assert_eq!(format(&once), once);
    }

    #[test]
    fn chrome_tracks_open_dialogs(
        strays in 0_usize..4,
        ops in proptest::collection::vec((any::<bool>(), 0_usize..2), 1..20)
    ) {
        let ids = ["successModal", "errorModal"];
        let mut doc = Document::new();
        for id in ids {
            doc.insert(Element::new(id, "div").with_class("modal"));
        }
        for n in 0..strays {
            doc.insert(Element::new(&format!("stale-{n}"), "div").with_class(BACKDROP_CLASS));
        }
        let mut presenter = DialogPresenter::new();
        let mut touched = false;

        for (open, which) in ops {
            if open {
                presenter.show(&mut doc, ids[which]).unwrap();
                touched = true;
            } else {
                presenter.hide(&mut doc, ids[which], CloseTrigger::Backdrop);
            }

            if touched {
                let any_open = presenter.open_count() > 0;
                prop_assert_eq!(doc.count_class(BACKDROP_CLASS), usize::from(any_open));
                prop_assert_eq!(DialogChrome::is_locked(&doc), any_open);
            }
        }

        // A second sweep changes nothing
        let before = (doc.count_class(BACKDROP_CLASS), DialogChrome::is_locked(&doc));
        if presenter.open_count() == 0 && touched {
            DialogChrome::cleanup(&mut doc);
            let after = (doc.count_class(BACKDROP_CLASS), DialogChrome::is_locked(&doc));
            prop_assert_eq!(after, before);
        }
    }
}
