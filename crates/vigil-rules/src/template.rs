#![forbid(unsafe_code)]

//! Positional message templates.
//!
//! `${0}` is the value under test, `${1}`.. the constraint parameters.
//! `${n..}` joins slots `n` onwards with a space. Out-of-range slots render
//! empty; placeholders that are not slot references are left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}]*)\}").expect("placeholder regex is valid"));

/// Substitute positional placeholders in `template`.
#[must_use]
pub fn render(template: &str, slots: &[String]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let key = caps[1].trim();
            if let Some(start) = key.strip_suffix("..") {
                return match start.trim().parse::<usize>() {
                    Ok(start) => slots.get(start..).unwrap_or_default().join(" "),
                    Err(_) => whole.to_owned(),
                };
            }
            match key.parse::<usize>() {
                Ok(idx) => slots.get(idx).cloned().unwrap_or_default(),
                Err(_) => whole.to_owned(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slots(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn substitutes_value_and_params() {
        let out = render("${0} must be at least ${1}", &slots(&["ab", "3"]));
        assert_eq!(out, "ab must be at least 3");
    }

    #[test]
    fn rest_placeholder_joins() {
        let out = render(
            "Allowed file types: ${1..}",
            &slots(&["a.png", "image/png", "image/jpeg"]),
        );
        assert_eq!(out, "Allowed file types: image/png image/jpeg");
    }

    #[test]
    fn missing_slots_render_empty() {
        assert_eq!(render("[${4}]", &slots(&["x"])), "[]");
        assert_eq!(render("[${3..}]", &slots(&["x"])), "[]");
    }

    #[test]
    fn non_slot_placeholders_are_kept() {
        assert_eq!(render("${name} ${0}", &slots(&["v"])), "${name} v");
    }

    proptest! {
        #[test]
        fn templates_without_placeholders_are_identity(text in "[a-zA-Z0-9 .,!?]{0,40}") {
            prop_assert_eq!(render(&text, &slots(&["v", "p"])), text);
        }

        #[test]
        fn slot_zero_is_value(value in "[a-z]{0,12}") {
            prop_assert_eq!(render("${0}", &[value.clone()]), value);
        }
    }
}
