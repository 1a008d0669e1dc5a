/**
 * Selector Tests
 *
 * CSS selector parsing and directive selector matching.
 */

#[cfg(test)]
mod tests {
    use ng_template_compiler::directive_matching::{CssSelector, ElementSelectorInput, SelectorMatcher};
    use pretty_assertions::assert_eq;

    fn parse_one(selector: &str) -> CssSelector {
        let mut selectors = CssSelector::parse(selector).expect("valid selector");
        assert_eq!(selectors.len(), 1, "expected a single selector in '{}'", selector);
        selectors.remove(0)
    }

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementSelectorInput {
        attrs
            .iter()
            .fold(ElementSelectorInput::new(tag), |el, (name, value)| el.with_attr(*name, *value))
    }

    mod parsing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_parse_element_names() {
            let selector = parse_one("sometag");
            assert_eq!(selector.element.as_deref(), Some("sometag"));
            assert!(selector.class_names.is_empty());
        }

        #[test]
        fn should_parse_ids_as_attributes() {
            let selector = parse_one("#main");
            assert_eq!(selector.attrs, vec![("id".to_string(), "main".to_string())]);
        }

        #[test]
        fn should_parse_and_lowercase_class_names() {
            let selector = parse_one(".someClass.other");
            assert_eq!(selector.class_names, vec!["someclass", "other"]);
        }

        #[test]
        fn should_parse_attribute_values_in_all_quote_styles() {
            let selector = parse_one(r#"[a=plain][b="double"][c='single'][d]"#);
            assert_eq!(
                selector.attrs,
                vec![
                    ("a".to_string(), "plain".to_string()),
                    ("b".to_string(), "double".to_string()),
                    ("c".to_string(), "single".to_string()),
                    ("d".to_string(), String::new()),
                ]
            );
        }

        #[test]
        fn should_split_selector_lists() {
            let selectors = CssSelector::parse("a, .b ,[c]").unwrap();
            assert_eq!(selectors.len(), 3);
            assert_eq!(selectors[1].class_names, vec!["b"]);
        }

        #[test]
        fn should_parse_not_selectors() {
            let selector = parse_one("div:not(.hidden)");
            assert_eq!(selector.element.as_deref(), Some("div"));
            assert_eq!(selector.not_selectors.len(), 1);
            assert_eq!(selector.not_selectors[0].class_names, vec!["hidden"]);
        }

        #[test]
        fn should_print_selectors() {
            let selector = parse_one("a.b[c=d]:not(.e)");
            assert_eq!(selector.to_string(), "a.b[c=d]:not(.e)");
        }

        #[test]
        fn should_unescape_dollar_in_attribute_names() {
            let selector = parse_one(r"[\$event]");
            assert_eq!(selector.attrs[0].0, "$event");
            assert_eq!(selector.to_string(), r"[\$event]");
        }

        #[test]
        fn should_reject_multiple_selectors_inside_not() {
            let err = CssSelector::parse(":not(a, b)").unwrap_err();
            assert!(err.to_string().contains("Multiple selectors in :not are not supported"));
        }

        #[test]
        fn should_reject_nested_not() {
            let err = CssSelector::parse("a:not(:not(b))").unwrap_err();
            assert!(err.to_string().contains("Nesting :not in a selector is not allowed"));
        }

        #[test]
        fn should_reject_unescaped_dollar() {
            let err = CssSelector::parse("[$x]").unwrap_err();
            assert!(err.to_string().contains("Unescaped \"$\" is not supported"));
        }
    }

    mod matching {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_match_by_element_name() {
            let selector = parse_one("input");
            assert!(selector.matches(&element("input", &[])));
            assert!(!selector.matches(&element("select", &[])));
        }

        #[test]
        fn should_match_attribute_presence_and_values() {
            let presence = parse_one("[ngModel]");
            assert!(presence.matches(&element("input", &[("ngModel", "")])));
            assert!(presence.matches(&element("input", &[("ngModel", "anything")])));
            assert!(!presence.matches(&element("input", &[("ngModelOptions", "")])));

            let value = parse_one("[type=text]");
            assert!(value.matches(&element("input", &[("type", "TEXT")])));
            assert!(!value.matches(&element("input", &[("type", "radio")])));
        }

        #[test]
        fn should_match_class_names_from_the_class_attribute() {
            let selector = parse_one(".a.b");
            assert!(selector.matches(&element("div", &[("class", "b  x A")])));
            assert!(!selector.matches(&element("div", &[("class", "a")])));
        }

        #[test]
        fn should_respect_not_selectors() {
            let selector = parse_one("button:not([disabled])");
            assert!(selector.matches(&element("button", &[])));
            assert!(!selector.matches(&element("button", &[("disabled", "")])));
        }

        #[test]
        fn should_match_bare_not_against_any_element() {
            let selector = parse_one(":not(span)");
            assert_eq!(selector.element.as_deref(), Some("*"));
            assert!(selector.matches(&element("div", &[])));
            assert!(!selector.matches(&element("span", &[])));
        }
    }

    mod matcher {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_return_every_matching_payload_in_order() {
            let mut matcher = SelectorMatcher::new();
            matcher.add_selectables(CssSelector::parse("[dirA]").unwrap(), 1);
            matcher.add_selectables(CssSelector::parse("div, span").unwrap(), 2);
            matcher.add_selectables(CssSelector::parse("p").unwrap(), 3);

            assert_eq!(matcher.match_element(&element("span", &[("dirA", "")])), vec![&1, &2]);
            assert_eq!(matcher.match_element(&element("p", &[])), vec![&3]);
            assert!(matcher.match_element(&element("a", &[])).is_empty());
        }

        #[test]
        fn should_report_emptiness() {
            let mut matcher: SelectorMatcher<&str> = SelectorMatcher::new();
            assert!(matcher.is_empty());
            matcher.add_selectables(CssSelector::parse("a").unwrap(), "a");
            assert!(!matcher.is_empty());
        }
    }
}
