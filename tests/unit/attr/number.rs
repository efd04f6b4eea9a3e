use super::*;

#[test]
fn splits_leading_number_and_unit() {
    assert_eq!(split_number("12.5px"), Some((12.5, "px")));
    assert_eq!(split_number("-.5e1%"), Some((-5.0, "%")));
    assert_eq!(split_number("3e"), Some((3.0, "e")));
    assert_eq!(split_number("px"), None);
    assert_eq!(split_number("-"), None);
}

#[test]
fn number_must_be_whole_value() {
    assert_eq!(parse_number(" 4 "), Some(4.0));
    assert_eq!(parse_number("4px"), None);
}

#[test]
fn number_lists_accept_mixed_separators() {
    assert_eq!(parse_number_list("1, 2 3,4"), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(parse_number_list("1-2"), vec![1.0, -2.0]);
    assert_eq!(parse_number_optional_number("2"), Some((2.0, 2.0)));
    assert_eq!(parse_number_optional_number("2 3"), Some((2.0, 3.0)));
    assert_eq!(parse_number_optional_number("1 2 3"), None);
}
