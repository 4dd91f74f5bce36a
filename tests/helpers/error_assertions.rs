//! Assertions over model errors.

use csdl::hir::{EdmError, ErrorCode};

pub fn codes(errors: &[EdmError]) -> Vec<ErrorCode> {
    errors.iter().map(|error| error.code).collect()
}

/// Assert that `errors` contains exactly `expected`, in any order.
pub fn assert_error_codes(errors: &[EdmError], expected: &[ErrorCode]) {
    let mut actual = codes(errors);
    let mut expected = expected.to_vec();
    actual.sort_by_key(|code| code.as_str());
    expected.sort_by_key(|code| code.as_str());
    assert_eq!(actual, expected, "unexpected errors: {errors:#?}");
}

pub fn assert_no_errors(errors: &[EdmError]) {
    assert!(errors.is_empty(), "expected no errors, got {errors:#?}");
}
