use crate::SessionConfig;

use googletest::assert_that;
use googletest::prelude::{anything, contains_substring, err, ok};

#[test]
fn given_default_session_config_when_validate_then_ok() {
    assert_that!(SessionConfig::default().validate(), ok(anything()));
}

#[test]
fn given_empty_file_when_validate_then_err() {
    let config = SessionConfig {
        file: "  ".to_string(),
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_parent_traversal_when_validate_then_err() {
    let config = SessionConfig {
        file: "../session.json".to_string(),
    };

    let result = config.validate();

    assert_that!(result, err(anything()));
    assert_that!(
        result.unwrap_err().to_string(),
        contains_substring("cannot contain '..'")
    );
}

#[test]
fn given_absolute_path_when_validate_then_err() {
    let config = SessionConfig {
        file: "/tmp/session.json".to_string(),
    };

    assert_that!(config.validate(), err(anything()));
}
