#![allow(missing_docs)]

pub(crate) mod fixtures;
pub(crate) mod http;

pub(crate) use fixtures::{get_test_connection, get_test_state, sale, sale_in_month};
pub(crate) use http::get_json_body;
