//! Shared test data, also used in the documentation examples
