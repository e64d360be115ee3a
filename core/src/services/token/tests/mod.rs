//! Tests for the token lifecycle service
