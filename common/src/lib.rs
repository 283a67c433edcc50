//! Common library exports shared between the filter engine and its hosts.

extern crate serde;


pub mod search_filters;
pub mod catalog;
pub mod facet_option;
pub mod suggestion;
pub mod saved_search;
pub mod url_param;
