//! Pagination module
//!
//! Cursor pagination over endpoints that describe their neighbouring
//! pages in a `Links` response header.
//!
//! # Overview
//!
//! A [`Paginator`] keeps the query data of its endpoint, the link of the
//! request that produced the current page and the links parsed from the
//! last response. Moving to another page follows one of those links
//! directly; changing the query data starts again from the first page.
//! [`FilteredPaginator`] adds a debounced text filter on top.

mod debounce;
mod filtered;
mod links;
mod paginator;

pub use debounce::Debouncer;
pub use filtered::FilteredPaginator;
pub use links::{parse_link_header_strict, parse_links};
pub use paginator::{
    Control, ItemConstructor, Paginator, PaginatorConfig, SelectHook, DEFAULT_DEBOUNCE_MS,
};

#[cfg(test)]
mod tests;
