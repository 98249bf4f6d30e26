//! Query-string filter expressions and pagination for CRUD backends.
//!
//! The [`filter`] module compiles expressions such as
//! `age:gte:18|name:~in:a,b` into a typed [`filter::Predicate`]. The
//! [`pagination`] module turns a request URL plus an optional predicate
//! into a bounded query and `prev`/`next` navigation links.

pub mod filter;
pub mod pagination;
