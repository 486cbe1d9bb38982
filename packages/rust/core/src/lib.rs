//! Generators for docbundle.
//!
//! - [`expander`]: index document → one file with every linked page inlined
//! - [`merger`]: a language's manual pages → single-page manual
//!
//! Both share the page-order, output, and progress plumbing defined here.

pub mod expander;
pub mod index;
pub mod merger;
pub mod order;
pub mod output;
pub mod progress;
