//! Entry types: the building blocks of a coupled configuration.
//!
//! Model entries describe components, connection and mediation entries
//! describe the transfers between them. Sequences and files live in
//! [`crate::configuration`].

mod attribute;
mod connection;
mod entry;
mod kind;

pub use attribute::{AttributeValue, Attributes, fortran_bool};
pub use connection::{ConnectionEntry, MediationEntry, SequenceEntry};
pub use entry::{DEFAULT_MEDIATOR_NAME, ModelEntry};
pub use kind::{EntryType, RemapMethod, Verbosity};

pub(crate) use attribute::{attribute_block, with_default_verbosity};

/// Indentation of nested content in rendered blocks.
pub(crate) const INDENTATION: &str = "  ";

/// Prefix every non-blank line of `text` with `prefix`.
pub(crate) fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
