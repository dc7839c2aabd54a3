//! GST domain core: GSTIN validation, tax computation, invoice assembly and
//! invoice number formatting.
//!
//! Everything in here is pure and synchronous. Persistence and sequence
//! allocation live in [`crate::services`].

mod assembler;
mod error;
mod gstin;
mod invoice_number;
mod tax;

pub use assembler::{assemble, is_interstate, AssembledInvoice};
pub use error::GstError;
pub use gstin::{is_valid_gstin, validate_party_gstin, PartyRole};
pub use invoice_number::{
    format_invoice_number, invoice_prefix, parse_sequence, sequence_after, MAX_SEQUENCE,
};
pub use tax::{calculate_tax, compute_line_tax, TaxSplit};
