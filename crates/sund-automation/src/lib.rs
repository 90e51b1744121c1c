//! Automation of the Solteq Sund clinical records client.
//!
//! Drives the client through its accessibility tree to open a patient record
//! and print the journal to the document archive, then verifies through the
//! document store that a finalized row exists. The only synchronization
//! mechanism is bounded polling: the GUI renders asynchronously and offers
//! nothing better than re-probing with a budget.

pub mod archive;
pub mod backend;
pub mod descriptor;
pub mod errors;
pub mod patient;
pub mod platforms;
#[cfg(test)]
mod tests;
pub mod wait;
pub mod workflow;

pub use archive::{journal_filename, DocumentArchive, PgDocumentArchive};
pub use backend::{Control, ControlImpl, UiBackend};
pub use descriptor::{ControlDescriptor, ControlKind};
pub use errors::AutomationError;
pub use patient::Cpr;
pub use wait::{poll_until, PollOptions};
pub use workflow::{Credentials, Launched, LoggedIn, PatientOpen, PrintDialog, SolteqSund};
