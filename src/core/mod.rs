pub mod access;
pub mod contact;
pub mod dashboard;
pub mod deadline;
pub mod documents;
pub mod export;
pub mod requirements;
pub mod tenders;
pub mod ticker;

pub use crate::domain::model::{
    RequirementSubmission, SubmittedTender, Tender, TenderStatus,
};
pub use crate::domain::ports::{AccessVerifier, BlobStore, Clock, ContactNotifier, DataStore};
pub use crate::utils::error::Result;
