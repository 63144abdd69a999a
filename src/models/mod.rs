//! Database models and CRUD operations.

pub mod attachment;
pub mod integration;
pub mod invitation;
pub mod profile;
pub mod tag;
pub mod workshop;

pub use attachment::Attachment;
pub use integration::{Integration, IntegrationKind};
pub use invitation::Invitation;
pub use profile::{Profile, ProfileView, UserRole};
pub use tag::{CreateTag, Tag, TagCategory, UpdateTag};
pub use workshop::{Workshop, WorkshopInput, WorkshopSource};
