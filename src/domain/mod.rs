//! Domain types: ordering rules, payload records and their validation.

pub mod ordering;
pub mod payload;
pub mod validation;

pub use ordering::{ItemId, OwnerId};
pub use payload::{
    Collection, ItemPayload, OrderedItem, PersonalInfo, PersonalInfoPayload, ProjectPayload,
    SocialLinkPayload,
};
pub use validation::{FieldError, ValidationErrors};
