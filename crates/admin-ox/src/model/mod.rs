//! Records served by the admin backend.

pub mod invitation;
pub mod role;
pub mod snowflake;
pub mod user;

pub use invitation::InvitationLink;
pub use role::Role;
pub use snowflake::Snowflake;
pub use user::User;
