//! Repositories
//!
//! Database access layer, one repository per table family.

mod artists;
mod events;
mod skills;
mod songs;
mod tags;
mod users;
mod versions;

pub use artists::ArtistRepo;
pub use events::EventRepo;
pub use skills::SkillRepo;
pub use songs::SongRepo;
pub use tags::TagRepo;
pub use users::{AdminGuarded, UserRepo};
pub use versions::VersionRepo;
