//! Persistence models

mod catalog;
mod skill;
mod user;

pub use catalog::{
    Artist, Event, EventInput, GameVersion, MAX_NAME_LEN, Song, SongFilter, SongInput, Tag,
    validate_name,
};
pub use skill::{NewSkillRecord, RecordFilter};
pub use user::{NewUser, Session, User};
