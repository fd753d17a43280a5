pub mod enums;
pub mod game_config;
pub mod race;
pub mod schedule;
pub mod user;
pub mod vote;

pub use enums::{RaceStatus, Roach};
pub use game_config::GameConfig;
pub use race::Race;
pub use schedule::RaceSchedule;
pub use user::User;
pub use vote::Vote;
