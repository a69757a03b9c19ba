pub mod move_records;
pub mod rounds;
pub mod session_players;
pub mod sessions;

pub use move_records::Entity as MoveRecords;
pub use move_records::Model as MoveRecord;
pub use rounds::Entity as Rounds;
pub use rounds::Model as Round;
pub use session_players::Entity as SessionPlayers;
pub use session_players::Model as SessionPlayer;
pub use sessions::Entity as Sessions;
pub use sessions::Model as Session;
