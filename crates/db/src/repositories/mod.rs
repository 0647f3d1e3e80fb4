//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod action_item_repo;
pub mod friendship_repo;
pub mod invitation_repo;
pub mod meeting_repo;
pub mod note_repo;
pub mod presence_repo;
pub mod session_repo;
pub mod transcript_repo;
pub mod user_repo;

pub use action_item_repo::ActionItemRepo;
pub use friendship_repo::FriendshipRepo;
pub use invitation_repo::InvitationRepo;
pub use meeting_repo::MeetingRepo;
pub use note_repo::NoteRepo;
pub use presence_repo::PresenceRepo;
pub use session_repo::SessionRepo;
pub use transcript_repo::TranscriptRepo;
pub use user_repo::UserRepo;
