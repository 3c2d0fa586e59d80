//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod admin;
pub mod contact;
pub mod document;
pub mod event;
pub mod leadership;
pub mod news;
pub mod session;
pub mod team;

pub use admin::{AdminRepository, SqlxAdminRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use document::{DocumentRepository, SqlxDocumentRepository};
pub use event::{EventRepository, SqlxEventRepository};
pub use leadership::{LeadershipRepository, SqlxLeadershipRepository};
pub use news::{NewsRepository, SqlxNewsRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use team::{SqlxTeamRepository, TeamRepository};
