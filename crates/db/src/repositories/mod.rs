//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Operations that write
//! several rows open their own transaction.

pub mod dashboard_repo;
pub mod division_repo;
pub mod enrollment_repo;
pub mod match_day_repo;
pub mod match_repo;
pub mod movement_repo;
pub mod notification_repo;
pub mod payment_repo;
pub mod player_repo;
pub mod registration_repo;
pub mod role_repo;
pub mod session_repo;
pub mod stage_repo;
pub mod tournament_repo;
pub mod user_repo;

pub use dashboard_repo::DashboardRepo;
pub use division_repo::DivisionRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use match_day_repo::MatchDayRepo;
pub use match_repo::MatchRepo;
pub use movement_repo::MovementRepo;
pub use notification_repo::NotificationRepo;
pub use payment_repo::PaymentRepo;
pub use player_repo::PlayerRepo;
pub use registration_repo::RegistrationRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use stage_repo::StageRepo;
pub use tournament_repo::TournamentRepo;
pub use user_repo::UserRepo;
