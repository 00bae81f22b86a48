pub mod users;

#[cfg(test)]
pub use users::MockUserStore;
pub use users::{PgUserService, UserStore};
