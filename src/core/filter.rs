use crate::domain::model::User;

/// Keeps the users whose email ends with `suffix`, preserving input order.
/// An empty suffix keeps everything.
pub fn filter_users(users: Vec<User>, suffix: &str) -> Vec<User> {
    users
        .into_iter()
        .filter(|user| user.email.ends_with(suffix))
        .collect()
}
