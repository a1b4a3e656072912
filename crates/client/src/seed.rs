//! Demo data seeding
//!
//! Populates an empty database with a handful of users, channels, and
//! welcome messages so a fresh install has something to show.

use banter_core::{Channel, Database, Message, Result, User};
use tracing::info;

/// Seed demo users, channels, and messages. Does nothing when the database
/// already has users. Returns true when data was written.
pub fn seed_demo_data(db: &Database) -> Result<bool> {
    if db.users().count()? > 0 {
        return Ok(false);
    }

    info!("Seeding demo data");

    let users = [
        ("John Doe", "john@example.com"),
        ("Jane Smith", "jane@example.com"),
        ("Bob Johnson", "bob@example.com"),
        ("Alice Williams", "alice@example.com"),
    ]
    .map(|(name, email)| {
        User::new(
            name.to_string(),
            email.to_string(),
            Some(format!(
                "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                email.split('@').next().unwrap_or(name)
            )),
        )
    });

    for user in &users {
        db.users().create(user)?;
    }

    let general = Channel::new(
        "general".to_string(),
        Some("Company-wide announcements and chatter".to_string()),
    );
    let random = Channel::new(
        "random".to_string(),
        Some("Anything that doesn't fit elsewhere".to_string()),
    );
    let introductions = Channel::new(
        "introductions".to_string(),
        Some("Say hello when you join".to_string()),
    );

    for channel in [&general, &random, &introductions] {
        db.channels().create(channel)?;
    }

    let welcome = [
        (0, "Welcome to Banter! :wave:"),
        (1, "Glad to have everyone here."),
        (2, "Has anyone set up their profile picture yet?"),
    ];
    for (author_index, content) in welcome {
        db.messages().create(&Message::new(
            general.id.clone(),
            users[author_index].id,
            content.to_string(),
        ))?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_populates_empty_database() {
        let db = Database::open_in_memory().unwrap();
        assert!(seed_demo_data(&db).unwrap());

        assert_eq!(db.users().count().unwrap(), 4);
        assert_eq!(db.channels().count().unwrap(), 3);
        assert!(db.messages().count().unwrap() > 0);
    }

    #[test]
    fn test_seed_is_a_noop_on_populated_database() {
        let db = Database::open_in_memory().unwrap();
        assert!(seed_demo_data(&db).unwrap());
        assert!(!seed_demo_data(&db).unwrap());
        assert_eq!(db.users().count().unwrap(), 4);
    }
}
