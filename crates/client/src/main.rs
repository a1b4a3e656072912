//! Banter - team chat client
//!
//! Opens the session against the platform data directory, seeding demo data
//! on first run, and prints a short summary of what is in the workspace.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Banter");

    let session = match banter_client::Session::open_default() {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to open session: {}", e);
            std::process::exit(1);
        }
    };

    let db = session.db();
    match (
        db.users().count(),
        db.channels().count(),
        db.messages().count(),
    ) {
        (Ok(users), Ok(channels), Ok(messages)) => {
            tracing::info!(users, channels, messages, "Workspace ready");
        }
        (users, channels, messages) => {
            tracing::error!(?users, ?channels, ?messages, "Failed to read workspace counts");
            std::process::exit(1);
        }
    }

    println!(
        "Signed in as {} <{}>",
        session.current_user().name,
        session.current_user().email
    );
}
