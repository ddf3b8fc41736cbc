//! Development fixtures

use domain_users::{hash_password, InMemoryUserDirectory, Role, User};
use tracing::info;

/// Insert a couple of known accounts so a fresh checkout is usable.
pub async fn seed_dev_users(directory: &InMemoryUserDirectory) -> eyre::Result<()> {
    let fixtures = [
        ("admin", "Admin", "admin-password", vec![Role::Admin, Role::User]),
        ("demo", "Demo User", "demo-password", vec![Role::User]),
    ];

    for (username, name, password, roles) in fixtures {
        let user = User::new(
            username.to_string(),
            name.to_string(),
            hash_password(password)?,
            roles,
        );
        directory.insert(user).await;
    }

    info!(count = directory.len().await, "Seeded development users");
    Ok(())
}
