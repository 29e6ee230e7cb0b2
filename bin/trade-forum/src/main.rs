//! # Trade Forum Binary
//!
//! Assembles the storage backend selected by compile-time features, makes
//! sure the profile holds the default records, and logs the current listing.

mod settings;

use settings::Settings;
use tf_core::traits::KvStore;
use tf_services::{moderation, posts, ForumStore};

// Feature-gated imports: the backend is chosen at compile time
#[cfg(all(feature = "store-local", not(feature = "store-sqlite")))]
use tf_store_local::LocalFileStore;

#[cfg(feature = "store-sqlite")]
use tf_store_sqlite::SqliteKvStore;

#[cfg(not(any(feature = "store-local", feature = "store-sqlite")))]
compile_error!("enable the `store-local` or `store-sqlite` feature");

async fn open_backend(settings: &Settings) -> anyhow::Result<Box<dyn KvStore>> {
    #[cfg(feature = "store-sqlite")]
    {
        let store = SqliteKvStore::new(&settings.database_url).await?;
        return Ok(Box::new(store));
    }

    #[cfg(all(feature = "store-local", not(feature = "store-sqlite")))]
    {
        log::info!("using profile directory {}", settings.data_dir.display());
        Ok(Box::new(LocalFileStore::new(settings.data_dir.clone())))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let store = ForumStore::new(open_backend(&settings).await?);
    store.initialize().await?;

    let users = store.get_users().await?;
    let listing = posts::list_posts(&store).await?;
    let stats = moderation::stats(&users, &listing);
    log::info!(
        "forum ready: {} users ({} active), {} posts",
        stats.users,
        stats.active_users,
        stats.posts
    );

    for post in &listing {
        let pin = if post.is_pinned() { format!("[pin {}] ", u8::from(post.pinned_level)) } else { String::new() };
        let price = post.price.map(|p| format!(" ¥{p}")).unwrap_or_default();
        log::info!("{pin}{} by {}{price} ({} replies)", post.title, post.author_name, post.replies.len());
    }

    if let Some(user) = store.get_current_user().await? {
        log::info!("session open for {}", user.username);
    }
    Ok(())
}
