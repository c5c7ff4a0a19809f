//! Loads AAPL daily history twice, demonstrating that the second load
//! only downloads the missing tail of the requested range.

use stockstash::{Key, SqliteStore, TimeSeriesCache, YahooProvider};

#[tokio::main]
async fn main() -> stockstash::Result<()> {
    let cache = TimeSeriesCache::new(SqliteStore::new("./stash.db")?, YahooProvider::new());
    let key = Key::new("AAPL");

    let records = cache.load(&key, "2025-06-01", "2025-06-29").await?;
    println!("first load:  {} records", records.len());

    // June is already persisted; only July and August are fetched here.
    let records = cache.load(&key, "2025-06-01", "2025-08-29").await?;
    println!("second load: {} records", records.len());

    if let Some((first, last)) = records.date_range() {
        println!("coverage:    {first} to {last}");
    }

    Ok(())
}
