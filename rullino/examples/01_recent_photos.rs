use std::sync::Arc;

use chrono::NaiveDate;
use futures::StreamExt;
use rullino::{Selection, fetch_album};
use rullino_mock::MockLibrary;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build a deterministic mock library (90 daily items).
    let newest = NaiveDate::from_ymd_opt(2020, 3, 31).expect("valid date");
    let library = Arc::new(MockLibrary::new(90, newest).with_page_size(10));

    // 2. Resolve and stream the five most recent photos. Only one page is
    //    fetched; stopping early would cost nothing.
    let stream = fetch_album(library, &Selection::Last(5)).await?;
    futures::pin_mut!(stream);

    while let Some(item) = stream.next().await {
        let item = item?;
        println!(
            "{}  taken {}  favorite: {}",
            item.filename(),
            item.created().date_naive(),
            item.is_favorite(),
        );
    }

    Ok(())
}
