use std::sync::Arc;

use chrono::NaiveDate;
use rullino::{Rullino, Selection};
use rullino_mock::{MockLibrary, MockStorage};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Mock connectors: a 60-item library and an empty storage sink.
    let newest = NaiveDate::from_ymd_opt(2020, 3, 15).expect("valid date");
    let library = Arc::new(MockLibrary::new(60, newest).with_page_size(10));
    let storage = Arc::new(MockStorage::new());

    // 2. Build the orchestrator. Deletion is opt-in; the mock only records
    //    what would be deleted.
    let rullino = Rullino::builder()
        .with_source(library.clone())
        .with_storage(storage.clone())
        .folder_structure("%Y/%m")
        .delete_after_upload(true)
        .build()?;

    // 3. Move one month of photos. The engine scans a lightweight
    //    projection to find the date window, then fetches only that slice.
    let from = NaiveDate::from_ymd_opt(2020, 2, 1).expect("valid date");
    let to = NaiveDate::from_ymd_opt(2020, 2, 29).expect("valid date");
    let report = rullino
        .transfer(library.clone(), &Selection::between(from, to))
        .await?;

    println!(
        "uploaded {} items ({} failed)",
        report.uploaded.len(),
        report.failed.len()
    );
    for (folder, name, size) in storage.files() {
        println!("  {folder}/{name} ({size} bytes)");
    }
    println!("deleted from source: {}", library.deleted().len());

    Ok(())
}
