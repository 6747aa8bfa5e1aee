use data_loader::FeatureStore;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("service/data"));

    println!("Loading feature tables from {}...\n", data_dir.display());

    let start = Instant::now();
    let store = FeatureStore::load_from_dir(&data_dir).expect("Failed to load feature tables");
    let elapsed = start.elapsed();

    let (movies, users) = store.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", movies);
    println!("Users: {}", users);
    println!(
        "\nPerformance: {:.0} rows/second",
        (movies + users) as f64 / elapsed.as_secs_f64()
    );
}
