//! End-to-end populate and verify scenarios over the in-memory store.

use std::time::Duration;

use course_seed::generate::CourseGenerator;
use course_seed::populate::{run_populate_with, write_in_batches};
use course_seed::testing::{test_config, MemoryStore};
use course_seed::verify::{run_verify_with, Verifier, UNSPECIFIED_BUCKET};
use course_seed::Course;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_courses(tenant: &str, n: usize) -> Vec<Course> {
    let generator = CourseGenerator::new(tenant);
    let mut rng = StdRng::seed_from_u64(7);
    (0..n).map(|_| generator.generate(&mut rng)).collect()
}

#[tokio::test]
async fn populate_continues_past_failed_batch_and_verifies() {
    let store = MemoryStore::new().fail_put_batch(2);
    let (metrics, written) =
        write_in_batches(&store, make_courses("TENANT_A", 47), 20, Duration::ZERO).await;

    // 47 records at batch size 20: three batches of 20, 20, 7. The second
    // batch fails; the third must still run.
    assert_eq!(metrics.batch_count, 3);
    assert_eq!(store.put_batch_calls(), 3);
    assert_eq!(metrics.inserted, 27);
    assert_eq!(metrics.failed, 20);
    assert_eq!(written.len(), 27);

    let verifier = Verifier::new(&store);
    assert_eq!(verifier.count_for_tenant("TENANT_A").await.unwrap(), 27);
    assert_eq!(verifier.count_all().await.unwrap(), 27);

    let report = verifier.aggregate("TENANT_A").await.unwrap();
    assert_eq!(report.category_total(), 27);
    assert_eq!(report.level_total(), 27);
}

#[tokio::test]
async fn populate_writes_only_the_target_tenant() {
    let store = MemoryStore::new();
    store.seed(make_courses("TENANT_B", 1).remove(0));

    let output_dir = tempfile::tempdir().unwrap();
    let mut config = test_config("TENANT_A");
    config.total_records = 35;
    config.batch_size = 10;
    config.output_dir = output_dir.path().to_path_buf();

    run_populate_with(&store, &config).await.unwrap();

    let verifier = Verifier::new(&store);
    assert_eq!(verifier.count_for_tenant("TENANT_A").await.unwrap(), 35);
    assert_eq!(verifier.count_for_tenant("TENANT_B").await.unwrap(), 1);
    assert_eq!(verifier.count_all().await.unwrap(), 36);
}

#[tokio::test]
async fn aggregate_reflects_every_page_of_the_partition() {
    // Page cap of 6 forces the aggregation to paginate internally.
    let store = MemoryStore::new().with_page_size(6);
    for course in make_courses("TENANT_A", 100) {
        store.seed(course);
    }

    let verifier = Verifier::new(&store);
    let report = verifier.aggregate("TENANT_A").await.unwrap();
    assert_eq!(report.category_total(), 100);
    assert_eq!(report.level_total(), 100);
    // Fully-generated records never land in the unspecified bucket.
    assert!(!report.by_level.contains_key(UNSPECIFIED_BUCKET));
    assert!(!report.by_category.contains_key(UNSPECIFIED_BUCKET));
}

#[tokio::test]
async fn run_verify_succeeds_on_empty_and_populated_tables() {
    let store = MemoryStore::new();
    let config = test_config("TENANT_A");

    run_verify_with(&store, &config).await.unwrap();

    for course in make_courses("TENANT_A", 5) {
        store.seed(course);
    }
    run_verify_with(&store, &config).await.unwrap();
}
