//! Pool and relay semantics — verifies that every submitted job reports back
//! exactly once, on the thread that pumps the relay, and that jobs own their
//! state from the moment of submission.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, ImageFormat, RgbImage};
use offstage::{TransformError, TransformOptions, TransformPool, TransformRequest};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

// ---------------------------------------------------------------------------
// Exactly-once delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_job_reports_exactly_once() {
    let mut pool = TransformPool::new(2);
    let fired = Arc::new(AtomicUsize::new(0));

    let request = TransformRequest::from_bytes(sample_jpeg(64, 48));
    for _ in 0..8 {
        let fired = Arc::clone(&fired);
        pool.submit(&request, move |outcome| {
            outcome.unwrap();
            fired.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert_eq!(pool.in_flight(), 8);

    while pool.relay_next().await {}

    assert_eq!(fired.load(Ordering::SeqCst), 8);
    assert_eq!(pool.in_flight(), 0);
}

#[tokio::test]
async fn failures_are_reported_through_the_handler() {
    let mut pool = TransformPool::new(2);
    let seen = Arc::new(Mutex::new(None));

    let request = TransformRequest::from_bytes(vec![0xba, 0xad, 0xf0, 0x0d]);
    let sink = Arc::clone(&seen);
    pool.submit(&request, move |outcome| {
        *sink.lock().unwrap() = Some(outcome);
    });

    assert!(pool.relay_next().await);

    let outcome = seen.lock().unwrap().take().unwrap();
    assert!(matches!(outcome, Err(TransformError::Decode(_))));
    assert_eq!(pool.in_flight(), 0);
}

#[tokio::test]
async fn handlers_run_on_the_pumping_thread() {
    let mut pool = TransformPool::new(2);
    let seen = Arc::new(Mutex::new(None));

    let request = TransformRequest::from_bytes(sample_jpeg(32, 32));
    let sink = Arc::clone(&seen);
    pool.submit(&request, move |_| {
        *sink.lock().unwrap() = Some(std::thread::current().id());
    });

    assert!(pool.relay_next().await);
    assert_eq!(
        seen.lock().unwrap().unwrap(),
        std::thread::current().id(),
        "handler must not run on a worker thread"
    );
}

// ---------------------------------------------------------------------------
// Job state ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn jobs_copy_their_request_at_submit_time() {
    let mut pool = TransformPool::new(2);
    let seen = Arc::new(Mutex::new(None));

    let mut request = TransformRequest::from_bytes(sample_jpeg(800, 600)).with(TransformOptions {
        width: 400,
        ..TransformOptions::default()
    });
    let sink = Arc::clone(&seen);
    pool.submit(&request, move |outcome| {
        *sink.lock().unwrap() = Some(outcome);
    });

    // none of this may reach the job already in flight
    request.options.width = 9999;
    request.options.height = 1;
    request.options.format = Some("bmp".into());

    assert!(pool.relay_next().await);

    let output = seen.lock().unwrap().take().unwrap().unwrap();
    assert_eq!(output.dimensions(), (400, 300));
}

// ---------------------------------------------------------------------------
// Pumping modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_ready_drains_without_blocking() {
    let mut pool = TransformPool::new(2);
    let fired = Arc::new(AtomicUsize::new(0));

    let request = TransformRequest::from_bytes(sample_jpeg(64, 64));
    for _ in 0..4 {
        let fired = Arc::clone(&fired);
        pool.submit(&request, move |_| {
            fired.fetch_add(1, Ordering::SeqCst);
        });
    }

    let mut relayed = 0;
    while relayed < 4 {
        let batch = pool.relay_ready();
        relayed += batch;
        if batch == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    assert_eq!(fired.load(Ordering::SeqCst), 4);
    assert_eq!(pool.relay_ready(), 0);
    assert_eq!(pool.in_flight(), 0);
}

#[tokio::test]
async fn in_flight_tracks_undelivered_jobs() {
    let mut pool = TransformPool::new(1);
    let request = TransformRequest::from_bytes(sample_jpeg(32, 32));

    pool.submit(&request, |_| {});
    pool.submit(&request, |_| {});
    pool.submit(&request, |_| {});
    assert_eq!(pool.in_flight(), 3);

    assert!(pool.relay_next().await);
    assert_eq!(pool.in_flight(), 2);

    while pool.relay_next().await {}
    assert_eq!(pool.in_flight(), 0);
}

#[tokio::test]
async fn dropping_the_pool_abandons_handlers() {
    let fired = Arc::new(AtomicUsize::new(0));
    {
        let pool = TransformPool::new(2);
        let fired = Arc::clone(&fired);
        let request = TransformRequest::from_bytes(sample_jpeg(32, 32));
        pool.submit(&request, move |_| {
            fired.fetch_add(1, Ordering::SeqCst);
        });
        // dropped without pumping
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
