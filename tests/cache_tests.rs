//! 单飞缓存测试

use rinth::domain::error::RinthError;
use rinth::infrastructure::storage::cache::SingleFlightCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_fetch() {
    let cache = Arc::new(SingleFlightCache::<String>::new("test", Duration::from_secs(5)));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_fetch("me", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok("alice".to_string())
                })
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "alice");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!cache.is_in_flight("me"));
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_entry_is_reused_until_ttl() {
    let cache = SingleFlightCache::<u32>::new("test", Duration::from_millis(5000));
    let calls = Arc::new(AtomicUsize::new(0));

    let fetch = |calls: Arc<AtomicUsize>| {
        move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst) as u32) }
    };

    assert_eq!(cache.get_or_fetch("k", fetch(calls.clone())).await.unwrap(), 0);

    tokio::time::advance(Duration::from_millis(4000)).await;
    assert_eq!(cache.get_or_fetch("k", fetch(calls.clone())).await.unwrap(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(1500)).await;
    assert!(cache.get("k").is_none());
    assert_eq!(cache.get_or_fetch("k", fetch(calls.clone())).await.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let cache = SingleFlightCache::<u32>::new("test", Duration::from_secs(5));

    let err = cache
        .get_or_fetch("k", || async {
            Err(RinthError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(!cache.is_in_flight("k"));
    assert!(cache.is_empty());

    let value = cache.get_or_fetch("k", || async { Ok(7) }).await.unwrap();
    assert_eq!(value, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failure_reaches_every_waiter() {
    let cache = Arc::new(SingleFlightCache::<u32>::new("test", Duration::from_secs(5)));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_fetch("k", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(RinthError::Status {
                        status: 503,
                        body: String::new(),
                    })
                })
                .await
        }));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_outlives_dropped_caller() {
    let cache = SingleFlightCache::<u32>::new("test", Duration::from_secs(5));

    let abandoned = cache.get_or_fetch("k", || async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(42)
    });
    // poll once so the fetch is registered, then give up on it
    let _ = tokio::time::timeout(Duration::from_millis(1), abandoned).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!cache.is_in_flight("k"));
    assert_eq!(cache.get("k"), Some(42));
}

#[tokio::test]
async fn test_keys_are_independent() {
    let cache = SingleFlightCache::<String>::new("test", Duration::from_secs(5));

    let a = cache.get_or_fetch("a", || async { Ok("A".to_string()) }).await.unwrap();
    let b = cache.get_or_fetch("b", || async { Ok("B".to_string()) }).await.unwrap();

    assert_eq!((a.as_str(), b.as_str()), ("A", "B"));
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
}
