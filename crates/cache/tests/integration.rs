//! Integration tests for the shared-instance cache.
//!
//! Exercises the two canonical consumer scenarios (computer inventory,
//! cached geocoding) and multi-threaded first-access races.

use flycache::{CacheResult, KeyedInstanceCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};

/// Attributes shared by every computer of the same kind.
#[derive(Debug)]
struct ComputerKind {
    make: String,
    model: String,
    processor: String,
}

fn computer_kind(make: &str, model: &str, processor: &str) -> ComputerKind {
    ComputerKind {
        make: make.to_string(),
        model: model.to_string(),
        processor: processor.to_string(),
    }
}

/// Resolves city coordinates, counting how often it is actually invoked.
struct Geocoder {
    lookups: AtomicU64,
}

impl Geocoder {
    fn new() -> Self {
        Self {
            lookups: AtomicU64::new(0),
        }
    }

    fn lat_lng(&self, address: &str) -> String {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        match address {
            "Amsterdam" => "52.3700 N, 4.8900 E",
            "London" => "51.5171 N, 0.1062 W",
            "Paris" => "48.8742 N, 2.3470 E",
            "Berlin" => "52.5233 N, 13.4127 E",
            _ => "",
        }
        .to_string()
    }

    fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Consumer Scenarios
// =============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_seven_computers_share_two_kinds() -> CacheResult<()> {
        let kinds = KeyedInstanceCache::new();
        let units = [
            ("Dell", "Studio XPS", "Intel", "5G", "Y755P"),
            ("Dell", "Studio XPS", "Intel", "6G", "X997T"),
            ("Dell", "Studio XPS", "Intel", "2G", "U8U80"),
            ("Dell", "Studio XPS", "Intel", "2G", "NT777"),
            ("Dell", "Studio XPS", "Intel", "2G", "0J88A"),
            ("HP", "Envy", "Intel", "4G", "CNU883701"),
            ("HP", "Envy", "Intel", "2G", "TXU003283"),
        ];

        let mut computers = Vec::new();
        for (make, model, processor, memory, tag) in units {
            let kind = kinds.get_or_create((make, model, processor), |_| {
                computer_kind(make, model, processor)
            })?;
            computers.push((kind, memory, tag));
        }

        assert_eq!(computers.len(), 7);
        assert_eq!(kinds.count(), 2, "7 units over 2 attribute combinations");

        // Every Dell unit references the single Dell kind.
        let dell = kinds.get(("Dell", "Studio XPS", "Intel"))?.unwrap();
        for (kind, _, _) in computers.iter().take(5) {
            assert!(Arc::ptr_eq(kind, &dell));
        }
        assert_eq!(dell.processor, "Intel");
        Ok(())
    }

    #[test]
    fn test_geocode_requests_hit_the_backend_once_per_city() -> CacheResult<()> {
        let geocoder = Geocoder::new();
        let cache = KeyedInstanceCache::new();
        let requests = [
            "Paris", "London", "London", "London", "London", "Amsterdam", "Amsterdam",
            "Amsterdam", "Amsterdam", "London", "London",
        ];

        let mut london_results = Vec::new();
        for address in requests {
            let coords = cache.get_or_create((address,), |_| geocoder.lat_lng(address))?;
            if address == "London" {
                london_results.push(coords);
            }
        }

        assert_eq!(cache.count(), 3, "11 requests over 3 distinct addresses");
        assert_eq!(geocoder.lookups(), 3, "each address resolved exactly once");

        // Every repeated request returned the identical cached value.
        for result in &london_results[1..] {
            assert!(Arc::ptr_eq(&london_results[0], result));
        }
        assert_eq!(*london_results[0], "51.5171 N, 0.1062 W");
        Ok(())
    }

    #[test]
    fn test_extrinsic_state_stays_outside_shared_entries() -> CacheResult<()> {
        let kinds = KeyedInstanceCache::new();
        let shared = kinds.get_or_create(("Dell", "Studio XPS", "Intel"), |_| {
            computer_kind("Dell", "Studio XPS", "Intel")
        })?;

        // Per-unit data lives next to the shared Arc, not inside it.
        let mut first = (Arc::clone(&shared), "5G".to_string());
        let second = (Arc::clone(&shared), "2G".to_string());
        first.1 = "6G".to_string();

        assert_eq!(second.1, "2G", "mutating one unit must not affect another");
        assert!(Arc::ptr_eq(&first.0, &second.0));
        assert_eq!(shared.make, "Dell");
        Ok(())
    }
}

// =============================================================================
// Concurrent First Access
// =============================================================================

mod races {
    use super::*;

    const THREADS: usize = 8;

    #[test]
    fn test_racing_callers_observe_one_entry() {
        let cache: KeyedInstanceCache<String> = KeyedInstanceCache::new();
        let constructions = AtomicU64::new(0);
        let barrier = Barrier::new(THREADS);

        let entries: Vec<Arc<String>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_create(("London",), |_| {
                                constructions.fetch_add(1, Ordering::Relaxed);
                                "51.5171 N, 0.1062 W".to_string()
                            })
                            .expect("get_or_create should succeed")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(constructions.load(Ordering::Relaxed), 1);
        assert_eq!(cache.count(), 1, "racing callers must add exactly one entry");
        for entry in &entries[1..] {
            assert!(
                Arc::ptr_eq(&entries[0], entry),
                "all racing callers must share the winning entry"
            );
        }
    }

    #[test]
    fn test_concurrent_distinct_keys_stay_isolated() {
        let cache: KeyedInstanceCache<String> = KeyedInstanceCache::new();
        let cities = ["Paris", "London", "Amsterdam", "Berlin"];
        let barrier = Barrier::new(cities.len() * 2);

        let cache_ref = &cache;
        let barrier_ref = &barrier;
        std::thread::scope(|s| {
            // Two threads per city, racing on each key.
            for city in cities {
                for _ in 0..2 {
                    s.spawn(move || {
                        barrier_ref.wait();
                        cache_ref
                            .get_or_create((city,), |_| city.to_lowercase())
                            .expect("get_or_create should succeed")
                    });
                }
            }
        });

        assert_eq!(cache.count(), cities.len());
        for city in cities {
            let entry = cache.get((city,)).unwrap().expect("entry should exist");
            assert_eq!(*entry, city.to_lowercase());
        }
    }

    #[test]
    fn test_stats_consistent_after_races() {
        let cache: KeyedInstanceCache<u32> = KeyedInstanceCache::new();
        let barrier = Barrier::new(THREADS);

        std::thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    barrier.wait();
                    cache.get_or_create((42,), |_| 42).unwrap()
                });
            }
        });

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.misses, 1, "only the winning caller misses");
        assert_eq!(stats.hits as usize, THREADS - 1);
    }
}
