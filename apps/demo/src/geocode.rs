//! Geocoding lookups fronted by a shared-instance cache.
//!
//! The backing geocoder is deliberately slow-looking and invocation-counted;
//! the cache guarantees each address is resolved at most once.

use flycache::{CacheResult, KeyedInstanceCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Resolves addresses to coordinates.
pub struct Geocoder {
    lookups: AtomicU64,
}

impl Geocoder {
    pub fn new() -> Self {
        Self {
            lookups: AtomicU64::new(0),
        }
    }

    /// Resolve an address. Unknown addresses resolve to an empty string.
    pub fn lat_lng(&self, address: &str) -> String {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(address, "resolving coordinates");
        match address {
            "Amsterdam" => "52.3700 N, 4.8900 E",
            "London" => "51.5171 N, 0.1062 W",
            "Paris" => "48.8742 N, 2.3470 E",
            "Berlin" => "52.5233 N, 13.4127 E",
            _ => "",
        }
        .to_string()
    }

    /// How many times the resolver actually ran.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Caching front for a [`Geocoder`].
pub struct CachedGeocoder {
    geocoder: Geocoder,
    cache: KeyedInstanceCache<String>,
}

impl CachedGeocoder {
    pub fn new(geocoder: Geocoder) -> Self {
        Self {
            geocoder,
            cache: KeyedInstanceCache::new(),
        }
    }

    /// Resolve an address, reusing the cached result when present.
    pub fn lat_lng(&self, address: &str) -> CacheResult<Arc<String>> {
        self.cache
            .get_or_create((address,), |_| self.geocoder.lat_lng(address))
    }

    /// Number of distinct addresses cached.
    pub fn cached(&self) -> usize {
        self.cache.count()
    }

    /// How many times the backing geocoder ran.
    pub fn lookups(&self) -> u64 {
        self.geocoder.lookups()
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> flycache::CacheStats {
        self.cache.stats()
    }
}

/// Run the geocoding demonstration.
pub fn run() -> CacheResult<()> {
    println!("=== Cached Geocoding ===");

    let geo = CachedGeocoder::new(Geocoder::new());
    let requests = [
        "Paris", "London", "London", "London", "London", "Amsterdam", "Amsterdam", "Amsterdam",
        "Amsterdam", "London", "London",
    ];

    for address in requests {
        let coords = geo.lat_lng(address)?;
        println!("{address}: {coords}");
    }

    println!("\nCache size: {}", geo.cached());
    println!("Geocoder invocations: {}", geo.lookups());
    let stats = serde_json::to_string(&geo.stats()).expect("stats serialize to JSON");
    println!("Stats: {stats}\n");
    Ok(())
}
