//! Computer inventory built on shared make/model/processor entries.
//!
//! Each unit keeps its own memory size and asset tag; the attributes common
//! to all units of the same kind are stored once and shared.

use flycache::{CacheResult, KeyedInstanceCache};
use std::collections::HashMap;
use std::sync::Arc;

/// Attributes shared by every computer of the same kind.
#[derive(Debug)]
pub struct ComputerKind {
    pub make: String,
    pub model: String,
    pub processor: String,
}

/// A single physical computer: shared kind plus per-unit data.
pub struct Computer {
    pub kind: Arc<ComputerKind>,
    pub memory: String,
    pub tag: String,
}

/// Inventory of computers keyed by asset tag.
pub struct Inventory {
    kinds: KeyedInstanceCache<ComputerKind>,
    computers: HashMap<String, Computer>,
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            kinds: KeyedInstanceCache::new(),
            computers: HashMap::new(),
        }
    }

    /// Register a unit, reusing the shared kind for its attributes.
    pub fn add(
        &mut self,
        make: &str,
        model: &str,
        processor: &str,
        memory: &str,
        tag: &str,
    ) -> CacheResult<()> {
        let kind = self.kinds.get_or_create((make, model, processor), |_| ComputerKind {
            make: make.to_string(),
            model: model.to_string(),
            processor: processor.to_string(),
        })?;
        self.computers.insert(
            tag.to_string(),
            Computer {
                kind,
                memory: memory.to_string(),
                tag: tag.to_string(),
            },
        );
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<&Computer> {
        self.computers.get(tag)
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.computers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.computers.is_empty()
    }

    /// Number of distinct kinds shared across the units.
    pub fn kind_count(&self) -> usize {
        self.kinds.count()
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the inventory demonstration.
pub fn run() -> CacheResult<()> {
    println!("=== Computer Inventory ===");

    let mut inventory = Inventory::new();
    inventory.add("Dell", "Studio XPS", "Intel", "5G", "Y755P")?;
    inventory.add("Dell", "Studio XPS", "Intel", "6G", "X997T")?;
    inventory.add("Dell", "Studio XPS", "Intel", "2G", "U8U80")?;
    inventory.add("Dell", "Studio XPS", "Intel", "2G", "NT777")?;
    inventory.add("Dell", "Studio XPS", "Intel", "2G", "0J88A")?;
    inventory.add("HP", "Envy", "Intel", "4G", "CNU883701")?;
    inventory.add("HP", "Envy", "Intel", "2G", "TXU003283")?;

    if let Some(unit) = inventory.get("Y755P") {
        println!(
            "{}: {} {} / {} / {}",
            unit.tag, unit.kind.make, unit.kind.model, unit.kind.processor, unit.memory
        );
    }

    println!("Computers: {}", inventory.len());
    println!("Shared kinds: {}\n", inventory.kind_count());
    Ok(())
}
