//! # Chunk Admission Protocol Tests
//!
//! At most one generation per index, nothing half-written reaches the host,
//! and a failed or cancelled chunk leaves nothing behind.

use std::sync::Arc;

use emberdeep_procedural::{
    ChunkManager, ChunkState, ColumnWriter, GenerationError, GenerationMethod, GenerationResult,
    Grid, HostError, Layer, LayerMethods, LayerState, MemoryHost, RandomService, Tile,
    WorldConfig, WorldPosition, WorldSeed,
};

fn manager_with(config: WorldConfig, methods: LayerMethods) -> ChunkManager<MemoryHost> {
    ChunkManager::with_methods(config, WorldSeed::new(1234), methods, MemoryHost::new())
        .expect("valid config")
}

fn manager(config: WorldConfig) -> ChunkManager<MemoryHost> {
    let methods = LayerMethods::from_config(&config);
    manager_with(config, methods)
}

/// Fills columns with rock and fails at a chosen global column.
#[derive(Debug)]
struct Faulty {
    fail_at_global: i64,
}

struct FaultyWriter {
    offset: i64,
    fail_at_global: i64,
}

impl GenerationMethod for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    fn initialize(
        &self,
        _grid: &Grid,
        _random: &RandomService,
        chunk_offset: i64,
    ) -> GenerationResult<Box<dyn ColumnWriter>> {
        Ok(Box::new(FaultyWriter { offset: chunk_offset, fail_at_global: self.fail_at_global }))
    }
}

impl ColumnWriter for FaultyWriter {
    fn write_column(&mut self, grid: &mut Grid, x: usize) -> GenerationResult<()> {
        if self.offset + x as i64 == self.fail_at_global {
            return Err(GenerationError::Method {
                method: "faulty".into(),
                reason: format!("column {}", self.fail_at_global),
            });
        }
        grid.place_tile(x, 0, Tile::Rock, true)
    }
}

#[test]
fn test_no_double_generation() {
    let mut manager = manager(WorldConfig::test());

    assert!(manager.request_chunk(3).unwrap());
    assert!(!manager.request_chunk(3).unwrap());
    assert_eq!(manager.generating_indices(), vec![3]);
    assert_eq!(manager.host().instantiated(), 2);

    // Keep the viewpoint near chunk 3 so retention leaves it alone.
    let report = manager.tick(48.0);
    assert_eq!(report.completed, vec![3]);
    assert!(!manager.request_chunk(3).unwrap());
    assert_eq!(manager.host().instantiated(), 2);
    assert_eq!(manager.stats().generated, 1);
}

#[test]
fn test_layers_hidden_until_complete() {
    let mut config = WorldConfig::test();
    config.streaming.columns_per_tick = 6;
    config.streaming.columns_per_yield = 3;
    let mut manager = manager(config);
    manager.request_chunk(0).unwrap();

    let report = manager.tick(0.0);
    assert_eq!(report.columns_written, 6);
    assert_eq!(manager.host().placements(), 0);
    assert_eq!(manager.layer_state(0, Layer::Overworld), LayerState::Generating);

    // Partly written layers stay out of reach through every accessor.
    assert!(manager.ready_grid(0, Layer::Overworld).is_none());
    let record = manager.chunk(0).unwrap();
    for layer in Layer::ALL {
        assert!(record.grid(layer).is_none(), "{layer} grid visible while generating");
    }

    while manager.chunk_state(0) != ChunkState::Ready {
        manager.tick(0.0);
    }
    let container = manager.host().container_named("Chunk_Overworld_0").unwrap();
    let grid = manager.ready_grid(0, Layer::Overworld).unwrap();
    assert_eq!(manager.chunk(0).unwrap().grid(Layer::Overworld), Some(grid));
    for (coord, cell) in grid.occupied_cells() {
        assert_eq!(container.cells[&coord], cell.tiles());
    }
}

#[test]
fn test_rollback_on_instantiation_failure() {
    let mut manager = manager(WorldConfig::test());
    manager.host_mut().reject_instantiation("Chunk_Underworld_3");

    let err = manager.request_chunk(3).unwrap_err();
    assert!(matches!(err, GenerationError::Host(HostError::InstantiationFailed { .. })));

    assert_eq!(manager.chunk_state(3), ChunkState::Absent);
    assert!(manager.generating_indices().is_empty());
    assert_eq!(manager.host().live_count(), 0, "overworld container orphaned");
    assert_eq!(manager.host().instantiated(), 1);
    assert_eq!(manager.host().destroyed(), 1);
    assert_eq!(manager.stats().failed, 1);

    // The index can be admitted again.
    manager.host_mut().clear_rejections();
    assert!(manager.request_chunk(3).unwrap());
}

#[test]
fn test_rollback_on_publish_failure() {
    let mut manager = manager(WorldConfig::test());
    manager.host_mut().reject_placement("Chunk_Overworld_0");

    let report = manager.tick(0.0);
    assert_eq!(report.admitted, vec![0]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 0);
    assert!(report.failed[0].message.contains("tile placement rejected"));

    assert_eq!(manager.chunk_state(0), ChunkState::Absent);
    assert!(manager.generating_indices().is_empty());
    assert_eq!(manager.host().live_count(), 0);

    // The current chunk is re-admitted once the host recovers.
    manager.host_mut().clear_rejections();
    let report = manager.tick(0.0);
    assert_eq!(report.completed, vec![0]);
    assert!(manager.is_chunk_ready(0));
}

#[test]
fn test_rollback_on_method_failure() {
    let mut config = WorldConfig::test();
    config.layers.underworld = false;
    let methods = LayerMethods {
        overworld: Some(Arc::new(Faulty { fail_at_global: 20 })),
        underworld: None,
    };
    let mut manager = manager_with(config, methods);

    let report = manager.tick(0.0);
    assert_eq!(report.completed, vec![0]);

    // Chunk 1 covers global columns 16..32 and fails at 20.
    let report = manager.tick(8.0);
    assert_eq!(report.admitted, vec![1]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].message.contains("faulty failed"));

    assert_eq!(manager.chunk_state(1), ChunkState::Absent);
    assert!(manager.host().container_named("Chunk_Overworld_1").is_none());
    assert!(manager.is_chunk_ready(0), "neighbour unaffected");
    assert_eq!(manager.host().live_names(), vec!["Chunk_Overworld_0"]);
}

#[test]
fn test_cancelled_chunk_leaves_nothing() {
    let mut config = WorldConfig::test();
    config.streaming.columns_per_tick = 4;
    config.streaming.columns_per_yield = 4;
    let mut manager = manager(config);
    manager.request_chunk(1).unwrap();
    manager.tick(0.0);

    assert!(manager.cancel_chunk(1));
    for _ in 0..8 {
        manager.tick(0.0);
    }

    assert_eq!(manager.chunk_state(1), ChunkState::Absent);
    assert!(!manager.generating_indices().contains(&1));
    assert!(manager.host().container_named("Chunk_Overworld_1").is_none());
    assert!(manager.host().container_named("Chunk_Underworld_1").is_none());
    assert_eq!(manager.stats().cancelled, 1);
    assert_eq!(manager.stats().failed, 0);
}

#[test]
fn test_transition_waits_for_next_chunk() {
    let mut config = WorldConfig::test();
    config.streaming.columns_per_tick = 4;
    config.streaming.columns_per_yield = 4;
    let mut manager = manager(config);

    // Chunk 0 takes 8 ticks at 4 columns per tick.
    for _ in 0..8 {
        manager.tick(0.0);
    }
    assert!(manager.is_chunk_ready(0));

    // Past the boundary before chunk 1 is ready: no transition.
    let report = manager.tick(16.0);
    assert_eq!(report.admitted, vec![1]);
    assert!(!report.transitioned);
    assert_eq!(manager.current_index(), 0);

    let mut transitioned = false;
    for _ in 0..16 {
        transitioned |= manager.tick(16.0).transitioned;
    }
    assert!(transitioned);
    assert_eq!(manager.current_index(), 1);
    assert_eq!(manager.next_index(), 2);
}

#[test]
fn test_retention_evicts_in_flight_chunks() {
    let mut config = WorldConfig::test();
    config.streaming.columns_per_tick = 1;
    let mut manager = manager(config);

    manager.request_chunk(10).unwrap();
    let report = manager.tick(0.0);

    assert!(report.evicted.contains(&10));
    assert_eq!(manager.chunk_state(10), ChunkState::Absent);
    assert!(!manager.generating_indices().contains(&10));
    assert!(manager.host().container_named("Chunk_Overworld_10").is_none());
    assert_eq!(manager.stats().evicted, 1);
}

#[test]
fn test_underworld_sits_below_overworld() {
    let mut config = WorldConfig::test();
    config.layers.gap = 4.0;
    let mut manager = manager(config);
    manager.request_chunk(-2).unwrap();

    let over = manager.host().container_named("Chunk_Overworld_-2").unwrap();
    let under = manager.host().container_named("Chunk_Underworld_-2").unwrap();
    assert_eq!(over.spec.position, WorldPosition::new(-32.0, 0.0));
    assert_eq!(under.spec.position, WorldPosition::new(-32.0, -36.0));
}
