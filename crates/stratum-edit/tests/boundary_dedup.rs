use proptest::prelude::*;
use stratum_edit::{ChunkInvalidator, PendingUpdateSet, affected_chunks};
use stratum_world::{ChunkId, ChunkLayout, TileCoord, VolumeDims, VoxelVolume};

#[test]
fn several_boundary_edits_in_one_tick_queue_each_chunk_once() {
    let layout = ChunkLayout::new(VolumeDims::new(8, 4, 2), 4);
    let mut vol = VoxelVolume::new(8, 4, 2);
    vol.set_present_all(true);
    let mut pending = PendingUpdateSet::new();
    for z in 0..4 {
        for x in [3, 4] {
            let mut inv = ChunkInvalidator {
                layout: &layout,
                pending: &mut pending,
            };
            vol.set_present(TileCoord::new(x, 1, z), false, &mut inv).unwrap();
        }
    }
    let mut got: Vec<_> = pending.iter().collect();
    got.sort();
    assert_eq!(got, vec![ChunkId::new(0, 0), ChunkId::new(1, 0)]);
}

#[test]
fn rejected_edit_marks_nothing() {
    let layout = ChunkLayout::new(VolumeDims::new(4, 4, 1), 2);
    let mut vol = VoxelVolume::new(4, 4, 1);
    let mut pending = PendingUpdateSet::new();
    let mut inv = ChunkInvalidator {
        layout: &layout,
        pending: &mut pending,
    };
    assert!(vol.set_present(TileCoord::new(4, 0, 0), true, &mut inv).is_err());
    assert!(pending.is_empty());
}

proptest! {
    // A chunk is affected iff the edited tile or one of its axis neighbors lies in it.
    #[test]
    fn affected_matches_neighbor_ownership(w in 1usize..=10, d in 1usize..=10, size in 1usize..=4, x in 0i32..10, z in 0i32..10) {
        prop_assume!((x as usize) < w && (z as usize) < d);
        let dims = VolumeDims::new(w, d, 1);
        let layout = ChunkLayout::new(dims, size);
        let tile = TileCoord::new(x, 0, z);
        let mut expect: Vec<ChunkId> = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]
            .iter()
            .map(|&(dx, dz)| tile.offset(dx, 0, dz))
            .filter(|t| dims.contains(*t))
            .map(|t| layout.chunk_of(t))
            .collect();
        expect.sort();
        expect.dedup();
        let mut got = affected_chunks(&layout, tile);
        got.sort();
        let before = got.len();
        got.dedup();
        prop_assert_eq!(before, got.len());
        prop_assert_eq!(got, expect);
    }
}
