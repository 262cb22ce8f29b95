use proptest::prelude::*;
use stratum_world::{ChunkLayout, TileCoord, VolumeDims, VoxelVolume};

fn dim() -> impl Strategy<Value = usize> {
    0usize..=6
}

fn coord() -> impl Strategy<Value = i32> {
    -8i32..=14
}

proptest! {
    // Out-of-range reads are "absent", never a panic, for every volume size including empty.
    #[test]
    fn is_present_false_outside_bounds(w in dim(), d in dim(), h in dim(), x in coord(), y in coord(), z in coord()) {
        let mut vol = VoxelVolume::new(w, d, h);
        vol.set_present_all(true);
        let tile = TileCoord::new(x, y, z);
        let inside = x >= 0 && y >= 0 && z >= 0
            && (x as usize) < w && (y as usize) < h && (z as usize) < d;
        prop_assert_eq!(vol.is_present(tile), inside);
    }

    // index_of is a bijection onto [0, cell_count)
    #[test]
    fn index_is_unique_and_in_range(w in 1usize..=6, d in 1usize..=6, h in 1usize..=6) {
        let dims = VolumeDims::new(w, d, h);
        let n = dims.cell_count();
        let mut seen = vec![false; n];
        for y in 0..h { for z in 0..d { for x in 0..w {
            let i = dims.index_of(TileCoord::new(x as i32, y as i32, z as i32)).unwrap();
            prop_assert!(i < n);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // Single-cell edits touch exactly that cell.
    #[test]
    fn set_present_is_local(w in 1usize..=5, d in 1usize..=5, h in 1usize..=5, seed in 0usize..1000) {
        let dims = VolumeDims::new(w, d, h);
        let i = seed % dims.cell_count();
        let t = TileCoord::new((i % w) as i32, (i / (w * d)) as i32, ((i / w) % d) as i32);
        prop_assert_eq!(dims.index_of(t), Some(i));
        let mut vol = VoxelVolume::new(w, d, h);
        vol.set_present(t, true, &mut ()).unwrap();
        prop_assert_eq!(vol.grid().present_count(), 1);
        prop_assert!(vol.is_present(t));
    }

    // Every in-range tile lands in a chunk the layout reports.
    #[test]
    fn every_tile_belongs_to_a_known_chunk(w in 1usize..=12, d in 1usize..=12, size in 1usize..=5, x in 0i32..12, z in 0i32..12) {
        prop_assume!((x as usize) < w && (z as usize) < d);
        let layout = ChunkLayout::new(VolumeDims::new(w, d, 1), size);
        let id = layout.chunk_of(TileCoord::new(x, 0, z));
        prop_assert!(layout.contains(id));
    }
}
