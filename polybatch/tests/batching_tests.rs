//! End-to-end batching tests against the recording backend.

use polybatch::{
    BackendCall, BatchArena, BatchConfig, BatchError, GrowableArray, PolyFlags, PolyVertex,
    RecordingBackend, Rgba, ShaderId, SortKey, SurfaceInfo, TextureHandle,
};

fn small_config() -> BatchConfig {
    BatchConfig {
        polygon_capacity: 4,
        vertex_capacity: 8,
        output_capacity: 8,
        ..Default::default()
    }
}

/// Fan of `count` vertices whose positions encode `tag`
fn fan(tag: u32, count: usize) -> Vec<PolyVertex> {
    (0..count)
        .map(|i| PolyVertex::new(tag as f32, i as f32, 0.0, i as f32 * 0.5, 1.0))
        .collect()
}

fn submit(
    arena: &mut BatchArena,
    backend: &mut RecordingBackend,
    texture: TextureHandle,
    flags: PolyFlags,
    color: Rgba,
    vertices: &[PolyVertex],
    horizon_special: bool,
) {
    arena.set_current_texture(backend, texture);
    arena
        .submit_polygon(
            backend,
            Some(&SurfaceInfo::with_color(color)),
            vertices,
            flags,
            ShaderId::NONE,
            horizon_special,
        )
        .unwrap();
}

/// Texture bound at the time of each indexed draw
fn textures_per_draw(calls: &[BackendCall]) -> Vec<TextureHandle> {
    let mut bound = TextureHandle::NONE;
    let mut textures = Vec::new();
    for call in calls {
        match call {
            BackendCall::SetTexture(texture) => bound = *texture,
            BackendCall::DrawIndexedTriangles { .. } => textures.push(bound),
            _ => {}
        }
    }
    textures
}

/// Tiny deterministic generator for varied workloads
struct Lcg(u32);

impl Lcg {
    fn next(&mut self, bound: u32) -> u32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 16) % bound
    }
}

#[test]
fn test_no_geometry_is_lost() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();
    let mut rng = Lcg(12345);
    let mut expected_triangles = 0;

    arena.begin_collecting().unwrap();
    for tag in 0..200 {
        let count = rng.next(8) as usize;
        expected_triangles += count.saturating_sub(2);
        let texture = TextureHandle(1 + rng.next(4));
        let flags = if rng.next(5) == 0 {
            PolyFlags::NO_TEXTURE
        } else {
            PolyFlags::empty()
        };
        let horizon = rng.next(10) == 0;
        submit(&mut arena, &mut backend, texture, flags, Rgba::WHITE, &fan(tag, count), horizon);
    }
    let stats = arena.flush(&mut backend).unwrap();

    assert_eq!(backend.triangle_count(), expected_triangles);
    assert_eq!(stats.triangles() as usize, expected_triangles);
    assert_eq!(stats.polygons, 200);
    assert_eq!(stats.draw_calls as usize, backend.draw_count());
}

#[test]
fn test_identical_states_share_one_draw() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();
    let red = Rgba::new(255, 0, 0, 255);
    let states = [
        (TextureHandle(1), PolyFlags::empty(), Rgba::WHITE),
        (TextureHandle(2), PolyFlags::empty(), Rgba::WHITE),
        (TextureHandle(1), PolyFlags::TRANSLUCENT, Rgba::WHITE),
        (TextureHandle(1), PolyFlags::empty(), red),
    ];

    arena.begin_collecting().unwrap();
    for round in 0..5 {
        for (i, &(texture, flags, color)) in states.iter().enumerate() {
            submit(&mut arena, &mut backend, texture, flags, color, &fan(round * 4 + i as u32, 4), false);
        }
    }
    let stats = arena.flush(&mut backend).unwrap();

    assert_eq!(backend.draw_count(), states.len());
    assert_eq!(stats.draw_calls as usize, states.len());
    for call in backend.draws() {
        // Five quads per run
        assert_eq!(call.triangle_count(), 10);
    }
}

#[test]
fn test_repeated_texture_merges_after_sort() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();
    let a = TextureHandle(10);
    let b = TextureHandle(20);

    arena.begin_collecting().unwrap();
    for (tag, texture) in [a, b, a].into_iter().enumerate() {
        submit(&mut arena, &mut backend, texture, PolyFlags::empty(), Rgba::WHITE, &fan(tag as u32, 3), false);
    }
    arena.flush(&mut backend).unwrap();

    assert_eq!(backend.draw_count(), 2);
    let mut textures = textures_per_draw(backend.calls());
    textures.sort();
    assert_eq!(textures, vec![a, b]);
    assert_eq!(backend.texture_binds().len(), 2);
}

#[test]
fn test_horizon_keys_precede_hashed_keys() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();

    arena.begin_collecting().unwrap();
    for tag in 0..12 {
        let horizon = tag % 3 == 0;
        let flags = if tag % 4 == 1 {
            PolyFlags::NO_TEXTURE
        } else {
            PolyFlags::empty()
        };
        submit(&mut arena, &mut backend, TextureHandle(tag + 1), flags, Rgba::WHITE, &fan(tag, 3), horizon);
    }

    let polygons = arena.polygons();
    let ordered: Vec<SortKey> = polygons
        .iter()
        .filter(|p| p.horizon_special || p.flags.is_untextured())
        .map(|p| p.key)
        .collect();
    let hashed: Vec<SortKey> = polygons
        .iter()
        .filter(|p| !p.horizon_special && !p.flags.is_untextured())
        .map(|p| p.key)
        .collect();

    assert!(!ordered.is_empty() && !hashed.is_empty());
    for low in &ordered {
        assert!(hashed.iter().all(|high| low < high));
    }
    // Submission order among horizon and untextured polygons
    assert!(ordered.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_horizon_polygons_draw_in_submission_order() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();

    arena.begin_collecting().unwrap();
    submit(&mut arena, &mut backend, TextureHandle(3), PolyFlags::empty(), Rgba::WHITE, &fan(0, 3), true);
    submit(&mut arena, &mut backend, TextureHandle(2), PolyFlags::empty(), Rgba::WHITE, &fan(1, 3), true);
    submit(&mut arena, &mut backend, TextureHandle(1), PolyFlags::empty(), Rgba::WHITE, &fan(2, 3), true);
    arena.flush(&mut backend).unwrap();

    assert_eq!(
        textures_per_draw(backend.calls()),
        vec![TextureHandle(3), TextureHandle(2), TextureHandle(1)]
    );
}

#[test]
fn test_horizon_drawn_first_in_either_order() {
    for horizon_first in [true, false] {
        let mut arena = BatchArena::new(small_config());
        let mut backend = RecordingBackend::new();
        let sky = TextureHandle(7);
        let wall = TextureHandle(8);

        arena.begin_collecting().unwrap();
        if horizon_first {
            submit(&mut arena, &mut backend, sky, PolyFlags::empty(), Rgba::WHITE, &fan(0, 4), true);
            submit(&mut arena, &mut backend, wall, PolyFlags::empty(), Rgba::WHITE, &fan(1, 4), false);
        } else {
            submit(&mut arena, &mut backend, wall, PolyFlags::empty(), Rgba::WHITE, &fan(1, 4), false);
            submit(&mut arena, &mut backend, sky, PolyFlags::empty(), Rgba::WHITE, &fan(0, 4), true);
        }
        arena.flush(&mut backend).unwrap();

        assert_eq!(textures_per_draw(backend.calls()), vec![sky, wall]);
        let first_draw = backend.draws().next().unwrap();
        let BackendCall::DrawIndexedTriangles { vertices, .. } = first_draw else {
            panic!("expected an indexed draw, got {first_draw:?}");
        };
        assert_eq!(vertices, &fan(0, 4));
    }
}

#[test]
fn test_fan_indices_are_offset_by_base_vertex() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();

    arena.begin_collecting().unwrap();
    submit(&mut arena, &mut backend, TextureHandle(1), PolyFlags::empty(), Rgba::WHITE, &fan(0, 4), false);
    submit(&mut arena, &mut backend, TextureHandle(1), PolyFlags::empty(), Rgba::WHITE, &fan(1, 5), false);
    arena.flush(&mut backend).unwrap();

    let draws: Vec<&BackendCall> = backend.draws().collect();
    assert_eq!(draws.len(), 1);
    let BackendCall::DrawIndexedTriangles { vertices, indices, .. } = draws[0] else {
        panic!("expected an indexed draw");
    };
    assert_eq!(vertices.len(), 9);
    assert_eq!(
        indices,
        &vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7, 4, 7, 8]
    );
}

#[test]
fn test_growth_preserves_stored_bytes() {
    let mut array: GrowableArray<PolyVertex> = GrowableArray::new("test vertices", 4);
    for tag in 0..4 {
        array.extend_from_slice(&fan(tag, 1));
    }
    let before: Vec<u8> = bytemuck::cast_slice(array.as_slice()).to_vec();

    array.extend_from_slice(&fan(99, 13));
    assert_eq!(array.capacity(), 32);
    let after: &[u8] = bytemuck::cast_slice(array.as_slice());
    assert_eq!(&after[..before.len()], before.as_slice());
}

#[test]
fn test_arena_growth_preserves_collected_polygons() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();
    let mut expected_vertices = Vec::new();

    arena.begin_collecting().unwrap();
    for tag in 0..40 {
        let vertices = fan(tag, 3 + (tag as usize % 4));
        expected_vertices.extend_from_slice(&vertices);
        submit(&mut arena, &mut backend, TextureHandle(tag), PolyFlags::empty(), Rgba::WHITE, &vertices, false);
    }

    assert!(arena.polygon_capacity() >= 40);
    assert_eq!(
        bytemuck::cast_slice::<PolyVertex, u8>(arena.vertices()),
        bytemuck::cast_slice::<PolyVertex, u8>(&expected_vertices)
    );
    for (tag, polygon) in arena.polygons().iter().enumerate() {
        assert_eq!(polygon.texture, TextureHandle(tag as u32));
    }

    arena.flush(&mut backend).unwrap();
    assert_eq!(backend.draw_count(), 40);
    assert!(arena.output_capacity() >= 6);
}

#[test]
fn test_contract_violations_are_errors() {
    let mut arena = BatchArena::default();
    let mut backend = RecordingBackend::new();

    assert_eq!(arena.flush(&mut backend), Err(BatchError::NotCollecting));
    arena.begin_collecting().unwrap();
    assert_eq!(arena.begin_collecting(), Err(BatchError::AlreadyCollecting));
    assert_eq!(
        arena.submit_polygon(&mut backend, None, &fan(0, 3), PolyFlags::empty(), ShaderId::NONE, false),
        Err(BatchError::MissingSurface)
    );
    assert!(arena.flush(&mut backend).is_ok());
    assert_eq!(arena.flush(&mut backend), Err(BatchError::NotCollecting));
    assert!(backend.calls().is_empty());
}

#[test]
fn test_views_reuse_the_arena() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::new();

    for view in 0..2 {
        arena.begin_collecting().unwrap();
        for tag in 0..20 {
            submit(&mut arena, &mut backend, TextureHandle(1 + tag % 2), PolyFlags::empty(), Rgba::WHITE, &fan(tag, 4), false);
        }
        let stats = arena.flush(&mut backend).unwrap();
        assert_eq!(stats.draw_calls, 2, "view {view}");
    }

    assert_eq!(backend.draw_count(), 4);
    assert_eq!(backend.triangle_count(), 2 * 20 * 2);
}

#[test]
fn test_shader_binds_follow_run_changes() {
    let mut arena = BatchArena::new(small_config());
    let mut backend = RecordingBackend::with_shaders();
    let surface = SurfaceInfo::with_color(Rgba::WHITE);

    arena.begin_collecting().unwrap();
    for (tag, shader) in [ShaderId(1), ShaderId(2), ShaderId(1)].into_iter().enumerate() {
        arena.set_current_texture(&mut backend, TextureHandle(5));
        arena
            .submit_polygon(&mut backend, Some(&surface), &fan(tag as u32, 3), PolyFlags::empty(), shader, false)
            .unwrap();
    }
    let stats = arena.flush(&mut backend).unwrap();

    assert_eq!(backend.draw_count(), 2);
    assert_eq!(stats.shader_changes, 2);
    let mut shaders = backend.shader_binds();
    shaders.sort();
    assert_eq!(shaders, vec![ShaderId(1), ShaderId(2)]);
    assert_eq!(backend.texture_binds(), vec![TextureHandle(5)]);
}

#[test]
fn test_batching_disabled_draws_immediately() {
    let mut arena = BatchArena::new(BatchConfig {
        batching: false,
        ..small_config()
    });
    let mut backend = RecordingBackend::new();

    assert_eq!(arena.start_frame(), Ok(false));
    submit(&mut arena, &mut backend, TextureHandle(2), PolyFlags::empty(), Rgba::WHITE, &fan(0, 4), false);
    submit(&mut arena, &mut backend, TextureHandle(2), PolyFlags::empty(), Rgba::WHITE, &fan(1, 4), false);
    assert_eq!(arena.end_frame(&mut backend), Ok(None));

    assert_eq!(backend.texture_binds(), vec![TextureHandle(2), TextureHandle(2)]);
    assert!(backend
        .draws()
        .all(|call| matches!(call, BackendCall::DrawPolygon { .. })));
    assert_eq!(backend.draw_count(), 2);
}
