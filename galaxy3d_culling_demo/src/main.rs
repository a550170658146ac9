//! Galaxy3D culling demo
//!
//! Builds a random scene of grouping nodes and models, then renders the same
//! animated frames through `OcTreeCuller` and `DummyCuller` and logs how many
//! models each one hands to the draw loop and how long culling took.

use std::f32::consts::FRAC_PI_3;
use std::time::{Duration, Instant};
use galaxy_3d_culling::galaxy3d::Engine;
use galaxy_3d_culling::galaxy3d::camera::Camera;
use galaxy_3d_culling::galaxy3d::config::{CullerConfig, OcTreeConfig};
use galaxy_3d_culling::galaxy3d::culling::{DummyCuller, OcTreeCuller};
use galaxy_3d_culling::galaxy3d::log::LogSeverity;
use galaxy_3d_culling::galaxy3d::scene::{NodeKind, LightType, RecordingDrawer, SceneRenderer, SpatialKey};
use galaxy_3d_culling::galaxy3d::Result;
use galaxy_3d_culling::glam::{Mat4, Quat, Vec3};
use galaxy_3d_culling::{engine_error, engine_info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SOURCE: &str = "galaxy3d::Demo";

const REGION_SIZE: f32 = 1000.0;
const GROUP_COUNT: usize = 40;
const MODELS_PER_GROUP: usize = 50;
const FRAME_COUNT: usize = 120;
const MOVES_PER_FRAME: usize = 25;

/// Node handles of the generated scene
struct DemoScene {
    groups: Vec<SpatialKey>,
    models: Vec<SpatialKey>,
}

/// Accumulated per-culler statistics
#[derive(Default)]
struct Stats {
    cull_time: Duration,
    visible: usize,
    drawn: usize,
}

fn random_offset(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn camera() -> Camera {
    Camera::perspective(FRAC_PI_3, 16.0 / 9.0, 0.5, 600.0)
}

/// Populate `renderer` with a seeded random hierarchy.
///
/// Both renderers are built from the same seed, so they hold identical
/// graphs with identical keys.
fn build_scene(renderer: &mut SceneRenderer, seed: u64) -> Result<DemoScene> {
    let mut rng = StdRng::seed_from_u64(seed);
    let lit = renderer.create_shader("lit");
    let outline = renderer.create_shader("outline");
    let root = renderer.root();
    renderer.attach_local_shader(root, lit)?;
    renderer.insert_node_at("sun", NodeKind::Light(LightType::Directional), None, Mat4::IDENTITY)?;

    let mut scene = DemoScene { groups: Vec::new(), models: Vec::new() };
    for g in 0..GROUP_COUNT {
        let position = random_offset(&mut rng, REGION_SIZE * 0.8);
        let group = renderer.insert_node_at(
            &format!("group{}", g),
            NodeKind::Grouping,
            None,
            Mat4::from_translation(position),
        )?;
        if g % 4 == 0 {
            renderer.attach_local_shader(group, outline)?;
        }
        if g % 10 == 0 {
            renderer.insert_node_at(
                &format!("lamp{}", g),
                NodeKind::Light(LightType::Point),
                Some(group),
                Mat4::IDENTITY,
            )?;
        }

        for m in 0..MODELS_PER_GROUP {
            let model = renderer.insert_node_at(
                &format!("model{}_{}", g, m),
                NodeKind::Model,
                Some(group),
                Mat4::from_translation(random_offset(&mut rng, 100.0)),
            )?;
            renderer.set_bounding_radius(model, rng.gen_range(0.5..4.0))?;
            scene.models.push(model);
        }
        scene.groups.push(group);
    }
    Ok(scene)
}

/// Animate the scene for one frame, then render it
fn run_frame(
    renderer: &mut SceneRenderer,
    scene: &DemoScene,
    rng: &mut StdRng,
    frame: usize,
    drawer: &mut RecordingDrawer,
    stats: &mut Stats,
) -> Result<()> {
    let angle = frame as f32 * 0.05;
    renderer.update_camera(|camera| {
        let eye = Vec3::new(angle.cos(), 0.2, angle.sin()) * 300.0;
        camera.look_at(eye, Vec3::ZERO, Vec3::Y);
    });

    for _ in 0..MOVES_PER_FRAME {
        let model = scene.models[rng.gen_range(0..scene.models.len())];
        renderer.set_local_transform(model, Mat4::from_translation(random_offset(rng, 100.0)))?;
    }
    let group = scene.groups[frame % scene.groups.len()];
    let spin = Mat4::from_rotation_translation(
        Quat::from_rotation_y(angle),
        random_offset(rng, REGION_SIZE * 0.8),
    );
    renderer.set_local_transform(group, spin)?;

    let start = Instant::now();
    renderer.render(drawer);
    stats.cull_time += start.elapsed();
    stats.visible += renderer.visible_set().len();
    stats.drawn += renderer.models_drawn();
    Ok(())
}

fn report(name: &str, stats: &Stats) {
    let frames = FRAME_COUNT as u32;
    engine_info!(
        SOURCE,
        "{}: {:.1} visible / {:.1} drawn per frame, {:?} per frame",
        name,
        stats.visible as f32 / FRAME_COUNT as f32,
        stats.drawn as f32 / FRAME_COUNT as f32,
        stats.cull_time / frames
    );
}

fn run() -> Result<()> {
    let seed = 0x6A1A_3D;
    let config = CullerConfig {
        octree: OcTreeConfig::with_region_size(REGION_SIZE),
        element_reserve: GROUP_COUNT * MODELS_PER_GROUP,
        light_reserve: GROUP_COUNT / 10 + 1,
    };

    let mut octree = SceneRenderer::new(Box::new(OcTreeCuller::new(camera(), config)?))?;
    let mut dummy = SceneRenderer::new(Box::new(DummyCuller::with_config(camera(), &config)))?;
    let octree_scene = build_scene(&mut octree, seed)?;
    let dummy_scene = build_scene(&mut dummy, seed)?;
    engine_info!(
        SOURCE,
        "Scene ready: {} groups, {} models",
        octree_scene.groups.len(),
        octree_scene.models.len()
    );

    let mut octree_rng = StdRng::seed_from_u64(seed + 1);
    let mut dummy_rng = StdRng::seed_from_u64(seed + 1);
    let mut octree_drawer = RecordingDrawer::new();
    let mut dummy_drawer = RecordingDrawer::new();
    let mut octree_stats = Stats::default();
    let mut dummy_stats = Stats::default();

    for frame in 0..FRAME_COUNT {
        run_frame(&mut octree, &octree_scene, &mut octree_rng, frame, &mut octree_drawer, &mut octree_stats)?;
        run_frame(&mut dummy, &dummy_scene, &mut dummy_rng, frame, &mut dummy_drawer, &mut dummy_stats)?;

        if octree.models_drawn() != dummy.models_drawn() {
            engine_error!(
                SOURCE,
                "Frame {}: octree culler drew {} models, dummy culler drew {}",
                frame,
                octree.models_drawn(),
                dummy.models_drawn()
            );
        }
    }

    report("OcTreeCuller", &octree_stats);
    report("DummyCuller", &dummy_stats);
    Ok(())
}

fn main() {
    // Octree splits and merges are traced; keep the console readable
    Engine::set_min_severity(LogSeverity::Info);

    if let Err(err) = run() {
        engine_error!(SOURCE, "Demo failed: {}", err);
        std::process::exit(1);
    }
}
