use std::path::PathBuf;
use std::time::Duration;

use render::Geometry;
use table::{AssetError, AssetLoader, AssetRequest, Placement, Simulation, TableConfig};

const WAIT: Duration = Duration::from_secs(10);

fn asset_root(test: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("table-assets-{}-{test}", std::process::id()));
    std::fs::create_dir_all(root.join("models")).unwrap();
    root
}

#[test]
fn loads_files_off_the_frame_loop() {
    let root = asset_root("load");
    std::fs::write(root.join("models/ball.glb"), b"glTF-bytes").unwrap();

    let mut loader = AssetLoader::new(&root);
    loader.request(AssetRequest::new("models/ball.glb", None, Placement::default()));
    assert_eq!(loader.in_flight(), 1);

    let done = loader.wait_idle(WAIT).unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(loader.in_flight(), 0);
    let fragment = done[0].result.as_ref().unwrap();
    assert_eq!(fragment.byte_len, 10);
    assert_eq!(fragment.source, root.join("models/ball.glb"));
}

#[test]
fn missing_and_empty_files_fail_individually() {
    let root = asset_root("fail");
    std::fs::write(root.join("models/empty.glb"), b"").unwrap();
    std::fs::write(root.join("models/rock.glb"), b"rock").unwrap();

    let mut loader = AssetLoader::new(&root);
    for path in ["models/missing.glb", "models/empty.glb", "models/rock.glb"] {
        loader.request(AssetRequest::new(path, None, Placement::default()));
    }
    let done = loader.wait_idle(WAIT).unwrap();
    assert_eq!(done.len(), 3);

    for loaded in &done {
        match loaded.request.path.as_str() {
            "models/missing.glb" => assert!(matches!(loaded.result, Err(AssetError::Io { .. }))),
            "models/empty.glb" => assert!(matches!(loaded.result, Err(AssetError::Empty(_)))),
            _ => assert!(loaded.result.is_ok()),
        }
    }
}

#[test]
fn many_requests_share_the_worker_pool() {
    let root = asset_root("pool");
    std::fs::write(root.join("models/rock.glb"), b"rock").unwrap();

    let mut loader = AssetLoader::new(&root);
    let requests = table::assets::LOADER_THREADS * 8;
    for _ in 0..requests {
        loader.request(AssetRequest::new("models/rock.glb", None, Placement::default()));
    }
    assert_eq!(loader.in_flight(), requests);

    let done = loader.wait_idle(WAIT).unwrap();
    assert_eq!(done.len(), requests);
    assert!(done.iter().all(|loaded| loaded.result.is_ok()));
    assert_eq!(loader.in_flight(), 0);
}

#[test]
fn poll_never_blocks() {
    let mut loader = AssetLoader::new(asset_root("poll"));
    assert!(loader.poll().is_empty());
    assert!(loader.wait_idle(Duration::ZERO).unwrap().is_empty());
}

#[test]
fn loaded_models_attach_under_their_nodes() {
    let root = asset_root("attach");
    std::fs::write(root.join("models/Tower.glb"), b"tower").unwrap();
    std::fs::write(root.join("models/pinball_flipper.glb"), b"flipper").unwrap();

    let mut config = TableConfig::default();
    config.assets.root = root;
    let mut sim = Simulation::new(config).unwrap();
    let nodes_before = sim.scene().len();

    // Two towers and two flipper models; walls and rocks are missing on disk
    let attached = sim.settle_assets(WAIT).unwrap();
    assert_eq!(attached, 4);
    assert_eq!(sim.scene().len(), nodes_before + 4);

    let scene = sim.scene();
    let towers: Vec<_> = scene
        .iter()
        .filter(|(_, node)| node.name == "Tower")
        .collect();
    assert_eq!(towers.len(), 2);
    for (_, tower) in &towers {
        assert_eq!(tower.parent, Some(sim.table()));
        assert!(matches!(tower.geometry, Geometry::Imported { byte_len: 5, .. }));
        assert!((tower.scale.x - 0.6).abs() < 1e-6);
    }

    let flipper = sim.flipper(table::FlipperSide::Left);
    let node = scene.node(table::Actuator::node(flipper)).unwrap();
    assert_eq!(node.children.len(), 1);
}

#[test]
fn failed_loads_do_not_stop_the_frame_loop() {
    let mut config = TableConfig::default();
    config.assets.root = asset_root("empty-root");
    let mut sim = Simulation::new(config).unwrap();
    let nodes = sim.scene().len();

    let mut failed = 0;
    for _ in 0..600 {
        failed += sim.frame(1.0 / 60.0).unwrap().assets_failed;
        if failed == 28 {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(failed, 28);
    assert_eq!(sim.scene().len(), nodes);
}
